use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use etl_common::column_values;
use etl_model::Value;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TransformError};
use crate::stages::filter_rows;
use crate::state::TableState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// A row predicate.
///
/// Comparisons against a null cell are false for every operator. Values of
/// different kinds (a number and a text) are unequal and unordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Compare {
        column: String,
        cmp: CompareOp,
        value: Value,
    },
    IsNull {
        column: String,
    },
    IsNotNull {
        column: String,
    },
    All {
        predicates: Vec<Predicate>,
    },
    Any {
        predicates: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn compare(column: impl Into<String>, cmp: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.into(),
            cmp,
            value: value.into(),
        }
    }

    /// Columns the predicate reads.
    pub fn columns(&self) -> BTreeSet<&str> {
        let mut columns = BTreeSet::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'a>(&'a self, columns: &mut BTreeSet<&'a str>) {
        match self {
            Predicate::Compare { column, .. }
            | Predicate::IsNull { column }
            | Predicate::IsNotNull { column } => {
                columns.insert(column.as_str());
            }
            Predicate::All { predicates } | Predicate::Any { predicates } => {
                for predicate in predicates {
                    predicate.collect_columns(columns);
                }
            }
        }
    }

    /// Evaluate against one row; `cell` returns the row's value for a column.
    pub fn matches<'v>(&self, cell: &dyn Fn(&str) -> &'v Value) -> bool {
        match self {
            Predicate::Compare { column, cmp, value } => {
                let current = cell(column);
                if current.is_null() || value.is_null() {
                    return false;
                }
                match compare(current, value) {
                    Some(ordering) => cmp.accepts(ordering),
                    None => *cmp == CompareOp::Ne,
                }
            }
            Predicate::IsNull { column } => cell(column).is_null(),
            Predicate::IsNotNull { column } => !cell(column).is_null(),
            Predicate::All { predicates } => predicates.iter().all(|p| p.matches(cell)),
            Predicate::Any { predicates } => predicates.iter().any(|p| p.matches(cell)),
        }
    }
}

/// Ordering of two non-null values; `None` when their kinds are not
/// comparable.
fn compare(cell: &Value, literal: &Value) -> Option<Ordering> {
    match (cell, literal) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => match (cell.as_f64(), literal.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { column, cmp, value } => match value {
                Value::Text(text) => write!(f, "{column} {} '{text}'", cmp.symbol()),
                other => write!(f, "{column} {} {other}", cmp.symbol()),
            },
            Predicate::IsNull { column } => write!(f, "{column} is null"),
            Predicate::IsNotNull { column } => write!(f, "{column} is not null"),
            Predicate::All { predicates } => join(f, predicates, " and "),
            Predicate::Any { predicates } => join(f, predicates, " or "),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, predicates: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (idx, predicate) in predicates.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{predicate}")?;
    }
    f.write_str(")")
}

const OPERATORS: &[(&str, CompareOp)] = &[
    ("==", CompareOp::Eq),
    ("!=", CompareOp::Ne),
    ("<=", CompareOp::Le),
    (">=", CompareOp::Ge),
    ("<", CompareOp::Lt),
    (">", CompareOp::Gt),
    ("=", CompareOp::Eq),
];

/// Parses `<column> <op> <literal>`, `<column> is null` and
/// `<column> is not null`.
///
/// Operators are `==`, `=`, `!=`, `<`, `<=`, `>`, `>=`. A literal in single
/// or double quotes is text; otherwise it is inferred like a CSV cell.
///
/// ```
/// use etl_transform::{CompareOp, Predicate};
///
/// let parsed: Predicate = "price >= 10.5".parse().unwrap();
/// assert_eq!(parsed, Predicate::compare("price", CompareOp::Ge, 10.5));
///
/// let parsed: Predicate = "status == 'shipped'".parse().unwrap();
/// assert_eq!(parsed, Predicate::compare("status", CompareOp::Eq, "shipped"));
/// ```
impl FromStr for Predicate {
    type Err = TransformError;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = |message: &str| TransformError::InvalidPredicate {
            input: input.to_string(),
            message: message.to_string(),
        };
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        for (suffix, not) in [(" is not null", true), (" is null", false)] {
            if lower.ends_with(suffix) {
                let column = trimmed[..trimmed.len() - suffix.len()].trim();
                if column.is_empty() {
                    return Err(invalid("missing column name"));
                }
                let column = column.to_string();
                return Ok(if not {
                    Predicate::IsNotNull { column }
                } else {
                    Predicate::IsNull { column }
                });
            }
        }

        let start = trimmed
            .find(['=', '!', '<', '>'])
            .ok_or_else(|| invalid("expected a comparison operator"))?;
        let column = trimmed[..start].trim();
        if column.is_empty() {
            return Err(invalid("missing column name"));
        }
        let rest = &trimmed[start..];
        let (symbol, cmp) = OPERATORS
            .iter()
            .find(|(symbol, _)| rest.starts_with(symbol))
            .ok_or_else(|| invalid("expected a comparison operator"))?;
        let literal = rest[symbol.len()..].trim();
        let value = parse_literal(literal).ok_or_else(|| invalid("missing literal"))?;
        Ok(Predicate::compare(column, *cmp, value))
    }
}

fn parse_literal(literal: &str) -> Option<Value> {
    if literal.is_empty() || literal.starts_with(['=', '!', '<', '>']) {
        return None;
    }
    for quote in ['\'', '"'] {
        if literal.len() >= 2 && literal.starts_with(quote) && literal.ends_with(quote) {
            return Some(Value::Text(literal[1..literal.len() - 1].to_string()));
        }
    }
    if literal.eq_ignore_ascii_case("null") || literal.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(Value::infer(literal))
}

/// Keep the rows matching `predicate`, in order.
pub fn filter(state: TableState, predicate: &Predicate) -> Result<TableState> {
    let mut cells: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
    for column in predicate.columns() {
        state.require_column(column)?;
        cells.insert(column, column_values(&state.data, column)?);
    }

    let null = Value::Null;
    let keep: Vec<bool> = (0..state.height())
        .map(|row| {
            let cell = |column: &str| -> &Value {
                cells
                    .get(column)
                    .and_then(|values| values.get(row))
                    .unwrap_or(&null)
            };
            predicate.matches(&cell)
        })
        .collect();
    let data = filter_rows(&state.data, &keep)?;
    info!(
        table = %state.name,
        condition = %predicate,
        before = state.height(),
        after = data.height(),
        "filtered rows"
    );
    Ok(state.with_data(data))
}
