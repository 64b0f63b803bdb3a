//! Descriptive statistics over the observed (non-null) values of a column.

pub(crate) fn observed(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Largest absolute value; `0.0` for an empty slice.
pub(crate) fn magnitude(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        return Some(sum / n);
    }
    // The sum overflowed; average the values scaled into [-1, 1].
    let scale = magnitude(values);
    Some(values.iter().map(|v| v / scale).sum::<f64>() / n * scale)
}

pub(crate) fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Standard deviation with `ddof` delta degrees of freedom; `None` when
/// fewer than `ddof + 1` values are observed.
pub(crate) fn stdev(values: &[f64], ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }
    let dof = (values.len() - ddof) as f64;
    let center = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - center).powi(2)).sum();
    if sum_sq.is_finite() {
        return Some((sum_sq / dof).sqrt());
    }
    // Squared deviations overflowed; measure the spread in units of the
    // largest magnitude instead.
    let scale = magnitude(values);
    let center = center / scale;
    let sum_sq: f64 = values.iter().map(|v| (v / scale - center).powi(2)).sum();
    Some((sum_sq / dof).sqrt() * scale)
}

/// `(v - center) / spread` without overflowing on the difference.
pub(crate) fn scaled_offset(v: f64, center: f64, spread: f64) -> f64 {
    let offset = v - center;
    if offset.is_finite() {
        offset / spread
    } else {
        v / spread - center / spread
    }
}

/// Position of `v` within `[min, max]`, where `min < max`.
pub(crate) fn unit_position(v: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range.is_finite() {
        (v - min) / range
    } else {
        (v / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
    }
}
