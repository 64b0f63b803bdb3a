//! Built-in entity schemas.
//!
//! Every entity's first field is its key and is the only non-nullable field.
//! Order matters: nested schemas (order_detail) come after the entities they
//! embed so their columns can be resolved at registration.

use etl_model::{Field, Schema};

pub const USER: &str = "user";
pub const PRODUCT: &str = "product";
pub const ORDER: &str = "order";
pub const INVENTORY: &str = "inventory";
pub const ORDER_DETAIL: &str = "order_detail";
pub const REVIEW: &str = "review";
pub const CATEGORY: &str = "category";
pub const SUPPLIER: &str = "supplier";
pub const SHIPMENT: &str = "shipment";
pub const PAYMENT: &str = "payment";
pub const WISHLIST: &str = "wishlist";
pub const CART: &str = "cart";
pub const DISCOUNT: &str = "discount";

/// Entities loaded by default when no selection is given: the five that the
/// flat source is split into.
pub const DEFAULT_SPLIT: &[&str] = &[USER, PRODUCT, ORDER, INVENTORY, ORDER_DETAIL];

pub fn builtin_schemas() -> Vec<Schema> {
    vec![
        Schema::new(
            USER,
            vec![
                Field::integer("id").required(),
                Field::text("username"),
                Field::text("email"),
                Field::boolean("is_active"),
                Field::text("created_at"),
            ],
        ),
        Schema::new(
            PRODUCT,
            vec![
                Field::integer("product_id").required(),
                Field::text("name"),
                Field::text("description"),
                Field::float("price"),
                Field::boolean("in_stock"),
                Field::text("created_at"),
            ],
        ),
        Schema::new(
            ORDER,
            vec![
                Field::integer("order_id").required(),
                Field::integer("user_id"),
                Field::integer("product_id"),
                Field::integer("quantity"),
                Field::float("total_price"),
                Field::text("order_date"),
                Field::text("status"),
            ],
        ),
        Schema::new(
            INVENTORY,
            vec![
                Field::integer("product_id").required(),
                Field::integer("quantity_available"),
                Field::text("restock_date"),
                Field::text("supplier_name"),
                Field::text("supplier_contact"),
            ],
        ),
        Schema::new(
            ORDER_DETAIL,
            vec![
                Field::nested("order", ORDER),
                Field::nested("user", USER),
                Field::nested("product", PRODUCT),
                Field::text("shipping_address"),
                Field::text("billing_address"),
                Field::text("payment_method"),
                Field::text("delivery_date"),
            ],
        ),
        Schema::new(
            REVIEW,
            vec![
                Field::integer("id").required(),
                Field::integer("user_id"),
                Field::integer("product_id"),
                Field::integer("rating"),
                Field::text("comment"),
                Field::text("review_date"),
            ],
        ),
        Schema::new(
            CATEGORY,
            vec![
                Field::integer("id").required(),
                Field::text("name"),
                Field::text("description"),
                Field::text("created_at"),
            ],
        ),
        Schema::new(
            SUPPLIER,
            vec![
                Field::integer("id").required(),
                Field::text("name"),
                Field::text("contact_name"),
                Field::text("contact_email"),
                Field::text("phone_number"),
                Field::text("address"),
            ],
        ),
        Schema::new(
            SHIPMENT,
            vec![
                Field::integer("id").required(),
                Field::integer("order_id"),
                Field::text("shipment_date"),
                Field::text("delivery_date"),
                Field::text("carrier"),
                Field::text("tracking_number"),
                Field::text("status"),
            ],
        ),
        Schema::new(
            PAYMENT,
            vec![
                Field::integer("id").required(),
                Field::integer("order_id"),
                Field::text("payment_date"),
                Field::float("amount"),
                Field::text("payment_method"),
                Field::text("status"),
            ],
        ),
        Schema::new(
            WISHLIST,
            vec![
                Field::integer("id").required(),
                Field::integer("user_id"),
                Field::integer_list("product_ids"),
                Field::text("created_at"),
            ],
        ),
        Schema::new(
            CART,
            vec![
                Field::integer("id").required(),
                Field::integer("user_id"),
                Field::integer_list("product_ids"),
                Field::float("total_price"),
                Field::text("created_at"),
            ],
        ),
        Schema::new(
            DISCOUNT,
            vec![
                Field::integer("id").required(),
                Field::text("code"),
                Field::text("description"),
                Field::float("discount_percentage"),
                Field::text("valid_from"),
                Field::text("valid_to"),
                Field::boolean("active"),
            ],
        ),
    ]
}
