//! Order Repository

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;

use super::entity::{Order, OrderItem, OrderStatus, OrderType, PaymentStatus, PricedLine};
use crate::shared::error::{ApiError, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::RowKey;
use crate::shared::store::SqliteTable;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_number TEXT NOT NULL UNIQUE,
    customer_id INTEGER NOT NULL REFERENCES customers(customer_id),
    order_type TEXT,
    order_status TEXT NOT NULL DEFAULT 'pending',
    payment_status TEXT NOT NULL DEFAULT 'pending',
    order_date INTEGER NOT NULL,
    total_amount REAL NOT NULL DEFAULT 0,
    discount_amount REAL NOT NULL DEFAULT 0,
    tax_amount REAL NOT NULL DEFAULT 0,
    final_amount REAL NOT NULL DEFAULT 0,
    delivery_address TEXT,
    notes TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id);
CREATE INDEX IF NOT EXISTS idx_orders_date ON orders(order_date);

CREATE TABLE IF NOT EXISTS order_items (
    order_item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders(order_id),
    product_id INTEGER NOT NULL REFERENCES products(product_id),
    vendor_id INTEGER NOT NULL REFERENCES vendors(vendor_id),
    vendor_product_id INTEGER NOT NULL REFERENCES vendor_products(vendor_product_id),
    quantity INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    discount_percentage REAL NOT NULL DEFAULT 0,
    tax_percentage REAL NOT NULL DEFAULT 0,
    line_total REAL NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);

CREATE VIEW IF NOT EXISTS order_item_details AS
SELECT oi.*, p.product_name, v.vendor_name
FROM order_items oi
LEFT JOIN products p ON p.product_id = oi.product_id
LEFT JOIN vendors v ON v.vendor_id = oi.vendor_id;
"#;

/// Order list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub customer_id: Option<RowKey>,
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub order_type: Option<OrderType>,
    /// Orders placed on or after this day (YYYY-MM-DD)
    pub from_date: Option<NaiveDate>,
    /// Orders placed on or before 23:59:59 of this day (YYYY-MM-DD)
    pub to_date: Option<NaiveDate>,
}

impl OrderFilter {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .eq("customer_id", self.customer_id)
            .eq("order_status", self.order_status.map(|s| s.as_str()))
            .eq("payment_status", self.payment_status.map(|s| s.as_str()))
            .eq("order_type", self.order_type.map(|t| t.as_str()))
            .on_or_after_day("order_date", self.from_date)
            .on_or_before_day("order_date", self.to_date)
    }
}

/// Free-text order search with the status filters of the listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderSearch {
    /// Substring of the order number, delivery address or notes
    pub search: Option<String>,
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub order_type: Option<OrderType>,
}

impl OrderSearch {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .contains(&["order_number", "delivery_address", "notes"], self.search.clone())
            .eq("order_status", self.order_status.map(|s| s.as_str()))
            .eq("payment_status", self.payment_status.map(|s| s.as_str()))
            .eq("order_type", self.order_type.map(|t| t.as_str()))
    }
}

const ITEMS_QUERY: &str =
    "SELECT * FROM order_item_details WHERE order_id = ? ORDER BY order_item_id ASC";

pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the order and its lines in one transaction.
    ///
    /// Assigns ids to the order and every line.
    pub async fn insert_with_items(&self, order: &mut Order, lines: &mut [PricedLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO orders (order_number, customer_id, order_type, order_status, payment_status, \
             order_date, total_amount, discount_amount, tax_amount, final_amount, delivery_address, \
             notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.order_number)
        .bind(order.customer_id)
        .bind(order.order_type.map(|t| t.as_str()))
        .bind(order.order_status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.order_date.timestamp_millis())
        .bind(order.total_amount)
        .bind(order.discount_amount)
        .bind(order.tax_amount)
        .bind(order.final_amount)
        .bind(&order.delivery_address)
        .bind(&order.notes)
        .bind(order.created_at.timestamp_millis())
        .bind(order.updated_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;
        order.id = result.last_insert_rowid();

        for line in lines.iter_mut() {
            let item = &mut line.item;
            item.order_id = order.id;
            let result = sqlx::query(
                "INSERT INTO order_items (order_id, product_id, vendor_id, vendor_product_id, quantity, \
                 unit_price, discount_percentage, tax_percentage, line_total, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(item.vendor_id)
            .bind(item.vendor_product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.discount_percentage)
            .bind(item.tax_percentage)
            .bind(item.line_total)
            .bind(item.created_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
            item.id = result.last_insert_rowid();
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: RowKey) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    /// Lines of an order with product and vendor names.
    pub async fn items_for(&self, order_id: RowKey) -> Result<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(ITEMS_QUERY)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn update(&self, order: &Order) -> Result<()> {
        let result = sqlx::query(
            "UPDATE orders SET order_type = ?, order_status = ?, payment_status = ?, \
             total_amount = ?, discount_amount = ?, tax_amount = ?, final_amount = ?, \
             delivery_address = ?, notes = ?, updated_at = ? WHERE order_id = ?",
        )
        .bind(order.order_type.map(|t| t.as_str()))
        .bind(order.order_status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.total_amount)
        .bind(order.discount_amount)
        .bind(order.tax_amount)
        .bind(order.final_amount)
        .bind(&order.delivery_address)
        .bind(&order.notes)
        .bind(order.updated_at.timestamp_millis())
        .bind(order.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Order", order.id));
        }
        Ok(())
    }
}

impl SqliteTable for OrderRepository {
    type Entity = Order;
    const TABLE: &'static str = "orders";
    const KEY_COLUMN: &'static str = "order_id";

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
