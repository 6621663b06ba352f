//! Vendor Order Repository

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;

use super::entity::{VendorOrder, VendorOrderStatus};
use crate::shared::error::{ApiError, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::RowKey;
use crate::shared::store::{date_text, SqliteTable};

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS vendor_orders (
    vendor_order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    vendor_id INTEGER NOT NULL REFERENCES vendors(vendor_id),
    po_number TEXT NOT NULL UNIQUE,
    order_date INTEGER NOT NULL,
    total_amount REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    expected_delivery_date TEXT,
    actual_delivery_date TEXT,
    notes TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_vendor_orders_vendor ON vendor_orders(vendor_id);
CREATE INDEX IF NOT EXISTS idx_vendor_orders_date ON vendor_orders(order_date);
"#;

/// Purchase order list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VendorOrderFilter {
    pub vendor_id: Option<RowKey>,
    pub status: Option<VendorOrderStatus>,
    /// Placed on or after this day (YYYY-MM-DD)
    pub from_date: Option<NaiveDate>,
    /// Placed on or before 23:59:59 of this day (YYYY-MM-DD)
    pub to_date: Option<NaiveDate>,
}

impl VendorOrderFilter {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .eq("vendor_id", self.vendor_id)
            .eq("status", self.status.map(|s| s.as_str()))
            .on_or_after_day("order_date", self.from_date)
            .on_or_before_day("order_date", self.to_date)
    }
}

pub struct VendorOrderRepository {
    pool: SqlitePool,
}

impl VendorOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, order: &mut VendorOrder) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO vendor_orders (vendor_id, po_number, order_date, total_amount, status, \
             expected_delivery_date, actual_delivery_date, notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order.vendor_id)
        .bind(&order.po_number)
        .bind(order.order_date.timestamp_millis())
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(date_text(order.expected_delivery_date))
        .bind(date_text(order.actual_delivery_date))
        .bind(&order.notes)
        .bind(order.created_at.timestamp_millis())
        .bind(order.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        order.id = result.last_insert_rowid();
        Ok(())
    }

    pub async fn find_by_id(&self, id: RowKey) -> Result<Option<VendorOrder>> {
        let order = sqlx::query_as::<_, VendorOrder>(
            "SELECT * FROM vendor_orders WHERE vendor_order_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn update(&self, order: &VendorOrder) -> Result<()> {
        let result = sqlx::query(
            "UPDATE vendor_orders SET total_amount = ?, status = ?, expected_delivery_date = ?, \
             actual_delivery_date = ?, notes = ?, updated_at = ? WHERE vendor_order_id = ?",
        )
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(date_text(order.expected_delivery_date))
        .bind(date_text(order.actual_delivery_date))
        .bind(&order.notes)
        .bind(order.updated_at.timestamp_millis())
        .bind(order.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("VendorOrder", order.id));
        }
        Ok(())
    }
}

impl SqliteTable for VendorOrderRepository {
    type Entity = VendorOrder;
    const TABLE: &'static str = "vendor_orders";
    const KEY_COLUMN: &'static str = "vendor_order_id";

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::shared::filter::{FilterValue, Predicate};
    use crate::vendor::{Vendor, VendorRepository};

    #[tokio::test]
    async fn test_dates_survive_storage() {
        let pool = db::connect_in_memory().await.unwrap();
        let mut vendor = Vendor::new("Acme");
        VendorRepository::new(pool.clone()).insert(&mut vendor).await.unwrap();

        let repo = VendorOrderRepository::new(pool);
        let mut order = VendorOrder::new(vendor.id, 540.0);
        order.expected_delivery_date = NaiveDate::from_ymd_opt(2024, 7, 1);
        repo.insert(&mut order).await.unwrap();

        order.receive(NaiveDate::from_ymd_opt(2024, 7, 3));
        repo.update(&order).await.unwrap();

        let stored = repo.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);
        assert_eq!(stored.status, VendorOrderStatus::Received);
    }

    #[tokio::test]
    async fn test_unknown_vendor_is_rejected_by_storage() {
        let pool = db::connect_in_memory().await.unwrap();
        let repo = VendorOrderRepository::new(pool);
        let mut order = VendorOrder::new(404, 1.0);
        assert!(repo.insert(&mut order).await.is_err());
    }

    #[test]
    fn test_status_filter_uses_stored_text() {
        let filter = VendorOrderFilter {
            status: Some(VendorOrderStatus::Shipped),
            ..Default::default()
        };
        assert_eq!(
            filter.to_filter_set().predicates(),
            &[Predicate::Eq { column: "status", value: FilterValue::Text("shipped".to_string()) }]
        );
    }
}
