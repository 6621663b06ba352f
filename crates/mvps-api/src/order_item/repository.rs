//! Order Item Repository
//!
//! Reads go through the `order_item_details` view so every line carries
//! its product and vendor names.

use serde::Deserialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use utoipa::IntoParams;

use crate::order::OrderItem;
use crate::shared::error::{ApiError, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::RowKey;
use crate::shared::store::{now_millis, SqliteTable};

/// Order line filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderItemFilter {
    pub order_id: Option<RowKey>,
    pub vendor_id: Option<RowKey>,
    pub product_id: Option<RowKey>,
}

impl OrderItemFilter {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .eq("order_id", self.order_id)
            .eq("vendor_id", self.vendor_id)
            .eq("product_id", self.product_id)
    }
}

pub struct OrderItemRepository {
    pool: SqlitePool,
}

impl OrderItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: RowKey) -> Result<Option<OrderItem>> {
        let item = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_item_details WHERE order_item_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Store the line's quantity and pricing, then refresh its order's totals.
    pub async fn update(&self, item: &OrderItem) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE order_items SET quantity = ?, unit_price = ?, discount_percentage = ?, \
             tax_percentage = ?, line_total = ? WHERE order_item_id = ?",
        )
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.discount_percentage)
        .bind(item.tax_percentage)
        .bind(item.line_total)
        .bind(item.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("OrderItem", item.id));
        }

        refresh_order_totals(&mut tx, item.order_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove the line and refresh its order's totals.
    pub async fn delete(&self, item: &OrderItem) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM order_items WHERE order_item_id = ?")
            .bind(item.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("OrderItem", item.id));
        }

        refresh_order_totals(&mut tx, item.order_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Re-derive `total_amount` from the remaining lines.
///
/// The recorded discount is capped at the new total so `final_amount`
/// never goes negative.
async fn refresh_order_totals(tx: &mut Transaction<'_, Sqlite>, order_id: RowKey) -> Result<()> {
    sqlx::query(
        "UPDATE orders SET total_amount = ROUND(( \
             SELECT COALESCE(SUM(line_total), 0) FROM order_items WHERE order_id = ?), 2), \
         updated_at = ? WHERE order_id = ?",
    )
    .bind(order_id)
    .bind(now_millis().timestamp_millis())
    .bind(order_id)
    .execute(&mut **tx)
    .await?;

    // SET reads pre-update values, so the cap needs its own statement
    sqlx::query(
        "UPDATE orders SET discount_amount = MIN(discount_amount, total_amount), \
         final_amount = ROUND(total_amount - MIN(discount_amount, total_amount) + tax_amount, 2) \
         WHERE order_id = ?",
    )
    .bind(order_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

impl SqliteTable for OrderItemRepository {
    type Entity = OrderItem;
    const TABLE: &'static str = "order_item_details";
    const KEY_COLUMN: &'static str = "order_item_id";

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
