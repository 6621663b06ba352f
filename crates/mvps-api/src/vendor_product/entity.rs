//! Vendor Product Entities
//!
//! A vendor's priced, stocked listing of a product plus its stock audit trail.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::shared::pagination::{Keyed, RowKey};
use crate::shared::store::{now_millis, EpochMillis};

/// Price after the percentage discount, rounded to cents.
///
/// Mirrors the stored `final_price` generated column.
pub fn discounted_price(cost_price: f64, discount_percentage: f64) -> f64 {
    let raw = cost_price * (1.0 - discount_percentage / 100.0);
    (raw * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct VendorProduct {
    #[sqlx(rename = "vendor_product_id")]
    pub id: RowKey,
    pub vendor_id: RowKey,
    pub product_id: RowKey,
    pub vendor_sku: Option<String>,
    pub cost_price: f64,
    /// Maximum retail price
    pub mrp: Option<f64>,
    pub discount_percentage: f64,
    /// Computed by storage; refreshed on every read
    pub final_price: f64,
    pub minimum_order_quantity: i64,
    pub stock_quantity: i64,
    pub expiry_date: Option<NaiveDate>,
    pub is_available: bool,
    pub delivery_time_days: i64,
    #[sqlx(try_from = "EpochMillis")]
    pub created_at: DateTime<Utc>,
    #[sqlx(try_from = "EpochMillis")]
    pub updated_at: DateTime<Utc>,
}

impl VendorProduct {
    pub fn new(vendor_id: RowKey, product_id: RowKey, cost_price: f64) -> Self {
        let now = now_millis();
        Self {
            id: 0,
            vendor_id,
            product_id,
            vendor_sku: None,
            cost_price,
            mrp: None,
            discount_percentage: 0.0,
            final_price: cost_price,
            minimum_order_quantity: 1,
            stock_quantity: 0,
            expiry_date: None,
            is_available: true,
            delivery_time_days: 7,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_discount(mut self, discount_percentage: f64) -> Self {
        self.discount_percentage = discount_percentage;
        self.final_price = discounted_price(self.cost_price, discount_percentage);
        self
    }

    pub fn with_stock(mut self, stock_quantity: i64) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }

    /// Price charged per unit.
    pub fn effective_price(&self) -> f64 {
        discounted_price(self.cost_price, self.discount_percentage)
    }

    pub fn is_orderable(&self) -> bool {
        self.is_available && self.stock_quantity > 0
    }

    /// Soft delete: delist and zero the stock.
    pub fn withdraw(&mut self) {
        self.is_available = false;
        self.stock_quantity = 0;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

impl Keyed for VendorProduct {
    fn key(&self) -> RowKey {
        self.id
    }
}

/// One recorded stock change, joined with product and vendor names
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StockMovement {
    #[sqlx(rename = "movement_id")]
    pub id: RowKey,
    pub vendor_product_id: RowKey,
    pub product_id: RowKey,
    pub product_name: String,
    pub vendor_id: RowKey,
    pub vendor_name: String,
    pub vendor_sku: Option<String>,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub change_amount: i64,
    #[sqlx(try_from = "EpochMillis")]
    pub changed_at: DateTime<Utc>,
}

/// One vendor's offer for a product, ranked against the other offers
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PriceOffer {
    pub product_id: RowKey,
    pub product_name: String,
    pub generic_name: Option<String>,
    pub category_id: Option<RowKey>,
    pub vendor_product_id: RowKey,
    pub vendor_id: RowKey,
    pub vendor_name: String,
    pub cost_price: f64,
    pub discount_percentage: f64,
    pub final_price: f64,
    pub stock_quantity: i64,
    pub is_available: bool,
    /// Matches the lowest final price among the product's offers
    pub is_lowest: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discounted_price_rounds_to_cents() {
        assert_eq!(discounted_price(100.0, 0.0), 100.0);
        assert_eq!(discounted_price(100.0, 12.5), 87.5);
        assert_eq!(discounted_price(19.99, 10.0), 17.99);
    }

    #[test]
    fn test_withdraw_delists_and_zeroes_stock() {
        let mut vp = VendorProduct::new(1, 2, 10.0).with_stock(40);
        assert!(vp.is_orderable());
        vp.withdraw();
        assert!(!vp.is_available);
        assert_eq!(vp.stock_quantity, 0);
        assert!(!vp.is_orderable());
    }
}
