//! Vendor Order Entity

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::shared::pagination::{Keyed, RowKey};
use crate::shared::reference::dated_reference;
use crate::shared::store::{now_millis, EpochMillis};

crate::text_enum! {
    /// Purchase order lifecycle
    pub enum VendorOrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Shipped => "shipped",
        Received => "received",
        Cancelled => "cancelled",
    }
}

/// A purchase order with a vendor
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct VendorOrder {
    #[sqlx(rename = "vendor_order_id")]
    pub id: RowKey,
    pub vendor_id: RowKey,
    /// `PO-<date>-<8 hex>`
    pub po_number: String,
    #[sqlx(try_from = "EpochMillis")]
    pub order_date: DateTime<Utc>,
    pub total_amount: f64,
    pub status: VendorOrderStatus,
    pub expected_delivery_date: Option<NaiveDate>,
    pub actual_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[sqlx(try_from = "EpochMillis")]
    pub created_at: DateTime<Utc>,
    #[sqlx(try_from = "EpochMillis")]
    pub updated_at: DateTime<Utc>,
}

impl VendorOrder {
    pub fn new(vendor_id: RowKey, total_amount: f64) -> Self {
        let now = now_millis();
        Self {
            id: 0,
            vendor_id,
            po_number: dated_reference("PO", now),
            order_date: now,
            total_amount,
            status: VendorOrderStatus::Pending,
            expected_delivery_date: None,
            actual_delivery_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record arrival; the delivery date defaults to today.
    pub fn receive(&mut self, on: Option<NaiveDate>) {
        self.status = VendorOrderStatus::Received;
        if self.actual_delivery_date.is_none() {
            self.actual_delivery_date = Some(on.unwrap_or_else(|| now_millis().date_naive()));
        }
        self.touch();
    }

    pub fn cancel(&mut self) {
        self.status = VendorOrderStatus::Cancelled;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

impl Keyed for VendorOrder {
    fn key(&self) -> RowKey {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_is_pending_with_po_number() {
        let order = VendorOrder::new(3, 1200.0);
        assert_eq!(order.status, VendorOrderStatus::Pending);
        let prefix = format!("PO-{}-", order.order_date.format("%Y-%m-%d"));
        assert!(order.po_number.starts_with(&prefix));
    }

    #[test]
    fn test_receive_keeps_recorded_delivery_date() {
        let recorded = NaiveDate::from_ymd_opt(2024, 6, 1);
        let mut order = VendorOrder::new(1, 0.0);
        order.actual_delivery_date = recorded;
        order.receive(NaiveDate::from_ymd_opt(2024, 6, 5));
        assert_eq!(order.status, VendorOrderStatus::Received);
        assert_eq!(order.actual_delivery_date, recorded);

        let mut fresh = VendorOrder::new(1, 0.0);
        fresh.receive(NaiveDate::from_ymd_opt(2024, 6, 5));
        assert_eq!(fresh.actual_delivery_date, NaiveDate::from_ymd_opt(2024, 6, 5));
    }

    #[test]
    fn test_status_vocabulary() {
        assert_eq!(VendorOrderStatus::allowed(), "pending, confirmed, shipped, received, cancelled");
        assert_eq!(VendorOrderStatus::parse("received"), Some(VendorOrderStatus::Received));
    }
}
