//! Order Entities

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::shared::pagination::{Keyed, RowKey};
use crate::shared::reference::dated_reference;
use crate::shared::store::{now_millis, EpochMillis};
use crate::vendor_product::VendorProduct;

crate::text_enum! {
    /// Fulfilment state
    pub enum OrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

crate::text_enum! {
    pub enum PaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
        Refunded => "refunded",
    }
}

crate::text_enum! {
    /// Sales channel
    pub enum OrderType {
        Online => "online",
        DoorToDoor => "door_to_door",
    }
}

/// Human readable order number, `ORD-<date>-<8 hex>`.
pub fn generate_order_number(at: DateTime<Utc>) -> String {
    dated_reference("ORD", at)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Order {
    #[sqlx(rename = "order_id")]
    pub id: RowKey,
    pub order_number: String,
    pub customer_id: RowKey,
    pub order_type: Option<OrderType>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[sqlx(try_from = "EpochMillis")]
    pub order_date: DateTime<Utc>,
    pub total_amount: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    #[sqlx(try_from = "EpochMillis")]
    pub created_at: DateTime<Utc>,
    #[sqlx(try_from = "EpochMillis")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: RowKey) -> Self {
        let now = now_millis();
        Self {
            id: 0,
            order_number: generate_order_number(now),
            customer_id,
            order_type: None,
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            order_date: now,
            total_amount: 0.0,
            discount_amount: 0.0,
            tax_amount: 0.0,
            final_amount: 0.0,
            delivery_address: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total up the lines. Discount counts only lines priced below cost.
    pub fn apply_totals(&mut self, lines: &[PricedLine]) {
        self.total_amount = round_cents(lines.iter().map(|l| l.item.line_total).sum());
        self.discount_amount = round_cents(lines.iter().map(PricedLine::discount).sum());
        self.tax_amount = 0.0;
        self.recompute_final();
    }

    pub fn recompute_final(&mut self) {
        self.final_amount = round_cents(self.total_amount - self.discount_amount + self.tax_amount);
    }

    pub fn cancel(&mut self) {
        self.order_status = OrderStatus::Cancelled;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

impl Keyed for Order {
    fn key(&self) -> RowKey {
        self.id
    }
}

/// One order line, with product and vendor names when read back
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderItem {
    #[sqlx(rename = "order_item_id")]
    pub id: RowKey,
    pub order_id: RowKey,
    pub product_id: RowKey,
    pub vendor_id: RowKey,
    pub vendor_product_id: RowKey,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount_percentage: f64,
    pub tax_percentage: f64,
    pub line_total: f64,
    pub product_name: Option<String>,
    pub vendor_name: Option<String>,
    #[sqlx(try_from = "EpochMillis")]
    pub created_at: DateTime<Utc>,
}

impl Keyed for OrderItem {
    fn key(&self) -> RowKey {
        self.id
    }
}

impl OrderItem {
    /// `unit_price * quantity`, rounded to cents.
    pub fn recompute_line_total(&mut self) {
        self.line_total = round_cents(self.unit_price * self.quantity as f64);
    }
}

/// An order line priced from the vendor listing it was bought from.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub item: OrderItem,
    cost_price: f64,
}

impl PricedLine {
    pub fn new(vp: &VendorProduct, quantity: i64) -> Self {
        let unit_price = vp.effective_price();
        Self {
            item: OrderItem {
                id: 0,
                order_id: 0,
                product_id: vp.product_id,
                vendor_id: vp.vendor_id,
                vendor_product_id: vp.id,
                quantity,
                unit_price,
                discount_percentage: vp.discount_percentage,
                tax_percentage: 0.0,
                line_total: round_cents(unit_price * quantity as f64),
                product_name: None,
                vendor_name: None,
                created_at: now_millis(),
            },
            cost_price: vp.cost_price,
        }
    }

    /// Amount saved against cost, zero for undiscounted lines.
    pub fn discount(&self) -> f64 {
        if self.item.discount_percentage > 0.0 {
            self.cost_price * self.item.quantity as f64 - self.item.line_total
        } else {
            0.0
        }
    }
}
