//! Vendor Order Aggregate
//!
//! Purchase orders placed with vendors to restock the marketplace.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::{VendorOrder, VendorOrderStatus};
pub use repository::{VendorOrderFilter, VendorOrderRepository};
pub use api::{VendorOrdersState, vendor_orders_router};
