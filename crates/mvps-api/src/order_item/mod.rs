//! Order Lines
//!
//! Direct access to order lines across orders. Changing a line refreshes
//! the totals of the order it belongs to.

pub mod repository;
pub mod api;

pub use repository::{OrderItemFilter, OrderItemRepository};
pub use api::{OrderItemsState, order_items_router};
