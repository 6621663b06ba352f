//! Order Aggregate
//!
//! Customer orders, their priced lines and status lifecycle.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::{Order, OrderItem, OrderStatus, OrderType, PaymentStatus, PricedLine};
pub use repository::{OrderFilter, OrderRepository, OrderSearch};
pub use api::{OrderItemResponse, OrderResponse, OrdersState, orders_router};
