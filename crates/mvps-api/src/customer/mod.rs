//! Customer Aggregate
//!
//! Buyers: retail, wholesale and institutional.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::{Customer, CustomerType};
pub use repository::{CustomerFilter, CustomerRepository};
pub use api::{CustomersState, customers_router};
