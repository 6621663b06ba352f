//! Product Aggregate

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::Product;
pub use repository::{ProductFilter, ProductRepository};
pub use api::{ProductsState, products_router};
