//! Product Category Aggregate
//!
//! A tree of categories; products reference their category.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::Category;
pub use repository::{CategoryFilter, CategoryRepository};
pub use api::{CategoriesState, categories_router};
