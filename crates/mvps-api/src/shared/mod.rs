//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod error;
pub mod api_common;
pub mod filter;
pub mod pagination;
pub mod reference;
pub mod store;
pub mod text_enum;

// APIs
pub mod health_api;

// Re-export commonly used items
pub use error::{ApiError, Result};
pub use api_common::{CursorParams, DataResponse, PaginationParams, Patch, SuccessResponse};
pub use filter::FilterSet;
pub use pagination::{CursorPage, Keyed, OffsetPage, PageSource, RowKey};
pub use store::SqliteTable;
pub use health_api::{HealthState, health_router};
