//! Marketplace Search
//!
//! Unpaged lookups across products with their best offer, and vendors.

pub mod api;

pub use api::{ProductSearchParams, SearchState, VendorSearchParams, search_router};
