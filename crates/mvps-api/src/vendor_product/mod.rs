//! Vendor Product Aggregate
//!
//! Vendor listings of products with pricing, stock levels and stock audit.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::{PriceOffer, StockMovement, VendorProduct};
pub use repository::{MarketQuery, OfferScope, StockChange, VendorProductFilter, VendorProductRepository};
pub use api::{PriceOfferResponse, VendorProductResponse, VendorProductsState, vendor_products_router};
