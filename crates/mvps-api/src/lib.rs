//! MVPS Marketplace API
//!
//! Healthcare marketplace REST API over vendors, product categories,
//! products, customers, orders, vendor product listings and purchase orders
//! placed with vendors. Every collection is listed two ways:
//! - offset pages (`page`, `limit`) with total counts
//! - keyset pages (`cursor`, `size`) with an opaque cursor and look-ahead
//!   `hasNext` detection
//!
//! Both modes share one filter rendering per resource so they always agree
//! on membership and order.
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access and list filters
//! - `api` - REST endpoints

use std::sync::Arc;

use sqlx::SqlitePool;
use utoipa_axum::router::OpenApiRouter;

// Aggregates
pub mod vendor;
pub mod category;
pub mod product;
pub mod customer;
pub mod order;
pub mod order_item;
pub mod vendor_product;
pub mod vendor_order;

// Cross-aggregate queries
pub mod search;

// Shared infrastructure
pub mod shared;
pub mod db;
pub mod seed;

// Re-export common types from shared
pub use shared::error::{ApiError, Result};
pub use shared::pagination::{fetch_cursor_page, fetch_offset_page, CursorPage, OffsetPage, PageSource};
pub use shared::health_api::HealthState;

// Re-export main entity types for convenience
pub use vendor::{Vendor, VendorRepository};
pub use category::{Category, CategoryRepository};
pub use product::{Product, ProductRepository};
pub use customer::{Customer, CustomerRepository, CustomerType};
pub use order::{Order, OrderItem, OrderRepository, OrderStatus, OrderType, PaymentStatus};
pub use order_item::OrderItemRepository;
pub use vendor_product::{VendorProduct, VendorProductRepository};
pub use vendor_order::{VendorOrder, VendorOrderRepository, VendorOrderStatus};

/// Every resource router nested under its base path, OpenAPI paths collected.
pub fn api_router(pool: SqlitePool, health: HealthState) -> OpenApiRouter {
    let vendor_repo = Arc::new(VendorRepository::new(pool.clone()));
    let category_repo = Arc::new(CategoryRepository::new(pool.clone()));
    let product_repo = Arc::new(ProductRepository::new(pool.clone()));
    let customer_repo = Arc::new(CustomerRepository::new(pool.clone()));
    let order_repo = Arc::new(OrderRepository::new(pool.clone()));
    let order_item_repo = Arc::new(OrderItemRepository::new(pool.clone()));
    let vendor_order_repo = Arc::new(VendorOrderRepository::new(pool.clone()));
    let vendor_product_repo = Arc::new(VendorProductRepository::new(pool));

    let vendors_state = vendor::VendorsState {
        vendor_repo: vendor_repo.clone(),
        vendor_product_repo: vendor_product_repo.clone(),
    };
    let categories_state = category::CategoriesState { category_repo: category_repo.clone() };
    let products_state = product::ProductsState {
        product_repo: product_repo.clone(),
        category_repo,
        vendor_product_repo: vendor_product_repo.clone(),
    };
    let customers_state = customer::CustomersState {
        customer_repo: customer_repo.clone(),
        order_repo: order_repo.clone(),
    };
    let orders_state = order::OrdersState {
        order_repo,
        customer_repo,
        product_repo: product_repo.clone(),
        vendor_product_repo: vendor_product_repo.clone(),
    };
    let order_items_state = order_item::OrderItemsState { order_item_repo };
    let vendor_products_state = vendor_product::VendorProductsState {
        vendor_product_repo: vendor_product_repo.clone(),
        vendor_repo: vendor_repo.clone(),
        product_repo,
    };
    let vendor_orders_state = vendor_order::VendorOrdersState {
        vendor_order_repo,
        vendor_repo: vendor_repo.clone(),
    };
    let search_state = search::SearchState { vendor_repo, vendor_product_repo };

    OpenApiRouter::new()
        .nest("/vendors", vendor::vendors_router(vendors_state))
        .nest("/categories", category::categories_router(categories_state))
        .nest("/products", product::products_router(products_state))
        .nest("/customers", customer::customers_router(customers_state))
        .nest("/orders", order::orders_router(orders_state))
        .nest("/order-items", order_item::order_items_router(order_items_state))
        .nest("/vendor-products", vendor_product::vendor_products_router(vendor_products_state))
        .nest("/vendor-orders", vendor_order::vendor_orders_router(vendor_orders_state))
        .nest("/search", search::search_router(search_state))
        .nest("/health", shared::health_router(health))
}
