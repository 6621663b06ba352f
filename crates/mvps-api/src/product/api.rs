//! Products API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Product;
use super::repository::{ProductFilter, ProductRepository};
use crate::category::CategoryRepository;
use crate::shared::api_common::{
    require_text, CursorParams, DataResponse, PaginationParams, Patch, SuccessResponse,
};
use crate::shared::error::{ApiError, ErrorResponse, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::{fetch_cursor_page, fetch_offset_page, CursorPage, OffsetPage, RowKey};
use crate::vendor_product::{MarketQuery, OfferScope, PriceOfferResponse, VendorProductRepository};

/// Create product request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub product_name: String,
    pub generic_name: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub hsn_code: Option<String>,
    pub unit_of_measure: Option<String>,
    pub barcode: Option<String>,
    /// Defaults to false
    pub prescription_required: Option<bool>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

/// Update product request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProductRequest {
    pub product_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub generic_name: Patch<String>,
    #[schema(value_type = Option<i64>)]
    pub category_id: Patch<i64>,
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub manufacturer: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub hsn_code: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub unit_of_measure: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub barcode: Patch<String>,
    pub prescription_required: Option<bool>,
    pub is_active: Option<bool>,
}

/// Product response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub product_id: RowKey,
    pub product_name: String,
    pub generic_name: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub hsn_code: Option<String>,
    pub unit_of_measure: Option<String>,
    pub barcode: Option<String>,
    pub prescription_required: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            product_id: p.id,
            product_name: p.name,
            generic_name: p.generic_name,
            category_id: p.category_id,
            description: p.description,
            manufacturer: p.manufacturer,
            hsn_code: p.hsn_code,
            unit_of_measure: p.unit_of_measure,
            barcode: p.barcode,
            prescription_required: p.prescription_required,
            is_active: p.is_active,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Products service state
#[derive(Clone)]
pub struct ProductsState {
    pub product_repo: Arc<ProductRepository>,
    pub category_repo: Arc<CategoryRepository>,
    pub vendor_product_repo: Arc<VendorProductRepository>,
}

async fn load_product(state: &ProductsState, id: RowKey) -> Result<Product> {
    state
        .product_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

async fn require_category(state: &ProductsState, category_id: Option<RowKey>) -> Result<()> {
    if let Some(id) = category_id {
        if state.category_repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::not_found("Category", id));
        }
    }
    Ok(())
}

/// List products (offset pagination)
#[utoipa::path(
    get,
    path = "",
    tag = "products",
    params(PaginationParams, ProductFilter),
    responses(
        (status = 200, description = "Page of products", body = OffsetPage<ProductResponse>)
    )
)]
pub async fn list_products(
    State(state): State<ProductsState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<OffsetPage<ProductResponse>>> {
    let page = fetch_offset_page(
        state.product_repo.as_ref(),
        paging.page,
        paging.limit,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(ProductResponse::from)))
}

/// List products (cursor pagination)
#[utoipa::path(
    get,
    path = "/cursor",
    tag = "products",
    params(CursorParams, ProductFilter),
    responses(
        (status = 200, description = "Page of products", body = CursorPage<ProductResponse>)
    )
)]
pub async fn list_products_by_cursor(
    State(state): State<ProductsState>,
    Query(paging): Query<CursorParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<CursorPage<ProductResponse>>> {
    let page = fetch_cursor_page(
        state.product_repo.as_ref(),
        paging.cursor(),
        paging.size,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(ProductResponse::from)))
}

/// Create a product
#[utoipa::path(
    post,
    path = "",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = DataResponse<ProductResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Duplicate barcode", body = ErrorResponse)
    )
)]
pub async fn create_product(
    State(state): State<ProductsState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<DataResponse<ProductResponse>>)> {
    let mut product = Product::new(require_text("productName", &req.product_name)?);
    require_category(&state, req.category_id).await?;
    product.generic_name = req.generic_name;
    product.category_id = req.category_id;
    product.description = req.description;
    product.manufacturer = req.manufacturer;
    product.hsn_code = req.hsn_code;
    product.unit_of_measure = req.unit_of_measure;
    product.barcode = req.barcode;
    product.prescription_required = req.prescription_required.unwrap_or(false);
    product.is_active = req.is_active.unwrap_or(true);

    state.product_repo.insert(&mut product).await?;
    info!(product_id = product.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(product.into(), "Product created successfully")),
    ))
}

/// Get product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = DataResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn get_product(
    State(state): State<ProductsState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<ProductResponse>>> {
    let product = load_product(&state, id).await?;
    Ok(Json(DataResponse::ok(product.into())))
}

/// Get product by barcode
#[utoipa::path(
    get,
    path = "/barcode/{barcode}",
    tag = "products",
    params(
        ("barcode" = String, Path, description = "Product barcode")
    ),
    responses(
        (status = 200, description = "Product found", body = DataResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn get_product_by_barcode(
    State(state): State<ProductsState>,
    Path(barcode): Path<String>,
) -> Result<Json<DataResponse<ProductResponse>>> {
    let product = state
        .product_repo
        .find_by_barcode(&barcode)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &barcode))?;

    Ok(Json(DataResponse::ok(product.into())))
}

/// Update product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = DataResponse<ProductResponse>),
        (status = 404, description = "Product or category not found", body = ErrorResponse)
    )
)]
pub async fn update_product(
    State(state): State<ProductsState>,
    Path(id): Path<RowKey>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<DataResponse<ProductResponse>>> {
    let mut product = load_product(&state, id).await?;

    if let Some(name) = req.product_name {
        product.name = require_text("productName", &name)?;
    }
    req.generic_name.apply_to(&mut product.generic_name);
    if let Patch::Value(category_id) = req.category_id {
        require_category(&state, Some(category_id)).await?;
    }
    req.category_id.apply_to(&mut product.category_id);
    req.description.apply_to(&mut product.description);
    req.manufacturer.apply_to(&mut product.manufacturer);
    req.hsn_code.apply_to(&mut product.hsn_code);
    req.unit_of_measure.apply_to(&mut product.unit_of_measure);
    req.barcode.apply_to(&mut product.barcode);
    if let Some(required) = req.prescription_required {
        product.prescription_required = required;
    }
    if let Some(active) = req.is_active {
        product.is_active = active;
    }
    product.touch();

    state.product_repo.update(&product).await?;

    Ok(Json(DataResponse::with_message(product.into(), "Product updated successfully")))
}

/// Delete product (soft delete)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deactivated", body = SuccessResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn delete_product(
    State(state): State<ProductsState>,
    Path(id): Path<RowKey>,
) -> Result<Json<SuccessResponse>> {
    let mut product = load_product(&state, id).await?;
    product.deactivate();
    state.product_repo.update(&product).await?;

    info!(product_id = id, "Product deactivated");
    Ok(Json(SuccessResponse::with_message("Product deleted successfully")))
}

/// Vendors offering a product, cheapest first
///
/// Lists every available offer, including those currently out of stock.
#[utoipa::path(
    get,
    path = "/{id}/vendors",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Offers for the product", body = DataResponse<Vec<PriceOfferResponse>>),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn list_product_vendors(
    State(state): State<ProductsState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<Vec<PriceOfferResponse>>>> {
    load_product(&state, id).await?;

    let mut query = MarketQuery::new(OfferScope::All);
    query.in_stock_only = false;
    query.ranked = FilterSet::new().eq("vp.product_id", Some(id));
    let offers = state.vendor_product_repo.market_offers(&query).await?;

    Ok(Json(DataResponse::ok(
        offers.into_iter().map(PriceOfferResponse::from).collect(),
    )))
}

/// Create products router
pub fn products_router(state: ProductsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_products, create_product))
        .routes(routes!(list_products_by_cursor))
        .routes(routes!(get_product_by_barcode))
        .routes(routes!(get_product, update_product, delete_product))
        .routes(routes!(list_product_vendors))
        .with_state(state)
}
