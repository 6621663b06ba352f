//! Vendor Products API
//!
//! Listings, pricing, stock updates and stock history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{PriceOffer, StockMovement, VendorProduct};
use super::repository::{MarketQuery, OfferScope, StockChange, VendorProductFilter, VendorProductRepository};
use crate::product::ProductRepository;
use crate::shared::api_common::{
    require_at_least, require_range, CursorParams, DataResponse, PaginationParams, Patch, SuccessResponse,
};
use crate::shared::error::{ApiError, ErrorResponse, Result};
use crate::shared::filter::FilterSet;
use crate::shared::pagination::{fetch_cursor_page, fetch_offset_page, CursorPage, OffsetPage, RowKey};
use crate::vendor::VendorRepository;

/// Create vendor product request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorProductRequest {
    pub vendor_id: RowKey,
    pub product_id: RowKey,
    pub vendor_sku: Option<String>,
    pub cost_price: f64,
    pub mrp: Option<f64>,
    /// 0 to 100, defaults to 0
    pub discount_percentage: Option<f64>,
    /// Defaults to 1
    pub minimum_order_quantity: Option<i64>,
    /// Defaults to 0
    pub stock_quantity: Option<i64>,
    pub expiry_date: Option<NaiveDate>,
    /// Defaults to true
    pub is_available: Option<bool>,
    /// Defaults to 7
    pub delivery_time_days: Option<i64>,
}

/// Update vendor product request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateVendorProductRequest {
    #[schema(value_type = Option<String>)]
    pub vendor_sku: Patch<String>,
    pub cost_price: Option<f64>,
    #[schema(value_type = Option<f64>)]
    pub mrp: Patch<f64>,
    pub discount_percentage: Option<f64>,
    pub minimum_order_quantity: Option<i64>,
    pub stock_quantity: Option<i64>,
    #[schema(value_type = Option<NaiveDate>)]
    pub expiry_date: Patch<NaiveDate>,
    pub is_available: Option<bool>,
    pub delivery_time_days: Option<i64>,
}

/// Vendor product response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorProductResponse {
    pub vendor_product_id: RowKey,
    pub vendor_id: RowKey,
    pub product_id: RowKey,
    pub vendor_sku: Option<String>,
    pub cost_price: f64,
    pub mrp: Option<f64>,
    pub discount_percentage: f64,
    pub final_price: f64,
    pub minimum_order_quantity: i64,
    pub stock_quantity: i64,
    pub expiry_date: Option<NaiveDate>,
    pub is_available: bool,
    pub delivery_time_days: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<VendorProduct> for VendorProductResponse {
    fn from(vp: VendorProduct) -> Self {
        Self {
            vendor_product_id: vp.id,
            vendor_id: vp.vendor_id,
            product_id: vp.product_id,
            vendor_sku: vp.vendor_sku,
            cost_price: vp.cost_price,
            mrp: vp.mrp,
            discount_percentage: vp.discount_percentage,
            final_price: vp.final_price,
            minimum_order_quantity: vp.minimum_order_quantity,
            stock_quantity: vp.stock_quantity,
            expiry_date: vp.expiry_date,
            is_available: vp.is_available,
            delivery_time_days: vp.delivery_time_days,
            created_at: vp.created_at.to_rfc3339(),
            updated_at: vp.updated_at.to_rfc3339(),
        }
    }
}

/// A product offer with its standing against the other vendors
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceOfferResponse {
    pub product_id: RowKey,
    pub product_name: String,
    pub generic_name: Option<String>,
    pub vendor_product_id: RowKey,
    pub vendor_id: RowKey,
    pub vendor_name: String,
    pub cost_price: f64,
    pub discount_percentage: f64,
    pub final_price: f64,
    pub stock_quantity: i64,
    pub is_available: bool,
    /// `LOWEST PRICE` or `HIGHER PRICE`
    pub price_status: String,
}

impl From<PriceOffer> for PriceOfferResponse {
    fn from(o: PriceOffer) -> Self {
        let price_status = if o.is_lowest { "LOWEST PRICE" } else { "HIGHER PRICE" };
        Self {
            product_id: o.product_id,
            product_name: o.product_name,
            generic_name: o.generic_name,
            vendor_product_id: o.vendor_product_id,
            vendor_id: o.vendor_id,
            vendor_name: o.vendor_name,
            cost_price: o.cost_price,
            discount_percentage: o.discount_percentage,
            final_price: o.final_price,
            stock_quantity: o.stock_quantity,
            is_available: o.is_available,
            price_status: price_status.to_string(),
        }
    }
}

/// Lowest price query
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LowestPriceParams {
    pub category_id: Option<RowKey>,
    /// Only offers at or below this final price
    pub max_price: Option<f64>,
    /// Only offers with at least this much stock
    pub min_stock: Option<i64>,
}

/// Price comparison query
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PriceComparisonParams {
    pub product_id: Option<RowKey>,
    pub category_id: Option<RowKey>,
}

/// One requested stock level
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub vendor_product_id: RowKey,
    pub stock_quantity: i64,
}

/// Bulk stock update request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StockUpdateRequest {
    pub updates: Vec<StockUpdate>,
}

/// Bulk stock update result
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateResponse {
    pub success: bool,
    pub message: String,
    pub updated_count: u32,
}

/// Stock history entry DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockHistoryEntry {
    pub movement_id: RowKey,
    pub vendor_product_id: RowKey,
    pub product_id: RowKey,
    pub product_name: String,
    pub vendor_id: RowKey,
    pub vendor_name: String,
    pub vendor_sku: Option<String>,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub change_amount: i64,
    pub changed_at: String,
}

impl From<StockMovement> for StockHistoryEntry {
    fn from(m: StockMovement) -> Self {
        Self {
            movement_id: m.id,
            vendor_product_id: m.vendor_product_id,
            product_id: m.product_id,
            product_name: m.product_name,
            vendor_id: m.vendor_id,
            vendor_name: m.vendor_name,
            vendor_sku: m.vendor_sku,
            previous_quantity: m.previous_quantity,
            new_quantity: m.new_quantity,
            change_amount: m.change_amount,
            changed_at: m.changed_at.to_rfc3339(),
        }
    }
}

/// Vendor products service state
#[derive(Clone)]
pub struct VendorProductsState {
    pub vendor_product_repo: Arc<VendorProductRepository>,
    pub vendor_repo: Arc<VendorRepository>,
    pub product_repo: Arc<ProductRepository>,
}

async fn load_vendor_product(state: &VendorProductsState, id: RowKey) -> Result<VendorProduct> {
    state
        .vendor_product_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("VendorProduct", id))
}

fn validate_pricing(vp: &VendorProduct) -> Result<()> {
    require_at_least("costPrice", vp.cost_price, 0.0)?;
    require_range("discountPercentage", vp.discount_percentage, 0.0, 100.0)?;
    if let Some(mrp) = vp.mrp {
        require_at_least("mrp", mrp, 0.0)?;
    }
    require_at_least("minimumOrderQuantity", vp.minimum_order_quantity, 1)?;
    require_at_least("stockQuantity", vp.stock_quantity, 0)?;
    require_at_least("deliveryTimeDays", vp.delivery_time_days, 0)?;
    Ok(())
}

/// List vendor products (offset pagination)
#[utoipa::path(
    get,
    path = "",
    tag = "vendor-products",
    params(PaginationParams, VendorProductFilter),
    responses(
        (status = 200, description = "Page of vendor products", body = OffsetPage<VendorProductResponse>)
    )
)]
pub async fn list_vendor_products(
    State(state): State<VendorProductsState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<VendorProductFilter>,
) -> Result<Json<OffsetPage<VendorProductResponse>>> {
    let page = fetch_offset_page(
        state.vendor_product_repo.as_ref(),
        paging.page,
        paging.limit,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(VendorProductResponse::from)))
}

/// List vendor products (cursor pagination)
#[utoipa::path(
    get,
    path = "/cursor",
    tag = "vendor-products",
    params(CursorParams, VendorProductFilter),
    responses(
        (status = 200, description = "Page of vendor products", body = CursorPage<VendorProductResponse>)
    )
)]
pub async fn list_vendor_products_by_cursor(
    State(state): State<VendorProductsState>,
    Query(paging): Query<CursorParams>,
    Query(filter): Query<VendorProductFilter>,
) -> Result<Json<CursorPage<VendorProductResponse>>> {
    let page = fetch_cursor_page(
        state.vendor_product_repo.as_ref(),
        paging.cursor(),
        paging.size,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(VendorProductResponse::from)))
}

/// Create a vendor product
#[utoipa::path(
    post,
    path = "",
    tag = "vendor-products",
    request_body = CreateVendorProductRequest,
    responses(
        (status = 201, description = "Vendor product created", body = DataResponse<VendorProductResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Vendor or product not found", body = ErrorResponse),
        (status = 409, description = "Vendor already lists this product", body = ErrorResponse)
    )
)]
pub async fn create_vendor_product(
    State(state): State<VendorProductsState>,
    Json(req): Json<CreateVendorProductRequest>,
) -> Result<(StatusCode, Json<DataResponse<VendorProductResponse>>)> {
    if state.vendor_repo.find_by_id(req.vendor_id).await?.is_none() {
        return Err(ApiError::not_found("Vendor", req.vendor_id));
    }
    if state.product_repo.find_by_id(req.product_id).await?.is_none() {
        return Err(ApiError::not_found("Product", req.product_id));
    }

    let mut vp = VendorProduct::new(req.vendor_id, req.product_id, req.cost_price)
        .with_discount(req.discount_percentage.unwrap_or(0.0))
        .with_stock(req.stock_quantity.unwrap_or(0));
    vp.vendor_sku = req.vendor_sku;
    vp.mrp = req.mrp;
    vp.expiry_date = req.expiry_date;
    if let Some(moq) = req.minimum_order_quantity {
        vp.minimum_order_quantity = moq;
    }
    if let Some(available) = req.is_available {
        vp.is_available = available;
    }
    if let Some(days) = req.delivery_time_days {
        vp.delivery_time_days = days;
    }
    validate_pricing(&vp)?;

    state.vendor_product_repo.insert(&mut vp).await?;
    info!(vendor_product_id = vp.id, vendor_id = vp.vendor_id, product_id = vp.product_id, "Vendor product created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(vp.into(), "Vendor product created successfully")),
    ))
}

/// Get vendor product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "vendor-products",
    params(
        ("id" = i64, Path, description = "Vendor product ID")
    ),
    responses(
        (status = 200, description = "Vendor product found", body = DataResponse<VendorProductResponse>),
        (status = 404, description = "Vendor product not found", body = ErrorResponse)
    )
)]
pub async fn get_vendor_product(
    State(state): State<VendorProductsState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<VendorProductResponse>>> {
    let vp = load_vendor_product(&state, id).await?;
    Ok(Json(DataResponse::ok(vp.into())))
}

/// Update vendor product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "vendor-products",
    params(
        ("id" = i64, Path, description = "Vendor product ID")
    ),
    request_body = UpdateVendorProductRequest,
    responses(
        (status = 200, description = "Vendor product updated", body = DataResponse<VendorProductResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Vendor product not found", body = ErrorResponse)
    )
)]
pub async fn update_vendor_product(
    State(state): State<VendorProductsState>,
    Path(id): Path<RowKey>,
    Json(req): Json<UpdateVendorProductRequest>,
) -> Result<Json<DataResponse<VendorProductResponse>>> {
    let mut vp = load_vendor_product(&state, id).await?;

    req.vendor_sku.apply_to(&mut vp.vendor_sku);
    if let Some(cost) = req.cost_price {
        vp.cost_price = cost;
    }
    req.mrp.apply_to(&mut vp.mrp);
    if let Some(discount) = req.discount_percentage {
        vp.discount_percentage = discount;
    }
    if let Some(moq) = req.minimum_order_quantity {
        vp.minimum_order_quantity = moq;
    }
    if let Some(stock) = req.stock_quantity {
        vp.stock_quantity = stock;
    }
    req.expiry_date.apply_to(&mut vp.expiry_date);
    if let Some(available) = req.is_available {
        vp.is_available = available;
    }
    if let Some(days) = req.delivery_time_days {
        vp.delivery_time_days = days;
    }
    validate_pricing(&vp)?;
    vp.touch();

    state.vendor_product_repo.update(&mut vp).await?;

    Ok(Json(DataResponse::with_message(vp.into(), "Vendor product updated successfully")))
}

/// Delete vendor product (delist and zero stock)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "vendor-products",
    params(
        ("id" = i64, Path, description = "Vendor product ID")
    ),
    responses(
        (status = 200, description = "Vendor product withdrawn", body = SuccessResponse),
        (status = 404, description = "Vendor product not found", body = ErrorResponse)
    )
)]
pub async fn delete_vendor_product(
    State(state): State<VendorProductsState>,
    Path(id): Path<RowKey>,
) -> Result<Json<SuccessResponse>> {
    let mut vp = load_vendor_product(&state, id).await?;
    vp.withdraw();
    state.vendor_product_repo.update(&mut vp).await?;

    info!(vendor_product_id = id, "Vendor product withdrawn");
    Ok(Json(SuccessResponse::with_message("Vendor product deleted successfully")))
}

/// Bulk stock update
///
/// Unknown ids, negative quantities and unchanged levels are skipped.
#[utoipa::path(
    patch,
    path = "/stock",
    tag = "vendor-products",
    request_body = StockUpdateRequest,
    responses(
        (status = 200, description = "Stock levels applied", body = StockUpdateResponse)
    )
)]
pub async fn update_stock(
    State(state): State<VendorProductsState>,
    Json(req): Json<StockUpdateRequest>,
) -> Result<Json<StockUpdateResponse>> {
    if req.updates.is_empty() {
        return Ok(Json(StockUpdateResponse {
            success: true,
            message: "No updates provided".to_string(),
            updated_count: 0,
        }));
    }

    let mut updated_count = 0;
    for update in &req.updates {
        if update.stock_quantity < 0 {
            debug!(vendor_product_id = update.vendor_product_id, "Skipping negative stock level");
            continue;
        }

        match state
            .vendor_product_repo
            .set_stock(update.vendor_product_id, update.stock_quantity)
            .await?
        {
            StockChange::Applied { previous, new } => {
                debug!(vendor_product_id = update.vendor_product_id, previous, new, "Stock updated");
                updated_count += 1;
            }
            StockChange::Unchanged | StockChange::NotFound => {}
        }
    }

    info!(requested = req.updates.len(), updated_count, "Bulk stock update applied");
    Ok(Json(StockUpdateResponse {
        success: true,
        message: "Stock updated successfully".to_string(),
        updated_count,
    }))
}

/// Cheapest available offer of every product
#[utoipa::path(
    get,
    path = "/lowest-prices",
    tag = "vendor-products",
    params(LowestPriceParams),
    responses(
        (status = 200, description = "Cheapest offer per product, by product name", body = DataResponse<Vec<PriceOfferResponse>>)
    )
)]
pub async fn get_lowest_prices(
    State(state): State<VendorProductsState>,
    Query(params): Query<LowestPriceParams>,
) -> Result<Json<DataResponse<Vec<PriceOfferResponse>>>> {
    let mut query = MarketQuery::new(OfferScope::CheapestPerProduct);
    query.ranked = FilterSet::new()
        .eq("p.category_id", params.category_id)
        .at_most("vp.final_price", params.max_price)
        .at_least("vp.stock_quantity", params.min_stock);

    let offers = state.vendor_product_repo.market_offers(&query).await?;
    debug!(products = offers.len(), "Lowest prices computed");

    Ok(Json(DataResponse::ok(
        offers.into_iter().map(PriceOfferResponse::from).collect(),
    )))
}

/// Every available offer, marked lowest or higher within its product
#[utoipa::path(
    get,
    path = "/price-comparison",
    tag = "vendor-products",
    params(PriceComparisonParams),
    responses(
        (status = 200, description = "Offers grouped by product, cheapest first", body = DataResponse<Vec<PriceOfferResponse>>)
    )
)]
pub async fn get_price_comparison(
    State(state): State<VendorProductsState>,
    Query(params): Query<PriceComparisonParams>,
) -> Result<Json<DataResponse<Vec<PriceOfferResponse>>>> {
    let mut query = MarketQuery::new(OfferScope::All);
    query.ranked = FilterSet::new()
        .eq("vp.product_id", params.product_id)
        .eq("p.category_id", params.category_id);

    let offers = state.vendor_product_repo.market_offers(&query).await?;

    Ok(Json(DataResponse::ok(
        offers.into_iter().map(PriceOfferResponse::from).collect(),
    )))
}

/// Stock movement history, newest first
#[utoipa::path(
    get,
    path = "/{id}/stock-history",
    tag = "vendor-products",
    params(
        ("id" = i64, Path, description = "Vendor product ID")
    ),
    responses(
        (status = 200, description = "Stock movements", body = DataResponse<Vec<StockHistoryEntry>>),
        (status = 404, description = "Vendor product not found", body = ErrorResponse)
    )
)]
pub async fn get_stock_history(
    State(state): State<VendorProductsState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<Vec<StockHistoryEntry>>>> {
    load_vendor_product(&state, id).await?;
    let history = state.vendor_product_repo.stock_history(id).await?;

    Ok(Json(DataResponse::ok(
        history.into_iter().map(StockHistoryEntry::from).collect(),
    )))
}

/// Create vendor products router
pub fn vendor_products_router(state: VendorProductsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_vendor_products, create_vendor_product))
        .routes(routes!(list_vendor_products_by_cursor))
        .routes(routes!(update_stock))
        .routes(routes!(get_lowest_prices))
        .routes(routes!(get_price_comparison))
        .routes(routes!(get_vendor_product, update_vendor_product, delete_vendor_product))
        .routes(routes!(get_stock_history))
        .with_state(state)
}
