//! Vendor Orders API
//!
//! Purchase orders with vendors. Deleting one cancels it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{VendorOrder, VendorOrderStatus};
use super::repository::{VendorOrderFilter, VendorOrderRepository};
use crate::shared::api_common::{
    require_at_least, CursorParams, DataResponse, PaginationParams, Patch, SuccessResponse,
};
use crate::shared::error::{ApiError, ErrorResponse, Result};
use crate::shared::pagination::{fetch_cursor_page, fetch_offset_page, CursorPage, OffsetPage, RowKey};
use crate::vendor::VendorRepository;

/// Create purchase order request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorOrderRequest {
    pub vendor_id: RowKey,
    /// Defaults to 0
    pub total_amount: Option<f64>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Update purchase order request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateVendorOrderRequest {
    pub status: Option<VendorOrderStatus>,
    pub total_amount: Option<f64>,
    #[schema(value_type = Option<String>, format = Date)]
    pub expected_delivery_date: Patch<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub actual_delivery_date: Patch<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
}

/// Purchase order DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorOrderResponse {
    pub vendor_order_id: RowKey,
    pub vendor_id: RowKey,
    pub po_number: String,
    pub order_date: String,
    pub total_amount: f64,
    pub status: VendorOrderStatus,
    pub expected_delivery_date: Option<NaiveDate>,
    pub actual_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<VendorOrder> for VendorOrderResponse {
    fn from(o: VendorOrder) -> Self {
        Self {
            vendor_order_id: o.id,
            vendor_id: o.vendor_id,
            po_number: o.po_number,
            order_date: o.order_date.to_rfc3339(),
            total_amount: o.total_amount,
            status: o.status,
            expected_delivery_date: o.expected_delivery_date,
            actual_delivery_date: o.actual_delivery_date,
            notes: o.notes,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Clone)]
pub struct VendorOrdersState {
    pub vendor_order_repo: Arc<VendorOrderRepository>,
    pub vendor_repo: Arc<VendorRepository>,
}

async fn load_vendor_order(state: &VendorOrdersState, id: RowKey) -> Result<VendorOrder> {
    state
        .vendor_order_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("VendorOrder", id))
}

/// List purchase orders (offset pagination)
#[utoipa::path(
    get,
    path = "",
    tag = "vendor-orders",
    params(PaginationParams, VendorOrderFilter),
    responses(
        (status = 200, description = "Page of purchase orders", body = OffsetPage<VendorOrderResponse>)
    )
)]
pub async fn list_vendor_orders(
    State(state): State<VendorOrdersState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<VendorOrderFilter>,
) -> Result<Json<OffsetPage<VendorOrderResponse>>> {
    let page = fetch_offset_page(
        state.vendor_order_repo.as_ref(),
        paging.page,
        paging.limit,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(VendorOrderResponse::from)))
}

/// List purchase orders (cursor pagination)
#[utoipa::path(
    get,
    path = "/cursor",
    tag = "vendor-orders",
    params(CursorParams, VendorOrderFilter),
    responses(
        (status = 200, description = "Page of purchase orders", body = CursorPage<VendorOrderResponse>)
    )
)]
pub async fn list_vendor_orders_by_cursor(
    State(state): State<VendorOrdersState>,
    Query(paging): Query<CursorParams>,
    Query(filter): Query<VendorOrderFilter>,
) -> Result<Json<CursorPage<VendorOrderResponse>>> {
    let page = fetch_cursor_page(
        state.vendor_order_repo.as_ref(),
        paging.cursor(),
        paging.size,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(VendorOrderResponse::from)))
}

/// Place a purchase order
#[utoipa::path(
    post,
    path = "",
    tag = "vendor-orders",
    request_body = CreateVendorOrderRequest,
    responses(
        (status = 201, description = "Purchase order created", body = DataResponse<VendorOrderResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Vendor not found", body = ErrorResponse)
    )
)]
pub async fn create_vendor_order(
    State(state): State<VendorOrdersState>,
    Json(req): Json<CreateVendorOrderRequest>,
) -> Result<(StatusCode, Json<DataResponse<VendorOrderResponse>>)> {
    if state.vendor_repo.find_by_id(req.vendor_id).await?.is_none() {
        return Err(ApiError::not_found("Vendor", req.vendor_id));
    }

    let total = require_at_least("totalAmount", req.total_amount.unwrap_or(0.0), 0.0)?;
    let mut order = VendorOrder::new(req.vendor_id, total);
    order.expected_delivery_date = req.expected_delivery_date;
    order.notes = req.notes;

    state.vendor_order_repo.insert(&mut order).await?;
    info!(vendor_order_id = order.id, po_number = %order.po_number, vendor_id = order.vendor_id, "Vendor order created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(order.into(), "Vendor order created successfully")),
    ))
}

/// Get purchase order by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "vendor-orders",
    params(
        ("id" = i64, Path, description = "Vendor order ID")
    ),
    responses(
        (status = 200, description = "Purchase order found", body = DataResponse<VendorOrderResponse>),
        (status = 404, description = "Purchase order not found", body = ErrorResponse)
    )
)]
pub async fn get_vendor_order(
    State(state): State<VendorOrdersState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<VendorOrderResponse>>> {
    let order = load_vendor_order(&state, id).await?;
    Ok(Json(DataResponse::ok(order.into())))
}

/// Update purchase order
///
/// Moving to `received` stamps today as the delivery date unless one is given.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "vendor-orders",
    params(
        ("id" = i64, Path, description = "Vendor order ID")
    ),
    request_body = UpdateVendorOrderRequest,
    responses(
        (status = 200, description = "Purchase order updated", body = DataResponse<VendorOrderResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse)
    )
)]
pub async fn update_vendor_order(
    State(state): State<VendorOrdersState>,
    Path(id): Path<RowKey>,
    Json(req): Json<UpdateVendorOrderRequest>,
) -> Result<Json<DataResponse<VendorOrderResponse>>> {
    let mut order = load_vendor_order(&state, id).await?;

    if let Some(total) = req.total_amount {
        order.total_amount = require_at_least("totalAmount", total, 0.0)?;
    }
    req.expected_delivery_date.apply_to(&mut order.expected_delivery_date);
    req.actual_delivery_date.apply_to(&mut order.actual_delivery_date);
    req.notes.apply_to(&mut order.notes);
    match req.status {
        Some(VendorOrderStatus::Received) => order.receive(None),
        Some(status) => order.status = status,
        None => {}
    }
    order.touch();

    state.vendor_order_repo.update(&order).await?;

    Ok(Json(DataResponse::with_message(order.into(), "Vendor order updated successfully")))
}

/// Cancel purchase order
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "vendor-orders",
    params(
        ("id" = i64, Path, description = "Vendor order ID")
    ),
    responses(
        (status = 200, description = "Purchase order cancelled", body = SuccessResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse)
    )
)]
pub async fn cancel_vendor_order(
    State(state): State<VendorOrdersState>,
    Path(id): Path<RowKey>,
) -> Result<Json<SuccessResponse>> {
    let mut order = load_vendor_order(&state, id).await?;
    order.cancel();
    state.vendor_order_repo.update(&order).await?;

    info!(vendor_order_id = id, "Vendor order cancelled");
    Ok(Json(SuccessResponse::with_message("Vendor order cancelled successfully")))
}

/// Create vendor orders router
pub fn vendor_orders_router(state: VendorOrdersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_vendor_orders, create_vendor_order))
        .routes(routes!(list_vendor_orders_by_cursor))
        .routes(routes!(get_vendor_order, update_vendor_order, cancel_vendor_order))
        .with_state(state)
}
