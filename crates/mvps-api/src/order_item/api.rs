//! Order Items API
//!
//! Lines across all orders, listed with either pagination mode.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::repository::{OrderItemFilter, OrderItemRepository};
use crate::order::{OrderItem, OrderItemResponse};
use crate::shared::api_common::{
    require_at_least, require_range, CursorParams, DataResponse, PaginationParams, SuccessResponse,
};
use crate::shared::error::{ApiError, ErrorResponse, Result};
use crate::shared::pagination::{fetch_cursor_page, fetch_offset_page, CursorPage, OffsetPage, RowKey};

/// Update order line request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOrderItemRequest {
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub tax_percentage: Option<f64>,
}

#[derive(Clone)]
pub struct OrderItemsState {
    pub order_item_repo: Arc<OrderItemRepository>,
}

async fn load_item(state: &OrderItemsState, id: RowKey) -> Result<OrderItem> {
    state
        .order_item_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("OrderItem", id))
}

/// List order lines (offset pagination)
#[utoipa::path(
    get,
    path = "",
    tag = "order-items",
    params(PaginationParams, OrderItemFilter),
    responses(
        (status = 200, description = "Page of order lines", body = OffsetPage<OrderItemResponse>)
    )
)]
pub async fn list_order_items(
    State(state): State<OrderItemsState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<OrderItemFilter>,
) -> Result<Json<OffsetPage<OrderItemResponse>>> {
    let page = fetch_offset_page(
        state.order_item_repo.as_ref(),
        paging.page,
        paging.limit,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(OrderItemResponse::from)))
}

/// List order lines (cursor pagination)
#[utoipa::path(
    get,
    path = "/cursor",
    tag = "order-items",
    params(CursorParams, OrderItemFilter),
    responses(
        (status = 200, description = "Page of order lines", body = CursorPage<OrderItemResponse>)
    )
)]
pub async fn list_order_items_by_cursor(
    State(state): State<OrderItemsState>,
    Query(paging): Query<CursorParams>,
    Query(filter): Query<OrderItemFilter>,
) -> Result<Json<CursorPage<OrderItemResponse>>> {
    let page = fetch_cursor_page(
        state.order_item_repo.as_ref(),
        paging.cursor(),
        paging.size,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(OrderItemResponse::from)))
}

/// Get order line by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "order-items",
    params(
        ("id" = i64, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Order line found", body = DataResponse<OrderItemResponse>),
        (status = 404, description = "Order line not found", body = ErrorResponse)
    )
)]
pub async fn get_order_item(
    State(state): State<OrderItemsState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<OrderItemResponse>>> {
    let item = load_item(&state, id).await?;
    Ok(Json(DataResponse::ok(item.into())))
}

/// Update an order line
///
/// The line total is recomputed and the order's totals follow.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "order-items",
    params(
        ("id" = i64, Path, description = "Order item ID")
    ),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "Order line updated", body = DataResponse<OrderItemResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Order line not found", body = ErrorResponse)
    )
)]
pub async fn update_order_item(
    State(state): State<OrderItemsState>,
    Path(id): Path<RowKey>,
    Json(req): Json<UpdateOrderItemRequest>,
) -> Result<Json<DataResponse<OrderItemResponse>>> {
    let mut item = load_item(&state, id).await?;

    if let Some(quantity) = req.quantity {
        item.quantity = require_at_least("quantity", quantity, 1)?;
    }
    if let Some(price) = req.unit_price {
        item.unit_price = require_at_least("unitPrice", price, 0.0)?;
    }
    if let Some(discount) = req.discount_percentage {
        item.discount_percentage = require_range("discountPercentage", discount, 0.0, 100.0)?;
    }
    if let Some(tax) = req.tax_percentage {
        item.tax_percentage = require_range("taxPercentage", tax, 0.0, 100.0)?;
    }
    item.recompute_line_total();

    state.order_item_repo.update(&item).await?;
    info!(order_item_id = id, order_id = item.order_id, line_total = item.line_total, "Order item updated");

    Ok(Json(DataResponse::with_message(item.into(), "Order item updated successfully")))
}

/// Delete an order line
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "order-items",
    params(
        ("id" = i64, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Order line deleted", body = SuccessResponse),
        (status = 404, description = "Order line not found", body = ErrorResponse)
    )
)]
pub async fn delete_order_item(
    State(state): State<OrderItemsState>,
    Path(id): Path<RowKey>,
) -> Result<Json<SuccessResponse>> {
    let item = load_item(&state, id).await?;
    state.order_item_repo.delete(&item).await?;

    info!(order_item_id = id, order_id = item.order_id, "Order item deleted");
    Ok(Json(SuccessResponse::with_message("Order item deleted successfully")))
}

pub fn order_items_router(state: OrderItemsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_order_items))
        .routes(routes!(list_order_items_by_cursor))
        .routes(routes!(get_order_item, update_order_item, delete_order_item))
        .with_state(state)
}
