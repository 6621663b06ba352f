//! Orders API
//!
//! Order placement with vendor selection and pricing, status transitions
//! and both pagination modes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{Order, OrderItem, OrderStatus, OrderType, PaymentStatus, PricedLine};
use super::repository::{OrderFilter, OrderRepository, OrderSearch};
use crate::customer::CustomerRepository;
use crate::product::ProductRepository;
use crate::shared::api_common::{require_at_least, CursorParams, DataResponse, PaginationParams, Patch, SuccessResponse};
use crate::shared::error::{ApiError, ErrorResponse, Result};
use crate::shared::pagination::{fetch_cursor_page, fetch_offset_page, CursorPage, OffsetPage, RowKey};
use crate::vendor_product::{VendorProduct, VendorProductRepository};

/// Line of a new order
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    pub product_id: RowKey,
    /// Listing to buy from; the cheapest in-stock listing when omitted
    pub vendor_product_id: Option<RowKey>,
    pub quantity: i64,
}

/// Create order request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: RowKey,
    pub order_type: Option<OrderType>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<CreateOrderItemRequest>,
}

/// Update order request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOrderRequest {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub order_type: Option<OrderType>,
    #[schema(value_type = Option<String>)]
    pub delivery_address: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
    pub discount_amount: Option<f64>,
    pub tax_amount: Option<f64>,
}

/// Order status change
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusRequest {
    /// One of pending, confirmed, processing, shipped, delivered, cancelled
    pub order_status: String,
}

/// Payment status change
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    /// One of pending, paid, failed, refunded
    pub payment_status: String,
}

/// Order response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: RowKey,
    pub order_number: String,
    pub customer_id: RowKey,
    pub order_type: Option<OrderType>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub order_date: String,
    pub total_amount: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            order_id: o.id,
            order_number: o.order_number,
            customer_id: o.customer_id,
            order_type: o.order_type,
            order_status: o.order_status,
            payment_status: o.payment_status,
            order_date: o.order_date.to_rfc3339(),
            total_amount: o.total_amount,
            discount_amount: o.discount_amount,
            tax_amount: o.tax_amount,
            final_amount: o.final_amount,
            delivery_address: o.delivery_address,
            notes: o.notes,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

/// Order line DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub order_item_id: RowKey,
    pub order_id: RowKey,
    pub product_id: RowKey,
    pub product_name: Option<String>,
    pub vendor_id: RowKey,
    pub vendor_name: Option<String>,
    pub vendor_product_id: RowKey,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount_percentage: f64,
    pub tax_percentage: f64,
    pub line_total: f64,
    pub created_at: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        Self {
            order_item_id: i.id,
            order_id: i.order_id,
            product_id: i.product_id,
            product_name: i.product_name,
            vendor_id: i.vendor_id,
            vendor_name: i.vendor_name,
            vendor_product_id: i.vendor_product_id,
            quantity: i.quantity,
            unit_price: i.unit_price,
            discount_percentage: i.discount_percentage,
            tax_percentage: i.tax_percentage,
            line_total: i.line_total,
            created_at: i.created_at.to_rfc3339(),
        }
    }
}

/// Order with its lines
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItemsResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

/// Orders service state
#[derive(Clone)]
pub struct OrdersState {
    pub order_repo: Arc<OrderRepository>,
    pub customer_repo: Arc<CustomerRepository>,
    pub product_repo: Arc<ProductRepository>,
    pub vendor_product_repo: Arc<VendorProductRepository>,
}

async fn load_order(state: &OrdersState, id: RowKey) -> Result<Order> {
    state
        .order_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))
}

async fn with_items(state: &OrdersState, order: Order) -> Result<OrderWithItemsResponse> {
    let items = state.order_repo.items_for(order.id).await?;
    Ok(OrderWithItemsResponse {
        order: order.into(),
        items: items.into_iter().map(OrderItemResponse::from).collect(),
    })
}

/// Resolve the listing a line is bought from.
async fn choose_vendor_product(state: &OrdersState, item: &CreateOrderItemRequest) -> Result<VendorProduct> {
    if state.product_repo.find_by_id(item.product_id).await?.is_none() {
        return Err(ApiError::not_found("Product", item.product_id));
    }

    match item.vendor_product_id {
        Some(vp_id) => {
            let vp = state
                .vendor_product_repo
                .find_by_id(vp_id)
                .await?
                .ok_or_else(|| ApiError::not_found("VendorProduct", vp_id))?;
            if vp.product_id != item.product_id {
                return Err(ApiError::validation(format!(
                    "Vendor product {} does not list product {}",
                    vp_id, item.product_id
                )));
            }
            Ok(vp)
        }
        None => {
            let vp = state
                .vendor_product_repo
                .find_cheapest_for_product(item.product_id)
                .await?
                .ok_or_else(|| ApiError::not_found("VendorProduct", format!("available for product {}", item.product_id)))?;
            debug!(product_id = item.product_id, vendor_product_id = vp.id, final_price = vp.final_price, "Selected cheapest listing");
            Ok(vp)
        }
    }
}

/// List orders (offset pagination)
#[utoipa::path(
    get,
    path = "",
    tag = "orders",
    params(PaginationParams, OrderFilter),
    responses(
        (status = 200, description = "Page of orders", body = OffsetPage<OrderResponse>)
    )
)]
pub async fn list_orders(
    State(state): State<OrdersState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<OffsetPage<OrderResponse>>> {
    let page = fetch_offset_page(
        state.order_repo.as_ref(),
        paging.page,
        paging.limit,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(OrderResponse::from)))
}

/// List orders (cursor pagination)
#[utoipa::path(
    get,
    path = "/cursor",
    tag = "orders",
    params(CursorParams, OrderFilter),
    responses(
        (status = 200, description = "Page of orders", body = CursorPage<OrderResponse>)
    )
)]
pub async fn list_orders_by_cursor(
    State(state): State<OrdersState>,
    Query(paging): Query<CursorParams>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<CursorPage<OrderResponse>>> {
    let page = fetch_cursor_page(
        state.order_repo.as_ref(),
        paging.cursor(),
        paging.size,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(OrderResponse::from)))
}

/// Search orders by number, address or notes (offset pagination)
#[utoipa::path(
    get,
    path = "/search",
    tag = "orders",
    params(PaginationParams, OrderSearch),
    responses(
        (status = 200, description = "Page of matching orders", body = OffsetPage<OrderResponse>)
    )
)]
pub async fn search_orders(
    State(state): State<OrdersState>,
    Query(paging): Query<PaginationParams>,
    Query(search): Query<OrderSearch>,
) -> Result<Json<OffsetPage<OrderResponse>>> {
    let page = fetch_offset_page(
        state.order_repo.as_ref(),
        paging.page,
        paging.limit,
        &search.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(OrderResponse::from)))
}

/// Place an order
#[utoipa::path(
    post,
    path = "",
    tag = "orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = DataResponse<OrderWithItemsResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Customer, product or listing not found", body = ErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<OrdersState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<DataResponse<OrderWithItemsResponse>>)> {
    if state.customer_repo.find_by_id(req.customer_id).await?.is_none() {
        return Err(ApiError::not_found("Customer", req.customer_id));
    }
    if req.items.is_empty() {
        return Err(ApiError::validation("Order must contain at least one item"));
    }

    let mut lines = Vec::with_capacity(req.items.len());
    for item in &req.items {
        require_at_least("quantity", item.quantity, 1)?;
        let vp = choose_vendor_product(&state, item).await?;
        lines.push(PricedLine::new(&vp, item.quantity));
    }

    let mut order = Order::new(req.customer_id);
    order.order_type = req.order_type;
    order.delivery_address = req.delivery_address;
    order.notes = req.notes;
    order.apply_totals(&lines);

    state.order_repo.insert_with_items(&mut order, &mut lines).await?;
    info!(
        order_id = order.id,
        order_number = %order.order_number,
        customer_id = order.customer_id,
        lines = lines.len(),
        final_amount = order.final_amount,
        "Order created"
    );

    let data = with_items(&state, order).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(data, "Order created successfully")),
    ))
}

/// Get order by ID with its lines
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "orders",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order found", body = DataResponse<OrderWithItemsResponse>),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn get_order(
    State(state): State<OrdersState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<OrderWithItemsResponse>>> {
    let order = load_order(&state, id).await?;
    Ok(Json(DataResponse::ok(with_items(&state, order).await?)))
}

/// Update order
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "orders",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = DataResponse<OrderResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn update_order(
    State(state): State<OrdersState>,
    Path(id): Path<RowKey>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<DataResponse<OrderResponse>>> {
    let mut order = load_order(&state, id).await?;

    if let Some(status) = req.order_status {
        order.order_status = status;
    }
    if let Some(status) = req.payment_status {
        order.payment_status = status;
    }
    if let Some(order_type) = req.order_type {
        order.order_type = Some(order_type);
    }
    req.delivery_address.apply_to(&mut order.delivery_address);
    req.notes.apply_to(&mut order.notes);
    if let Some(discount) = req.discount_amount {
        order.discount_amount = require_at_least("discountAmount", discount, 0.0)?;
    }
    if let Some(tax) = req.tax_amount {
        order.tax_amount = require_at_least("taxAmount", tax, 0.0)?;
    }
    order.recompute_final();
    order.touch();

    state.order_repo.update(&order).await?;

    Ok(Json(DataResponse::with_message(order.into(), "Order updated successfully")))
}

/// Cancel order
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "orders",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order cancelled", body = SuccessResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn cancel_order(
    State(state): State<OrdersState>,
    Path(id): Path<RowKey>,
) -> Result<Json<SuccessResponse>> {
    let mut order = load_order(&state, id).await?;
    order.cancel();
    state.order_repo.update(&order).await?;

    info!(order_id = id, "Order cancelled");
    Ok(Json(SuccessResponse::with_message("Order cancelled successfully")))
}

/// Change order status
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "orders",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    request_body = OrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = DataResponse<OrderResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn update_order_status(
    State(state): State<OrdersState>,
    Path(id): Path<RowKey>,
    Json(req): Json<OrderStatusRequest>,
) -> Result<Json<DataResponse<OrderResponse>>> {
    let status = OrderStatus::parse(req.order_status.trim()).ok_or_else(|| {
        ApiError::validation(format!("orderStatus must be one of: {}", OrderStatus::allowed()))
    })?;

    let mut order = load_order(&state, id).await?;
    let previous = order.order_status;
    order.order_status = status;
    order.touch();
    state.order_repo.update(&order).await?;

    info!(order_id = id, from = %previous, to = %status, "Order status changed");
    Ok(Json(DataResponse::with_message(order.into(), "Order status updated successfully")))
}

/// Change payment status
#[utoipa::path(
    patch,
    path = "/{id}/payment-status",
    tag = "orders",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    request_body = PaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status updated", body = DataResponse<OrderResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn update_payment_status(
    State(state): State<OrdersState>,
    Path(id): Path<RowKey>,
    Json(req): Json<PaymentStatusRequest>,
) -> Result<Json<DataResponse<OrderResponse>>> {
    let status = PaymentStatus::parse(req.payment_status.trim()).ok_or_else(|| {
        ApiError::validation(format!("paymentStatus must be one of: {}", PaymentStatus::allowed()))
    })?;

    let mut order = load_order(&state, id).await?;
    order.payment_status = status;
    order.touch();
    state.order_repo.update(&order).await?;

    info!(order_id = id, payment_status = %status, "Payment status changed");
    Ok(Json(DataResponse::with_message(order.into(), "Payment status updated successfully")))
}

/// Create orders router
pub fn orders_router(state: OrdersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_orders, create_order))
        .routes(routes!(list_orders_by_cursor))
        .routes(routes!(search_orders))
        .routes(routes!(get_order, update_order, cancel_order))
        .routes(routes!(update_order_status))
        .routes(routes!(update_payment_status))
        .with_state(state)
}
