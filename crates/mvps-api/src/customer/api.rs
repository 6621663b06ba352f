//! Customers API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{Customer, CustomerType};
use super::repository::{CustomerFilter, CustomerRepository};
use crate::order::{OrderFilter, OrderRepository, OrderResponse, OrderStatus};
use crate::shared::api_common::{
    require_text, CursorParams, DataResponse, PaginationParams, Patch, SuccessResponse,
};
use crate::shared::error::{ApiError, ErrorResponse, Result};
use crate::shared::pagination::{fetch_cursor_page, fetch_offset_page, CursorPage, OffsetPage, RowKey};
use crate::shared::store::fetch_all_matching;

/// Create customer request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    /// Defaults to retail
    pub customer_type: Option<CustomerType>,
    /// Defaults to today
    pub registration_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Update customer request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCustomerRequest {
    pub customer_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub city: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub state: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub pincode: Patch<String>,
    pub customer_type: Option<CustomerType>,
    pub is_active: Option<bool>,
}

/// Customer response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub customer_id: RowKey,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub customer_type: CustomerType,
    pub registration_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            customer_id: c.id,
            customer_name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            city: c.city,
            state: c.state,
            pincode: c.pincode,
            customer_type: c.customer_type,
            registration_date: c.registration_date,
            is_active: c.is_active,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Order history filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerOrdersQuery {
    pub order_status: Option<OrderStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Customers service state
#[derive(Clone)]
pub struct CustomersState {
    pub customer_repo: Arc<CustomerRepository>,
    pub order_repo: Arc<OrderRepository>,
}

async fn load_customer(state: &CustomersState, id: RowKey) -> Result<Customer> {
    state
        .customer_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", id))
}

/// List customers (offset pagination)
#[utoipa::path(
    get,
    path = "",
    tag = "customers",
    params(PaginationParams, CustomerFilter),
    responses(
        (status = 200, description = "Page of customers", body = OffsetPage<CustomerResponse>)
    )
)]
pub async fn list_customers(
    State(state): State<CustomersState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<OffsetPage<CustomerResponse>>> {
    let page = fetch_offset_page(
        state.customer_repo.as_ref(),
        paging.page,
        paging.limit,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(CustomerResponse::from)))
}

/// List customers (cursor pagination)
#[utoipa::path(
    get,
    path = "/cursor",
    tag = "customers",
    params(CursorParams, CustomerFilter),
    responses(
        (status = 200, description = "Page of customers", body = CursorPage<CustomerResponse>)
    )
)]
pub async fn list_customers_by_cursor(
    State(state): State<CustomersState>,
    Query(paging): Query<CursorParams>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<CursorPage<CustomerResponse>>> {
    let page = fetch_cursor_page(
        state.customer_repo.as_ref(),
        paging.cursor(),
        paging.size,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(CustomerResponse::from)))
}

/// Register a customer
#[utoipa::path(
    post,
    path = "",
    tag = "customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = DataResponse<CustomerResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Phone already registered", body = ErrorResponse)
    )
)]
pub async fn create_customer(
    State(state): State<CustomersState>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<DataResponse<CustomerResponse>>)> {
    let mut customer = Customer::new(require_text("customerName", &req.customer_name)?);
    customer.email = req.email;
    customer.phone = req.phone;
    customer.address = req.address;
    customer.city = req.city;
    customer.state = req.state;
    customer.pincode = req.pincode;
    customer.customer_type = req.customer_type.unwrap_or_default();
    if req.registration_date.is_some() {
        customer.registration_date = req.registration_date;
    }
    customer.is_active = req.is_active.unwrap_or(true);

    state.customer_repo.insert(&mut customer).await?;
    info!(customer_id = customer.id, customer_type = %customer.customer_type, "Customer created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(customer.into(), "Customer created successfully")),
    ))
}

/// Get customer by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "customers",
    params(
        ("id" = i64, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer found", body = DataResponse<CustomerResponse>),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
pub async fn get_customer(
    State(state): State<CustomersState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<CustomerResponse>>> {
    let customer = load_customer(&state, id).await?;
    Ok(Json(DataResponse::ok(customer.into())))
}

/// Get customer by phone number
#[utoipa::path(
    get,
    path = "/phone/{phone}",
    tag = "customers",
    params(
        ("phone" = String, Path, description = "Registered phone number")
    ),
    responses(
        (status = 200, description = "Customer found", body = DataResponse<CustomerResponse>),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
pub async fn get_customer_by_phone(
    State(state): State<CustomersState>,
    Path(phone): Path<String>,
) -> Result<Json<DataResponse<CustomerResponse>>> {
    let customer = state
        .customer_repo
        .find_by_phone(&phone)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &phone))?;

    Ok(Json(DataResponse::ok(customer.into())))
}

/// Update customer
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "customers",
    params(
        ("id" = i64, Path, description = "Customer ID")
    ),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = DataResponse<CustomerResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Phone already registered", body = ErrorResponse)
    )
)]
pub async fn update_customer(
    State(state): State<CustomersState>,
    Path(id): Path<RowKey>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<DataResponse<CustomerResponse>>> {
    let mut customer = load_customer(&state, id).await?;

    if let Some(name) = req.customer_name {
        customer.name = require_text("customerName", &name)?;
    }
    req.email.apply_to(&mut customer.email);
    req.phone.apply_to(&mut customer.phone);
    req.address.apply_to(&mut customer.address);
    req.city.apply_to(&mut customer.city);
    req.state.apply_to(&mut customer.state);
    req.pincode.apply_to(&mut customer.pincode);
    if let Some(customer_type) = req.customer_type {
        customer.customer_type = customer_type;
    }
    if let Some(active) = req.is_active {
        customer.is_active = active;
    }
    customer.touch();

    state.customer_repo.update(&customer).await?;

    Ok(Json(DataResponse::with_message(customer.into(), "Customer updated successfully")))
}

/// Delete customer (soft delete)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "customers",
    params(
        ("id" = i64, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer deactivated", body = SuccessResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
pub async fn delete_customer(
    State(state): State<CustomersState>,
    Path(id): Path<RowKey>,
) -> Result<Json<SuccessResponse>> {
    let mut customer = load_customer(&state, id).await?;
    customer.deactivate();
    state.customer_repo.update(&customer).await?;

    info!(customer_id = id, "Customer deactivated");
    Ok(Json(SuccessResponse::with_message("Customer deleted successfully")))
}

/// Order history of a customer, oldest first
#[utoipa::path(
    get,
    path = "/{id}/orders",
    tag = "customers",
    params(
        ("id" = i64, Path, description = "Customer ID"),
        CustomerOrdersQuery
    ),
    responses(
        (status = 200, description = "Customer orders", body = DataResponse<Vec<OrderResponse>>),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    )
)]
pub async fn get_customer_orders(
    State(state): State<CustomersState>,
    Path(id): Path<RowKey>,
    Query(query): Query<CustomerOrdersQuery>,
) -> Result<Json<DataResponse<Vec<OrderResponse>>>> {
    load_customer(&state, id).await?;

    let filter = OrderFilter {
        customer_id: Some(id),
        order_status: query.order_status,
        from_date: query.from_date,
        to_date: query.to_date,
        ..Default::default()
    };
    let orders = fetch_all_matching(state.order_repo.as_ref(), &filter.to_filter_set()).await?;

    Ok(Json(DataResponse::ok(
        orders.into_iter().map(OrderResponse::from).collect(),
    )))
}

/// Create customers router
pub fn customers_router(state: CustomersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_customers, create_customer))
        .routes(routes!(list_customers_by_cursor))
        .routes(routes!(get_customer_by_phone))
        .routes(routes!(get_customer, update_customer, delete_customer))
        .routes(routes!(get_customer_orders))
        .with_state(state)
}
