//! Categories API

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

use super::entity::Category;
use super::repository::{CategoryFilter, CategoryRepository};
use crate::shared::api_common::{
    require_text, CursorParams, DataResponse, PaginationParams, Patch, SuccessResponse,
};
use crate::shared::error::{ApiError, ErrorResponse, Result};
use crate::shared::pagination::{fetch_cursor_page, fetch_offset_page, CursorPage, OffsetPage, RowKey};

/// Create category request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub category_name: String,
    pub description: Option<String>,
    pub parent_category_id: Option<RowKey>,
}

/// Update category request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCategoryRequest {
    pub category_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    /// `null` moves the category to the top level
    #[schema(value_type = Option<i64>)]
    pub parent_category_id: Patch<RowKey>,
}

/// Category response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub category_id: RowKey,
    pub category_name: String,
    pub description: Option<String>,
    pub parent_category_id: Option<RowKey>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            category_id: c.id,
            category_name: c.name,
            description: c.description,
            parent_category_id: c.parent_category_id,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Clone)]
pub struct CategoriesState {
    pub category_repo: Arc<CategoryRepository>,
}

async fn load_category(state: &CategoriesState, id: RowKey) -> Result<Category> {
    state
        .category_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))
}

async fn require_parent(state: &CategoriesState, parent: Option<RowKey>) -> Result<()> {
    if let Some(parent) = parent {
        load_category(state, parent).await?;
    }
    Ok(())
}

/// List categories (offset pagination)
#[utoipa::path(
    get,
    path = "",
    tag = "categories",
    params(PaginationParams, CategoryFilter),
    responses(
        (status = 200, description = "Page of categories", body = OffsetPage<CategoryResponse>)
    )
)]
pub async fn list_categories(
    State(state): State<CategoriesState>,
    Query(paging): Query<PaginationParams>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<OffsetPage<CategoryResponse>>> {
    let page = fetch_offset_page(
        state.category_repo.as_ref(),
        paging.page,
        paging.limit,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(CategoryResponse::from)))
}

/// List categories (cursor pagination)
#[utoipa::path(
    get,
    path = "/cursor",
    tag = "categories",
    params(CursorParams, CategoryFilter),
    responses(
        (status = 200, description = "Page of categories", body = CursorPage<CategoryResponse>)
    )
)]
pub async fn list_categories_by_cursor(
    State(state): State<CategoriesState>,
    Query(paging): Query<CursorParams>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<CursorPage<CategoryResponse>>> {
    let page = fetch_cursor_page(
        state.category_repo.as_ref(),
        paging.cursor(),
        paging.size,
        &filter.to_filter_set(),
    )
    .await?;

    Ok(Json(page.map(CategoryResponse::from)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = DataResponse<CategoryResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Parent category not found", body = ErrorResponse)
    )
)]
pub async fn create_category(
    State(state): State<CategoriesState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<DataResponse<CategoryResponse>>)> {
    let mut category = Category::new(require_text("categoryName", &req.category_name)?);
    require_parent(&state, req.parent_category_id).await?;
    category.description = req.description;
    category.parent_category_id = req.parent_category_id;

    state.category_repo.insert(&mut category).await?;
    info!(category_id = category.id, parent = ?category.parent_category_id, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(category.into(), "Category created successfully")),
    ))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "categories",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = DataResponse<CategoryResponse>),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
pub async fn get_category(
    State(state): State<CategoriesState>,
    Path(id): Path<RowKey>,
) -> Result<Json<DataResponse<CategoryResponse>>> {
    let category = load_category(&state, id).await?;
    Ok(Json(DataResponse::ok(category.into())))
}

/// Update category
///
/// A category cannot be moved below itself.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "categories",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = DataResponse<CategoryResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Category or parent not found", body = ErrorResponse)
    )
)]
pub async fn update_category(
    State(state): State<CategoriesState>,
    Path(id): Path<RowKey>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<DataResponse<CategoryResponse>>> {
    let mut category = load_category(&state, id).await?;

    if let Some(name) = req.category_name {
        category.name = require_text("categoryName", &name)?;
    }
    req.description.apply_to(&mut category.description);
    if let Patch::Value(parent) = req.parent_category_id {
        require_parent(&state, Some(parent)).await?;
        if state.category_repo.is_within(parent, id).await? {
            return Err(ApiError::validation(
                "parentCategoryId cannot be the category itself or one of its subcategories",
            ));
        }
    }
    req.parent_category_id.apply_to(&mut category.parent_category_id);
    category.touch();

    state.category_repo.update(&category).await?;

    Ok(Json(DataResponse::with_message(category.into(), "Category updated successfully")))
}

/// Delete category
///
/// Rejected with 409 while products or subcategories still reference it.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "categories",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = SuccessResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category still in use", body = ErrorResponse)
    )
)]
pub async fn delete_category(
    State(state): State<CategoriesState>,
    Path(id): Path<RowKey>,
) -> Result<Json<SuccessResponse>> {
    state.category_repo.delete(id).await?;

    info!(category_id = id, "Category deleted");
    Ok(Json(SuccessResponse::with_message("Category deleted successfully")))
}

/// Create categories router
pub fn categories_router(state: CategoriesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_categories, create_category))
        .routes(routes!(list_categories_by_cursor))
        .routes(routes!(get_category, update_category, delete_category))
        .with_state(state)
}
