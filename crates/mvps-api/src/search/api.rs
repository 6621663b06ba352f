//! Search API

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::api_common::DataResponse;
use crate::shared::error::Result;
use crate::shared::filter::FilterSet;
use crate::shared::pagination::RowKey;
use crate::shared::store::fetch_all_matching;
use crate::vendor::api::VendorResponse;
use crate::vendor::VendorRepository;
use crate::vendor_product::{MarketQuery, OfferScope, PriceOfferResponse, VendorProductRepository};

/// Product search over each product's cheapest offer
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductSearchParams {
    /// Substring of the product, generic or vendor name
    pub q: Option<String>,
    pub category_id: Option<RowKey>,
    /// Lower bound on the cheapest price
    pub min_price: Option<f64>,
    /// Only offers at or below this price compete
    pub max_price: Option<f64>,
    pub prescription_required: Option<bool>,
    /// Defaults to true; false also considers offers with no stock
    pub in_stock: Option<bool>,
}

impl ProductSearchParams {
    pub fn to_market_query(&self) -> MarketQuery {
        let mut query = MarketQuery::new(OfferScope::CheapestPerProduct);
        query.in_stock_only = self.in_stock.unwrap_or(true);
        query.ranked = FilterSet::new()
            .eq("p.category_id", self.category_id)
            .eq("p.prescription_required", self.prescription_required)
            .at_most("vp.final_price", self.max_price);
        query.offers = FilterSet::new()
            .at_least("final_price", self.min_price)
            .contains(&["product_name", "generic_name", "vendor_name"], self.q.clone());
        query
    }
}

/// Vendor search
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VendorSearchParams {
    /// Substring of the vendor name or city
    pub q: Option<String>,
    /// Case-insensitive city match
    pub city: Option<String>,
    /// Case-insensitive state match
    pub state: Option<String>,
    pub is_active: Option<bool>,
}

impl VendorSearchParams {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .contains(&["vendor_name", "city"], self.q.clone())
            .eq_ignore_case("city", self.city.clone())
            .eq_ignore_case("state", self.state.clone())
            .eq("is_active", self.is_active)
    }
}

#[derive(Clone)]
pub struct SearchState {
    pub vendor_repo: Arc<VendorRepository>,
    pub vendor_product_repo: Arc<VendorProductRepository>,
}

/// Search products
#[utoipa::path(
    get,
    path = "/products",
    tag = "search",
    params(ProductSearchParams),
    responses(
        (status = 200, description = "Matching products with their cheapest offer", body = DataResponse<Vec<PriceOfferResponse>>)
    )
)]
pub async fn search_products(
    State(state): State<SearchState>,
    Query(params): Query<ProductSearchParams>,
) -> Result<Json<DataResponse<Vec<PriceOfferResponse>>>> {
    let offers = state
        .vendor_product_repo
        .market_offers(&params.to_market_query())
        .await?;
    debug!(q = ?params.q, matches = offers.len(), "Product search");

    Ok(Json(DataResponse::ok(
        offers.into_iter().map(PriceOfferResponse::from).collect(),
    )))
}

/// Search vendors
#[utoipa::path(
    get,
    path = "/vendors",
    tag = "search",
    params(VendorSearchParams),
    responses(
        (status = 200, description = "Matching vendors", body = DataResponse<Vec<VendorResponse>>)
    )
)]
pub async fn search_vendors(
    State(state): State<SearchState>,
    Query(params): Query<VendorSearchParams>,
) -> Result<Json<DataResponse<Vec<VendorResponse>>>> {
    let vendors = fetch_all_matching(state.vendor_repo.as_ref(), &params.to_filter_set()).await?;
    debug!(q = ?params.q, matches = vendors.len(), "Vendor search");

    Ok(Json(DataResponse::ok(
        vendors.into_iter().map(VendorResponse::from).collect(),
    )))
}

pub fn search_router(state: SearchState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(search_products))
        .routes(routes!(search_vendors))
        .with_state(state)
}
