//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use domain::{NewProduct, Product, ProductPage, ProductQuery};

use super::{ApiResponse, AppState};
use crate::error::ApiError;

/// GET /api/products: search and paginate products.
#[tracing::instrument(skip(state, query))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ProductPage>>, ApiError> {
    let Query(query) = query?;
    let page = state.products.list_products(query).await?;
    let count = page.items.len();
    Ok(Json(ApiResponse::counted(page, count)))
}

/// POST /api/products: create a product.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let Json(input) = payload?;
    let product = state.products.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product))))
}
