//! Read-only catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use catalog::{Category, Product, TypeDescription};
use event_store::EventStore;

use crate::AppState;
use crate::error::ApiError;

fn parse_catalog_id(id: &str) -> Result<i32, ApiError> {
    id.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid catalog id: {id}")))
}

/// GET /schema: queryable types and their fields.
pub async fn schema() -> Json<Vec<TypeDescription>> {
    Json(catalog::schema())
}

/// GET /categories
#[tracing::instrument(skip(state))]
pub async fn categories<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalog.categories().await?))
}

/// GET /categories/{id}/products
#[tracing::instrument(skip(state))]
pub async fn category_products<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let category_id = parse_catalog_id(&id)?;
    if state.catalog.category(category_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Category {id} not found")));
    }

    Ok(Json(state.catalog.products_in_category(category_id).await?))
}

/// GET /products
#[tracing::instrument(skip(state))]
pub async fn products<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.products().await?))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn product<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product_id = parse_catalog_id(&id)?;
    state
        .catalog
        .product(product_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))
}
