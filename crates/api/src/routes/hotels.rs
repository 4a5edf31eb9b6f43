//! Hotel availability search.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use catalog::{CatalogExt, HotelSearchRequest, HotelSearchResult};
use event_store::EventStore;

use crate::AppState;
use crate::error::ApiError;

/// POST /hotels/search
#[tracing::instrument(skip(state, request))]
pub async fn search<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<HotelSearchRequest>,
) -> Result<Json<HotelSearchResult>, ApiError> {
    let result = state.catalog.search_hotels(&request).await?;
    tracing::debug!(
        requested = result.requested.len(),
        alternatives = result.alternatives.len(),
        "hotel search done"
    );
    Ok(Json(result))
}
