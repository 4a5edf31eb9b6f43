//! HTTP API for the travel platform.
//!
//! Serves the catalog and hotel search, billing accounts and travel bookings,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use catalog::{Catalog, CatalogError};
use domain::AccountService;
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    InMemoryCarRentalService, InMemoryFlightService, InMemoryHotelService, SagaConfig,
    SagaCoordinator,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Saga coordinator wired to the in-memory booking services.
pub type BookingCoordinator<S> =
    SagaCoordinator<S, InMemoryFlightService, InMemoryHotelService, InMemoryCarRentalService>;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub accounts: AccountService<S>,
    pub bookings: BookingCoordinator<S>,
    pub catalog: Arc<dyn Catalog>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    use routes::{accounts, bookings, hotels};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/schema", get(routes::catalog::schema))
        .route("/categories", get(routes::catalog::categories::<S>))
        .route(
            "/categories/{id}/products",
            get(routes::catalog::category_products::<S>),
        )
        .route("/products", get(routes::catalog::products::<S>))
        .route("/products/{id}", get(routes::catalog::product::<S>))
        .route("/hotels/search", post(hotels::search::<S>))
        .route("/accounts", post(accounts::open::<S>))
        .route("/accounts/{id}", get(accounts::get::<S>))
        .route("/accounts/{id}/deposits", post(accounts::deposit::<S>))
        .route("/accounts/{id}/withdrawals", post(accounts::withdraw::<S>))
        .route(
            "/accounts/{id}/subscriptions",
            post(accounts::create_subscription::<S>),
        )
        .route(
            "/accounts/{id}/subscriptions/{subscription_id}",
            delete(accounts::cancel_subscription::<S>),
        )
        .route("/accounts/{id}/invoices", post(accounts::create_invoice::<S>))
        .route("/bookings", post(bookings::book::<S>))
        .route("/bookings/{id}", get(bookings::get::<S>))
        .route("/bookings/{id}/events", get(bookings::events::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the application state over `event_store` and `catalog`.
///
/// The hotel booking service only accepts hotels listed in the catalog.
pub async fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
    catalog: Arc<dyn Catalog>,
    saga_config: SagaConfig,
) -> Result<Arc<AppState<S>>, CatalogError> {
    let known_hotels = catalog
        .hotels()
        .await?
        .into_iter()
        .map(|hotel| hotel.hotel_id);

    let bookings = SagaCoordinator::with_config(
        event_store.clone(),
        InMemoryFlightService::new(),
        InMemoryHotelService::with_known_hotels(known_hotels),
        InMemoryCarRentalService::new(),
        saga_config,
    );

    Ok(Arc::new(AppState {
        accounts: AccountService::new(event_store),
        bookings,
        catalog,
    }))
}
