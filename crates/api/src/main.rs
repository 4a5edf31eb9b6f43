//! API server entry point.

use std::sync::Arc;

use api::config::{Config, LogFormat};
use catalog::{Catalog, InMemoryCatalog, PostgresCatalog};
use event_store::{EventStore, InMemoryEventStore, PostgresEventStore};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve<S: EventStore + Clone + 'static>(
    config: Config,
    event_store: S,
    catalog: Arc<dyn Catalog>,
    metrics_handle: PrometheusHandle,
) {
    let state = api::create_default_state(event_store, catalog, config.saga_config())
        .await
        .expect("failed to load the hotel catalog");

    // Bookings cut short by the previous shutdown.
    match state.bookings.recover_in_flight().await {
        Ok(recovered) if !recovered.is_empty() => {
            tracing::info!(count = recovered.len(), "recovered in-flight bookings");
        }
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "booking recovery failed"),
    }

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(
        %addr,
        step_timeout_ms = config.saga_step_timeout.as_millis(),
        "starting API server"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(&config);

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    match config.database_url.clone() {
        Some(url) => {
            tracing::info!("using PostgreSQL event store and catalog");
            let event_store = PostgresEventStore::connect(&url)
                .await
                .expect("failed to connect to PostgreSQL");
            let catalog = PostgresCatalog::new(event_store.pool().clone());
            serve(config, event_store, Arc::new(catalog), metrics_handle).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory stores");
            serve(
                config,
                InMemoryEventStore::new(),
                Arc::new(InMemoryCatalog::seeded()),
                metrics_handle,
            )
            .await;
        }
    }
}
