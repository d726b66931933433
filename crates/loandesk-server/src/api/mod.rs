//! HTTP application assembly and serving

pub mod response;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{response::IntoResponse, routing::get, Router};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

use crate::{
    config::Config,
    error::ApiError,
    features::{self, FeatureState},
    middleware::{self, boundary::RequestBoundaryLayer},
    store::Store,
};
use response::Envelope;

/// Build the application: index, health, feature routes, fallbacks, and the
/// request boundary. This is the router the test suite drives.
pub fn app(store: Arc<dyn Store>) -> Router {
    let health_store = Arc::clone(&store);

    Router::new()
        .route("/", get(index).fallback(method_not_allowed))
        .route(
            "/health",
            get(move || health(Arc::clone(&health_store))).fallback(method_not_allowed),
        )
        .merge(features::router(FeatureState::new(store)))
        .fallback(not_found)
        .layer(middleware::tracing_layer())
        .layer(RequestBoundaryLayer::new())
}

/// [`app`] plus compression and CORS from configuration
pub fn create_router(store: Arc<dyn Store>, config: &Config) -> Router {
    app(store)
        .layer(CompressionLayer::new())
        .layer(middleware::cors_layer(&config.cors))
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: Config, store: Arc<dyn Store>) -> anyhow::Result<()> {
    let app = create_router(store, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

async fn index() -> Envelope {
    Envelope::success("it works!")
}

async fn health(store: Arc<dyn Store>) -> axum::response::Response {
    match store.ping().await {
        Ok(()) => Envelope::success("healthy").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Store health check failed");
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(Envelope::failure("unhealthy")),
            )
                .into_response()
        },
    }
}

pub(crate) async fn not_found() -> ApiError {
    ApiError::unhandled(404, "Not found.")
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::unhandled(405, "Method not allowed.")
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
