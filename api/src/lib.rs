use std::{env, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{Router, middleware, routing::post};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

use crate::{
    middleware_layer::request_id::request_id, routes::prof_reviews::prof_reviews_route::prof_reviews,
};

pub use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    middleware_layer::request_id::REQUEST_ID_HEADER,
};

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:3000";

/// All HTTP routes with their middleware, bound to `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/profReviews", post(prof_reviews))
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}

/// Builds the state from the environment and serves until Ctrl+C.
///
/// Configuration problems are returned before the listener is bound.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    let app = router(state);

    // Bind to address
    let listener = TcpListener::bind(&host_url).await.map_err(AppError::Bind)?;
    info!(address = %host_url, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
