//! Reportfmt Server - HTTP upload surface for report formatting
//!
//! Provides REST endpoints for:
//! - Single-document processing (multipart upload in, formatted DOCX out)
//! - Health check
//!
//! One pipeline run per upload; uploads are spooled to a temp directory
//! for the duration of the request and deleted afterwards regardless of
//! outcome.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod handlers;
mod state;
#[cfg(test)]
mod tests;

use state::AppState;

// Financial reports are small; anything past this is not one.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reportfmt_server=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Initialize application state
    info!("Initializing application state...");
    let state = Arc::new(AppState::from_env()?);
    if state.strict {
        info!("Strict validation: non-compliant reports will be rejected");
    }

    let app = router(state);

    // Parse bind address
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Processing endpoint
        .route("/process-document", post(handlers::process_document))
        // Add middleware
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
