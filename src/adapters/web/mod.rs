//! HTTP surface: axum router, askama pages and HTMX fragments.

mod error;
mod handlers;
mod templates;

pub use error::WebError;
pub use templates::{BlockView, PageView};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::domain::error::DashboardError;
use crate::ports::warehouse_port::WarehousePort;

pub struct AppState {
    pub warehouse: Arc<dyn WarehousePort + Send + Sync>,
    pub static_dir: PathBuf,
}

pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/", get(handlers::overview))
        .route("/view/{slug}", get(handlers::view))
        .route("/export/{table}", get(handlers::export))
        .route("/health", get(handlers::health))
        .nest_service("/static", static_files)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), DashboardError> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dashboard listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
