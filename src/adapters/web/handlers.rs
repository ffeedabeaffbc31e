//! HTTP request handlers.

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::adapters::csv_export::to_csv_bytes;
use crate::domain::dashboards::{self, warehouse::export_table};
use crate::domain::query::QueryParams;
use crate::domain::sql;
use crate::ports::warehouse_port::WarehousePort;
use crate::domain::view::{Selection, View};

use super::templates::{ContentTemplate, PageTemplate, PageView};
use super::{is_htmx_request, AppState, WebError};

type Pairs = Query<Vec<(String, String)>>;

async fn render_view(
    state: Arc<AppState>,
    view: View,
    pairs: Vec<(String, String)>,
    headers: &HeaderMap,
) -> Result<Response, WebError> {
    let sel = Selection::from_pairs(&pairs)?;
    let today = chrono::Local::now().date_naive();
    let port = Arc::clone(&state.warehouse);
    let dash =
        tokio::task::spawn_blocking(move || dashboards::build(view, &*port, &sel, today))
            .await?;
    let failed = dash.error_notices().count();
    if failed > 0 {
        tracing::info!(view = view.slug(), failed, "view rendered with failed queries");
    }

    let page = PageView::from(dash);
    let html = if is_htmx_request(headers) {
        ContentTemplate { page: &page }.render()
    } else {
        PageTemplate::new(&page).render()
    }
    .map_err(|e| WebError::internal(format!("template error: {e}")))?;
    Ok(Html(html).into_response())
}

pub async fn overview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(pairs): Pairs,
) -> Result<Response, WebError> {
    render_view(state, View::Overview, pairs, &headers).await
}

pub async fn view(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Query(pairs): Pairs,
) -> Result<Response, WebError> {
    let view = View::from_slug(&slug)
        .ok_or_else(|| WebError::not_found(format!("no such view: {slug}")))?;
    render_view(state, view, pairs, &headers).await
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Response, WebError> {
    let port = Arc::clone(&state.warehouse);
    let name = table.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        export_table(&*port, &name).and_then(|rows| to_csv_bytes(&rows))
    })
    .await??;

    // Only catalog-listed names get this far.
    let disposition = format!("attachment; filename=\"{table}.csv\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let port = Arc::clone(&state.warehouse);
    let probe =
        tokio::task::spawn_blocking(move || port.query(sql::HEALTH_CHECK, &QueryParams::new()))
            .await;
    match probe {
        Ok(Ok(_)) => (StatusCode::OK, "ok").into_response(),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("database unavailable: {err}"),
            )
                .into_response()
        }
        Err(err) => WebError::from(err).into_response(),
    }
}

pub async fn not_found() -> WebError {
    WebError::not_found("page not found")
}
