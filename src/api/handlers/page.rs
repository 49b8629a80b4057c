//! Page CRUD handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{debug, info};

use crate::api::server::AppState;
use crate::error::WikiError;
use crate::models::Page;

/// List all page titles
pub async fn list_pages(State(state): State<AppState>) -> Result<impl IntoResponse, WikiError> {
    let titles = state.store.list().await?;
    Ok(Json(titles))
}

/// Get the markdown of a page
///
/// A page that was never saved reads as empty.
pub async fn get_page(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<impl IntoResponse, WikiError> {
    let content = state.store.get(&title).await?;

    debug!(title = %title, found = content.is_some(), "Fetched page");

    Ok(String::from_utf8_lossy(&content.unwrap_or_default()).into_owned())
}

/// Create or replace a page
///
/// The path title is the storage key; the title inside the body is echoed
/// back but not used for keying.
pub async fn save_page(
    State(state): State<AppState>,
    Path(title): Path<String>,
    body: String,
) -> Result<impl IntoResponse, WikiError> {
    let page = Page::from_json(&body)?;

    state.store.set(&title, page.markdown.as_bytes()).await?;

    info!(title = %title, bytes = page.markdown.len(), "Saved page");
    Ok(Json(page))
}

/// Delete a page
pub async fn delete_page(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<impl IntoResponse, WikiError> {
    state.store.delete(&title).await?;

    info!(title = %title, "Deleted page");
    Ok(StatusCode::OK)
}
