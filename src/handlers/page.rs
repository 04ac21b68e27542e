//! Page handlers. Updates replace title and content wholesale.

use crate::error::AppError;
use crate::extractors::{parse_id, JsonBody};
use crate::models::{NewPage, Page, PageChanges};
use crate::response::{created, message, ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

const NOT_FOUND: &str = "Page not found";

async fn load(state: &AppState, id_str: &str) -> Result<Page, AppError> {
    let id = parse_id(id_str, "page")?;
    state
        .store
        .find_page(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

/// GET /pages
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store.list_pages().await?))
}

/// GET /pages/:id
pub async fn read(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(load(&state, &id_str).await?))
}

/// POST /pages
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewPage>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;
    let page = state.store.insert_page(&body).await?;
    tracing::info!(id = page.id, "page created");
    Ok(created(page))
}

/// PUT /pages/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<JsonBody<PageChanges>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let mut page = load(&state, &id_str).await?;
    let JsonBody(changes) = body?;
    page.apply_changes(changes);
    let page = state
        .store
        .update_page(&page)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(ok(page))
}

/// DELETE /pages/:id
pub async fn delete(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<impl IntoResponse, AppError> {
    let page = load(&state, &id_str).await?;
    if !state.store.delete_page(page.id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!(id = page.id, "page deleted");
    Ok(message("Page deleted successfully"))
}
