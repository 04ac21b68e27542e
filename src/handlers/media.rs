//! Media handlers. There is no update; deleting detaches the media from every post.

use crate::error::AppError;
use crate::extractors::{parse_id, JsonBody};
use crate::models::NewMedia;
use crate::response::{created, message, ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub(crate) const NOT_FOUND: &str = "Media not found";

/// GET /media
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store.list_media().await?))
}

/// GET /media/:id
pub async fn read(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str, "media")?;
    let media = state
        .store
        .find_media(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(ok(media))
}

/// POST /media
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewMedia>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;
    let media = state.store.insert_media(&body).await?;
    tracing::info!(id = media.id, kind = %media.kind, "media created");
    Ok(created(media))
}

/// DELETE /media/:id
pub async fn delete(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str, "media")?;
    state
        .store
        .find_media(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    if !state.store.delete_media(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!(id, "media deleted");
    Ok(message("Media deleted successfully"))
}
