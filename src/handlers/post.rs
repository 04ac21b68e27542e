//! Post handlers. Updates are merge-patch: empty incoming fields keep the stored value.

use crate::error::AppError;
use crate::extractors::{parse_id, JsonBody};
use crate::models::{Post, PostFilter, PostInput};
use crate::response::{created, message, ok};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::IntoResponse,
};

const NOT_FOUND: &str = "Post not found";

async fn load(state: &AppState, id_str: &str) -> Result<Post, AppError> {
    let id = parse_id(id_str, "post")?;
    state
        .store
        .find_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

/// GET /posts?title=&author=
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(pairs) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let filter = PostFilter::from_pairs(pairs);
    Ok(ok(state.store.list_posts(&filter).await?))
}

/// GET /posts/:id
pub async fn read(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(load(&state, &id_str).await?))
}

/// POST /posts
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    body.validate_new()?;
    let post = state.store.insert_post(&body).await?;
    tracing::info!(id = post.id, "post created");
    Ok(created(post))
}

/// PUT /posts/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<JsonBody<PostInput>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let mut post = load(&state, &id_str).await?;
    let JsonBody(patch) = body?;
    post.apply_patch(patch);
    let post = state
        .store
        .update_post(&post)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(ok(post))
}

/// DELETE /posts/:id
pub async fn delete(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<impl IntoResponse, AppError> {
    let post = load(&state, &id_str).await?;
    if !state.store.delete_post(post.id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!(id = post.id, "post deleted");
    Ok(message("Post deleted successfully"))
}

async fn load_pair(state: &AppState, id_str: &str, media_id_str: &str) -> Result<(Post, i64), AppError> {
    let post = load(state, id_str).await?;
    let media_id = parse_id(media_id_str, "media")?;
    state
        .store
        .find_media(media_id)
        .await?
        .ok_or_else(|| AppError::NotFound(super::media::NOT_FOUND.into()))?;
    Ok((post, media_id))
}

/// PUT /posts/:id/media/:media_id
pub async fn attach_media(
    State(state): State<AppState>,
    Path((id_str, media_id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (post, media_id) = load_pair(&state, &id_str, &media_id_str).await?;
    state.store.attach_media(post.id, media_id).await?;
    Ok(ok(load(&state, &id_str).await?))
}

/// DELETE /posts/:id/media/:media_id
pub async fn detach_media(
    State(state): State<AppState>,
    Path((id_str, media_id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (post, media_id) = load_pair(&state, &id_str, &media_id_str).await?;
    state.store.detach_media(post.id, media_id).await?;
    Ok(ok(load(&state, &id_str).await?))
}
