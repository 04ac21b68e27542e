//! Resource routes for pages, posts and media.

use crate::handlers::{media, page, post};
use crate::state::AppState;
use axum::{routing::get, routing::put, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/pages", get(page::list).post(page::create))
        .route("/pages/:id", get(page::read).put(page::update).delete(page::delete))
        .route("/posts", get(post::list).post(post::create))
        .route("/posts/:id", get(post::read).put(post::update).delete(post::delete))
        .route(
            "/posts/:id/media/:media_id",
            put(post::attach_media).delete(post::detach_media),
        )
        .route("/media", get(media::list).post(media::create))
        .route("/media/:id", get(media::read).delete(media::delete))
        .with_state(state)
}
