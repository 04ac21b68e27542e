//! Data access for pages, posts, media and the `post_media` join table.
//!
//! Handlers only see [`Store`]; [`PgStore`] is the PostgreSQL implementation and
//! [`MemoryStore`] keeps everything in process for tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::models::{Media, NewMedia, NewPage, Page, Post, PostFilter, PostInput};
use async_trait::async_trait;

/// Every write runs in its own transaction; a failed write leaves no trace.
///
/// `update_*` return `None` and `delete_*` return `false` when the row no longer exists.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the readiness check.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_pages(&self) -> Result<Vec<Page>, AppError>;
    async fn find_page(&self, id: i64) -> Result<Option<Page>, AppError>;
    async fn insert_page(&self, page: &NewPage) -> Result<Page, AppError>;
    /// Persists title and content of `page`; bumps `updated_at`.
    async fn update_page(&self, page: &Page) -> Result<Option<Page>, AppError>;
    async fn delete_page(&self, id: i64) -> Result<bool, AppError>;

    /// Posts come back with their media attached.
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError>;
    async fn find_post(&self, id: i64) -> Result<Option<Post>, AppError>;
    async fn insert_post(&self, post: &PostInput) -> Result<Post, AppError>;
    /// Persists title, content and author of `post`; bumps `updated_at`.
    async fn update_post(&self, post: &Post) -> Result<Option<Post>, AppError>;
    /// Removes the post's join rows together with the post.
    async fn delete_post(&self, id: i64) -> Result<bool, AppError>;

    async fn list_media(&self) -> Result<Vec<Media>, AppError>;
    async fn find_media(&self, id: i64) -> Result<Option<Media>, AppError>;
    async fn insert_media(&self, media: &NewMedia) -> Result<Media, AppError>;
    /// Detaches the media from every post, then removes it.
    async fn delete_media(&self, id: i64) -> Result<bool, AppError>;

    /// No-op when already attached.
    async fn attach_media(&self, post_id: i64, media_id: i64) -> Result<(), AppError>;
    /// Returns whether a link was removed.
    async fn detach_media(&self, post_id: i64, media_id: i64) -> Result<bool, AppError>;
}
