//! In-process `Store`. Same semantics as `PgStore`; each call holds the lock for its whole write.

use super::Store;
use crate::error::AppError;
use crate::models::{Media, NewMedia, NewPage, Page, Post, PostFilter, PostInput};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    pages: BTreeMap<i64, Page>,
    posts: BTreeMap<i64, Post>,
    media: BTreeMap<i64, Media>,
    /// (post_id, media_id)
    post_media: BTreeSet<(i64, i64)>,
    next_page_id: i64,
    next_post_id: i64,
    next_media_id: i64,
}

impl Tables {
    fn media_of(&self, post_id: i64) -> Vec<Media> {
        self.post_media
            .range((post_id, i64::MIN)..=(post_id, i64::MAX))
            .filter_map(|(_, media_id)| self.media.get(media_id).cloned())
            .collect()
    }

    fn with_media(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.media = self.media_of(post.id);
        post
    }
}

/// New `updated_at`, strictly after `prev` even when the clock has not moved.
fn touched(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > prev {
        now
    } else {
        prev + Duration::microseconds(1)
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails the way a lost database connection does.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.check()?;
        self.tables
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.check()?;
        self.tables
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }

    async fn list_pages(&self) -> Result<Vec<Page>, AppError> {
        Ok(self.read()?.pages.values().cloned().collect())
    }

    async fn find_page(&self, id: i64) -> Result<Option<Page>, AppError> {
        Ok(self.read()?.pages.get(&id).cloned())
    }

    async fn insert_page(&self, page: &NewPage) -> Result<Page, AppError> {
        let mut t = self.write()?;
        let now = Utc::now();
        let row = Page {
            id: next_id(&mut t.next_page_id),
            title: page.title.clone(),
            content: page.content.clone(),
            created_at: now,
            updated_at: now,
        };
        t.pages.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_page(&self, page: &Page) -> Result<Option<Page>, AppError> {
        let mut t = self.write()?;
        let Some(stored) = t.pages.get_mut(&page.id) else {
            return Ok(None);
        };
        stored.title = page.title.clone();
        stored.content = page.content.clone();
        stored.updated_at = touched(stored.updated_at);
        Ok(Some(stored.clone()))
    }

    async fn delete_page(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.pages.remove(&id).is_some())
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        let t = self.read()?;
        Ok(t.posts
            .values()
            .filter(|p| filter.matches(p))
            .map(|p| t.with_media(p))
            .collect())
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        let t = self.read()?;
        Ok(t.posts.get(&id).map(|p| t.with_media(p)))
    }

    async fn insert_post(&self, post: &PostInput) -> Result<Post, AppError> {
        let mut t = self.write()?;
        let now = Utc::now();
        let row = Post {
            id: next_id(&mut t.next_post_id),
            title: post.title.clone(),
            content: post.content.clone(),
            author: post.author.clone(),
            created_at: now,
            updated_at: now,
            media: Vec::new(),
        };
        t.posts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, AppError> {
        let mut t = self.write()?;
        let Some(stored) = t.posts.get_mut(&post.id) else {
            return Ok(None);
        };
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.author = post.author.clone();
        stored.updated_at = touched(stored.updated_at);
        let stored = stored.clone();
        Ok(Some(t.with_media(&stored)))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        t.post_media.retain(|(post_id, _)| *post_id != id);
        Ok(t.posts.remove(&id).is_some())
    }

    async fn list_media(&self) -> Result<Vec<Media>, AppError> {
        Ok(self.read()?.media.values().cloned().collect())
    }

    async fn find_media(&self, id: i64) -> Result<Option<Media>, AppError> {
        Ok(self.read()?.media.get(&id).cloned())
    }

    async fn insert_media(&self, media: &NewMedia) -> Result<Media, AppError> {
        let mut t = self.write()?;
        let now = Utc::now();
        let row = Media {
            id: next_id(&mut t.next_media_id),
            url: media.url.clone(),
            kind: media.kind.clone(),
            created_at: now,
            updated_at: now,
        };
        t.media.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_media(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        t.post_media.retain(|(_, media_id)| *media_id != id);
        Ok(t.media.remove(&id).is_some())
    }

    async fn attach_media(&self, post_id: i64, media_id: i64) -> Result<(), AppError> {
        let mut t = self.write()?;
        if !t.posts.contains_key(&post_id) || !t.media.contains_key(&media_id) {
            return Err(AppError::Internal(format!(
                "post_media references missing row (post {}, media {})",
                post_id, media_id
            )));
        }
        t.post_media.insert((post_id, media_id));
        Ok(())
    }

    async fn detach_media(&self, post_id: i64, media_id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.post_media.remove(&(post_id, media_id)))
    }
}
