//! Post record, create/patch payload and list filter.

use super::Media;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Attached media, loaded separately from `post_media`.
    #[sqlx(skip)]
    #[serde(default)]
    pub media: Vec<Media>,
}

impl Post {
    /// Merge-patch: only non-empty incoming fields replace the stored ones.
    pub fn apply_patch(&mut self, patch: PostInput) {
        if !patch.title.is_empty() {
            self.title = patch.title;
        }
        if !patch.content.is_empty() {
            self.content = patch.content;
        }
        if !patch.author.is_empty() {
            self.author = patch.author;
        }
    }
}

/// Body of `POST /posts` and `PUT /posts/:id`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
}

impl PostInput {
    /// Required on create only; updates go through [`Post::apply_patch`].
    pub fn validate_new(&self) -> Result<(), AppError> {
        if self.title.is_empty() || self.content.is_empty() {
            return Err(AppError::BadRequest("Title and content are required".into()));
        }
        Ok(())
    }
}

/// Query string of `GET /posts`. Empty values are treated as absent.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PostFilter {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl PostFilter {
    /// Build from raw query pairs. A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut filter = PostFilter::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "title" => &mut filter.title,
                "author" => &mut filter.author,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        filter
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|s| !s.is_empty())
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref().filter(|s| !s.is_empty())
    }

    /// Case-insensitive substring on title, exact match on author.
    pub fn matches(&self, post: &Post) -> bool {
        let title_ok = self
            .title()
            .map(|t| post.title.to_lowercase().contains(&t.to_lowercase()))
            .unwrap_or(true);
        let author_ok = self.author().map(|a| post.author == a).unwrap_or(true);
        title_ok && author_ok
    }
}
