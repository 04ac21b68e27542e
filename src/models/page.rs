//! Page record and its create/replace payloads.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column width of `pages.title`.
pub const PAGE_TITLE_MAX_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Full replace: both fields are overwritten, empty or not.
    pub fn apply_changes(&mut self, changes: PageChanges) {
        self.title = changes.title;
        self.content = changes.content;
    }
}

/// Body of `POST /pages`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewPage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl NewPage {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.is_empty() {
            return Err(AppError::BadRequest("title is required".into()));
        }
        // Checked here so an overlong title is a 400, not a column error from the store.
        if self.title.chars().count() > PAGE_TITLE_MAX_LEN {
            return Err(AppError::BadRequest(format!(
                "title must be at most {} characters",
                PAGE_TITLE_MAX_LEN
            )));
        }
        if self.content.is_empty() {
            return Err(AppError::BadRequest("content is required".into()));
        }
        Ok(())
    }
}

/// Body of `PUT /pages/:id`. Absent fields read as empty.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageChanges {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        let now = Utc::now();
        Page {
            id: 1,
            title: "About".into(),
            content: "Hello".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn changes_overwrite_with_empty_values() {
        let mut p = page();
        p.apply_changes(PageChanges {
            title: "".into(),
            content: "New".into(),
        });
        assert_eq!(p.title, "");
        assert_eq!(p.content, "New");
    }

    #[test]
    fn new_page_requires_fields() {
        assert!(NewPage::default().validate().is_err());
        let missing_content = NewPage {
            title: "t".into(),
            content: "".into(),
        };
        assert_eq!(missing_content.validate().unwrap_err().to_string(), "content is required");
        let ok = NewPage {
            title: "t".into(),
            content: "c".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn title_length_counts_chars() {
        let at_limit = NewPage {
            title: "é".repeat(PAGE_TITLE_MAX_LEN),
            content: "c".into(),
        };
        assert!(at_limit.validate().is_ok());
        let over = NewPage {
            title: "a".repeat(PAGE_TITLE_MAX_LEN + 1),
            content: "c".into(),
        };
        assert!(over.validate().is_err());
    }
}
