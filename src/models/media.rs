//! Media record and its create payload.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Media {
    pub id: i64,
    pub url: String,
    /// Free-form media type such as "image" or "video".
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /media`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewMedia {
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl NewMedia {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.url.is_empty() || self.kind.is_empty() {
            return Err(AppError::BadRequest("URL and type are required".into()));
        }
        Ok(())
    }
}
