//! `Store` over a sqlx `PgPool`. Explicit SQL per operation; writes are transactional.

use super::Store;
use crate::error::AppError;
use crate::models::{Media, NewMedia, NewPage, Page, Post, PostFilter, PostInput};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

const PAGE_COLUMNS: &str = "id, title, content, created_at, updated_at";
const POST_COLUMNS: &str = "id, title, content, author, created_at, updated_at";
const MEDIA_COLUMNS: &str = "id, url, type, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    /// Media attached to each of `post_ids`, keyed by post id.
    async fn media_for_posts<'e, E>(executor: E, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Media>>, AppError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = "SELECT pm.post_id, m.id, m.url, m.type, m.created_at, m.updated_at \
                   FROM media m JOIN post_media pm ON pm.media_id = m.id \
                   WHERE pm.post_id = ANY($1) ORDER BY m.id";
        tracing::debug!(sql = %sql, post_ids = ?post_ids, "query");
        let rows: Vec<AttachedMedia> = sqlx::query_as(sql)
            .bind(post_ids.to_vec())
            .fetch_all(executor)
            .await?;
        let mut by_post: HashMap<i64, Vec<Media>> = HashMap::new();
        for row in rows {
            by_post.entry(row.post_id).or_default().push(row.media);
        }
        Ok(by_post)
    }

    async fn with_media(&self, mut posts: Vec<Post>) -> Result<Vec<Post>, AppError> {
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let mut by_post = Self::media_for_posts(&self.pool, &ids).await?;
        for post in &mut posts {
            post.media = by_post.remove(&post.id).unwrap_or_default();
        }
        Ok(posts)
    }
}

#[derive(sqlx::FromRow)]
struct AttachedMedia {
    post_id: i64,
    #[sqlx(flatten)]
    media: Media,
}

/// LIKE pattern for a literal substring.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_pages(&self) -> Result<Vec<Page>, AppError> {
        let sql = format!("SELECT {} FROM pages ORDER BY id", PAGE_COLUMNS);
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_page(&self, id: i64) -> Result<Option<Page>, AppError> {
        let sql = format!("SELECT {} FROM pages WHERE id = $1", PAGE_COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_page(&self, page: &NewPage) -> Result<Page, AppError> {
        let sql = format!(
            "INSERT INTO pages (title, content) VALUES ($1, $2) RETURNING {}",
            PAGE_COLUMNS
        );
        tracing::debug!(sql = %sql, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let row: Page = sqlx::query_as(&sql)
            .bind(&page.title)
            .bind(&page.content)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn update_page(&self, page: &Page) -> Result<Option<Page>, AppError> {
        let sql = format!(
            "UPDATE pages SET title = $1, content = $2, updated_at = NOW() WHERE id = $3 RETURNING {}",
            PAGE_COLUMNS
        );
        tracing::debug!(sql = %sql, id = page.id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let row: Option<Page> = sqlx::query_as(&sql)
            .bind(&page.title)
            .bind(&page.content)
            .bind(page.id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn delete_page(&self, id: i64) -> Result<bool, AppError> {
        let sql = "DELETE FROM pages WHERE id = $1";
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(done.rows_affected() > 0)
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!("SELECT {} FROM posts", POST_COLUMNS));
        let mut joiner = " WHERE ";
        if let Some(title) = filter.title() {
            qb.push(joiner).push("title ILIKE ").push_bind(contains_pattern(title));
            joiner = " AND ";
        }
        if let Some(author) = filter.author() {
            qb.push(joiner).push("author = ").push_bind(author.to_string());
        }
        qb.push(" ORDER BY id");
        tracing::debug!(sql = %qb.sql(), filter = ?filter, "query");
        let posts: Vec<Post> = qb.build_query_as().fetch_all(&self.pool).await?;
        self.with_media(posts).await
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        let post: Option<Post> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        match post {
            Some(p) => Ok(self.with_media(vec![p]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_post(&self, post: &PostInput) -> Result<Post, AppError> {
        let sql = format!(
            "INSERT INTO posts (title, content, author) VALUES ($1, $2, $3) RETURNING {}",
            POST_COLUMNS
        );
        tracing::debug!(sql = %sql, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let row: Post = sqlx::query_as(&sql)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.author)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, AppError> {
        let sql = format!(
            "UPDATE posts SET title = $1, content = $2, author = $3, updated_at = NOW() WHERE id = $4 RETURNING {}",
            POST_COLUMNS
        );
        tracing::debug!(sql = %sql, id = post.id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let row: Option<Post> = sqlx::query_as(&sql)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.author)
            .bind(post.id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut row) = row else {
            return Ok(None);
        };
        row.media = Self::media_for_posts(&mut *tx, &[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, AppError> {
        tracing::debug!(id, "delete post (tx)");
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM post_media WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let done = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(done.rows_affected() > 0)
    }

    async fn list_media(&self) -> Result<Vec<Media>, AppError> {
        let sql = format!("SELECT {} FROM media ORDER BY id", MEDIA_COLUMNS);
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_media(&self, id: i64) -> Result<Option<Media>, AppError> {
        let sql = format!("SELECT {} FROM media WHERE id = $1", MEDIA_COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_media(&self, media: &NewMedia) -> Result<Media, AppError> {
        let sql = format!("INSERT INTO media (url, type) VALUES ($1, $2) RETURNING {}", MEDIA_COLUMNS);
        tracing::debug!(sql = %sql, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let row: Media = sqlx::query_as(&sql)
            .bind(&media.url)
            .bind(&media.kind)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn delete_media(&self, id: i64) -> Result<bool, AppError> {
        tracing::debug!(id, "delete media (tx)");
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM post_media WHERE media_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let done = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(done.rows_affected() > 0)
    }

    async fn attach_media(&self, post_id: i64, media_id: i64) -> Result<(), AppError> {
        let sql = "INSERT INTO post_media (post_id, media_id) VALUES ($1, $2) ON CONFLICT DO NOTHING";
        tracing::debug!(sql = %sql, post_id, media_id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        sqlx::query(sql).bind(post_id).bind(media_id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn detach_media(&self, post_id: i64, media_id: i64) -> Result<bool, AppError> {
        let sql = "DELETE FROM post_media WHERE post_id = $1 AND media_id = $2";
        tracing::debug!(sql = %sql, post_id, media_id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query(sql).bind(post_id).bind(media_id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(done.rows_affected() > 0)
    }
}
