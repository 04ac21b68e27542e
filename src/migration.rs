//! Database bootstrap: create the database when missing and apply the schema.
//! The schema step is idempotent (`IF NOT EXISTS`) and is skipped in production.

use crate::error::AppError;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Tables in dependency order; `post_media` references both `posts` and `media`.
const SCHEMA: &[(&str, &str)] = &[
    (
        "pages",
        r#"
        CREATE TABLE IF NOT EXISTS pages (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            content TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            content TEXT NOT NULL,
            author VARCHAR(100) NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "media",
        r#"
        CREATE TABLE IF NOT EXISTS media (
            id BIGSERIAL PRIMARY KEY,
            url TEXT NOT NULL,
            type TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post_media",
        r#"
        CREATE TABLE IF NOT EXISTS post_media (
            post_id BIGINT NOT NULL REFERENCES posts (id) ON DELETE CASCADE,
            media_id BIGINT NOT NULL REFERENCES media (id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, media_id)
        )
        "#,
    ),
];

/// Key of the transaction-scoped advisory lock that serializes concurrent migrations.
const MIGRATION_LOCK_KEY: i64 = 0x636d_735f_6d69_67;

/// Create `pages`, `posts`, `media` and `post_media` if they do not exist, in one transaction.
pub async fn auto_migrate(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for (table, ddl) in SCHEMA {
        tracing::debug!(table = %table, "ensure table");
        sqlx::query(ddl).execute(&mut *tx).await?;
    }
    sqlx::query("CREATE INDEX IF NOT EXISTS post_media_media_id_idx ON post_media (media_id)")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    tracing::info!(tables = SCHEMA.len(), "schema up to date");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Internal(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Returns (url of the `postgres` admin database, target database name).
/// A URL without a path names no database, so the name comes back empty.
fn split_database_url(url: &str) -> Result<(String, String), AppError> {
    let authority_start = url
        .find("://")
        .map(|i| i + 3)
        .ok_or_else(|| AppError::Internal("DATABASE_URL: missing scheme".into()))?;
    let rest = url.get(authority_start..).unwrap_or("");
    let slash = match rest.find(|c: char| c == '/' || c == '?') {
        Some(i) if rest.as_bytes()[i] == b'/' => i,
        _ => return Ok((url.to_string(), String::new())),
    };
    let path_start = authority_start + slash + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim().to_string();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres{}", base, query), db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_is_split_into_admin_url_and_name() {
        let (admin, name) = split_database_url("postgres://u:p@localhost:5432/cms").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "cms");
    }

    #[test]
    fn query_string_is_kept_on_admin_url() {
        let (admin, name) = split_database_url("postgres://localhost/cms?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres?sslmode=disable");
        assert_eq!(name, "cms");
    }

    #[test]
    fn url_without_path_names_no_database() {
        for url in ["postgres://localhost", "postgres://u@host:5432", "postgres://host?sslmode=disable"] {
            let (admin, name) = split_database_url(url).unwrap();
            assert_eq!(admin, url);
            assert_eq!(name, "");
        }
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("my\"db"), "\"my\"\"db\"");
    }

    #[test]
    fn join_table_is_created_last() {
        assert_eq!(SCHEMA.last().map(|(t, _)| *t), Some("post_media"));
    }
}
