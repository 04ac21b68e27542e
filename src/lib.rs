//! CMS backend: REST CRUD for pages, posts and media over PostgreSQL.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{AppConfig, Environment};
pub use error::{AppError, ConfigError};
pub use migration::{auto_migrate, ensure_database_exists};
pub use routes::{app, common_routes, resource_routes};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, Store};
