//! Router assembly.

mod common;
mod resources;

pub use common::common_routes;
pub use resources::resource_routes;

use crate::config::AppConfig;
use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full application: resources under `config.api_prefix`, health checks at the root.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let resources = resource_routes(state.clone());
    let api = if config.api_prefix.is_empty() {
        resources
    } else {
        Router::new().nest(&config.api_prefix, resources)
    };
    Router::new()
        .merge(common_routes(state))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(config.body_limit_bytes)),
        )
}
