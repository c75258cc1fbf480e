//! Application state and HTTP router construction.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::compiler::Coercer;
use crate::config::Config;
use crate::engine::ProcessEngine;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn ProcessEngine>,
    pub coercer: Coercer,
}

impl AppState {
    pub fn new(config: &Config, engine: Arc<dyn ProcessEngine>) -> Self {
        Self {
            engine,
            coercer: Coercer::new(config.date_format.clone()),
        }
    }
}

/// Build the full Axum router with every resource, CORS and request tracing.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(api::health::router())
        .merge(api::jobs::router())
        .merge(api::job_definitions::router())
        .merge(api::process_instances::router())
        .merge(api::tasks::router())
        .merge(api::messages::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
