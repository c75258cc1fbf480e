//! flowrest - REST request compiler for a process engine
//!
//! Turns loosely typed HTTP parameters (query strings or JSON bodies) into
//! validated calls on engine queries and command builders. The engine itself
//! is supplied by the embedder through [`engine::ProcessEngine`].
//!
//! Embedders load [`Config::from_env`], call [`logging::init_tracing`] and
//! then hand their engine to [`serve`].

extern crate self as flowrest;

pub mod api;
pub mod app;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod resources;

use std::sync::Arc;

use anyhow::Context;

pub use crate::app::{AppState, build_app};
pub use crate::config::Config;
pub use crate::engine::ProcessEngine;
pub use crate::error::RestError;

/// Bind `config.bind_address()` and serve the REST API until the process stops
pub async fn serve(config: Arc<Config>, engine: Arc<dyn ProcessEngine>) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(&config, engine);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(address = %addr, "REST API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
