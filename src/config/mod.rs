//! Application configuration management

use std::env;

use anyhow::{Context, Result};

use crate::compiler::coerce::DEFAULT_DATE_FORMAT;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address, all interfaces when unset
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// chrono format string used for every date parameter and typed date value
    pub date_format: String,

    /// Emit JSON log lines instead of the human readable format
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            port: 8080,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            log_json: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let date_format =
            env::var("REST_DATE_FORMAT").unwrap_or_else(|_| DEFAULT_DATE_FORMAT.to_string());
        if date_format.trim().is_empty() {
            anyhow::bail!("REST_DATE_FORMAT must not be empty");
        }

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            date_format,

            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(true),
        })
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host.as_deref().unwrap_or("0.0.0.0"), self.port)
    }
}
