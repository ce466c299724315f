//! Structured logging setup
//!
//! Logs go to stderr so the result block on stdout stays clean.
//!
//! # Environment Variables
//!
//! - `TRAINPUSH_LOG`: filter directives (default: `trainpush=info`)
//! - `TRAINPUSH_LOG_FORMAT`: `json` or `pretty` (default: `pretty`)

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILTER_VAR: &str = "TRAINPUSH_LOG";
pub const LOG_FORMAT_VAR: &str = "TRAINPUSH_LOG_FORMAT";
const DEFAULT_FILTER: &str = "trainpush=info";

pub fn init() -> Result<()> {
    let log_format = std::env::var(LOG_FORMAT_VAR).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_env(LOG_FILTER_VAR)
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
