//! Errors returned as `Result` by the locus crate
//!
//! Location failures never show up here: they are delivered through the
//! error category as [`LocationError`](locus_model::LocationError). These
//! types cover the surrounding plumbing only.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::logging::LoggingError;

/// Failure to load a [`FacadeConfig`](crate::FacadeConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum LocusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

pub type Result<T> = std::result::Result<T, LocusError>;
