//! Error handling for catalog ingestion operations.
//!
//! Only structural failures surface here. Per-field decoding problems
//! (bad numbers, ragged lines, odd dates) degrade to absent values instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("SATCAT file not found: {path}")]
    MissingSource { path: PathBuf },

    #[error("Malformed SATCAT source: {reason}")]
    MalformedSource { reason: String },

    #[error("Failed to parse SATCAT data: {reason}")]
    Parse { reason: String },

    #[error("Failed to fetch SATCAT from {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CatalogError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSource {
            reason: reason.into(),
        }
    }

    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
