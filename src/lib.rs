//! SATCAT Explorer Library
//!
//! Ingests the GCAT satellite catalog, a fixed-width listing embedded in
//! an HTML document, and exposes it as a typed table.
//!
//! This library provides tools for:
//! - Locating the header and data blocks inside the source document
//! - Deriving column boundaries from header token positions and slicing rows
//! - Decoding the 12-position type code and vague launch dates
//! - Loading and refreshing the local snapshot with a stale-copy fallback
//! - Filtering and aggregating the catalog as a Polars `DataFrame`
//! - Exporting the catalog to Parquet

pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod header;
pub mod models;
pub mod parser;
pub mod query;
pub mod schema;
pub mod store;
pub mod writer;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use models::{CatalogRow, CatalogTable, ColumnSpan, DateConfidence, SizeClass, TypeCode};
pub use parser::{parse, parse_file};
pub use store::{CatalogStore, LoadedCatalog, RefreshOutcome};
