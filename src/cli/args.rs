//! Command-line argument definitions.

use crate::config::{CatalogConfig, CompressionAlgorithm};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "satcat")]
#[command(about = "Explore the GCAT satellite catalog: load, refresh, decode and summarise")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Local SATCAT file (defaults to satcat.html in the working directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Remote SATCAT URL used by refresh
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Timeout in seconds for the refresh download
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the loaded snapshot: revision, row count and columns
    Info,

    /// Download the latest SATCAT and replace the local file
    Refresh {
        /// Download even if the local file is already dated today
        #[arg(long)]
        force: bool,
    },

    /// Type, launch-year, date-confidence, size-class and numeric summaries
    Summary,

    /// Value counts for the SatType bytes
    Bytes {
        /// Only this byte position (1-12)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=12))]
        position: Option<u8>,
    },

    /// Filter the catalog and print matching rows
    Filter {
        /// Coarse types to keep (e.g. P,R)
        #[arg(long, value_delimiter = ',')]
        coarse: Vec<String>,

        /// First launch year (inclusive)
        #[arg(long)]
        from: Option<i32>,

        /// Last launch year (inclusive)
        #[arg(long)]
        to: Option<i32>,

        /// Byte filter as POSITION=VALUES, e.g. 2=H,P (repeatable)
        #[arg(long = "byte", value_name = "POSITION=VALUES")]
        bytes: Vec<String>,

        /// Maximum rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Decode a 12-character type code
    Decode {
        /// Type code, e.g. PHAT
        code: String,
    },

    /// Interpret a Julian Date or a vague catalog date
    Date {
        /// e.g. 2451545.0 or "2016 Jun 8 2359:57?"
        input: String,
    },

    /// Export the catalog (raw and derived columns) to Parquet
    Export {
        /// Output parquet file
        #[arg(short, long)]
        output: PathBuf,

        /// Parquet compression algorithm (snappy, zstd, lz4, none)
        #[arg(long)]
        compression: Option<String>,
    },
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Layer CLI overrides on top of the file/default configuration
    pub fn resolve_config(&self) -> Result<CatalogConfig> {
        let mut config = CatalogConfig::load(self.config.as_deref())?;

        if let Some(data_file) = &self.data_file {
            config = config.with_data_file(data_file.clone());
        }
        if let Some(url) = &self.url {
            config = config.with_source_url(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_fetch_timeout_secs(secs);
        }
        if let Some(Command::Export {
            compression: Some(compression),
            ..
        }) = &self.command
        {
            config = config.with_compression(compression.parse::<CompressionAlgorithm>()?);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse a `POSITION=V1,V2` byte filter
pub fn parse_byte_filter(raw: &str) -> Option<(usize, Vec<String>)> {
    let (position, values) = raw.split_once('=')?;
    let position: usize = position.trim().parse().ok()?;
    if !(1..=12).contains(&position) {
        return None;
    }
    let values: Vec<String> = values
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return None;
    }
    Some((position, values))
}
