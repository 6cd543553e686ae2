//! Parquet export of the catalog frame.

use crate::config::CompressionAlgorithm;
use crate::error::Result;
use polars::prelude::{DataFrame, ParquetWriter as PolarsParquetWriter, StatisticsOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes catalog frames to a parquet file
#[derive(Debug, Clone)]
pub struct ParquetExporter {
    output_path: PathBuf,
    compression: CompressionAlgorithm,
}

impl ParquetExporter {
    pub fn new(output_path: impl Into<PathBuf>, compression: CompressionAlgorithm) -> Self {
        Self {
            output_path: output_path.into(),
            compression,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the frame, creating parent directories as needed. Returns rows written.
    pub fn write(&self, df: &DataFrame) -> Result<usize> {
        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut df = df.clone();
        let file = std::fs::File::create(&self.output_path)?;
        PolarsParquetWriter::new(file)
            .with_compression(self.compression.to_polars_compression())
            .with_statistics(StatisticsOptions::full())
            .finish(&mut df)?;

        debug!(
            "Wrote {} rows to {}",
            df.height(),
            self.output_path.display()
        );
        Ok(df.height())
    }
}
