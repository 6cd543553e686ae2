//! Catalog snapshot store.
//!
//! `CatalogStore` owns the lifecycle of the local catalog file: loading it,
//! refreshing it from the remote source, and reading its revision label.
//! A refresh makes exactly one fetch attempt. The local file is replaced
//! atomically and only once the fetched document has been parsed
//! successfully; on any failure the existing copy is used instead.

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::header::{extract_revision, read_revision};
use crate::models::CatalogTable;
use crate::parser::{parse, parse_file};
use chrono::NaiveDate;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

/// Source of the remote catalog document
pub trait SourceFetcher {
    /// Fetch the raw document bytes in a single attempt
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// HTTP fetcher with a bounded timeout and no retries
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::network(url, format!("HTTP status {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::network(url, e))?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// Result of loading the local snapshot.
///
/// The table and the revision are read independently; either may be
/// missing while the other is present.
#[derive(Debug)]
pub struct LoadedCatalog {
    pub table: Option<CatalogTable>,
    pub revision: Option<String>,
    /// Why `table` is missing, if it is
    pub failure: Option<CatalogError>,
}

/// Result of a refresh attempt
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The remote document was fetched, stored and parsed
    Updated { table: CatalogTable },
    /// The fetch or store failed; the existing local copy was parsed instead
    Stale { table: CatalogTable, reason: String },
}

impl RefreshOutcome {
    pub fn table(&self) -> &CatalogTable {
        match self {
            RefreshOutcome::Updated { table } | RefreshOutcome::Stale { table, .. } => table,
        }
    }

    pub fn into_table(self) -> CatalogTable {
        match self {
            RefreshOutcome::Updated { table } | RefreshOutcome::Stale { table, .. } => table,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, RefreshOutcome::Stale { .. })
    }
}

/// Owner of the persisted catalog snapshot
#[derive(Debug, Clone)]
pub struct CatalogStore<F = HttpFetcher> {
    config: CatalogConfig,
    fetcher: F,
}

impl CatalogStore<HttpFetcher> {
    /// Store backed by the HTTP fetcher
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        Ok(Self { config, fetcher })
    }
}

impl<F: SourceFetcher> CatalogStore<F> {
    pub fn with_fetcher(config: CatalogConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn data_file(&self) -> &Path {
        &self.config.data_file
    }

    /// Load the local snapshot.
    ///
    /// A missing file is an error. A file that fails to parse yields a
    /// `LoadedCatalog` without a table, carrying the failure.
    pub fn load(&self) -> Result<LoadedCatalog> {
        let path = self.data_file();
        if !path.is_file() {
            error!("SATCAT file '{}' not found", path.display());
            return Err(CatalogError::MissingSource {
                path: path.to_path_buf(),
            });
        }

        let revision = match read_revision(path) {
            Ok(revision) => revision,
            Err(e) => {
                warn!("Could not read revision from {}: {}", path.display(), e);
                None
            }
        };

        match parse_file(path) {
            Ok(table) => {
                info!(
                    "Loaded {} catalog rows from {} (revision {})",
                    table.len(),
                    path.display(),
                    revision.as_deref().unwrap_or("unknown")
                );
                Ok(LoadedCatalog {
                    table: Some(table.with_revision(revision.clone())),
                    revision,
                    failure: None,
                })
            }
            Err(e) => {
                error!("Failed to load or parse '{}': {}", path.display(), e);
                Ok(LoadedCatalog {
                    table: None,
                    revision,
                    failure: Some(e),
                })
            }
        }
    }

    /// Revision label of the local snapshot
    pub fn current_revision(&self) -> Result<Option<String>> {
        read_revision(self.data_file())
    }

    /// Fetch the remote document once and replace the local snapshot.
    ///
    /// On failure the existing local copy is parsed and returned as
    /// [`RefreshOutcome::Stale`]; without a local copy the failure is
    /// returned.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let path = self.data_file();

        match self.fetch_and_persist().await {
            Ok(revision) => {
                let table = parse_file(path)?.with_revision(revision);
                info!(
                    "Downloaded and replaced {} ({} rows)",
                    path.display(),
                    table.len()
                );
                Ok(RefreshOutcome::Updated { table })
            }
            Err(e) => {
                warn!(
                    "Failed to download SATCAT from web: {}. Using local file if available.",
                    e
                );
                if !path.is_file() {
                    return Err(e);
                }
                let revision = read_revision(path).ok().flatten();
                let table = parse_file(path)?.with_revision(revision);
                Ok(RefreshOutcome::Stale {
                    table,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Fetch, validate and atomically persist. Returns the fetched revision.
    async fn fetch_and_persist(&self) -> Result<Option<String>> {
        let url = &self.config.source_url;
        let bytes = self.fetcher.fetch(url).await?;

        let content = String::from_utf8(bytes).map_err(|e| CatalogError::Parse {
            reason: format!("Fetched document is not valid UTF-8: {}", e),
        })?;

        let revision = extract_revision(&content);
        info!(
            "Fetched SATCAT update date: {}",
            revision.as_deref().unwrap_or("Unknown")
        );

        parse(&content)?;
        persist_atomically(self.data_file(), content.as_bytes())?;
        Ok(revision)
    }
}

/// Write to a temporary sibling file, then rename it over `path`
fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| CatalogError::Io(e.error))?;

    debug!("Persisted {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Whether a revision label names the given day (`YYYY Mon D`)
pub fn is_up_to_date(revision: Option<&str>, today: NaiveDate) -> bool {
    let Some(revision) = revision else {
        return false;
    };
    let normalized = revision.split_whitespace().collect::<Vec<_>>().join(" ");
    normalized == today.format("%Y %b %-d").to_string()
}
