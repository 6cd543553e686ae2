//! Revision label extraction.
//!
//! The catalog carries a `# Updated YYYY Mon D` comment identifying the
//! snapshot. The label is read independently of table parsing so that
//! either can succeed without the other.

use crate::constants::REVISION_MARKER;
use crate::error::{CatalogError, Result};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static REVISION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"# Updated (\d{4} [A-Za-z]{3}\s+\d{1,2})").expect("valid regex")
});

/// Revision label from a single line, if it is a revision comment
fn revision_from_line(line: &str) -> Option<String> {
    if !line.starts_with(REVISION_MARKER) {
        return None;
    }
    REVISION_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|label| label.as_str().trim().to_string())
}

/// First revision label found in document text
pub fn extract_revision(content: &str) -> Option<String> {
    content.lines().find_map(revision_from_line)
}

/// Revision label of a file on disk.
///
/// Streams the file line by line and stops at the first match. Lines that
/// are not valid UTF-8 are skipped; any other read error is returned.
pub fn read_revision(file_path: &Path) -> Result<Option<String>> {
    let file = File::open(file_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::MissingSource {
            path: file_path.to_path_buf(),
        },
        _ => CatalogError::Io(e),
    })?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => continue,
            Err(e) => return Err(CatalogError::Io(e)),
        };
        if let Some(revision) = revision_from_line(&line) {
            debug!("Found revision {} in {}", revision, file_path.display());
            return Ok(Some(revision));
        }
    }

    debug!("No revision marker in {}", file_path.display());
    Ok(None)
}
