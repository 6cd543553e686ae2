//! End-to-end tests for catalog ingestion, the snapshot store and the
//! consumer-facing frame, using a trimmed copy of the GCAT satcat page.

use satcat_explorer::config::CatalogConfig;
use satcat_explorer::error::CatalogError;
use satcat_explorer::query::{CatalogFilter, launches_per_year, value_counts};
use satcat_explorer::store::{CatalogStore, SourceFetcher};
use satcat_explorer::{DateConfidence, parse};
use tempfile::TempDir;

const SAMPLE: &str = include_str!("fixtures/satcat_sample.html");

/// Fetcher that always fails, standing in for an unreachable server
struct UnreachableFetcher;

impl SourceFetcher for UnreachableFetcher {
    async fn fetch(&self, url: &str) -> satcat_explorer::Result<Vec<u8>> {
        Err(CatalogError::network(url, "connection timed out"))
    }
}

#[test]
fn test_parse_sample_catalog() {
    let table = parse(SAMPLE).unwrap();

    assert_eq!(table.len(), 5);
    assert_eq!(table.column_names().len(), 10);
    assert_eq!(table.column_names()[0], "#JCAT");

    let sputnik = &table.rows()[2];
    assert_eq!(sputnik.get("Name"), Some("Sputnik-2"));
    assert_eq!(sputnik.get("Piece"), Some("1957 BET 1"));
    assert_eq!(sputnik.coarse_type(), Some('P'));
    assert_eq!(sputnik.launch_year(), Some(1957));
    assert_eq!(sputnik.date_confidence(), Some(DateConfidence::ExactToSecond));
    assert_eq!(sputnik.derived.numeric_value("Apogee"), Some(1659.0));
}

#[test]
fn test_sparse_and_uncertain_rows() {
    let table = parse(SAMPLE).unwrap();

    let starlink = &table.rows()[3];
    let code = starlink.derived.type_code.as_ref().unwrap();
    assert_eq!(code.prefix2, "P ");
    assert_eq!(code.position(2), Some('-'));
    assert_eq!(code.position(6), Some('C'));
    assert_eq!(starlink.date_confidence(), Some(DateConfidence::ExactToDay));

    let future = &table.rows()[4];
    assert_eq!(future.get("Satcat"), Some(""));
    assert_eq!(future.get("Inc"), Some(""));
    assert_eq!(future.derived.numeric_value("Mass"), None);
    assert_eq!(future.launch_year(), Some(2030));
    assert_eq!(future.date_confidence(), Some(DateConfidence::Uncertain));
}

#[test]
fn test_parse_is_idempotent() {
    assert_eq!(parse(SAMPLE).unwrap(), parse(SAMPLE).unwrap());
}

#[test]
fn test_single_block_document_is_malformed() {
    let doc = "<HTML><PRE>\n#JCAT   Type\n</PRE></HTML>";
    match parse(doc) {
        Err(CatalogError::MalformedSource { .. }) => {}
        other => panic!("Expected MalformedSource, got {:?}", other),
    }
}

#[test]
fn test_frame_queries_on_sample() {
    let df = parse(SAMPLE).unwrap().to_dataframe().unwrap();

    let payloads_since_2000 = CatalogFilter::new()
        .with_coarse_types(["P"])
        .with_year_range(Some(2000), None)
        .apply(&df)
        .unwrap();
    assert_eq!(payloads_since_2000.height(), 2);

    let per_year = launches_per_year(&df).unwrap().unwrap();
    assert_eq!(per_year.height(), 3);

    let coarse = value_counts(&df, "CoarseType").unwrap().unwrap();
    assert_eq!(coarse.height(), 2);
}

#[test]
fn test_store_load_reports_revision() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("satcat.html");
    std::fs::write(&path, SAMPLE).unwrap();

    let store = CatalogStore::new(CatalogConfig::default().with_data_file(&path)).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded.revision.as_deref(), Some("2024 Jun  8"));
    assert_eq!(loaded.table.unwrap().len(), 5);
}

#[tokio::test]
async fn test_refresh_with_network_failure_keeps_local_bytes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("satcat.html");
    std::fs::write(&path, SAMPLE).unwrap();
    let before = std::fs::read(&path).unwrap();

    let config = CatalogConfig::default().with_data_file(&path);
    let store = CatalogStore::with_fetcher(config, UnreachableFetcher);

    let outcome = store.refresh().await.unwrap();
    assert!(outcome.is_stale());
    assert_eq!(outcome.table(), &parse(SAMPLE).unwrap().with_revision(Some("2024 Jun  8".into())));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}
