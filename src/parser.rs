//! Fixed-width catalog parsing.
//!
//! The catalog document is HTML with the listing split across `<PRE>`
//! blocks: the first holds the column header line, a later one holds the
//! fixed-width data rows. Column boundaries are the character offsets at
//! which header tokens start, so each header label "covers" the data that
//! follows it up to the next label.

use crate::constants::{COMMENT_PREFIX, columns};
use crate::decoder::{
    classify_date_confidence, coerce_numeric, decode_type_code, extract_launch_year,
};
use crate::error::{CatalogError, Result};
use crate::models::{CatalogRow, CatalogTable, ColumnSpan, DerivedFields, LaunchInfo};
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use std::sync::LazyLock;
use tracing::{debug, warn};

static PRE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<PRE>(.*?)</PRE>").expect("valid regex"));
static RECORD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S\d+").expect("valid regex"));

/// Header and data text extracted from the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlocks<'a> {
    pub header: &'a str,
    pub data: &'a str,
}

/// Column boundaries derived from the header line.
///
/// `spans` are the columns in header order; `end` closes the last column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub spans: Vec<ColumnSpan>,
    pub end: usize,
}

impl ColumnLayout {
    /// `[start, end)` character range of the column at `index`
    pub fn bounds(&self, index: usize) -> Option<(usize, usize)> {
        let span = self.spans.get(index)?;
        let end = self
            .spans
            .get(index + 1)
            .map(|next| next.start)
            .unwrap_or(self.end);
        Some((span.start, end))
    }

    pub fn names(&self) -> Arc<[String]> {
        self.spans
            .iter()
            .map(|span| span.name.clone())
            .collect::<Vec<_>>()
            .into()
    }
}

/// Locate the header block and the first non-empty data block
pub fn locate_blocks(document: &str) -> Result<SourceBlocks<'_>> {
    let blocks: Vec<&str> = PRE_BLOCK
        .captures_iter(document)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    if blocks.len() < 2 {
        return Err(CatalogError::malformed(format!(
            "expected at least two <PRE> blocks, found {}",
            blocks.len()
        )));
    }

    let header = blocks[0].trim();
    let data = blocks[1..]
        .iter()
        .map(|block| block.trim())
        .find(|block| !block.is_empty())
        .ok_or_else(|| CatalogError::malformed("no data found in <PRE> blocks after header"))?;

    debug!(
        "Located {} <PRE> blocks: header {} chars, data {} bytes",
        blocks.len(),
        header.chars().count(),
        data.len()
    );

    Ok(SourceBlocks { header, data })
}

/// Derive column spans from the start offsets of header tokens
pub fn derive_column_spans(header: &str) -> ColumnLayout {
    let mut spans = Vec::new();
    let mut current: Option<(usize, String)> = None;
    let mut length = 0;

    for (offset, c) in header.chars().enumerate() {
        length = offset + 1;
        if c.is_whitespace() {
            if let Some((start, name)) = current.take() {
                spans.push(ColumnSpan::new(name, start));
            }
        } else {
            match current.as_mut() {
                Some((_, name)) => name.push(c),
                None => current = Some((offset, c.to_string())),
            }
        }
    }
    if let Some((start, name)) = current {
        spans.push(ColumnSpan::new(name, start));
    }

    ColumnLayout {
        spans,
        end: length + 1,
    }
}

/// Slice a fixed-width line into trimmed raw fields.
///
/// Columns starting past the end of the line come back empty.
pub fn slice_row(line: &str, layout: &ColumnLayout) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();

    (0..layout.spans.len())
        .filter_map(|index| layout.bounds(index))
        .map(|(start, end)| {
            if start >= chars.len() {
                return String::new();
            }
            let end = end.min(chars.len());
            let field: String = chars[start..end.max(start)].iter().collect();
            field.trim().to_string()
        })
        .collect()
}

/// Keep only record lines (`S<digits>` identifiers)
pub fn filter_data_lines(data: &str) -> Vec<&str> {
    data.split('\n')
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with(COMMENT_PREFIX)
                && RECORD_ID.is_match(trimmed)
        })
        .collect()
}

/// Which derivations the schema supports
#[derive(Debug, Clone)]
struct DerivationPlan {
    has_type: bool,
    has_launch_date: bool,
    numeric: Vec<&'static str>,
}

impl DerivationPlan {
    fn for_layout(layout: &ColumnLayout) -> Self {
        let has = |name: &str| layout.spans.iter().any(|span| span.name == name);
        Self {
            has_type: has(columns::TYPE),
            has_launch_date: has(columns::LAUNCH_DATE),
            numeric: columns::NUMERIC
                .iter()
                .copied()
                .filter(|name| has(*name))
                .collect(),
        }
    }

    fn derive(&self, row: &CatalogRow) -> DerivedFields {
        let type_code = if self.has_type {
            Some(decode_type_code(row.get(columns::TYPE).unwrap_or_default()))
        } else {
            None
        };

        let launch = if self.has_launch_date {
            let raw = row.get(columns::LAUNCH_DATE);
            Some(LaunchInfo {
                year: extract_launch_year(raw),
                confidence: classify_date_confidence(raw),
            })
        } else {
            None
        };

        let numeric = self
            .numeric
            .iter()
            .map(|name| {
                let value = row.get(*name).and_then(coerce_numeric);
                (name.to_string(), value)
            })
            .collect();

        DerivedFields {
            type_code,
            launch,
            numeric,
        }
    }
}

/// Parse a catalog document into a table.
///
/// The revision label is not read here; see [`crate::header`].
pub fn parse(document: &str) -> Result<CatalogTable> {
    let blocks = locate_blocks(document)?;
    let layout = derive_column_spans(blocks.header);

    if layout.spans.is_empty() {
        return Err(CatalogError::malformed("header block contains no column names"));
    }

    let names = layout.names();
    let plan = DerivationPlan::for_layout(&layout);
    debug!(
        "Derivations: type={}, launch_date={}, numeric={:?}",
        plan.has_type, plan.has_launch_date, plan.numeric
    );

    let lines = filter_data_lines(blocks.data);
    let rows: Vec<CatalogRow> = lines
        .iter()
        .map(|line| {
            let mut row = CatalogRow::new(names.clone(), slice_row(line, &layout));
            row.derived = plan.derive(&row);
            row
        })
        .collect();

    debug!(
        "Parsed {} rows across {} columns",
        rows.len(),
        layout.spans.len()
    );

    let table = CatalogTable::new(layout.spans, rows);
    for duplicate in table.duplicate_columns() {
        warn!(
            "Duplicate column '{}' in header; later values take precedence",
            duplicate
        );
    }

    Ok(table)
}

/// Read and parse a catalog file
pub fn parse_file(file_path: &Path) -> Result<CatalogTable> {
    let document = std::fs::read_to_string(file_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::MissingSource {
            path: file_path.to_path_buf(),
        },
        std::io::ErrorKind::InvalidData => CatalogError::Parse {
            reason: format!("{} is not valid UTF-8", file_path.display()),
        },
        _ => CatalogError::Io(e),
    })?;

    parse(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateConfidence;

    const HEADER: &str = "#JCAT    Satcat    Piece         Type         Name                      LDate                 Mass   Perigee  Apogee  Inc";

    fn document(rows: &[&str]) -> String {
        format!(
            "<HTML>\n<PRE>\n{}\n</PRE>\n<PRE>\n# Updated 2024 Jun 8\n{}\n</PRE>\n</HTML>\n",
            HEADER,
            rows.join("\n")
        )
    }

    #[test]
    fn test_locate_blocks() {
        let doc = "<PRE>A B</PRE><PRE>   </PRE><PRE>\nS1 x\n</PRE>";
        let blocks = locate_blocks(doc).unwrap();
        assert_eq!(blocks.header, "A B");
        assert_eq!(blocks.data, "S1 x");
    }

    #[test]
    fn test_locate_blocks_single_block() {
        let result = locate_blocks("<PRE>A B</PRE>");
        assert!(matches!(result, Err(CatalogError::MalformedSource { .. })));
    }

    #[test]
    fn test_locate_blocks_only_empty_followers() {
        let result = locate_blocks("<PRE>A B</PRE><PRE>\n\n</PRE><PRE> </PRE>");
        assert!(matches!(result, Err(CatalogError::MalformedSource { .. })));
    }

    #[test]
    fn test_derive_column_spans() {
        let layout = derive_column_spans("A   B      C");
        assert_eq!(
            layout.spans,
            vec![
                ColumnSpan::new("A", 0),
                ColumnSpan::new("B", 4),
                ColumnSpan::new("C", 11),
            ]
        );
        assert_eq!(layout.end, 13);
        assert_eq!(layout.bounds(2), Some((11, 13)));
        assert_eq!(layout.bounds(3), None);
    }

    #[test]
    fn test_slice_row_uses_start_offsets() {
        let layout = derive_column_spans("A   B      C");
        let fields = slice_row("a1  b2345   c", &layout);
        assert_eq!(fields, vec!["a1", "b2345", "c"]);
    }

    #[test]
    fn test_slice_row_short_line() {
        let layout = derive_column_spans("A   B      C");
        assert_eq!(slice_row("a1  b2", &layout), vec!["a1", "b2", ""]);
        assert_eq!(slice_row("", &layout), vec!["", "", ""]);
    }

    #[test]
    fn test_slice_row_long_line_truncated_at_sentinel() {
        let layout = derive_column_spans("A B");
        assert_eq!(slice_row("1 2345", &layout), vec!["1", "23"]);
    }

    #[test]
    fn test_filter_data_lines() {
        let data = "# comment\n\n   \nheader repeated\nS12345 ...\nS\nX123\n  S99 padded";
        assert_eq!(filter_data_lines(data), vec!["S12345 ...", "  S99 padded"]);
    }

    #[test]
    fn test_parse_derives_columns() {
        let row = format!(
            "{:<9}{:<10}{:<14}{:<13}{:<26}{:<22}{:<7}{:<9}{:<8}{}",
            "S00001", "1", "1957 ALP 1", "R2", "8K71 stage", "1957 Oct 4 1928:34", "7790", "214",
            "938", "65.10"
        );
        let table = parse(&document(&[&row])).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.revision(), None);
        let row = &table.rows()[0];
        assert_eq!(row.get("#JCAT"), Some("S00001"));
        assert_eq!(row.get("Type"), Some("R2"));
        assert_eq!(row.get("Name"), Some("8K71 stage"));
        assert_eq!(row.coarse_type(), Some('R'));
        assert_eq!(row.launch_year(), Some(1957));

        let code = row.derived.type_code.as_ref().unwrap();
        assert_eq!(code.prefix2, "R2");
        assert_eq!(code.position(3), Some('-'));

        assert_eq!(row.derived.numeric_value("Mass"), Some(7790.0));
        assert_eq!(row.derived.numeric_value("Inc"), Some(65.10));
        assert_eq!(row.date_confidence(), Some(DateConfidence::ExactToSecond));
    }

    #[test]
    fn test_parse_without_type_or_date_columns() {
        let doc = "<PRE>#JCAT   Name</PRE><PRE>S1      Foo\n</PRE>";
        let table = parse(doc).unwrap();
        let row = &table.rows()[0];
        assert!(row.derived.type_code.is_none());
        assert!(row.derived.launch.is_none());
        assert!(row.derived.numeric.is_empty());
        assert_eq!(row.get("Name"), Some("Foo"));
    }

    #[test]
    fn test_parse_malformed_numeric_is_absent() {
        let doc = "<PRE>#JCAT   Mass</PRE><PRE>S1      12?\nS2      -\nS3      40\n</PRE>";
        let table = parse(doc).unwrap();
        let masses: Vec<_> = table
            .rows()
            .iter()
            .map(|row| row.derived.numeric_value("Mass"))
            .collect();
        assert_eq!(masses, vec![None, None, Some(40.0)]);
        assert!(table.rows()[0].derived.has_numeric("Mass"));
    }

    #[test]
    fn test_parse_duplicate_header_names() {
        let doc = "<PRE>#JCAT  X   X</PRE><PRE>S1     a   b\n</PRE>";
        let table = parse(doc).unwrap();
        assert_eq!(table.column_names(), vec!["#JCAT", "X", "X"]);
        assert_eq!(table.rows()[0].get("X"), Some("b"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let doc = document(&[
            "S00002   2         1957 BET 1    PH           Sputnik 2",
            "# mid-block comment",
            "S00003   3",
        ]);
        assert_eq!(parse(&doc).unwrap(), parse(&doc).unwrap());
    }

    #[test]
    fn test_parse_single_block_fails() {
        let result = parse("<HTML><PRE>A B C</PRE></HTML>");
        assert!(matches!(result, Err(CatalogError::MalformedSource { .. })));
    }

    #[test]
    fn test_parse_empty_header_fails() {
        let result = parse("<PRE>   </PRE><PRE>S1 x</PRE>");
        assert!(matches!(result, Err(CatalogError::MalformedSource { .. })));
    }
}
