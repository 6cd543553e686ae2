//! Core data structures for the satellite catalog.
//!
//! Defines the positional column schema, catalog rows with their derived
//! attributes, the decoded type code, and the classification enums shared
//! by the parser, the frame builder and the query helpers.

use crate::constants::{PLACEHOLDER, TYPE_CODE_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One header token: the column name and the character offset it starts at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub name: String,
    pub start: usize,
}

impl ColumnSpan {
    pub fn new(name: impl Into<String>, start: usize) -> Self {
        Self {
            name: name.into(),
            start,
        }
    }
}

/// Decoded 12-position classification code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCode {
    /// First character verbatim, `None` for an empty code
    pub coarse: Option<char>,
    /// Per-position characters with blanks and missing positions as `-`
    pub positions: [char; TYPE_CODE_LEN],
    /// Raw two-character prefix, no placeholder substitution
    pub prefix2: String,
}

impl TypeCode {
    /// Character at a 1-indexed position
    pub fn position(&self, position: usize) -> Option<char> {
        if position == 0 {
            return None;
        }
        self.positions.get(position - 1).copied()
    }

    /// Coarse type rendered as a string (empty when the code was empty)
    pub fn coarse_str(&self) -> String {
        self.coarse.map(String::from).unwrap_or_default()
    }

    /// Positions that carry a meaningful (non-placeholder) character
    pub fn meaningful_positions(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != PLACEHOLDER)
            .map(|(i, c)| (i + 1, *c))
    }
}

/// Precision classification of a vague launch date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateConfidence {
    Unknown,
    Uncertain,
    ScheduledUnconfirmed,
    ExactToSecond,
    ExactToMinute,
    ExactToDay,
    ExactToMonth,
    ExactToYear,
    Other,
}

impl DateConfidence {
    pub const ALL: [DateConfidence; 9] = [
        DateConfidence::Unknown,
        DateConfidence::Uncertain,
        DateConfidence::ScheduledUnconfirmed,
        DateConfidence::ExactToSecond,
        DateConfidence::ExactToMinute,
        DateConfidence::ExactToDay,
        DateConfidence::ExactToMonth,
        DateConfidence::ExactToYear,
        DateConfidence::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DateConfidence::Unknown => "Unknown",
            DateConfidence::Uncertain => "Uncertain",
            DateConfidence::ScheduledUnconfirmed => "Scheduled (not confirmed)",
            DateConfidence::ExactToSecond => "Exact to second",
            DateConfidence::ExactToMinute => "Exact to minute",
            DateConfidence::ExactToDay => "Exact to day",
            DateConfidence::ExactToMonth => "Exact to month",
            DateConfidence::ExactToYear => "Exact to year",
            DateConfidence::Other => "Other/Unknown",
        }
    }
}

impl fmt::Display for DateConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mass-based satellite size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeClass {
    Unknown,
    CubeSat,
    MicroSat,
    SmallSat,
    MediumSat,
    LargeSat,
}

impl SizeClass {
    pub fn label(&self) -> &'static str {
        match self {
            SizeClass::Unknown => "Unknown",
            SizeClass::CubeSat => "CubeSat",
            SizeClass::MicroSat => "MicroSat",
            SizeClass::SmallSat => "SmallSat",
            SizeClass::MediumSat => "MediumSat",
            SizeClass::LargeSat => "LargeSat",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values derived from the launch-date column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchInfo {
    pub year: Option<i32>,
    pub confidence: DateConfidence,
}

/// Derived attributes of a row.
///
/// Each member is `None` when its source column is missing from the schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub type_code: Option<TypeCode>,
    pub launch: Option<LaunchInfo>,
    /// Numeric coercions, one entry per numeric source column present
    pub numeric: Vec<(String, Option<f64>)>,
}

impl DerivedFields {
    pub fn numeric_value(&self, column: &str) -> Option<f64> {
        self.numeric
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| *value)
    }

    pub fn has_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|(name, _)| name == column)
    }
}

/// One cataloged object: raw fields aligned with the table's columns
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    columns: Arc<[String]>,
    values: Vec<String>,
    pub derived: DerivedFields,
}

impl CatalogRow {
    pub fn new(columns: Arc<[String]>, values: Vec<String>) -> Self {
        Self {
            columns,
            values,
            derived: DerivedFields::default(),
        }
    }

    /// Raw value by column name.
    ///
    /// With duplicate header names the later column wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .rposition(|column| column == name)
            .and_then(|index| self.values.get(index))
            .map(String::as_str)
    }

    /// Raw values in column order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Ordered `(name, value)` pairs, duplicates included
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn coarse_type(&self) -> Option<char> {
        self.derived.type_code.as_ref().and_then(|code| code.coarse)
    }

    pub fn launch_year(&self) -> Option<i32> {
        self.derived.launch.as_ref().and_then(|launch| launch.year)
    }

    pub fn date_confidence(&self) -> Option<DateConfidence> {
        self.derived.launch.as_ref().map(|launch| launch.confidence)
    }
}

/// Parsed catalog snapshot with its optional revision label
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTable {
    spans: Vec<ColumnSpan>,
    rows: Vec<CatalogRow>,
    revision: Option<String>,
}

impl CatalogTable {
    pub fn new(spans: Vec<ColumnSpan>, rows: Vec<CatalogRow>) -> Self {
        Self {
            spans,
            rows,
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: Option<String>) -> Self {
        self.revision = revision;
        self
    }

    pub fn spans(&self) -> &[ColumnSpan] {
        &self.spans
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Source column names in header order, duplicates included
    pub fn column_names(&self) -> Vec<&str> {
        self.spans.iter().map(|span| span.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.spans.iter().any(|span| span.name == name)
    }

    /// Header names that occur more than once
    pub fn duplicate_columns(&self) -> Vec<&str> {
        let mut duplicates = Vec::new();
        for (i, span) in self.spans.iter().enumerate() {
            let name = span.name.as_str();
            if self.spans[..i].iter().any(|earlier| earlier.name == name)
                && !duplicates.contains(&name)
            {
                duplicates.push(name);
            }
        }
        duplicates
    }
}
