//! Columnar view of a parsed catalog.
//!
//! Converts a [`CatalogTable`] into a Polars `DataFrame` for downstream
//! consumers. Raw columns stay strings except the designated numeric
//! fields, which become nullable `Float64`. Derived columns are appended
//! only when their source column exists.

use crate::constants::{TYPE_CODE_LEN, columns};
use crate::error::Result;
use crate::models::CatalogTable;
use polars::prelude::*;
use tracing::{debug, warn};

/// Polars type of a column in the catalog frame
pub fn column_dtype(column_name: &str) -> DataType {
    match column_name {
        name if columns::NUMERIC.contains(&name) => DataType::Float64,
        columns::LAUNCH_YEAR => DataType::Int32,
        _ => DataType::String,
    }
}

/// Names of the derived columns this table will get
fn derived_column_names(table: &CatalogTable) -> Vec<String> {
    let mut names = Vec::new();
    if table.has_column(columns::TYPE) {
        names.push(columns::COARSE_TYPE.to_string());
        names.extend((1..=TYPE_CODE_LEN).map(columns::sat_type));
        names.push(columns::SAT_TYPE_1_2.to_string());
    }
    if table.has_column(columns::LAUNCH_DATE) {
        names.push(columns::LAUNCH_YEAR.to_string());
        names.push(columns::DATE_CONFIDENCE.to_string());
    }
    names
}

/// Unique raw column names in first-occurrence order.
///
/// A raw column named like a derived one is dropped in favour of the
/// derived column.
fn raw_column_names<'a>(table: &'a CatalogTable, derived: &[String]) -> Vec<&'a str> {
    let mut names: Vec<&str> = Vec::new();
    for name in table.column_names() {
        if names.contains(&name) {
            continue;
        }
        if derived.iter().any(|d| d == name) {
            warn!(
                "Source column '{}' clashes with a derived column and is dropped from the frame",
                name
            );
            continue;
        }
        names.push(name);
    }
    names
}

impl CatalogTable {
    /// Build the consumer-facing frame: raw columns then derived columns.
    ///
    /// Duplicate header names collapse into one column holding the values
    /// of the last duplicate.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = self.rows();
        let mut frame_columns: Vec<Column> = Vec::new();

        let derived = derived_column_names(self);
        for name in raw_column_names(self, &derived) {
            let column = match column_dtype(name) {
                DataType::Float64 => {
                    let values: Vec<Option<f64>> = rows
                        .iter()
                        .map(|row| row.derived.numeric_value(name))
                        .collect();
                    Column::new(name.into(), values)
                }
                _ => {
                    let values: Vec<&str> = rows
                        .iter()
                        .map(|row| row.get(name).unwrap_or_default())
                        .collect();
                    Column::new(name.into(), values)
                }
            };
            frame_columns.push(column);
        }

        if self.has_column(columns::TYPE) {
            frame_columns.extend(type_code_columns(self));
        }

        if self.has_column(columns::LAUNCH_DATE) {
            let years: Vec<Option<i32>> = rows.iter().map(|row| row.launch_year()).collect();
            let confidence: Vec<Option<&str>> = rows
                .iter()
                .map(|row| row.date_confidence().map(|c| c.label()))
                .collect();
            frame_columns.push(Column::new(columns::LAUNCH_YEAR.into(), years));
            frame_columns.push(Column::new(columns::DATE_CONFIDENCE.into(), confidence));
        }

        let frame = DataFrame::new(frame_columns)?;
        debug!(
            "Built catalog frame: {} rows x {} columns",
            frame.height(),
            frame.width()
        );
        Ok(frame)
    }
}

/// `CoarseType`, `SatType_1..12` and `SatType_1_2`
fn type_code_columns(table: &CatalogTable) -> Vec<Column> {
    let codes: Vec<_> = table
        .rows()
        .iter()
        .map(|row| row.derived.type_code.as_ref())
        .collect();

    let mut result = Vec::with_capacity(TYPE_CODE_LEN + 2);

    let coarse: Vec<Option<String>> = codes
        .iter()
        .map(|code| code.map(|c| c.coarse_str()))
        .collect();
    result.push(Column::new(columns::COARSE_TYPE.into(), coarse));

    for position in 1..=TYPE_CODE_LEN {
        let values: Vec<Option<String>> = codes
            .iter()
            .map(|code| {
                code.and_then(|c| c.position(position))
                    .map(String::from)
            })
            .collect();
        result.push(Column::new(columns::sat_type(position).into(), values));
    }

    let prefix: Vec<Option<&str>> = codes
        .iter()
        .map(|code| code.map(|c| c.prefix2.as_str()))
        .collect();
    result.push(Column::new(columns::SAT_TYPE_1_2.into(), prefix));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn sample_table() -> CatalogTable {
        let doc = "<PRE>\n#JCAT   Type         LDate         Mass   Inc\n</PRE>\n<PRE>\n\
                   S1      PHAT         2016 Jun 8    1200   51.6\n\
                   S2      R2           1999 Dec      -      98.0\n\
                   S3      D\n</PRE>";
        parse(doc).unwrap()
    }

    #[test]
    fn test_column_dtype() {
        assert_eq!(column_dtype("Mass"), DataType::Float64);
        assert_eq!(column_dtype("LaunchYear"), DataType::Int32);
        assert_eq!(column_dtype("Name"), DataType::String);
    }

    #[test]
    fn test_frame_has_raw_and_derived_columns() {
        let df = sample_table().to_dataframe().unwrap();
        assert_eq!(df.height(), 3);

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        for expected in [
            "#JCAT",
            "Type",
            "LDate",
            "Mass",
            "Inc",
            "CoarseType",
            "SatType_1",
            "SatType_12",
            "SatType_1_2",
            "LaunchYear",
            "DateConfidence",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }

        assert_eq!(df.column("Mass").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Mass").unwrap().null_count(), 2);
        assert_eq!(df.column("LaunchYear").unwrap().null_count(), 1);
    }

    #[test]
    fn test_frame_type_code_values() {
        let df = sample_table().to_dataframe().unwrap();
        let sat2 = df.column("SatType_2").unwrap().str().unwrap().clone();
        assert_eq!(sat2.get(0), Some("H"));
        assert_eq!(sat2.get(1), Some("2"));
        assert_eq!(sat2.get(2), Some("-"));

        let prefix = df.column("SatType_1_2").unwrap().str().unwrap().clone();
        assert_eq!(prefix.get(2), Some("D"));
    }

    #[test]
    fn test_frame_omits_underivable_columns() {
        let table = parse("<PRE>#JCAT   Name</PRE><PRE>S1      Foo</PRE>").unwrap();
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.width(), 2);
        assert!(df.column("CoarseType").is_err());
        assert!(df.column("LaunchYear").is_err());
    }

    #[test]
    fn test_frame_prefers_derived_over_clashing_source_column() {
        let table = parse(
            "<PRE>#JCAT   Type   CoarseType   LDate        LaunchYear</PRE>\
             <PRE>S1      PH     raw          2016 Jun 8   raw</PRE>",
        )
        .unwrap();
        let df = table.to_dataframe().unwrap();

        assert_eq!(df.width(), 3 + 14 + 2);
        let coarse = df.column("CoarseType").unwrap().str().unwrap().clone();
        assert_eq!(coarse.get(0), Some("P"));
        let years = df.column("LaunchYear").unwrap().i32().unwrap().clone();
        assert_eq!(years.get(0), Some(2016));
    }

    #[test]
    fn test_frame_collapses_duplicate_columns() {
        let table = parse("<PRE>#JCAT  X   X</PRE><PRE>S1     a   b</PRE>").unwrap();
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.width(), 2);
        let x = df.column("X").unwrap().str().unwrap().clone();
        assert_eq!(x.get(0), Some("b"));
    }
}
