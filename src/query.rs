//! Filtering and aggregation over the catalog frame.
//!
//! Every helper checks that the columns it needs exist and degrades to
//! `None` (or skips the condition) when they don't, so callers can render
//! "no data available" instead of failing.

use crate::constants::{TYPE_CODE_LEN, columns};
use crate::decoder::size_class;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Name of the count column produced by the aggregations
pub const COUNT_COLUMN: &str = "Count";

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// `col == v1 OR col == v2 ...`
fn any_of(column: &str, values: &[String]) -> Option<Expr> {
    values
        .iter()
        .map(|value| col(column).eq(lit(value.clone())))
        .reduce(|acc, expr| acc.or(expr))
}

/// Row filter over coarse type, launch year and individual SatType bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub coarse_types: Vec<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    /// `(position, accepted values)` for `SatType_<position>`
    pub byte_values: Vec<(usize, Vec<String>)>,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coarse_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.coarse_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_year_range(mut self, from: Option<i32>, to: Option<i32>) -> Self {
        self.year_from = from;
        self.year_to = to;
        self
    }

    pub fn with_byte(mut self, position: usize, values: Vec<String>) -> Self {
        self.byte_values.push((position, values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.coarse_types.is_empty()
            && self.year_from.is_none()
            && self.year_to.is_none()
            && self.byte_values.iter().all(|(_, values)| values.is_empty())
    }

    /// Conditions this filter contributes for the given frame
    fn predicates(&self, df: &DataFrame) -> Vec<Expr> {
        let mut predicates = Vec::new();

        if !self.coarse_types.is_empty() {
            if has_column(df, columns::COARSE_TYPE) {
                predicates.extend(any_of(columns::COARSE_TYPE, &self.coarse_types));
            } else {
                warn!("No {} column; coarse type filter ignored", columns::COARSE_TYPE);
            }
        }

        if self.year_from.is_some() || self.year_to.is_some() {
            if has_column(df, columns::LAUNCH_YEAR) {
                if let Some(from) = self.year_from {
                    predicates.push(col(columns::LAUNCH_YEAR).gt_eq(lit(from)));
                }
                if let Some(to) = self.year_to {
                    predicates.push(col(columns::LAUNCH_YEAR).lt_eq(lit(to)));
                }
            } else {
                warn!("No {} column; year filter ignored", columns::LAUNCH_YEAR);
            }
        }

        for (position, values) in &self.byte_values {
            if !(1..=TYPE_CODE_LEN).contains(position) || values.is_empty() {
                continue;
            }
            let column = columns::sat_type(*position);
            if has_column(df, &column) {
                predicates.extend(any_of(&column, values));
            } else {
                warn!("No {} column; byte filter ignored", column);
            }
        }

        predicates
    }

    /// Apply the filter, returning a new frame
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let predicates = self.predicates(df);
        if predicates.is_empty() {
            return Ok(df.clone());
        }

        let mut frame = df.clone().lazy();
        for predicate in predicates {
            frame = frame.filter(predicate);
        }
        let filtered = frame.collect()?;
        debug!("Filter kept {} of {} rows", filtered.height(), df.height());
        Ok(filtered)
    }
}

/// Occurrences of each value in `column`, most frequent first
pub fn value_counts(df: &DataFrame, column: &str) -> Result<Option<DataFrame>> {
    if !has_column(df, column) {
        return Ok(None);
    }

    let counts = df
        .clone()
        .lazy()
        .group_by([col(column)])
        .agg([len().alias(COUNT_COLUMN)])
        .sort_by_exprs(
            [col(COUNT_COLUMN), col(column)],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    Ok(Some(counts))
}

/// Number of objects launched per year, ascending by year
pub fn launches_per_year(df: &DataFrame) -> Result<Option<DataFrame>> {
    if !has_column(df, columns::LAUNCH_YEAR) {
        return Ok(None);
    }

    let counts = df
        .clone()
        .lazy()
        .filter(col(columns::LAUNCH_YEAR).is_not_null())
        .group_by([col(columns::LAUNCH_YEAR)])
        .agg([len().alias(COUNT_COLUMN)])
        .sort([columns::LAUNCH_YEAR], SortMultipleOptions::default())
        .collect()?;

    if counts.height() == 0 {
        return Ok(None);
    }
    Ok(Some(counts))
}

/// Attach a `SizeClass` column derived from `Mass`
pub fn with_size_class(df: &DataFrame) -> Result<Option<DataFrame>> {
    if !has_column(df, columns::MASS) {
        return Ok(None);
    }

    let classes: Vec<&str> = df
        .column(columns::MASS)?
        .f64()?
        .into_iter()
        .map(|mass| size_class(mass).label())
        .collect();

    let mut result = df.clone();
    result.with_column(Column::new(columns::SIZE_CLASS.into(), classes))?;
    Ok(Some(result))
}

/// Launch counts per year and size class
pub fn size_class_by_year(df: &DataFrame) -> Result<Option<DataFrame>> {
    if !has_column(df, columns::LAUNCH_YEAR) {
        return Ok(None);
    }
    let Some(sized) = with_size_class(df)? else {
        return Ok(None);
    };

    let counts = sized
        .lazy()
        .filter(col(columns::LAUNCH_YEAR).is_not_null())
        .group_by([col(columns::LAUNCH_YEAR), col(columns::SIZE_CLASS)])
        .agg([len().alias(COUNT_COLUMN)])
        .sort_by_exprs(
            [col(columns::LAUNCH_YEAR), col(columns::SIZE_CLASS)],
            SortMultipleOptions::default(),
        )
        .collect()?;

    Ok(Some(counts))
}

/// Earliest and latest launch year present
pub fn year_bounds(df: &DataFrame) -> Result<Option<(i32, i32)>> {
    if !has_column(df, columns::LAUNCH_YEAR) {
        return Ok(None);
    }
    let years = df.column(columns::LAUNCH_YEAR)?.i32()?;
    Ok(years.min().zip(years.max()))
}

/// Basic statistics for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Summaries for the numeric columns that are present
pub fn numeric_summary(df: &DataFrame) -> Result<Vec<NumericSummary>> {
    let mut summaries = Vec::new();
    for name in columns::NUMERIC {
        if !has_column(df, name) {
            continue;
        }
        let values = df.column(name)?.f64()?;
        let missing = values.null_count();
        summaries.push(NumericSummary {
            column: name.to_string(),
            count: values.len() - missing,
            missing,
            min: values.min(),
            max: values.max(),
            mean: values.mean(),
        });
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn sample_frame() -> DataFrame {
        let doc = "<PRE>\n#JCAT   Type         LDate         Mass   Inc\n</PRE>\n<PRE>\n\
                   S1      PHAT         2016 Jun 8    1200   51.6\n\
                   S2      R2           1999 Dec      -      98.0\n\
                   S3      PX           2016 Jan 3    4      97.4\n\
                   S4      D\n</PRE>";
        parse(doc).unwrap().to_dataframe().unwrap()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let df = sample_frame();
        let filter = CatalogFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&df).unwrap().height(), 4);
    }

    #[test]
    fn test_filter_by_coarse_type_and_year() {
        let df = sample_frame();
        let filter = CatalogFilter::new()
            .with_coarse_types(["P"])
            .with_year_range(Some(2010), Some(2020));
        assert_eq!(filter.apply(&df).unwrap().height(), 2);

        let filter = CatalogFilter::new().with_year_range(None, Some(2000));
        assert_eq!(filter.apply(&df).unwrap().height(), 1);
    }

    #[test]
    fn test_filter_by_byte() {
        let df = sample_frame();
        let filter = CatalogFilter::new().with_byte(2, vec!["H".into(), "X".into()]);
        assert_eq!(filter.apply(&df).unwrap().height(), 2);

        let filter = CatalogFilter::new().with_byte(2, vec!["-".into()]);
        assert_eq!(filter.apply(&df).unwrap().height(), 1);
    }

    #[test]
    fn test_filter_on_missing_column_is_ignored() {
        let df = parse("<PRE>#JCAT   Name</PRE><PRE>S1      Foo</PRE>")
            .unwrap()
            .to_dataframe()
            .unwrap();
        let filter = CatalogFilter::new().with_coarse_types(["P"]);
        assert_eq!(filter.apply(&df).unwrap().height(), 1);
    }

    #[test]
    fn test_value_counts() {
        let df = sample_frame();
        let counts = value_counts(&df, "CoarseType").unwrap().unwrap();
        let values = counts.column("CoarseType").unwrap().str().unwrap().clone();
        assert_eq!(values.get(0), Some("P"));
        assert_eq!(counts.height(), 3);
        assert!(value_counts(&df, "Missing").unwrap().is_none());
    }

    #[test]
    fn test_launches_per_year() {
        let df = sample_frame();
        let per_year = launches_per_year(&df).unwrap().unwrap();
        assert_eq!(per_year.height(), 2);
        let years = per_year.column("LaunchYear").unwrap().i32().unwrap().clone();
        assert_eq!(years.get(0), Some(1999));
    }

    #[test]
    fn test_size_class_by_year() {
        let df = sample_frame();
        let sized = with_size_class(&df).unwrap().unwrap();
        let classes = sized.column("SizeClass").unwrap().str().unwrap().clone();
        assert_eq!(classes.get(0), Some("LargeSat"));
        assert_eq!(classes.get(1), Some("Unknown"));
        assert_eq!(classes.get(2), Some("CubeSat"));

        let by_year = size_class_by_year(&df).unwrap().unwrap();
        assert_eq!(by_year.height(), 3);
    }

    #[test]
    fn test_year_bounds_and_numeric_summary() {
        let df = sample_frame();
        assert_eq!(year_bounds(&df).unwrap(), Some((1999, 2016)));

        let summary = numeric_summary(&df).unwrap();
        assert_eq!(summary.len(), 2);
        let mass = &summary[0];
        assert_eq!(mass.column, "Mass");
        assert_eq!(mass.count, 2);
        assert_eq!(mass.missing, 2);
        assert_eq!(mass.max, Some(1200.0));
    }
}
