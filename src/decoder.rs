//! Field decoding for catalog columns.
//!
//! Pure, stateless functions that turn raw catalog strings into derived
//! values: the packed 12-position type code, vague launch dates, numeric
//! fields and mass size classes. None of these ever fail on bad input;
//! unparseable values degrade to placeholders, `None` or `Other`.

use crate::constants::{
    COARSE_TYPE_LABELS, MONTH_ABBREVIATIONS, PLACEHOLDER, TYPE_CODE_LEN, TYPE_POSITION_NAMES,
    UNIX_EPOCH_JD, size_limits,
};
use crate::error::{CatalogError, Result};
use crate::models::{DateConfidence, SizeClass, TypeCode};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static EXACT_TO_SECOND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4} [A-Za-z]{3} \d{1,2} \d{4}:\d{2}").expect("valid regex")
});
static EXACT_TO_MINUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4} [A-Za-z]{3} \d{1,2} \d{4}").expect("valid regex"));
static EXACT_TO_DAY: LazyLock<Regex> = LazyLock::new(|| {
    let months = MONTH_ABBREVIATIONS.join("|");
    Regex::new(&format!(r"\d{{4}} (?:{}) \d{{1,2}}", months)).expect("valid regex")
});
static EXACT_TO_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4} [A-Za-z]{3}").expect("valid regex"));
// ASCII only: `\d` also matches other scripts' digits, which don't parse as i32
static FOUR_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").expect("valid regex"));
static JULIAN_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").expect("valid regex"));

/// Decode a packed classification code into its per-position facets
pub fn decode_type_code(code: &str) -> TypeCode {
    let mut chars = code.chars();
    let mut positions = [PLACEHOLDER; TYPE_CODE_LEN];
    for slot in positions.iter_mut() {
        match chars.next() {
            Some(c) if !c.is_whitespace() => *slot = c,
            Some(_) => {}
            None => break,
        }
    }

    TypeCode {
        coarse: code.chars().next(),
        positions,
        prefix2: code.chars().take(2).collect(),
    }
}

/// Classify how precisely a vague date is specified.
///
/// Rules are tried in priority order, the first match wins.
pub fn classify_date_confidence(raw: Option<&str>) -> DateConfidence {
    let Some(s) = raw else {
        return DateConfidence::Unknown;
    };

    if s.contains('?') {
        DateConfidence::Uncertain
    } else if s.contains('s') {
        DateConfidence::ScheduledUnconfirmed
    } else if EXACT_TO_SECOND.is_match(s) {
        DateConfidence::ExactToSecond
    } else if EXACT_TO_MINUTE.is_match(s) {
        DateConfidence::ExactToMinute
    } else if EXACT_TO_DAY.is_match(s) {
        DateConfidence::ExactToDay
    } else if EXACT_TO_MONTH.is_match(s) {
        DateConfidence::ExactToMonth
    } else if FOUR_DIGITS.is_match(s) {
        DateConfidence::ExactToYear
    } else {
        DateConfidence::Other
    }
}

/// First run of four digits, taken as the launch year without range checks
pub fn extract_launch_year(raw: Option<&str>) -> Option<i32> {
    let found = FOUR_DIGITS.find(raw?)?;
    found.as_str().parse().ok()
}

/// Best-effort numeric coercion; anything unparseable becomes `None`
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Size class of an object by mass in kilograms
pub fn size_class(mass: Option<f64>) -> SizeClass {
    match mass {
        None => SizeClass::Unknown,
        Some(m) if m.is_nan() => SizeClass::Unknown,
        Some(m) if m <= size_limits::CUBESAT_KG => SizeClass::CubeSat,
        Some(m) if m <= size_limits::MICROSAT_KG => SizeClass::MicroSat,
        Some(m) if m <= size_limits::SMALLSAT_KG => SizeClass::SmallSat,
        Some(m) if m <= size_limits::MEDIUMSAT_KG => SizeClass::MediumSat,
        Some(_) => SizeClass::LargeSat,
    }
}

/// Facet name for a 1-indexed type-code position
pub fn position_name(position: usize) -> Option<&'static str> {
    position
        .checked_sub(1)
        .and_then(|index| TYPE_POSITION_NAMES.get(index))
        .copied()
}

pub fn coarse_type_label(coarse: char) -> Option<&'static str> {
    COARSE_TYPE_LABELS
        .iter()
        .find(|(code, _)| *code == coarse)
        .map(|(_, label)| *label)
}

/// Result of the free-form date converter
#[derive(Debug, Clone, PartialEq)]
pub enum DateInterpretation {
    Julian { jd: f64, utc: DateTime<Utc> },
    Vague { input: String, confidence: DateConfidence },
}

/// Interpret user input as either a Julian Date or a vague catalog date
pub fn interpret_date_input(input: &str) -> Result<DateInterpretation> {
    let s = input.trim();
    if JULIAN_DATE.is_match(s) {
        let jd: f64 = s.parse().map_err(|e| CatalogError::Parse {
            reason: format!("Invalid Julian Date '{}': {}", s, e),
        })?;
        let utc = julian_to_utc(jd).ok_or_else(|| CatalogError::Parse {
            reason: format!("Julian Date {} is outside the representable range", jd),
        })?;
        return Ok(DateInterpretation::Julian { jd, utc });
    }

    Ok(DateInterpretation::Vague {
        input: s.to_string(),
        confidence: classify_date_confidence(Some(s)),
    })
}

/// Convert a Julian Date to a UTC timestamp, millisecond resolution
pub fn julian_to_utc(jd: f64) -> Option<DateTime<Utc>> {
    let millis = ((jd - UNIX_EPOCH_JD) * 86_400_000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}
