//! Application constants for the SATCAT explorer
//!
//! Source locations, column names used for derivation, and the glossary
//! of type-code positions.

// =============================================================================
// Source Locations
// =============================================================================

/// Local snapshot of the catalog, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = "satcat.html";

/// Remote GCAT satcat listing
pub const SATCAT_URL: &str = "https://planet4589.org/space/gcat/data/cats/satcat";

/// Timeout for the single fetch attempt
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub const APP_TITLE: &str = "SatExplorer: Global Satellite & Space Object Dashboard";

// =============================================================================
// Document Structure
// =============================================================================

/// Comment prefix of the line carrying the revision label
pub const REVISION_MARKER: &str = "# Updated";

/// Comment prefix inside the data block
pub const COMMENT_PREFIX: char = '#';

// =============================================================================
// Column Names
// =============================================================================

/// Source columns the derived columns are computed from
pub mod columns {
    pub const TYPE: &str = "Type";
    pub const LAUNCH_DATE: &str = "LDate";
    pub const MASS: &str = "Mass";
    pub const PERIGEE: &str = "Perigee";
    pub const APOGEE: &str = "Apogee";
    pub const INCLINATION: &str = "Inc";

    /// Columns coerced to numeric-or-absent
    pub const NUMERIC: &[&str] = &[MASS, PERIGEE, APOGEE, INCLINATION];

    pub const COARSE_TYPE: &str = "CoarseType";
    pub const SAT_TYPE_PREFIX: &str = "SatType_";
    pub const SAT_TYPE_1_2: &str = "SatType_1_2";
    pub const LAUNCH_YEAR: &str = "LaunchYear";
    pub const DATE_CONFIDENCE: &str = "DateConfidence";
    pub const SIZE_CLASS: &str = "SizeClass";

    /// Name of the per-position column, 1-indexed
    pub fn sat_type(position: usize) -> String {
        format!("{}{}", SAT_TYPE_PREFIX, position)
    }
}

// =============================================================================
// Type Code
// =============================================================================

/// Number of positions in a packed classification code
pub const TYPE_CODE_LEN: usize = 12;

/// Stand-in for blank or missing code positions
pub const PLACEHOLDER: char = '-';

/// Facet encoded by each type-code position
pub const TYPE_POSITION_NAMES: [&str; TYPE_CODE_LEN] = [
    "Coarse Type",
    "Type Modifier",
    "Attach Flag",
    "Subtype",
    "Orbit Flag",
    "Human Spaceflight",
    "UN Registration",
    "Failure/Constellation",
    "ID Flag",
    "Annotation",
    "Group Control",
    "Unused",
];

/// Coarse categories (type-code position 1)
pub const COARSE_TYPE_LABELS: &[(char, &str)] = &[
    ('P', "Payload"),
    ('C', "Component"),
    ('R', "Rocket stage"),
    ('D', "Fragmentation debris"),
    ('S', "Suborbital payload"),
    ('X', "Deleted entry"),
    ('Z', "Spurious entry"),
];

// =============================================================================
// Size Classes (kg upper bounds, inclusive)
// =============================================================================

pub mod size_limits {
    pub const CUBESAT_KG: f64 = 16.0;
    pub const MICROSAT_KG: f64 = 100.0;
    pub const SMALLSAT_KG: f64 = 500.0;
    pub const MEDIUMSAT_KG: f64 = 1000.0;
}

// =============================================================================
// Dates
// =============================================================================

/// Julian Date of the Unix epoch
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Standard three-letter month abbreviations
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
