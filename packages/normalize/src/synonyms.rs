//! Candidate attribute names for each canonical field.
//!
//! Open data exports spell the same attribute many ways. Each table lists
//! the spellings to probe, in priority order; the first present and
//! parseable value wins.

/// Building identifier keys.
pub const BUILDING_ID: &[&str] = &[
    "objectid", "id", "OBJECTID", "bldg_id", "BLDG_ID", "mapid", "MAPID",
];

/// Explicit building height keys, in meters.
pub const BUILDING_HEIGHT: &[&str] = &[
    "height_m",
    "HEIGHT_M",
    "height",
    "building_height",
    "bldg_height_m",
];

/// Building level (storey) count keys.
pub const BUILDING_LEVELS: &[&str] = &[
    "levels",
    "LEVELS",
    "storeys",
    "stories",
    "num_storeys",
    "number_of_storeys",
];

/// Building address keys.
pub const BUILDING_ADDRESS: &[&str] = &["address", "ADDRESS", "civic_address"];

/// Zoning keys carried directly on building footprints.
pub const BUILDING_ZONING: &[&str] = &["zoning", "ZONING", "land_use", "LAND_USE"];

/// Building use class keys.
pub const BUILDING_USE: &[&str] = &["use", "USE", "building_use", "BUILDING_USE", "bldg_use"];

/// Zoning district label keys, matched case-insensitively.
pub const ZONING_LABEL: &[&str] = &[
    "land_use_district",
    "landuse_district",
    "landuse",
    "district",
    "zone",
    "zoning",
];

/// Well-known assessed value keys, probed before the pattern scan.
pub const ASSESSED_VALUE: &[&str] = &["assessed_value", "ASSESSED_VALUE"];

/// Parcel address keys.
pub const PARCEL_ADDRESS: &[&str] = &["address", "street_address", "situs_addr"];

/// Returns `true` if an attribute name looks like an assessed value
/// column (e.g. `re_assessed_value`, `total_assessed`).
#[must_use]
pub fn is_assessed_value_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.contains("assessed") && (lower.contains("value") || lower.contains("total"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_assessed_value_columns() {
        assert!(is_assessed_value_key("RE_ASSESSED_VALUE"));
        assert!(is_assessed_value_key("assessed_total"));
        assert!(!is_assessed_value_key("assessed_year"));
        assert!(!is_assessed_value_key("land_value"));
    }

    #[test]
    fn zoning_labels_are_lowercase() {
        for key in ZONING_LABEL {
            assert_eq!(*key, key.to_lowercase(), "{key} must be lowercase");
        }
    }
}
