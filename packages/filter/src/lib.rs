#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Evaluates [`FilterSpec`] lists against enriched buildings.
//!
//! A building matches when it satisfies every filter. Filters that cannot
//! be evaluated for a building (missing field, uncoercible value,
//! unsupported operator) simply do not match; evaluation never errors.

use city3d_filter_models::{FilterAttribute, FilterOperator, FilterSpec, FilterValue};
use city3d_scene_models::Building;

/// Absolute tolerance for numeric equality.
pub const NUMERIC_TOLERANCE: f64 = 1e-6;

/// Returns the buildings that satisfy all `filters`, in input order.
///
/// An empty filter list matches every building.
#[must_use]
pub fn apply<'a>(buildings: &'a [Building], filters: &[FilterSpec]) -> Vec<&'a Building> {
    let matched: Vec<&Building> = buildings
        .iter()
        .filter(|building| matches_all(building, filters))
        .collect();

    log::debug!(
        "{} of {} buildings matched {} filters",
        matched.len(),
        buildings.len(),
        filters.len()
    );

    matched
}

/// Returns `true` if `building` satisfies every filter.
#[must_use]
pub fn matches_all(building: &Building, filters: &[FilterSpec]) -> bool {
    filters.iter().all(|spec| matches(building, spec))
}

/// Returns `true` if `building` satisfies a single filter.
#[must_use]
pub fn matches(building: &Building, spec: &FilterSpec) -> bool {
    if spec.attribute.is_numeric() {
        matches_numeric(numeric_field(building, spec.attribute), spec)
    } else {
        matches_text(&text_field(building, spec.attribute), spec)
    }
}

fn matches_numeric(field: Option<f64>, spec: &FilterSpec) -> bool {
    let (Some(field), Some(value)) = (field, spec.value.as_f64()) else {
        return false;
    };

    match spec.operator {
        FilterOperator::Gt => field > value,
        FilterOperator::Lt => field < value,
        FilterOperator::Gte => field >= value,
        FilterOperator::Lte => field <= value,
        FilterOperator::Eq => (field - value).abs() < NUMERIC_TOLERANCE,
        FilterOperator::Contains | FilterOperator::In => false,
    }
}

fn matches_text(field: &str, spec: &FilterSpec) -> bool {
    match spec.operator {
        FilterOperator::Eq => spec
            .value
            .as_text()
            .is_some_and(|value| field == value.to_lowercase()),
        FilterOperator::Contains => spec
            .value
            .as_text()
            .is_some_and(|value| field.contains(&value.to_lowercase())),
        FilterOperator::In => spec.value.as_list().is_some_and(|items| {
            items
                .iter()
                .filter_map(FilterValue::as_text)
                .any(|item| field == item.to_lowercase())
        }),
        FilterOperator::Gt | FilterOperator::Lt | FilterOperator::Gte | FilterOperator::Lte => {
            false
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn numeric_field(building: &Building, attribute: FilterAttribute) -> Option<f64> {
    match attribute {
        FilterAttribute::HeightM => Some(building.height_m),
        FilterAttribute::Levels => Some(building.levels as f64),
        FilterAttribute::AssessedValue => building.assessed_value,
        FilterAttribute::Zoning | FilterAttribute::Use | FilterAttribute::Address => None,
    }
}

/// Lowercased text of a categorical field; absent fields compare as `""`.
fn text_field(building: &Building, attribute: FilterAttribute) -> String {
    let text = match attribute {
        FilterAttribute::Zoning => Some(building.zoning.as_str()),
        FilterAttribute::Use => building.building_use.as_deref(),
        FilterAttribute::Address => building.address.as_deref(),
        FilterAttribute::HeightM | FilterAttribute::Levels | FilterAttribute::AssessedValue => {
            None
        }
    };
    text.unwrap_or_default().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_possible_truncation)]
    fn building(id: &str, height_m: f64, zoning: &str, assessed_value: Option<f64>) -> Building {
        Building {
            id: Some(id.to_string()),
            geometry: None,
            height_m,
            levels: (height_m / 3.0).round() as i64,
            address: Some(format!("{id} Mock St")),
            zoning: zoning.to_string(),
            assessed_value,
            building_use: None,
            raw: serde_json::Map::new(),
        }
    }

    fn ids(matched: &[&Building]) -> Vec<String> {
        matched.iter().filter_map(|b| b.id.clone()).collect()
    }

    fn sample() -> Vec<Building> {
        vec![
            building("101", 18.0, "RC-G", Some(420_000.0)),
            building("102", 35.0, "C-COR", Some(980_000.0)),
            building("103", 9.0, "RC-G", None),
        ]
    }

    #[test]
    fn empty_filter_list_matches_everything() {
        let buildings = sample();
        assert_eq!(apply(&buildings, &[]).len(), 3);
    }

    #[test]
    fn multiple_filters_intersect() {
        let buildings = sample();
        let tall = FilterSpec::new(FilterAttribute::HeightM, FilterOperator::Gt, 10.0);
        let rcg = FilterSpec::new(FilterAttribute::Zoning, FilterOperator::Eq, "rc-g");

        assert_eq!(ids(&apply(&buildings, &[tall.clone()])), ["101", "102"]);
        assert_eq!(ids(&apply(&buildings, &[rcg.clone()])), ["101", "103"]);
        assert_eq!(ids(&apply(&buildings, &[tall, rcg])), ["101"]);
    }

    #[test]
    fn numeric_equality_is_tolerant() {
        let buildings = vec![building("1", 12.0, "RC-G", Some(500_000.000_000_1))];
        let spec = FilterSpec::new(FilterAttribute::AssessedValue, FilterOperator::Eq, 500_000.0);
        assert_eq!(apply(&buildings, &[spec]).len(), 1);
    }

    #[test]
    fn missing_numeric_field_fails() {
        let buildings = sample();
        let spec = FilterSpec::new(FilterAttribute::AssessedValue, FilterOperator::Lt, 1e12);
        assert_eq!(ids(&apply(&buildings, &[spec])), ["101", "102"]);
    }

    #[test]
    fn numeric_text_values_are_coerced() {
        let buildings = sample();
        let spec = FilterSpec::new(FilterAttribute::Levels, FilterOperator::Gte, "6");
        assert_eq!(ids(&apply(&buildings, &[spec])), ["101", "102"]);

        let spec = FilterSpec::new(FilterAttribute::Levels, FilterOperator::Gte, "six");
        assert!(apply(&buildings, &[spec]).is_empty());
    }

    #[test]
    fn numeric_attributes_reject_text_operators() {
        let buildings = sample();
        let spec = FilterSpec::new(FilterAttribute::HeightM, FilterOperator::Contains, 18.0);
        assert!(apply(&buildings, &[spec]).is_empty());
    }

    #[test]
    fn contains_is_case_insensitive() {
        let buildings = sample();
        let spec = FilterSpec::new(FilterAttribute::Address, FilterOperator::Contains, "102 MOCK");
        assert_eq!(ids(&apply(&buildings, &[spec])), ["102"]);
    }

    #[test]
    fn in_requires_a_list() {
        let buildings = sample();
        let list = FilterSpec::new(
            FilterAttribute::Zoning,
            FilterOperator::In,
            FilterValue::List(vec!["c-cor".into(), "M-G".into()]),
        );
        assert_eq!(ids(&apply(&buildings, &[list])), ["102"]);

        let scalar = FilterSpec::new(FilterAttribute::Zoning, FilterOperator::In, "C-COR");
        assert!(apply(&buildings, &[scalar]).is_empty());
    }

    #[test]
    fn categorical_attributes_reject_ordering_operators() {
        let buildings = sample();
        let spec = FilterSpec::new(FilterAttribute::Zoning, FilterOperator::Gt, "A");
        assert!(apply(&buildings, &[spec]).is_empty());
    }

    #[test]
    fn absent_use_compares_as_empty() {
        let mut buildings = sample();
        buildings[1].building_use = Some("Commercial".to_string());
        let spec = FilterSpec::new(FilterAttribute::Use, FilterOperator::Eq, "commercial");
        assert_eq!(ids(&apply(&buildings, &[spec])), ["102"]);

        let spec = FilterSpec::new(FilterAttribute::Use, FilterOperator::Contains, "");
        assert_eq!(apply(&buildings, &[spec]).len(), 3);
    }
}
