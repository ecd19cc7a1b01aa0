#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalizes raw `GeoJSON` features into canonical scene records.
//!
//! Every canonical field is resolved by probing the candidate attribute
//! names in [`synonyms`] in order. Missing or unparseable values fall
//! through to the next candidate and finally to a default; normalization
//! never rejects a feature.

pub mod synonyms;

use city3d_scene_models::{
    AssessmentParcel, Building, DEFAULT_HEIGHT_M, Feature, METERS_PER_LEVEL, UNKNOWN_ADDRESS,
    UNKNOWN_ZONING, ZoningPolygon,
};
use serde_json::{Map, Value};

/// Normalizes a building footprint feature.
///
/// Height falls back from the explicit height attribute to
/// `levels * 3.0` and finally to `12.0`; levels fall back to
/// `round(height / 3.0)`.
#[must_use]
pub fn normalize_building(feature: &Feature) -> Building {
    let props = &feature.properties;

    let explicit_height = first_number(props, synonyms::BUILDING_HEIGHT);
    let explicit_levels = first_levels(props, synonyms::BUILDING_LEVELS);

    let height_m = explicit_height
        .or_else(|| explicit_levels.map(levels_to_height))
        .unwrap_or(DEFAULT_HEIGHT_M);
    let levels = explicit_levels.unwrap_or_else(|| height_to_levels(height_m));

    Building {
        id: first_text(props, synonyms::BUILDING_ID),
        geometry: parse_geometry(feature.geometry.as_ref()),
        height_m,
        levels,
        address: first_text(props, synonyms::BUILDING_ADDRESS),
        zoning: first_text(props, synonyms::BUILDING_ZONING)
            .unwrap_or_else(|| UNKNOWN_ZONING.to_string()),
        assessed_value: None,
        building_use: first_text(props, synonyms::BUILDING_USE),
        raw: props.clone(),
    }
}

/// Normalizes a land use (zoning district) feature.
#[must_use]
pub fn normalize_zoning(feature: &Feature) -> ZoningPolygon {
    let zoning = synonyms::ZONING_LABEL
        .iter()
        .find_map(|candidate| {
            feature
                .properties
                .iter()
                .filter(|(key, _)| key.to_lowercase() == *candidate)
                .find_map(|(_, value)| value_as_text(value))
        })
        .unwrap_or_else(|| UNKNOWN_ZONING.to_string());

    ZoningPolygon {
        geometry: parse_geometry(feature.geometry.as_ref()),
        zoning,
    }
}

/// Normalizes a property assessment parcel feature.
///
/// Well-known assessed value columns are probed first, then any column
/// whose name looks like an assessed value or total.
#[must_use]
pub fn normalize_assessment(feature: &Feature) -> AssessmentParcel {
    let props = &feature.properties;

    let assessed_value = synonyms::ASSESSED_VALUE
        .iter()
        .find_map(|key| props.get(*key).and_then(value_as_amount))
        .or_else(|| {
            props
                .iter()
                .filter(|(key, _)| synonyms::is_assessed_value_key(key))
                .find_map(|(_, value)| value_as_amount(value))
        });

    AssessmentParcel {
        geometry: parse_geometry(feature.geometry.as_ref()),
        assessed_value,
        address: first_text(props, synonyms::PARCEL_ADDRESS)
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
    }
}

/// Normalizes a batch of building features.
#[must_use]
pub fn normalize_buildings(features: &[Feature]) -> Vec<Building> {
    features.iter().map(normalize_building).collect()
}

/// Normalizes a batch of zoning features.
#[must_use]
pub fn normalize_zonings(features: &[Feature]) -> Vec<ZoningPolygon> {
    features.iter().map(normalize_zoning).collect()
}

/// Normalizes a batch of assessment features.
#[must_use]
pub fn normalize_assessments(features: &[Feature]) -> Vec<AssessmentParcel> {
    features.iter().map(normalize_assessment).collect()
}

#[allow(clippy::cast_precision_loss)]
fn levels_to_height(levels: i64) -> f64 {
    levels as f64 * METERS_PER_LEVEL
}

/// Rounds half to even, so a 7.5 m footprint counts as 2 levels.
#[allow(clippy::cast_possible_truncation)]
fn height_to_levels(height_m: f64) -> i64 {
    (height_m / METERS_PER_LEVEL).round_ties_even() as i64
}

/// Parses the raw geometry, treating anything malformed as absent.
fn parse_geometry(geometry: Option<&Value>) -> Option<geojson::Geometry> {
    let value = geometry.filter(|g| !g.is_null())?;
    match serde_json::from_value::<geojson::Geometry>(value.clone()) {
        Ok(geometry) => Some(geometry),
        Err(e) => {
            log::debug!("Ignoring malformed geometry: {e}");
            None
        }
    }
}

fn first_number(props: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| props.get(*key).and_then(value_as_f64))
}

/// Level counts may arrive as `"6.0"`; they are truncated to whole levels.
#[allow(clippy::cast_possible_truncation)]
fn first_levels(props: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    first_number(props, keys).map(|n| n.trunc() as i64)
}

fn first_text(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| props.get(*key).and_then(value_as_text))
}

fn value_as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Like [`value_as_f64`] but tolerates thousands separators.
fn value_as_amount(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => value_as_f64(&Value::String(s.replace(',', ""))),
        other => value_as_f64(other),
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
