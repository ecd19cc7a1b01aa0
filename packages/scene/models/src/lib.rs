#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical record types for a city scene.
//!
//! Raw `GeoJSON` features from the open data portal are normalized into
//! [`Building`], [`ZoningPolygon`], and [`AssessmentParcel`] values. All
//! three are rebuilt from scratch for every request; only buildings are
//! mutated afterwards (by spatial enrichment).

use serde::{Deserialize, Serialize};

/// Zoning label used when no zoning polygon (or attribute) applies.
pub const UNKNOWN_ZONING: &str = "Unknown";

/// Address used for parcels whose attributes carry no address.
pub const UNKNOWN_ADDRESS: &str = "Unknown";

/// Assumed storey height used to derive height from levels and back.
pub const METERS_PER_LEVEL: f64 = 3.0;

/// Height assigned to footprints that carry neither height nor levels.
pub const DEFAULT_HEIGHT_M: f64 = 12.0;

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

/// A raw feature as delivered by a data source: an optional geometry plus
/// a loosely-typed attribute map.
///
/// The geometry is kept as raw JSON so that a malformed geometry never
/// prevents the rest of the feature from being read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// `GeoJSON` geometry object, if any.
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
    /// Attribute map. `null` properties deserialize as an empty map.
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Feature {
    /// Creates a feature from a geometry and attribute map.
    #[must_use]
    pub const fn new(
        geometry: Option<serde_json::Value>,
        properties: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Reads a feature out of an arbitrary JSON value.
    ///
    /// Anything that is not an object yields an empty feature.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        let geometry = value.get("geometry").filter(|g| !g.is_null()).cloned();
        let properties = value
            .get("properties")
            .and_then(serde_json::Value::as_object)
            .cloned()
            .unwrap_or_default();

        Self {
            geometry,
            properties,
        }
    }
}

fn deserialize_properties<'de, D>(
    deserializer: D,
) -> Result<serde_json::Map<String, serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let props: Option<serde_json::Map<String, serde_json::Value>> =
        Option::deserialize(deserializer)?;
    Ok(props.unwrap_or_default())
}

/// A building footprint with resolved height and derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Source identifier, if the feature carried one.
    pub id: Option<String>,
    /// Footprint geometry. Buildings without one never match a polygon.
    pub geometry: Option<geojson::Geometry>,
    /// Height in meters. Always resolved.
    pub height_m: f64,
    /// Number of levels. Always resolved.
    pub levels: i64,
    /// Street address from the footprint attributes.
    pub address: Option<String>,
    /// Zoning district label.
    pub zoning: String,
    /// Assessed property value from the containing parcel.
    pub assessed_value: Option<f64>,
    /// Building use class (e.g. `"commercial"`), when the source has one.
    #[serde(rename = "use")]
    pub building_use: Option<String>,
    /// Original attribute map.
    pub raw: serde_json::Map<String, serde_json::Value>,
}

/// A zoning district polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoningPolygon {
    /// District geometry. Polygons without one are not indexed.
    pub geometry: Option<geojson::Geometry>,
    /// District label (e.g. `"RC-G"`).
    pub zoning: String,
}

/// A property assessment parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentParcel {
    /// Parcel geometry. Parcels without one are not indexed.
    pub geometry: Option<geojson::Geometry>,
    /// Assessed value, if one could be parsed.
    pub assessed_value: Option<f64>,
    /// Parcel street address.
    pub address: String,
}
