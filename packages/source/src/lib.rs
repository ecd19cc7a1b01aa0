#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature sources for scene building.
//!
//! A [`FeatureSource`] returns raw [`Feature`]s of one [`DatasetKind`]
//! inside a bounding box. Sources never fail outward: upstream errors are
//! logged and reported as an empty feature list.

pub mod registry;
pub mod socrata;

use async_trait::async_trait;
use city3d_scene_models::{BoundingBox, Feature};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use socrata::{DatasetFetcher, SocrataConfig, SocrataSource, fetch_first_available};

/// Errors that can occur while fetching from an upstream portal.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The portal answered with something other than a feature collection.
    #[error("Unexpected response: {message}")]
    Response {
        /// Description of what went wrong.
        message: String,
    },
}

/// Category of features a dataset provides.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// Building footprints.
    Buildings,
    /// Land-use (zoning) district polygons.
    LandUse,
    /// Assessment parcels.
    Assessments,
}

/// Anything that can provide raw features for a bounding box.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Returns the features of `kind` inside `bbox`.
    ///
    /// Returns an empty list on any upstream failure.
    async fn fetch_features(&self, kind: DatasetKind, bbox: &BoundingBox) -> Vec<Feature>;
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn dataset_kind_names_are_snake_case() {
        assert_eq!(DatasetKind::LandUse.to_string(), "land_use");
        assert_eq!(
            DatasetKind::from_str("assessments").unwrap(),
            DatasetKind::Assessments
        );
    }
}
