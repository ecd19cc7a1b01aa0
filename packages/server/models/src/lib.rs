#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the city3d server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the storage types to allow independent evolution of the API
//! contract.

use city3d_filter_models::FilterSpec;
use city3d_projects::ProjectRecord;
use city3d_scene_models::Building;
use serde::{Deserialize, Serialize};

/// Bounding box used when a scene request names none.
pub const DEFAULT_BBOX: &str = "-114.0719,51.0455,-114.0630,51.0505";

/// Username used when a project listing names none.
pub const DEFAULT_USERNAME: &str = "demo";

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Query parameters for the scene endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneQueryParams {
    /// Bounding box as `minLon,minLat,maxLon,maxLat`.
    pub bbox: Option<String>,
    /// `"1"` returns a fixed two-building scene.
    pub mock: Option<String>,
}

impl SceneQueryParams {
    /// The requested bbox, or [`DEFAULT_BBOX`].
    #[must_use]
    pub fn bbox_or_default(&self) -> &str {
        self.bbox.as_deref().unwrap_or(DEFAULT_BBOX)
    }

    /// Whether the mock scene was requested.
    #[must_use]
    pub fn is_mock(&self) -> bool {
        self.mock.as_deref() == Some("1")
    }
}

/// Enriched buildings for a bbox.
#[derive(Debug, Clone, Serialize)]
pub struct SceneResponse {
    /// The bbox string as requested.
    pub bbox: String,
    /// Enriched buildings.
    pub features: Vec<Building>,
    /// Set when the scene could not be built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/llm/filter`.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmQueryRequest {
    /// Free-text query.
    pub query: String,
}

/// Filters parsed from a free-text query.
#[derive(Debug, Clone, Serialize)]
pub struct LlmFilterResponse {
    /// Parsed filters, possibly empty.
    pub filters: Vec<FilterSpec>,
    /// Which parser produced the filters.
    pub note: String,
}

/// Body of `POST /api/filter`.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterRequest {
    /// Bounding box as `minLon,minLat,maxLon,maxLat`.
    pub bbox: String,
    /// Filters combined with AND.
    pub filters: Vec<FilterSpec>,
}

/// Buildings matching a filter request.
#[derive(Debug, Clone, Serialize)]
pub struct FilterResponse {
    /// IDs of matching buildings that have one.
    pub ids: Vec<String>,
    /// Number of matching buildings, including those without an ID.
    pub count: usize,
    /// The filters as received.
    pub filters: Vec<FilterSpec>,
}

/// Query parameters for the project listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListParams {
    /// Owner whose projects are listed.
    pub username: Option<String>,
}

impl ProjectListParams {
    /// The requested username, or [`DEFAULT_USERNAME`].
    #[must_use]
    pub fn username_or_default(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_USERNAME)
    }
}

/// Body of `POST /api/projects/save`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveProjectRequest {
    /// Owner, created on first save.
    pub username: String,
    /// Display name of the project.
    pub name: String,
    /// Filters to store.
    pub filters: Vec<FilterSpec>,
    /// Bounding box the filters were made for.
    #[serde(default)]
    pub bbox: Option<String>,
}

/// Response of `POST /api/projects/save`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveProjectResponse {
    /// ID of the new project.
    pub project_id: i64,
}

/// Body of `POST /api/projects/load`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadProjectRequest {
    /// Requesting user. Not checked against the project owner.
    pub username: String,
    /// ID of the project to load.
    pub project_id: i64,
}

/// A saved project as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ApiProject {
    /// Project ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Stored filters.
    pub filters: Vec<FilterSpec>,
    /// Stored bounding box, if one was saved.
    pub bbox: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<ProjectRecord> for ApiProject {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            filters: record.filters,
            bbox: record.bbox,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_params_default_to_downtown_bbox() {
        let params = SceneQueryParams::default();
        assert_eq!(params.bbox_or_default(), DEFAULT_BBOX);
        assert!(!params.is_mock());

        let params = SceneQueryParams {
            bbox: None,
            mock: Some("1".to_string()),
        };
        assert!(params.is_mock());
    }

    #[test]
    fn scene_error_is_omitted_when_absent() {
        let response = SceneResponse {
            bbox: DEFAULT_BBOX.to_string(),
            features: Vec::new(),
            error: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["features"], serde_json::json!([]));
    }

    #[test]
    fn save_request_bbox_is_optional() {
        let req: SaveProjectRequest = serde_json::from_str(
            r#"{"username":"demo","name":"p","filters":[{"attribute":"levels","operator":">","value":3}]}"#,
        )
        .unwrap();
        assert!(req.bbox.is_none());
        assert_eq!(req.filters.len(), 1);
    }
}
