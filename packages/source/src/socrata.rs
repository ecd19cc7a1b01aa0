//! Socrata `GeoJSON` feature source.
//!
//! Queries `<base>/<dataset>.geojson` with a `within_box` filter. The
//! geometry column name differs between datasets, so a fixed list of
//! likely names is probed until one returns features.

use std::time::Duration;

use async_trait::async_trait;
use city3d_scene_models::{BoundingBox, Feature};

use crate::registry::{self, DatasetDefinition};
use crate::{DatasetKind, FeatureSource, SourceError};

/// Default portal resource URL.
pub const DEFAULT_BASE_URL: &str = "https://data.calgary.ca/resource";

/// Default `$limit` per request.
pub const DEFAULT_LIMIT: u32 = 5000;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Geometry column names probed, in order.
pub const GEOMETRY_FIELDS: &[&str] = &["geometry", "the_geom", "shape", "geom", "multipolygon"];

/// Connection settings for a Socrata portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocrataConfig {
    /// Application token sent as `X-App-Token`, if any.
    pub app_token: Option<String>,
    /// Resource base URL.
    pub base_url: String,
    /// Maximum number of features per request.
    pub limit: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for SocrataConfig {
    fn default() -> Self {
        Self {
            app_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: DEFAULT_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SocrataConfig {
    /// Reads `SOCRATA_APP_TOKEN` and `SOCRATA_BASE_URL`, falling back to
    /// defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            app_token: std::env::var("SOCRATA_APP_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            base_url: std::env::var("SOCRATA_BASE_URL").unwrap_or(defaults.base_url),
            ..defaults
        }
    }

    /// Full `GeoJSON` resource URL for `dataset_id`.
    #[must_use]
    pub fn resource_url(&self, dataset_id: &str) -> String {
        format!("{}/{dataset_id}.geojson", self.base_url.trim_end_matches('/'))
    }
}

/// Builds the `$where` clause selecting features of `field` inside `bbox`.
///
/// Socrata expects `within_box(field, north, west, south, east)`.
#[must_use]
pub fn within_box_clause(field: &str, bbox: &BoundingBox) -> String {
    format!(
        "within_box({field}, {}, {}, {}, {})",
        bbox.north, bbox.west, bbox.south, bbox.east
    )
}

/// Extracts the `features` array of a `GeoJSON` feature collection.
///
/// # Errors
///
/// Returns [`SourceError::Response`] if the body has no `features` array.
pub fn parse_feature_collection(body: &serde_json::Value) -> Result<Vec<Feature>, SourceError> {
    let features = body["features"]
        .as_array()
        .ok_or_else(|| SourceError::Response {
            message: "No features array in GeoJSON response".to_string(),
        })?;
    Ok(features.iter().map(Feature::from_json).collect())
}

/// [`FeatureSource`] backed by a Socrata open-data portal.
pub struct SocrataSource {
    client: reqwest::Client,
    config: SocrataConfig,
    datasets: Vec<DatasetDefinition>,
}

impl SocrataSource {
    /// Creates a source over every registered dataset.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SocrataConfig) -> Result<Self, SourceError> {
        Self::with_datasets(config, registry::all_datasets())
    }

    /// Creates a source over an explicit dataset list.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn with_datasets(
        config: SocrataConfig,
        datasets: Vec<DatasetDefinition>,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            datasets,
        })
    }

    async fn query(&self, url: &str, where_clause: &str) -> Result<Vec<Feature>, SourceError> {
        let mut request = self.client.get(url).query(&[
            ("$limit", self.config.limit.to_string()),
            ("$where", where_clause.to_string()),
        ]);
        if let Some(token) = &self.config.app_token {
            request = request.header("X-App-Token", token);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Response {
                message: format!("Socrata request failed with status {}", resp.status()),
            });
        }

        let body: serde_json::Value = serde_json::from_str(&resp.text().await?)?;
        parse_feature_collection(&body)
    }
}

/// Fetches the features of a single dataset.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Returns the features of `dataset` inside `bbox`. Failures yield an
    /// empty list.
    async fn fetch_dataset(&self, dataset: &DatasetDefinition, bbox: &BoundingBox) -> Vec<Feature>;
}

/// Tries each dataset of `kind` in registry order and returns the first
/// non-empty result.
pub async fn fetch_first_available(
    fetcher: &dyn DatasetFetcher,
    datasets: &[DatasetDefinition],
    kind: DatasetKind,
    bbox: &BoundingBox,
) -> Vec<Feature> {
    for dataset in datasets.iter().filter(|d| d.kind == kind) {
        let features = fetcher.fetch_dataset(dataset, bbox).await;
        if !features.is_empty() {
            log::info!("Fetched {} {kind} features from {}", features.len(), dataset.id);
            return features;
        }
        log::debug!("{} returned no features", dataset.id);
    }

    log::warn!("No {kind} features found");
    Vec::new()
}

#[async_trait]
impl DatasetFetcher for SocrataSource {
    /// Probes geometry columns until one yields features.
    async fn fetch_dataset(&self, dataset: &DatasetDefinition, bbox: &BoundingBox) -> Vec<Feature> {
        let url = self.config.resource_url(&dataset.dataset_id);

        for field in GEOMETRY_FIELDS {
            match self.query(&url, &within_box_clause(field, bbox)).await {
                Ok(features) if !features.is_empty() => {
                    log::debug!(
                        "{}: {} features via geometry column '{field}'",
                        dataset.id,
                        features.len()
                    );
                    return features;
                }
                Ok(_) => {}
                Err(e) => log::warn!("{} ({field}): {e}", dataset.id),
            }
        }

        Vec::new()
    }
}

#[async_trait]
impl FeatureSource for SocrataSource {
    async fn fetch_features(&self, kind: DatasetKind, bbox: &BoundingBox) -> Vec<Feature> {
        fetch_first_available(self, &self.datasets, kind, bbox).await
    }
}
