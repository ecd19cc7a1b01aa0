//! Scene assembly: fetch, normalize, enrich.

use actix_web::error::BlockingError;
use actix_web::web;
use city3d_normalize::{normalize_assessments, normalize_buildings, normalize_zonings};
use city3d_scene_models::{BoundingBox, Building};
use city3d_source::{DatasetKind, FeatureSource};
use serde_json::Map;

/// Fetches all three dataset kinds for `bbox` and returns the enriched
/// buildings.
///
/// Normalization and enrichment run on the blocking thread pool.
///
/// # Errors
///
/// Returns [`BlockingError`] if the blocking task could not complete.
pub async fn build_scene(
    source: &dyn FeatureSource,
    bbox: &BoundingBox,
) -> Result<Vec<Building>, BlockingError> {
    let (buildings, zoning, parcels) = tokio::join!(
        source.fetch_features(DatasetKind::Buildings, bbox),
        source.fetch_features(DatasetKind::LandUse, bbox),
        source.fetch_features(DatasetKind::Assessments, bbox),
    );

    log::debug!(
        "Fetched {} buildings, {} zoning polygons, {} parcels",
        buildings.len(),
        zoning.len(),
        parcels.len()
    );

    web::block(move || {
        city3d_spatial::enrich(
            normalize_buildings(&buildings),
            &normalize_zonings(&zoning),
            &normalize_assessments(&parcels),
        )
    })
    .await
}

/// Fixed two-building scene for frontend development.
#[must_use]
pub fn mock_buildings() -> Vec<Building> {
    vec![
        mock_building(
            "mock-1",
            18.0,
            6,
            "101 Mock St",
            "RC-G",
            420_000.0,
            [-114.0709, 51.0460, -114.0704, 51.0464],
        ),
        mock_building(
            "mock-2",
            35.0,
            12,
            "102 Mock St",
            "C-COR",
            980_000.0,
            [-114.0698, 51.0472, -114.0693, 51.0476],
        ),
    ]
}

/// `[west, south, east, north]` rectangle footprint.
fn mock_building(
    id: &str,
    height_m: f64,
    levels: i64,
    address: &str,
    zoning: &str,
    assessed_value: f64,
    [west, south, east, north]: [f64; 4],
) -> Building {
    let footprint = serde_json::json!({
        "type": "Polygon",
        "coordinates": [[
            [west, south],
            [east, south],
            [east, north],
            [west, north],
            [west, south],
        ]],
    });

    Building {
        id: Some(id.to_string()),
        geometry: serde_json::from_value(footprint).ok(),
        height_m,
        levels,
        address: Some(address.to_string()),
        zoning: zoning.to_string(),
        assessed_value: Some(assessed_value),
        building_use: None,
        raw: Map::new(),
    }
}
