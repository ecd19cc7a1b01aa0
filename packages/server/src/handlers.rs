//! HTTP handler functions for the city3d API.

use actix_web::{HttpResponse, web};
use city3d_scene_models::BoundingBox;
use city3d_server_models::{
    ApiHealth, ApiProject, FilterRequest, FilterResponse, LlmFilterResponse, LlmQueryRequest,
    LoadProjectRequest, ProjectListParams, SaveProjectRequest, SaveProjectResponse,
    SceneQueryParams, SceneResponse,
};

use crate::{AppState, scene};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/scene`
///
/// Returns the enriched buildings inside the bbox. Scene assembly
/// failures are reported in the body with a 200 status.
pub async fn scene(
    state: web::Data<AppState>,
    params: web::Query<SceneQueryParams>,
) -> HttpResponse {
    let bbox_str = params.bbox_or_default().to_string();

    if params.is_mock() {
        return HttpResponse::Ok().json(SceneResponse {
            bbox: bbox_str,
            features: scene::mock_buildings(),
            error: None,
        });
    }

    let Some(bbox) = parse_bbox(&bbox_str) else {
        return invalid_bbox(&bbox_str);
    };

    match scene::build_scene(state.source.as_ref(), &bbox).await {
        Ok(features) => HttpResponse::Ok().json(SceneResponse {
            bbox: bbox_str,
            features,
            error: None,
        }),
        Err(e) => {
            log::error!("Failed to build scene for {bbox_str}: {e}");
            HttpResponse::Ok().json(SceneResponse {
                bbox: bbox_str,
                features: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    }
}

/// `POST /api/llm/filter`
///
/// Translates a free-text query into filters.
pub async fn llm_filter(
    state: web::Data<AppState>,
    body: web::Json<LlmQueryRequest>,
) -> HttpResponse {
    let outcome = state.parser.parse(&body.query).await;
    log::info!("Parsed {:?} via {}", body.query, outcome.note);
    HttpResponse::Ok().json(LlmFilterResponse {
        filters: outcome.filters,
        note: outcome.note,
    })
}

/// `POST /api/filter`
///
/// Rebuilds the scene for the bbox and returns the matching building IDs.
pub async fn filter(state: web::Data<AppState>, body: web::Json<FilterRequest>) -> HttpResponse {
    let FilterRequest { bbox, filters } = body.into_inner();

    let Some(parsed) = parse_bbox(&bbox) else {
        return invalid_bbox(&bbox);
    };

    let buildings = match scene::build_scene(state.source.as_ref(), &parsed).await {
        Ok(buildings) => buildings,
        Err(e) => {
            log::error!("Failed to build scene for {bbox}: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to build scene"
            }));
        }
    };

    let matched = city3d_filter::apply(&buildings, &filters);

    HttpResponse::Ok().json(FilterResponse {
        ids: matched.iter().filter_map(|b| b.id.clone()).collect(),
        count: matched.len(),
        filters,
    })
}

/// `GET /api/projects`
pub async fn list_projects(
    state: web::Data<AppState>,
    params: web::Query<ProjectListParams>,
) -> HttpResponse {
    match city3d_projects::list_projects(state.projects_db.as_ref(), params.username_or_default())
        .await
    {
        Ok(records) => {
            let projects: Vec<ApiProject> = records.into_iter().map(ApiProject::from).collect();
            HttpResponse::Ok().json(projects)
        }
        Err(e) => {
            log::error!("Failed to list projects: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list projects"
            }))
        }
    }
}

/// `POST /api/projects/save`
pub async fn save_project(
    state: web::Data<AppState>,
    body: web::Json<SaveProjectRequest>,
) -> HttpResponse {
    match city3d_projects::save_project(
        state.projects_db.as_ref(),
        &body.username,
        &body.name,
        &body.filters,
        body.bbox.as_deref(),
    )
    .await
    {
        Ok(project_id) => HttpResponse::Ok().json(SaveProjectResponse { project_id }),
        Err(e) => {
            log::error!("Failed to save project: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to save project"
            }))
        }
    }
}

/// `POST /api/projects/load`
pub async fn load_project(
    state: web::Data<AppState>,
    body: web::Json<LoadProjectRequest>,
) -> HttpResponse {
    match city3d_projects::load_project(state.projects_db.as_ref(), body.project_id).await {
        Ok(Some(record)) => HttpResponse::Ok().json(ApiProject::from(record)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "error": "not found" })),
        Err(e) => {
            log::error!("Failed to load project {}: {e}", body.project_id);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load project"
            }))
        }
    }
}

fn invalid_bbox(bbox: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": format!("Invalid bbox '{bbox}', expected minLon,minLat,maxLon,maxLat")
    }))
}

/// Parses a bounding box string `"west,south,east,north"` into a
/// [`BoundingBox`]. Every part must be a finite number.
fn parse_bbox(s: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<_>>()?;
    match parts[..] {
        [west, south, east, north] => Some(BoundingBox::new(west, south, east, north)),
        _ => None,
    }
}
