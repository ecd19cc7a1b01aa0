#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Saved filter projects backed by `SQLite`.
//!
//! A project is a named filter list (plus an optional bbox) owned by a
//! user. Users are created on first use; there is no authentication.
//!
//! Uses `switchy_database` for all database operations.

use std::path::Path;

use city3d_filter_models::FilterSpec;
use moosicbox_json_utils::database::ToValue as _;
use serde::Serialize;
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;
use thiserror::Error;

/// Default path for the projects database.
pub const DEFAULT_DB_PATH: &str = "data/city3d.sqlite";

/// Errors from project storage operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stored project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    /// Auto-generated project ID.
    pub id: i64,
    /// Project name.
    pub name: String,
    /// Saved filter list.
    pub filters: Vec<FilterSpec>,
    /// Saved bounding box string, if any.
    pub bbox: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Opens (or creates) the projects `SQLite` database and ensures the
/// schema exists.
///
/// # Errors
///
/// Returns [`ProjectError`] if the database cannot be opened or schema
/// creation fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, ProjectError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| ProjectError::Database(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;
    log::info!("Projects database ready at {}", path.display());

    Ok(db)
}

async fn ensure_schema(db: &dyn Database) -> Result<(), ProjectError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL
        )",
    )
    .await
    .map_err(|e| ProjectError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS projects (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER NOT NULL REFERENCES users(id),
            name          TEXT NOT NULL,
            filters_json  TEXT NOT NULL,
            bbox          TEXT,
            created_at    TEXT NOT NULL
        )",
    )
    .await
    .map_err(|e| ProjectError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_projects_user
         ON projects (user_id, created_at)",
    )
    .await
    .map_err(|e| ProjectError::Database(e.to_string()))?;

    Ok(())
}

/// Returns the ID of `username`, creating the user if needed.
///
/// # Errors
///
/// Returns [`ProjectError`] if any database operation fails.
pub async fn ensure_user(db: &dyn Database, username: &str) -> Result<i64, ProjectError> {
    db.exec_raw_params(
        "INSERT INTO users (username, created_at) VALUES ($1, $2)
         ON CONFLICT (username) DO NOTHING",
        &[
            DatabaseValue::String(username.to_string()),
            DatabaseValue::String(chrono::Utc::now().to_rfc3339()),
        ],
    )
    .await
    .map_err(|e| ProjectError::Database(e.to_string()))?;

    let rows = db
        .query_raw_params(
            "SELECT id FROM users WHERE username = $1",
            &[DatabaseValue::String(username.to_string())],
        )
        .await
        .map_err(|e| ProjectError::Database(e.to_string()))?;

    rows.first()
        .and_then(|r| r.to_value("id").ok())
        .ok_or_else(|| ProjectError::Database(format!("user '{username}' was not stored")))
}

/// Saves a project for `username` and returns its ID.
///
/// # Errors
///
/// Returns [`ProjectError`] if serialization or any database operation
/// fails.
pub async fn save_project(
    db: &dyn Database,
    username: &str,
    name: &str,
    filters: &[FilterSpec],
    bbox: Option<&str>,
) -> Result<i64, ProjectError> {
    let user_id = ensure_user(db, username).await?;
    let filters_json = serde_json::to_string(filters)?;

    let rows = db
        .query_raw_params(
            "INSERT INTO projects (user_id, name, filters_json, bbox, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
            &[
                DatabaseValue::Int64(user_id),
                DatabaseValue::String(name.to_string()),
                DatabaseValue::String(filters_json),
                bbox.map_or(DatabaseValue::Null, |b| DatabaseValue::String(b.to_string())),
                DatabaseValue::String(chrono::Utc::now().to_rfc3339()),
            ],
        )
        .await
        .map_err(|e| ProjectError::Database(e.to_string()))?;

    let id = rows
        .first()
        .and_then(|r| r.to_value("id").ok())
        .ok_or_else(|| ProjectError::Database("insert returned no id".to_string()))?;

    log::debug!("Saved project {id} '{name}' for {username}");
    Ok(id)
}

/// Lists the projects of `username`, newest first. Creates the user if
/// needed.
///
/// # Errors
///
/// Returns [`ProjectError`] if any database operation fails or a stored
/// filter list is not valid JSON.
pub async fn list_projects(
    db: &dyn Database,
    username: &str,
) -> Result<Vec<ProjectRecord>, ProjectError> {
    let user_id = ensure_user(db, username).await?;

    let rows = db
        .query_raw_params(
            "SELECT id, name, filters_json, bbox, created_at FROM projects
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
            &[DatabaseValue::Int64(user_id)],
        )
        .await
        .map_err(|e| ProjectError::Database(e.to_string()))?;

    rows.iter().map(project_from_row).collect()
}

/// Loads a project by ID.
///
/// Returns `None` if no such project exists.
///
/// # Errors
///
/// Returns [`ProjectError`] if the database operation fails or the stored
/// filter list is not valid JSON.
pub async fn load_project(
    db: &dyn Database,
    project_id: i64,
) -> Result<Option<ProjectRecord>, ProjectError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, filters_json, bbox, created_at FROM projects
             WHERE id = $1",
            &[DatabaseValue::Int64(project_id)],
        )
        .await
        .map_err(|e| ProjectError::Database(e.to_string()))?;

    rows.first().map(project_from_row).transpose()
}

fn project_from_row(row: &switchy_database::Row) -> Result<ProjectRecord, ProjectError> {
    let filters_json: String = row.to_value("filters_json").unwrap_or_default();
    Ok(ProjectRecord {
        id: row.to_value("id").unwrap_or(0),
        name: row.to_value("name").unwrap_or_default(),
        filters: serde_json::from_str(&filters_json)?,
        bbox: row.to_value("bbox").unwrap_or(None),
        created_at: row.to_value("created_at").unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use city3d_filter_models::{FilterAttribute, FilterOperator};

    use super::*;

    fn temp_db_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "city3d-projects-{}-{name}.sqlite",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    fn tall_filters() -> Vec<FilterSpec> {
        vec![
            FilterSpec::new(FilterAttribute::HeightM, FilterOperator::Gt, 30.48),
            FilterSpec::new(FilterAttribute::Zoning, FilterOperator::Eq, "C-COR"),
        ]
    }

    #[tokio::test]
    async fn ensure_user_is_idempotent() {
        let db = open_db(&temp_db_path("users")).await.unwrap();
        let first = ensure_user(db.as_ref(), "demo").await.unwrap();
        let second = ensure_user(db.as_ref(), "demo").await.unwrap();
        let other = ensure_user(db.as_ref(), "someone").await.unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn saved_project_loads_back() {
        let db = open_db(&temp_db_path("load")).await.unwrap();
        let id = save_project(
            db.as_ref(),
            "demo",
            "Downtown towers",
            &tall_filters(),
            Some("-114.0719,51.0455,-114.0630,51.0505"),
        )
        .await
        .unwrap();

        let project = load_project(db.as_ref(), id).await.unwrap().unwrap();
        assert_eq!(project.id, id);
        assert_eq!(project.name, "Downtown towers");
        assert_eq!(project.filters, tall_filters());
        assert_eq!(
            project.bbox.as_deref(),
            Some("-114.0719,51.0455,-114.0630,51.0505")
        );
    }

    #[tokio::test]
    async fn missing_project_is_none() {
        let db = open_db(&temp_db_path("missing")).await.unwrap();
        assert!(load_project(db.as_ref(), 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_per_user_and_newest_first() {
        let db = open_db(&temp_db_path("list")).await.unwrap();
        let older = save_project(db.as_ref(), "demo", "first", &[], None)
            .await
            .unwrap();
        let newer = save_project(db.as_ref(), "demo", "second", &tall_filters(), None)
            .await
            .unwrap();
        save_project(db.as_ref(), "someone", "theirs", &[], None)
            .await
            .unwrap();

        let projects = list_projects(db.as_ref(), "demo").await.unwrap();
        let ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
        assert_eq!(ids, [newer, older]);
        assert!(projects[1].filters.is_empty());
        assert!(projects[1].bbox.is_none());

        assert!(list_projects(db.as_ref(), "nobody").await.unwrap().is_empty());
    }
}
