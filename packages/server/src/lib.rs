#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the city3d building explorer.
//!
//! Serves enriched building scenes for a bounding box, structured and
//! free-text filtering over those scenes, and saved filter projects.
//! Scenes are rebuilt from the open-data portal on every request.

mod handlers;
pub mod scene;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use city3d_ai::{QueryParser, QueryParserConfig};
use city3d_source::{FeatureSource, SocrataConfig, SocrataSource};
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Provider of raw building, zoning, and assessment features.
    pub source: Arc<dyn FeatureSource>,
    /// Free-text query parser.
    pub parser: Arc<QueryParser>,
    /// `SQLite` database for saved projects.
    pub projects_db: Arc<dyn Database>,
}

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Path of the projects `SQLite` database.
    pub database_path: PathBuf,
    /// Query parser settings.
    pub parser: QueryParserConfig,
    /// Open-data portal settings.
    pub socrata: SocrataConfig,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, and `DATABASE_PATH`, plus the parser
    /// and portal settings.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),
            database_path: std::env::var("DATABASE_PATH")
                .map_or_else(|_| PathBuf::from(city3d_projects::DEFAULT_DB_PATH), PathBuf::from),
            parser: QueryParserConfig::from_env(),
            socrata: SocrataConfig::from_env(),
        }
    }
}

/// Registers all API routes under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/scene", web::get().to(handlers::scene))
            .route("/llm/filter", web::post().to(handlers::llm_filter))
            .route("/filter", web::post().to(handlers::filter))
            .route("/projects", web::get().to(handlers::list_projects))
            .route("/projects/save", web::post().to(handlers::save_project))
            .route("/projects/load", web::post().to(handlers::load_project)),
    );
}

/// Starts the API server.
///
/// Opens the projects database, builds the feature source and query
/// parser, and runs the Actix-Web HTTP server. The caller is responsible
/// for providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if startup fails or the HTTP server
/// fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Opening projects database...");
    let projects_db = city3d_projects::open_db(&config.database_path)
        .await
        .map_err(std::io::Error::other)?;

    let source = SocrataSource::new(config.socrata).map_err(std::io::Error::other)?;
    let parser = QueryParser::new(&config.parser).map_err(std::io::Error::other)?;
    if !parser.has_models() {
        log::info!("No text-generation models configured");
    }

    let state = web::Data::new(AppState {
        source: Arc::new(source),
        parser: Arc::new(parser),
        projects_db: Arc::from(projects_db),
    });

    let (bind_addr, port) = (config.bind_addr, config.port);
    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
