#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the avian influenza outbreak tracker.
//!
//! Serves outbreak summaries, chart data, choropleth figures and map
//! features to the web client. Every request reads the current snapshot
//! from the configured record store: a local CSV written by the ingestion
//! job, or a published spreadsheet fetched over HTTP.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;
use flu_finder_analytics::OutbreakService;
use flu_finder_geography::{GeoError, GeographyPaths, GeographyReference};
use flu_finder_store::{CsvFileStore, PublishedSheetStore, RecordStore, StoreError, paths};
use thiserror::Error;

/// Errors that can occur while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The record store could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Geography reference data could not be loaded.
    #[error(transparent)]
    Geography(#[from] GeoError),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Server configuration, from flags or environment variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "flu_finder_server", about = "Avian influenza outbreak API server")]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1")]
    pub bind_addr: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Outbreak snapshot CSV. Defaults to `<data dir>/outbreaks.csv`.
    #[arg(long, env = "FLU_FINDER_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Published spreadsheet CSV URL, read instead of a local snapshot.
    #[arg(long, env = "FLU_FINDER_SHEET_URL", conflicts_with = "snapshot")]
    pub sheet_url: Option<String>,

    /// County FIPS lookup CSV.
    #[arg(long, env = "FLU_FINDER_FIPS_LOOKUP")]
    pub fips_lookup: Option<PathBuf>,

    /// State outline `GeoJSON`.
    #[arg(long, env = "FLU_FINDER_STATE_OUTLINES")]
    pub state_outlines: Option<PathBuf>,

    /// County boundary `GeoJSON`.
    #[arg(long, env = "FLU_FINDER_COUNTY_FEATURES")]
    pub county_features: Option<PathBuf>,

    /// County name patch TOML, replacing the built-in table.
    #[arg(long, env = "FLU_FINDER_PATCHES")]
    pub patches: Option<PathBuf>,

    /// Allowed CORS origins. Any origin is allowed when empty.
    #[arg(long = "cors-origin", env = "FLU_FINDER_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Reference data locations, falling back to the data directory.
    #[must_use]
    pub fn geography_paths(&self) -> GeographyPaths {
        GeographyPaths {
            fips_lookup: self
                .fips_lookup
                .clone()
                .unwrap_or_else(paths::fips_lookup_path),
            state_outlines: self
                .state_outlines
                .clone()
                .unwrap_or_else(paths::state_outlines_path),
            county_features: self
                .county_features
                .clone()
                .unwrap_or_else(paths::county_features_path),
            patches: self.patches.clone(),
        }
    }

    /// Opens the configured record store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the sheet URL is invalid or the snapshot
    /// file cannot be read.
    pub async fn connect_store(&self) -> Result<Arc<dyn RecordStore>, StoreError> {
        if let Some(url) = &self.sheet_url {
            return Ok(Arc::new(PublishedSheetStore::connect(url)?));
        }
        let path = self.snapshot.clone().unwrap_or_else(paths::snapshot_path);
        Ok(Arc::new(CsvFileStore::connect(path).await?))
    }
}

/// Shared application state.
pub struct AppState {
    /// Outbreak queries over the configured store.
    pub service: OutbreakService,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/cdc/data", web::get().to(handlers::records))
            .route("/country/data", web::get().to(handlers::country_data))
            .route("/state/{state}/data", web::get().to(handlers::state_data))
            .route(
                "/county/{state}/{county}/data",
                web::get().to(handlers::county_data),
            )
            .route(
                "/state/{state}/county/{county}/data",
                web::get().to(handlers::county_data),
            )
            .route("/latest", web::get().to(handlers::latest))
            .route("/chart", web::get().to(handlers::chart))
            .route("/map/choropleth", web::get().to(handlers::choropleth))
            .route("/map/data", web::get().to(handlers::map_data))
            .route("/map/initialize", web::get().to(handlers::map_initialize)),
    );
}

fn cors(origins: &[String]) -> Cors {
    if origins.is_empty() {
        return Cors::permissive();
    }
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(["GET", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
}

/// Starts the outbreak API server.
///
/// Opens the record store, loads the geography reference data, and starts
/// the Actix-Web HTTP server. The caller provides the async runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the store cannot be opened, the FIPS lookup
/// cannot be loaded, or the server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    log::info!("Opening record store...");
    let store = config.connect_store().await?;
    log::info!("Serving outbreaks from {}", store.describe());

    log::info!("Loading geography reference data...");
    let geography = GeographyReference::load(&config.geography_paths())?;
    log::info!(
        "Loaded {} county regions, {} state outlines, {} county features",
        geography.boundaries.len(),
        geography.outlines.len(),
        geography.counties.len()
    );

    let service = OutbreakService::new(store, Arc::new(geography));
    let state = web::Data::new(AppState {
        service: service.clone(),
    });

    let origins = config.cors_origins.clone();
    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    if let Err(e) = service.close().await {
        log::warn!("Failed to close record store: {e}");
    }

    Ok(())
}
