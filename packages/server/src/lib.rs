#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the crime EDA dashboard.
//!
//! Serves the dashboard as a single HTML page with inline SVG charts plus a
//! small JSON API over the same data. The dataset is loaded once through a
//! [`DatasetCache`] shared by every worker; each request filters and
//! aggregates the cached table from scratch on the blocking thread pool.

mod handlers;
pub mod interactive;
pub mod page;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, error::BlockingError, middleware, web};
use crime_eda_analytics::build_dashboard;
use crime_eda_analytics_models::FilterSelection;
use crime_eda_charts::{ChartError, render_dashboard};
use crime_eda_dataset::{DEFAULT_DATASET_PATH, DatasetCache, DatasetError};
use crime_eda_incident_models::IncidentTable;
use thiserror::Error;

/// Address the server binds to when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Port the server listens on when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors raised while answering a request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The dataset could not be loaded.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// A chart failed to render.
    #[error(transparent)]
    Chart(#[from] ChartError),
    /// The blocking thread pool dropped the task.
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] BlockingError),
}

/// Where to find the data and where to listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// CSV file backing the dashboard.
    pub dataset_path: PathBuf,
    /// Interface to bind.
    pub bind_addr: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `DATASET_PATH`, `BIND_ADDR` and `PORT`, falling back to the
    /// defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dataset_path: std::env::var("DATASET_PATH")
                .map_or(defaults.dataset_path, PathBuf::from),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Lazily loaded incident table.
    pub dataset: Arc<DatasetCache>,
}

/// Filters `table`, renders every panel and wraps them in the dashboard page.
///
/// # Errors
///
/// Returns [`ServerError::Chart`] if a panel fails to render.
pub fn dashboard_page(
    table: &IncidentTable,
    selection: &FilterSelection,
) -> Result<String, ServerError> {
    let dashboard = build_dashboard(table, selection);
    let panels = render_dashboard(&dashboard)?;
    Ok(page::render(&dashboard, &panels))
}

/// Registers the page and API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/options", web::get().to(handlers::options))
            .route("/dashboard", web::get().to(handlers::dashboard)),
    );
}

/// Starts the dashboard server.
///
/// The dataset is loaded before binding so a missing or malformed file
/// stops startup instead of failing the first request. This is a regular
/// async function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the dataset cannot be loaded, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Loading dataset from {}...", config.dataset_path.display());
    let dataset = Arc::new(DatasetCache::new(&config.dataset_path));
    let table = dataset.load().map_err(|e| {
        log::error!("Failed to load dataset: {e}");
        std::io::Error::other(e)
    })?;
    log::info!("Dataset ready with {} incidents", table.len());

    let state = web::Data::new(AppState { dataset });
    let ServerConfig { bind_addr, port, .. } = config;

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
