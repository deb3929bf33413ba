#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the festival map application.
//!
//! Loads the configured festival source into an in-memory catalog at
//! startup and serves it as a JSON API: filtered result lists, detail
//! panels, map markers with their viewport, and filter options. The
//! frontend is served as static files from `app/dist`.

pub mod config;
mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, Scope, middleware, web};
use festival_map_catalog::{Catalog, SharedCatalog, load_into};
use festival_map_geography_models::MapDefaults;
use festival_map_server_models::EmbedOptions;
use festival_map_source::progress::null_progress;
use festival_map_source::{FestivalSource, FetchOptions};

pub use config::{ConfigError, ServerConfig};

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP server failed to bind or run.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Loaded festivals and the active filter.
    pub catalog: SharedCatalog,
    /// Source every reload fetches from.
    pub source: Arc<dyn FestivalSource>,
    /// Paging and limit options for every load.
    pub fetch_options: FetchOptions,
    /// Map centre, zoom limits, and tile layer.
    pub map_defaults: MapDefaults,
    /// Options served to embedding pages.
    pub embed: EmbedOptions,
}

impl AppState {
    /// Creates state with an empty catalog.
    #[must_use]
    pub fn new(source: Arc<dyn FestivalSource>, config: &ServerConfig) -> Self {
        Self {
            catalog: Catalog::new().into_shared(),
            source,
            fetch_options: config.fetch_options.clone(),
            map_defaults: MapDefaults::default(),
            embed: config.embed.clone(),
        }
    }
}

/// Routes of the JSON API, mounted under `/api`.
#[must_use]
pub fn api_scope() -> Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health))
        .route("/festivals", web::get().to(handlers::festivals))
        .route("/festivals/{id}", web::get().to(handlers::festival))
        .route("/festivals/{id}/focus", web::get().to(handlers::festival_focus))
        .route("/map", web::get().to(handlers::map))
        .route("/filters", web::get().to(handlers::filters))
        .route("/embed", web::get().to(handlers::embed))
        .route("/reload", web::post().to(handlers::reload))
        .route("/status", web::get().to(handlers::status))
}

/// Starts the festival map API server.
///
/// Reads the configuration from the environment, performs the initial
/// load, and starts the Actix-Web HTTP server. A failed initial load is
/// logged and the server starts with an empty catalog; `POST
/// /api/reload` retries it. The caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError::Config`] if the environment is invalid, or
/// [`ServerError::Io`] if the HTTP server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;
    let source = config.build_source(null_progress())?;

    let state = web::Data::new(AppState::new(source, &config));

    log::info!("Loading festivals from {}...", state.source.name());
    if let Err(e) = load_into(&state.catalog, state.source.as_ref(), &state.fetch_options).await {
        log::error!("Initial load failed, serving an empty catalog: {e}");
    }

    let ServerConfig {
        bind_addr, port, ..
    } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(api_scope())
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
