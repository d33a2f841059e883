#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the noise map application.
//!
//! Serves the REST API for searching addresses, submitting and updating
//! inter-floor noise reports, and reading per-address aggregates. Reports
//! are persisted in a `SQLite` database at `data/reports.db`. Sessions are
//! verified against an external identity provider; address search and
//! geocoding go through external map services.

mod auth;
mod error;
mod handlers;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use noise_map_eligibility::EligibilityPolicy;
use noise_map_geocoder::{coords::GeocodeConfig, road_address::RoadAddressConfig};
use noise_map_identity::{HttpSessionVerifier, SessionVerifier};
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Report store connection.
    pub db: Arc<dyn Database>,
    /// Session verifier backing the identity provider.
    pub verifier: Arc<dyn SessionVerifier>,
    /// Submission eligibility policy.
    pub policy: EligibilityPolicy,
    /// Road address lookup service, when configured.
    pub road_address: Option<RoadAddressConfig>,
    /// Geocoding service, when configured.
    pub geocode: Option<GeocodeConfig>,
}

/// Registers every API route under the `/api` scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/address", web::get().to(handlers::address_search))
            .route("/reports", web::get().to(handlers::reports))
            .route("/reports", web::post().to(handlers::submit_report))
            .route("/reports/my", web::get().to(handlers::my_reports))
            .route("/reports/latest", web::get().to(handlers::latest_reports))
            .route("/reports/summary", web::get().to(handlers::summary))
            .route("/reports/locations", web::get().to(handlers::locations))
            .route("/reports/{id}", web::put().to(handlers::update_report))
            .route("/ranking", web::get().to(handlers::ranking)),
    );
}

/// Starts the noise map API server.
///
/// Opens the report `SQLite` database, loads the eligibility policy and
/// external service configuration from the environment, and starts the
/// Actix-Web HTTP server. This is a regular async function — the caller is
/// responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the report database cannot be opened or the session verifier
/// is not configured.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let db_path = std::env::var("NOISE_MAP_DB")
        .unwrap_or_else(|_| noise_map_database::DEFAULT_DB_PATH.to_string());
    log::info!("Opening report database at {db_path}...");
    let db = noise_map_database::open_db(Path::new(&db_path))
        .await
        .expect("Failed to open report database");

    let verifier = HttpSessionVerifier::from_env(noise_map_geocoder::http_client().clone())
        .expect("Session verifier is not configured (AUTH_VERIFY_URL)");

    let policy = EligibilityPolicy::from_env();

    let road_address = RoadAddressConfig::from_env()
        .map_err(|e| log::warn!("Address search disabled: {e}"))
        .ok();
    let geocode = GeocodeConfig::from_env()
        .map_err(|e| log::warn!("Geocoding disabled, reports will be saved without coordinates: {e}"))
        .ok();

    let state = web::Data::new(AppState {
        db: Arc::from(db),
        verifier: Arc::new(verifier),
        policy,
        road_address,
        geocode,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
