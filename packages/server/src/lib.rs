#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for risk-aware routing.
//!
//! Exposes the safe-route request/response contract over HTTP and owns the
//! currently published hotspot snapshot. Snapshots are loaded through an
//! injected [`HotspotSource`] and refreshed periodically out-of-band;
//! in-flight route computations keep the snapshot they started with. Route
//! search itself is synchronous and CPU-bound, so each request runs
//! independently with no shared mutable state beyond the snapshot swap.

mod handlers;
mod ingest;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use saferoute_hotspot::{HotspotSource, HotspotStore, JsonFeedSource};
use saferoute_risk::PenaltyConfig;
use saferoute_routing::{Router, RouterConfig};

pub use ingest::IncidentClusterSource;

/// Shared application state.
pub struct AppState {
    /// The currently published hotspot snapshot.
    pub store: Arc<HotspotStore>,
    /// The pathfinding engine.
    pub router: Router,
    /// Penalty semantics used to build per-request risk fields.
    pub penalty: PenaltyConfig,
}

/// Loads a fresh hotspot set from the source and publishes it.
///
/// A failing load keeps the previously published snapshot; route requests
/// are never blocked on feed availability.
pub fn refresh_snapshot(source: &dyn HotspotSource, store: &HotspotStore) {
    match source.load() {
        Ok(hotspots) => {
            store.publish(hotspots);
        }
        Err(e) => {
            log::error!("Hotspot refresh failed, keeping current snapshot: {e}");
        }
    }
}

/// Picks the hotspot source from the environment: a pre-clustered JSON
/// feed (`HOTSPOTS_PATH`, default `data/hotspots.json`), or raw incidents
/// clustered on load when `INCIDENTS_PATH` is set.
fn source_from_env() -> Arc<dyn HotspotSource> {
    std::env::var("INCIDENTS_PATH").map_or_else(
        |_| {
            let path = std::env::var("HOTSPOTS_PATH")
                .unwrap_or_else(|_| "data/hotspots.json".to_string());
            log::info!("Loading hotspots from feed at {path}");
            Arc::new(JsonFeedSource::new(path)) as Arc<dyn HotspotSource>
        },
        |path| {
            log::info!("Clustering incidents from {path}");
            Arc::new(IncidentClusterSource::from_env(path)) as Arc<dyn HotspotSource>
        },
    )
}

/// Starts the safe-route API server.
///
/// Loads the initial hotspot snapshot, spawns the periodic refresh task
/// (`REFRESH_SECS`, default 300), and serves the HTTP API. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let store = Arc::new(HotspotStore::new());
    let source = source_from_env();

    refresh_snapshot(source.as_ref(), &store);

    let refresh_secs: u64 = std::env::var("REFRESH_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);

    {
        let store = Arc::clone(&store);
        let source = Arc::clone(&source);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(refresh_secs));
            ticker.tick().await; // first tick fires immediately; already loaded
            loop {
                ticker.tick().await;
                refresh_snapshot(source.as_ref(), &store);
            }
        });
    }

    let state = web::Data::new(AppState {
        store,
        router: Router::new(RouterConfig::default()),
        penalty: PenaltyConfig::default(),
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
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/hotspots", web::get().to(handlers::hotspots)),
            )
            .service(
                web::scope("/routing")
                    .route("/safe-route", web::post().to(handlers::safe_route)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
