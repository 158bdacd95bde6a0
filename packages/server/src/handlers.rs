//! HTTP handlers.
//!
//! The safe-route endpoint distinguishes malformed requests from expected
//! routing outcomes: out-of-range coordinates are a client error (400),
//! while "too far", "no path", and an exhausted search budget are valid
//! answers to a well-formed question and come back as a 200 error
//! envelope the collaborator can render.

use actix_web::{HttpResponse, Responder, web};
use saferoute_risk::RiskField;
use saferoute_routing::RouteError;
use saferoute_routing_models::{RouteRequest, RouteResponse};
use serde_json::json;

use crate::AppState;

pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.store.current();
    HttpResponse::Ok().json(json!({
        "healthy": true,
        "snapshotVersion": snapshot.version,
        "hotspotCount": snapshot.hotspots.len(),
    }))
}

pub async fn hotspots(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.store.current();
    HttpResponse::Ok().json(json!({
        "version": snapshot.version,
        "hotspots": snapshot.hotspots,
    }))
}

pub async fn safe_route(
    state: web::Data<AppState>,
    request: web::Json<RouteRequest>,
) -> impl Responder {
    let snapshot = state.store.current();
    let field = RiskField::new(&snapshot, state.penalty);

    match state
        .router
        .route(&field, request.start_point(), request.end_point())
    {
        Ok(route) => {
            log::debug!(
                "Route with {} points, risk {:.1}, {} avoided (snapshot v{})",
                route.points.len(),
                route.risk_score,
                route.avoided_hotspots,
                snapshot.version
            );
            HttpResponse::Ok().json(RouteResponse::ok(route))
        }
        Err(e @ RouteError::InvalidCoordinate { .. }) => {
            HttpResponse::BadRequest().json(RouteResponse::error(e.to_string()))
        }
        Err(e) => {
            log::info!("Route request failed: {e}");
            HttpResponse::Ok().json(RouteResponse::error(e.to_string()))
        }
    }
}
