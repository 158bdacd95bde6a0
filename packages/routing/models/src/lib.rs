#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route result types and the safe-route API contract.
//!
//! These types are serialized to JSON for the external routing
//! collaborator. They are separate from the engine internals so the wire
//! contract can evolve independently of the search implementation.

use saferoute_geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// A continuous-space point on a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
}

impl RoutePoint {
    /// Creates a new route point.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<GeoPoint> for RoutePoint {
    fn from(p: GeoPoint) -> Self {
        Self {
            lat: p.lat,
            lng: p.lng,
        }
    }
}

impl From<RoutePoint> for GeoPoint {
    fn from(p: RoutePoint) -> Self {
        Self {
            lat: p.lat,
            lng: p.lng,
        }
    }
}

/// A computed route, created once per request and not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    /// Ordered waypoints from the requested start to the requested end.
    pub points: Vec<RoutePoint>,
    /// The same points as an encoded polyline string.
    pub polyline: String,
    /// Non-negative aggregate risk penalty over the path.
    pub risk_score: f64,
    /// Hotspots the straight-line route would have entered that this
    /// route stays clear of.
    pub avoided_hotspots: usize,
}

/// A routing request from the external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// `[lat, lng]` of the start.
    pub start: [f64; 2],
    /// `[lat, lng]` of the end.
    pub end: [f64; 2],
}

impl RouteRequest {
    /// Start coordinate as a [`GeoPoint`].
    #[must_use]
    pub const fn start_point(&self) -> GeoPoint {
        GeoPoint::new(self.start[0], self.start[1])
    }

    /// End coordinate as a [`GeoPoint`].
    #[must_use]
    pub const fn end_point(&self) -> GeoPoint {
        GeoPoint::new(self.end[0], self.end[1])
    }
}

/// Response status for the safe-route endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    /// A route was computed.
    Ok,
    /// The request failed; `error` carries the reason.
    Error,
}

/// Response envelope for the safe-route endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    /// Outcome of the request.
    pub status: RouteStatus,
    /// The computed route when `status` is `ok`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteResult>,
    /// Failure description when `status` is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RouteResponse {
    /// Builds a success response.
    #[must_use]
    pub const fn ok(route: RouteResult) -> Self {
        Self {
            status: RouteStatus::Ok,
            route: Some(route),
            error: None,
        }
    }

    /// Builds an error response.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: RouteStatus::Error,
            route: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_wire_shape() {
        let json = r#"{ "start": [12.9716, 77.5946], "end": [12.9352, 77.6245] }"#;
        let req: RouteRequest = serde_json::from_str(json).unwrap();
        assert!((req.start_point().lat - 12.9716).abs() < f64::EPSILON);
        assert!((req.end_point().lng - 77.6245).abs() < f64::EPSILON);
    }

    #[test]
    fn ok_response_shape() {
        let response = RouteResponse::ok(RouteResult {
            points: vec![RoutePoint::new(12.97, 77.59), RoutePoint::new(12.98, 77.60)],
            polyline: "abc".to_string(),
            risk_score: 5.0,
            avoided_hotspots: 1,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json.get("error").is_none());
        assert_eq!(json["route"]["avoidedHotspots"], 1);
        assert_eq!(json["route"]["points"][0]["lat"], 12.97);
    }

    #[test]
    fn error_response_shape() {
        let response = RouteResponse::error("no path found");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("route").is_none());
        assert_eq!(json["error"], "no path found");
    }
}
