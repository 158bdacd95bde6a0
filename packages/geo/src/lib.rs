#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared geographic primitives for the safe-routing core.
//!
//! All distances in this workspace are great-circle (haversine) distances
//! in meters, computed over WGS84 latitude/longitude pairs. This crate
//! defines the point type those distances operate on, coordinate
//! validation, and the degree-padding helpers used to turn meter radii
//! into R-tree envelope extents.

use geo::{Distance, Haversine};
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A geographic point in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both coordinates are finite and within the valid
    /// WGS84 ranges (`[-90, 90]` latitude, `[-180, 180]` longitude).
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        // geo points are (x, y) = (lng, lat)
        Self::new(p.lng, p.lat)
    }
}

/// Great-circle distance between two points, in meters.
#[must_use]
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(a.into(), b.into())
}

/// Converts a meter distance to degrees of latitude.
#[must_use]
pub fn meters_to_lat_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Converts a meter distance to degrees of longitude at the given latitude.
///
/// Longitude degrees shrink toward the poles; the cosine factor is clamped
/// so envelopes near the poles stay finite.
#[must_use]
pub fn meters_to_lng_degrees(meters: f64, at_lat: f64) -> f64 {
    let cos_lat = at_lat.to_radians().cos().max(0.01);
    meters / (METERS_PER_DEGREE * cos_lat)
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Builds a box centered on `point` extending `radius_m` meters in
    /// every direction.
    #[must_use]
    pub fn around(point: GeoPoint, radius_m: f64) -> Self {
        let dlat = meters_to_lat_degrees(radius_m);
        let dlng = meters_to_lng_degrees(radius_m, point.lat);
        Self {
            west: point.lng - dlng,
            south: point.lat - dlat,
            east: point.lng + dlng,
            north: point.lat + dlat,
        }
    }

    /// Returns `true` if the point lies within this box (inclusive).
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lng >= self.west
            && point.lng <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}
