#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot production and distribution.
//!
//! Converts raw incident streams into weighted risk zones via
//! density-based clustering ([`cluster`]), holds the currently published
//! hotspot set behind a versioned snapshot ([`store`]), and abstracts how
//! hotspot feeds are loaded ([`source`]) so the routing core never touches
//! the filesystem directly.

pub mod cluster;
pub mod source;
pub mod store;

use saferoute_geo::GeoPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cluster::{ClusterOutcome, ClusterParams, RadiusRule, cluster};
pub use source::{HotspotSource, InMemorySource, JsonFeedSource};
pub use store::{HotspotSnapshot, HotspotStore};

/// A clustered, weighted zone of historical incident density.
///
/// Hotspots are produced wholesale by a clustering run (or loaded from an
/// external feed) and never mutated in place; a new clustering epoch
/// replaces the entire set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Identifier unique within one snapshot.
    #[serde(default)]
    pub id: u32,
    /// Center latitude (WGS84).
    pub lat: f64,
    /// Center longitude (WGS84).
    pub lng: f64,
    /// Radius of influence in meters.
    pub radius: f64,
    /// Non-negative weight; higher means more dangerous.
    pub intensity: f64,
    /// Number of incidents that formed this hotspot (0 when loaded from a
    /// feed that does not carry it).
    #[serde(default)]
    pub member_count: usize,
}

impl Hotspot {
    /// The hotspot's center as a [`GeoPoint`].
    #[must_use]
    pub const fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Returns `true` if the center is a valid coordinate and radius and
    /// intensity are non-negative finite numbers.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.center().is_valid()
            && self.radius.is_finite()
            && self.radius >= 0.0
            && self.intensity.is_finite()
            && self.intensity >= 0.0
    }
}

/// Errors that can occur while loading hotspot feeds.
#[derive(Debug, Error)]
pub enum HotspotError {
    /// Reading the feed failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The feed contents were not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
