#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk-weighted grid routing.
//!
//! Finds a walking-scale path between two coordinates over an implicit
//! geographic grid, biased away from hotspots by the additive penalties of
//! a [`saferoute_risk::RiskField`]. The raw grid path is then simplified,
//! spline-smoothed, and corner-cut into a natural curve, and can be
//! encoded as a compact polyline for transport.
//!
//! The search is a *risk-weighted best-first search*, not optimal A*: the
//! haversine heuristic lower-bounds only the distance component of the
//! cost, and risk penalties make the total cost exceed that bound. The
//! engine prefers safer routes over provably shortest ones.

pub mod engine;
pub mod grid;
pub mod polyline;
pub mod postprocess;

use thiserror::Error;

pub use engine::{Connectivity, Router, RouterConfig};
pub use grid::GridCell;
pub use polyline::{PolylineError, decode, encode};
pub use postprocess::SmoothingConfig;

/// Errors a routing request can fail with.
///
/// All variants are recoverable at the caller level; the external routing
/// API is expected to fall back to a non-risk-aware route.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// A requested coordinate was non-finite or out of WGS84 range.
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate {
        /// The offending latitude.
        lat: f64,
        /// The offending longitude.
        lng: f64,
    },

    /// Start and end are too far apart to search; rejected before any
    /// expansion.
    #[error("start and end are {meters:.0}m apart, exceeding the {ceiling_m:.0}m ceiling")]
    DistanceTooFar {
        /// The requested great-circle distance.
        meters: f64,
        /// The configured ceiling.
        ceiling_m: f64,
    },

    /// The open set emptied without reaching the goal.
    #[error("no grid path connects start and end")]
    NoPathFound,

    /// The node-expansion budget was hit before reaching the goal.
    #[error("search budget exhausted after expanding {expanded} nodes")]
    SearchBudgetExceeded {
        /// Nodes expanded before aborting.
        expanded: usize,
    },
}
