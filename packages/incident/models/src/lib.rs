#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record types and severity definitions.
//!
//! An [`Incident`] is a single historical report at a point location.
//! Incidents are produced by ingestion, are immutable, and are read-only
//! to the routing core: the clusterer consumes them in bulk and everything
//! downstream only ever sees the hotspots derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Ordinal incident severity, 1 through 5.
///
/// The numeric value doubles as the clustering weight when
/// severity-weighted intensity is enabled.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentSeverity {
    /// Non-criminal or nuisance reports.
    Minimal = 1,
    /// Minor offenses.
    Low = 2,
    /// Moderate offenses.
    Moderate = 3,
    /// Serious offenses.
    High = 4,
    /// The most severe offenses.
    Critical = 5,
}

impl IncidentSeverity {
    /// The severity as its ordinal weight.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Parses an ordinal weight back into a severity.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSeverityError`] for values outside 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Minimal),
            2 => Ok(Self::Low),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::High),
            5 => Ok(Self::Critical),
            _ => Err(InvalidSeverityError { value }),
        }
    }
}

/// A severity weight outside the 1-5 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The rejected value.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "severity value {} out of range 1-5", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Top-level incident category groupings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentCategory {
    /// Crimes against persons (assault, robbery, harassment).
    Violent,
    /// Crimes against property (burglary, theft, vandalism).
    Property,
    /// Public order and quality-of-life offenses.
    PublicOrder,
    /// Traffic collisions and road hazards.
    Traffic,
    /// Anything not fitting the above.
    Other,
}

impl IncidentCategory {
    /// The severity assumed for reports that carry a category but no
    /// explicit severity.
    #[must_use]
    pub const fn default_severity(self) -> IncidentSeverity {
        match self {
            Self::Violent => IncidentSeverity::High,
            Self::Property => IncidentSeverity::Moderate,
            Self::PublicOrder | Self::Traffic => IncidentSeverity::Low,
            Self::Other => IncidentSeverity::Minimal,
        }
    }

    /// Every category, in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Violent,
            Self::Property,
            Self::PublicOrder,
            Self::Traffic,
            Self::Other,
        ]
    }
}

/// A single historical incident report at a point location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// When the incident occurred.
    pub occurred_at: DateTime<Utc>,
    /// Severity level.
    pub severity: IncidentSeverity,
    /// Top-level category.
    pub category: IncidentCategory,
}
