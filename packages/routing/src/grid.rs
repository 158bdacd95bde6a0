//! Implicit geographic grid for search-node identity.
//!
//! Continuous coordinates are discretized by a fixed angular step
//! (0.001° ≈ 111 m of latitude by default). Cells are plain integer index
//! pairs, so the search's hot loop hashes two `i32`s instead of allocating
//! stringified coordinates. A cell maps deterministically to exactly one
//! (lat, lng) bucket and back to its center point; cells are never
//! persisted.

use saferoute_geo::GeoPoint;

/// A discretized grid cell identified by integer latitude/longitude
/// indices at a fixed step size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Latitude index (`round(lat / step)`).
    pub lat_idx: i32,
    /// Longitude index (`round(lng / step)`).
    pub lng_idx: i32,
}

impl GridCell {
    /// Snaps a continuous coordinate to its nearest grid cell.
    #[must_use]
    pub fn snap(point: GeoPoint, step_deg: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self {
            lat_idx: (point.lat / step_deg).round() as i32,
            lng_idx: (point.lng / step_deg).round() as i32,
        }
    }

    /// The continuous-space center of this cell.
    #[must_use]
    pub fn center(self, step_deg: f64) -> GeoPoint {
        GeoPoint::new(
            f64::from(self.lat_idx) * step_deg,
            f64::from(self.lng_idx) * step_deg,
        )
    }

    /// The four edge-adjacent neighbor cells.
    #[must_use]
    pub const fn neighbors_4(self) -> [Self; 4] {
        let Self { lat_idx, lng_idx } = self;
        [
            Self {
                lat_idx: lat_idx + 1,
                lng_idx,
            },
            Self {
                lat_idx: lat_idx - 1,
                lng_idx,
            },
            Self {
                lat_idx,
                lng_idx: lng_idx + 1,
            },
            Self {
                lat_idx,
                lng_idx: lng_idx - 1,
            },
        ]
    }

    /// The eight surrounding neighbor cells (edge- then corner-adjacent).
    #[must_use]
    pub const fn neighbors_8(self) -> [Self; 8] {
        let Self { lat_idx, lng_idx } = self;
        [
            Self {
                lat_idx: lat_idx + 1,
                lng_idx,
            },
            Self {
                lat_idx: lat_idx - 1,
                lng_idx,
            },
            Self {
                lat_idx,
                lng_idx: lng_idx + 1,
            },
            Self {
                lat_idx,
                lng_idx: lng_idx - 1,
            },
            Self {
                lat_idx: lat_idx + 1,
                lng_idx: lng_idx + 1,
            },
            Self {
                lat_idx: lat_idx + 1,
                lng_idx: lng_idx - 1,
            },
            Self {
                lat_idx: lat_idx - 1,
                lng_idx: lng_idx + 1,
            },
            Self {
                lat_idx: lat_idx - 1,
                lng_idx: lng_idx - 1,
            },
        ]
    }
}
