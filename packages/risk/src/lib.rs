#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory risk field over a hotspot snapshot.
//!
//! Answers "what additional cost should routing incur here" for arbitrary
//! points. Hotspots are indexed in an R-tree once per snapshot so the
//! per-point query (called once per expanded search node, potentially tens
//! of thousands of times per route) is an envelope lookup plus an exact
//! haversine check per candidate.
//!
//! The same field instance scores finished paths, so search-time penalties
//! and result scoring can never diverge.

use std::collections::BTreeSet;
use std::sync::Arc;

use rstar::{AABB, Envelope, PointDistance, RTree, RTreeObject};
use saferoute_geo::{BoundingBox, GeoPoint, haversine_m};
use saferoute_hotspot::{Hotspot, HotspotSnapshot};
use serde::{Deserialize, Serialize};

/// How a hotspot penalizes points inside its radius.
///
/// Both semantics are implemented and selectable; [`PenaltyModel::FlatTier`]
/// is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PenaltyModel {
    /// The full tier weight applies anywhere inside the radius.
    FlatTier,
    /// The tier weight decays linearly from full at the center to zero at
    /// the radius edge.
    LinearDecay,
}

/// Intensity tier thresholds and the additive penalty weight per tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyConfig {
    /// Within-radius penalty semantics.
    pub model: PenaltyModel,
    /// Intensity above which a hotspot is critical.
    pub critical_threshold: f64,
    /// Intensity above which a hotspot is high.
    pub high_threshold: f64,
    /// Intensity above which a hotspot is medium.
    pub medium_threshold: f64,
    /// Additive penalty for critical hotspots.
    pub critical_weight: f64,
    /// Additive penalty for high hotspots.
    pub high_weight: f64,
    /// Additive penalty for medium hotspots.
    pub medium_weight: f64,
    /// Additive penalty for everything else.
    pub low_weight: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            model: PenaltyModel::FlatTier,
            critical_threshold: 200.0,
            high_threshold: 100.0,
            medium_threshold: 40.0,
            critical_weight: 30.0,
            high_weight: 15.0,
            medium_weight: 5.0,
            low_weight: 1.0,
        }
    }
}

impl PenaltyConfig {
    /// The full tier weight for a hotspot of the given intensity.
    #[must_use]
    pub fn tier_weight(&self, intensity: f64) -> f64 {
        if intensity > self.critical_threshold {
            self.critical_weight
        } else if intensity > self.high_threshold {
            self.high_weight
        } else if intensity > self.medium_threshold {
            self.medium_weight
        } else {
            self.low_weight
        }
    }
}

/// A hotspot stored in the R-tree with its precomputed influence envelope.
struct HotspotEntry {
    envelope: AABB<[f64; 2]>,
    hotspot: Hotspot,
}

impl RTreeObject for HotspotEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for HotspotEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope.distance_2(point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.envelope.contains_point(point)
    }
}

/// Spatially indexed view of one hotspot snapshot.
///
/// Construction is per-snapshot, not per-request: a routing request grabs
/// the current snapshot `Arc` once and builds (or reuses) a field from it.
pub struct RiskField {
    tree: RTree<HotspotEntry>,
    config: PenaltyConfig,
    version: u64,
}

impl RiskField {
    /// Builds the index over all valid hotspots in the snapshot.
    #[must_use]
    pub fn new(snapshot: &Arc<HotspotSnapshot>, config: PenaltyConfig) -> Self {
        let entries: Vec<HotspotEntry> = snapshot
            .hotspots
            .iter()
            .filter(|h| h.is_valid())
            .map(|hotspot| {
                let bbox = BoundingBox::around(hotspot.center(), hotspot.radius);
                HotspotEntry {
                    envelope: AABB::from_corners(
                        [bbox.west, bbox.south],
                        [bbox.east, bbox.north],
                    ),
                    hotspot: hotspot.clone(),
                }
            })
            .collect();

        log::debug!(
            "Built risk field over {} hotspots (snapshot v{})",
            entries.len(),
            snapshot.version
        );

        Self {
            tree: RTree::bulk_load(entries),
            config,
            version: snapshot.version,
        }
    }

    /// Version of the snapshot this field was built from.
    #[must_use]
    pub const fn snapshot_version(&self) -> u64 {
        self.version
    }

    /// Number of indexed hotspots.
    #[must_use]
    pub fn hotspot_count(&self) -> usize {
        self.tree.size()
    }

    /// Additive routing penalty for being at `point`.
    ///
    /// Contributions from all hotspots whose radius contains the point are
    /// summed; a point outside every hotspot costs zero.
    #[must_use]
    pub fn penalty_at(&self, point: GeoPoint) -> f64 {
        let mut penalty = 0.0;

        for entry in self.tree.locate_all_at_point(&[point.lng, point.lat]) {
            let dist = haversine_m(point, entry.hotspot.center());
            if dist > entry.hotspot.radius {
                continue;
            }

            let weight = self.config.tier_weight(entry.hotspot.intensity);
            penalty += match self.config.model {
                PenaltyModel::FlatTier => weight,
                PenaltyModel::LinearDecay => {
                    if entry.hotspot.radius <= 0.0 {
                        weight
                    } else {
                        weight * (1.0 - dist / entry.hotspot.radius)
                    }
                }
            };
        }

        penalty
    }

    /// Total penalty accumulated over a point sequence.
    ///
    /// This is the one shared path scorer; both search results and any
    /// external path validation go through it.
    #[must_use]
    pub fn score_path(&self, points: &[GeoPoint]) -> f64 {
        points.iter().map(|&p| self.penalty_at(p)).sum()
    }

    /// Ids of hotspots whose radius contains at least one of the points.
    #[must_use]
    pub fn hotspots_within_range(&self, points: &[GeoPoint]) -> BTreeSet<u32> {
        let mut touched = BTreeSet::new();

        for &point in points {
            for entry in self.tree.locate_all_at_point(&[point.lng, point.lat]) {
                if haversine_m(point, entry.hotspot.center()) <= entry.hotspot.radius {
                    touched.insert(entry.hotspot.id);
                }
            }
        }

        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(hotspots: Vec<Hotspot>) -> Arc<HotspotSnapshot> {
        Arc::new(HotspotSnapshot {
            version: 1,
            hotspots,
        })
    }

    fn hotspot(id: u32, lat: f64, lng: f64, radius: f64, intensity: f64) -> Hotspot {
        Hotspot {
            id,
            lat,
            lng,
            radius,
            intensity,
            member_count: 0,
        }
    }

    #[test]
    fn zero_penalty_outside_all_hotspots() {
        let field = RiskField::new(
            &snapshot(vec![hotspot(0, 12.97, 77.59, 200.0, 250.0)]),
            PenaltyConfig::default(),
        );

        // ~5km away
        let far = GeoPoint::new(13.015, 77.59);
        assert!(field.penalty_at(far).abs() < f64::EPSILON);
    }

    #[test]
    fn flat_tier_weights_by_intensity() {
        let config = PenaltyConfig::default();
        let center = GeoPoint::new(12.97, 77.59);

        for (intensity, expected) in [(250.0, 30.0), (150.0, 15.0), (50.0, 5.0), (10.0, 1.0)] {
            let field = RiskField::new(
                &snapshot(vec![hotspot(0, 12.97, 77.59, 200.0, intensity)]),
                config,
            );
            assert!(
                (field.penalty_at(center) - expected).abs() < f64::EPSILON,
                "intensity {intensity} expected {expected}"
            );
        }
    }

    #[test]
    fn overlapping_hotspots_sum() {
        let field = RiskField::new(
            &snapshot(vec![
                hotspot(0, 12.97, 77.59, 300.0, 250.0),
                hotspot(1, 12.9705, 77.5905, 300.0, 50.0),
            ]),
            PenaltyConfig::default(),
        );

        let inside_both = GeoPoint::new(12.9702, 77.5902);
        assert!((field.penalty_at(inside_both) - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn linear_decay_full_at_center_zero_at_edge() {
        let config = PenaltyConfig {
            model: PenaltyModel::LinearDecay,
            ..PenaltyConfig::default()
        };
        let field = RiskField::new(&snapshot(vec![hotspot(0, 12.97, 77.59, 500.0, 250.0)]), config);

        let center = GeoPoint::new(12.97, 77.59);
        assert!((field.penalty_at(center) - 30.0).abs() < 1e-6);

        // ~250m north of center: half the radius, so half the weight
        let halfway = GeoPoint::new(12.97 + 250.0 / 111_320.0, 77.59);
        let p = field.penalty_at(halfway);
        assert!((p - 15.0).abs() < 0.5, "halfway penalty was {p}");

        // just outside the radius
        let outside = GeoPoint::new(12.97 + 520.0 / 111_320.0, 77.59);
        assert!(field.penalty_at(outside).abs() < f64::EPSILON);
    }

    #[test]
    fn flat_dominates_decay_inside_radius() {
        let snap = snapshot(vec![hotspot(0, 12.97, 77.59, 400.0, 250.0)]);
        let flat = RiskField::new(&snap, PenaltyConfig::default());
        let decayed = RiskField::new(
            &snap,
            PenaltyConfig {
                model: PenaltyModel::LinearDecay,
                ..PenaltyConfig::default()
            },
        );

        let interior = GeoPoint::new(12.9715, 77.59);
        assert!(flat.penalty_at(interior) >= decayed.penalty_at(interior));
    }

    #[test]
    fn score_path_non_decreasing_with_more_hotspots() {
        let path: Vec<GeoPoint> = (0..10)
            .map(|i| GeoPoint::new(12.97 + f64::from(i) * 0.0005, 77.59))
            .collect();

        let sparse = RiskField::new(
            &snapshot(vec![hotspot(0, 12.971, 77.59, 200.0, 120.0)]),
            PenaltyConfig::default(),
        );
        let dense = RiskField::new(
            &snapshot(vec![
                hotspot(0, 12.971, 77.59, 200.0, 120.0),
                hotspot(1, 12.973, 77.59, 200.0, 250.0),
            ]),
            PenaltyConfig::default(),
        );

        let sparse_score = sparse.score_path(&path);
        let dense_score = dense.score_path(&path);
        assert!(sparse_score >= 0.0);
        assert!(dense_score >= sparse_score);
    }

    #[test]
    fn hotspots_within_range_reports_ids() {
        let field = RiskField::new(
            &snapshot(vec![
                hotspot(3, 12.97, 77.59, 200.0, 120.0),
                hotspot(9, 13.05, 77.70, 200.0, 120.0),
            ]),
            PenaltyConfig::default(),
        );

        let touched = field.hotspots_within_range(&[GeoPoint::new(12.9701, 77.5901)]);
        assert!(touched.contains(&3));
        assert!(!touched.contains(&9));
    }

    #[test]
    fn invalid_hotspots_are_not_indexed() {
        let field = RiskField::new(
            &snapshot(vec![
                hotspot(0, 12.97, 77.59, 200.0, 120.0),
                hotspot(1, f64::NAN, 77.59, 200.0, 120.0),
                hotspot(2, 12.97, 77.59, -10.0, 120.0),
            ]),
            PenaltyConfig::default(),
        );

        assert_eq!(field.hotspot_count(), 1);
    }
}
