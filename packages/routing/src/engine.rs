//! Risk-weighted best-first search over the implicit grid.
//!
//! The accumulated cost `g` of a node is real-world meters walked plus
//! the risk penalty of every cell entered; the priority adds a haversine
//! straight-line estimate to the goal. Because penalties are non-negative,
//! the heuristic lower-bounds only the distance term, so the search trades
//! strict optimality for safer paths.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use saferoute_geo::{BoundingBox, GeoPoint, haversine_m};
use saferoute_risk::RiskField;
use saferoute_routing_models::{RoutePoint, RouteResult};

use crate::grid::GridCell;
use crate::postprocess::{self, SmoothingConfig};
use crate::{RouteError, polyline};

/// Neighbor expansion scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Edge-adjacent moves only.
    Four,
    /// Edge- and corner-adjacent moves.
    Eight,
}

/// Pathfinding engine configuration.
///
/// All distances are meters; the grid step is angular degrees
/// (0.001° ≈ 111 m of latitude), trading path resolution against node
/// count.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    /// Angular grid resolution in degrees.
    pub grid_step_deg: f64,
    /// Neighbor expansion scheme.
    pub connectivity: Connectivity,
    /// Popping a node within this many meters of the exact end terminates
    /// the search.
    pub goal_tolerance_m: f64,
    /// Requests whose start-end great-circle distance exceeds this are
    /// rejected before any search.
    pub max_route_distance_m: f64,
    /// Node-expansion budget; exceeding it aborts the search.
    pub max_expanded_nodes: usize,
    /// Extra padding in meters added to half the direct distance when
    /// bounding the searchable area.
    pub search_margin_m: f64,
    /// Interval in meters at which the straight start-end line is sampled
    /// for the avoided-hotspot comparison.
    pub straight_line_sample_m: f64,
    /// Post-processing tuning.
    pub smoothing: SmoothingConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            grid_step_deg: 0.001,
            connectivity: Connectivity::Eight,
            goal_tolerance_m: 25.0,
            max_route_distance_m: 50_000.0,
            max_expanded_nodes: 500_000,
            search_margin_m: 1_000.0,
            straight_line_sample_m: 25.0,
            smoothing: SmoothingConfig::default(),
        }
    }
}

/// A queued search node ordered by lowest priority first.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cell: GridCell,
    priority: f64,
}

impl Eq for SearchNode {}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The pathfinding engine.
pub struct Router {
    config: RouterConfig,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl Router {
    /// Creates a router with the given configuration.
    #[must_use]
    pub const fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Computes a risk-aware route from `start` to `end` against the given
    /// risk field.
    ///
    /// # Errors
    ///
    /// * [`RouteError::InvalidCoordinate`] for out-of-range inputs.
    /// * [`RouteError::DistanceTooFar`] when the request exceeds the
    ///   configured ceiling (checked before any search).
    /// * [`RouteError::NoPathFound`] when the open set empties.
    /// * [`RouteError::SearchBudgetExceeded`] when the expansion budget is
    ///   hit.
    pub fn route(
        &self,
        field: &RiskField,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<RouteResult, RouteError> {
        for point in [start, end] {
            if !point.is_valid() {
                return Err(RouteError::InvalidCoordinate {
                    lat: point.lat,
                    lng: point.lng,
                });
            }
        }

        let direct_m = haversine_m(start, end);
        if direct_m > self.config.max_route_distance_m {
            return Err(RouteError::DistanceTooFar {
                meters: direct_m,
                ceiling_m: self.config.max_route_distance_m,
            });
        }

        let raw = if direct_m <= self.config.goal_tolerance_m {
            // Degenerate request inside a single cell's reach: no search.
            vec![start, end]
        } else {
            self.search(field, start, end)?
        };

        let processed = postprocess::process(&raw, &self.config.smoothing);
        Ok(self.finish(field, start, end, processed))
    }

    fn search(
        &self,
        field: &RiskField,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Vec<GeoPoint>, RouteError> {
        let step = self.config.grid_step_deg;
        let start_cell = GridCell::snap(start, step);
        let end_cell = GridCell::snap(end, step);

        // Bound the searchable area so a pathological request cannot
        // wander arbitrarily far from the corridor before the node budget
        // trips.
        let margin_m = haversine_m(start, end).mul_add(0.5, self.config.search_margin_m);
        let bounds = search_bounds(start, end, margin_m);

        let mut open = BinaryHeap::new();
        let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
        let mut g_scores: HashMap<GridCell, f64> = HashMap::new();
        let mut closed: HashSet<GridCell> = HashSet::new();

        g_scores.insert(start_cell, 0.0);
        open.push(SearchNode {
            cell: start_cell,
            priority: haversine_m(start_cell.center(step), end),
        });

        let mut expanded = 0usize;

        while let Some(SearchNode { cell: current, .. }) = open.pop() {
            if closed.contains(&current) {
                continue;
            }
            closed.insert(current);

            expanded += 1;
            if expanded > self.config.max_expanded_nodes {
                log::debug!("Search budget exceeded after {expanded} nodes");
                return Err(RouteError::SearchBudgetExceeded { expanded });
            }

            let current_center = current.center(step);
            if current == end_cell
                || haversine_m(current_center, end) <= self.config.goal_tolerance_m
            {
                log::debug!(
                    "Route found after expanding {expanded} nodes ({} in open set)",
                    open.len()
                );
                return Ok(reconstruct(&came_from, current, start, end, step));
            }

            // neighbors_8 lists the four edge-adjacent cells first
            let all_neighbors = current.neighbors_8();
            let neighbors = match self.config.connectivity {
                Connectivity::Four => &all_neighbors[..4],
                Connectivity::Eight => &all_neighbors[..],
            };

            for &neighbor in neighbors {
                if closed.contains(&neighbor) {
                    continue;
                }

                let neighbor_center = neighbor.center(step);
                if !bounds.contains(neighbor_center) {
                    continue;
                }

                let edge_m = haversine_m(current_center, neighbor_center);
                let penalty = field.penalty_at(neighbor_center);
                let tentative = g_scores[&current] + edge_m + penalty;

                let best = g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative < best {
                    g_scores.insert(neighbor, tentative);
                    came_from.insert(neighbor, current);
                    open.push(SearchNode {
                        cell: neighbor,
                        priority: tentative + haversine_m(neighbor_center, end),
                    });
                }
            }
        }

        log::debug!("Open set exhausted after expanding {expanded} nodes");
        Err(RouteError::NoPathFound)
    }

    /// Scores the final path and assembles the result.
    fn finish(
        &self,
        field: &RiskField,
        start: GeoPoint,
        end: GeoPoint,
        points: Vec<GeoPoint>,
    ) -> RouteResult {
        let risk_score = field.score_path(&points);

        let straight = sample_line(start, end, self.config.straight_line_sample_m);
        let threatened = field.hotspots_within_range(&straight);
        let touched = field.hotspots_within_range(&points);
        let avoided_hotspots = threatened.difference(&touched).count();

        let route_points: Vec<RoutePoint> = points.into_iter().map(RoutePoint::from).collect();
        let encoded = polyline::encode(&route_points);

        RouteResult {
            points: route_points,
            polyline: encoded,
            risk_score,
            avoided_hotspots,
        }
    }
}

/// Walks parent pointers back to the start, reverses, and stitches the
/// exact requested endpoints onto the discrete path.
fn reconstruct(
    came_from: &HashMap<GridCell, GridCell>,
    goal: GridCell,
    start: GeoPoint,
    end: GeoPoint,
    step: f64,
) -> Vec<GeoPoint> {
    let mut cells = vec![goal];
    let mut cursor = goal;
    while let Some(&parent) = came_from.get(&cursor) {
        cells.push(parent);
        cursor = parent;
    }
    cells.reverse();

    let mut points: Vec<GeoPoint> = cells.into_iter().map(|c| c.center(step)).collect();
    if let Some(first) = points.first_mut() {
        *first = start;
    }
    points.push(end);
    points
}

/// The searchable area: the start-end envelope padded by `margin_m`.
fn search_bounds(start: GeoPoint, end: GeoPoint, margin_m: f64) -> BoundingBox {
    let a = BoundingBox::around(start, margin_m);
    let b = BoundingBox::around(end, margin_m);
    BoundingBox::new(
        a.west.min(b.west),
        a.south.min(b.south),
        a.east.max(b.east),
        a.north.max(b.north),
    )
}

/// Evenly sampled points along the straight start-end line, endpoints
/// included.
fn sample_line(start: GeoPoint, end: GeoPoint, sample_m: f64) -> Vec<GeoPoint> {
    let total = haversine_m(start, end);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let segments = ((total / sample_m.max(1.0)).ceil() as usize).max(1);

    (0..=segments)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / segments as f64;
            GeoPoint::new(
                (end.lat - start.lat).mul_add(t, start.lat),
                (end.lng - start.lng).mul_add(t, start.lng),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use saferoute_hotspot::{Hotspot, HotspotSnapshot};
    use saferoute_risk::PenaltyConfig;

    use super::*;

    fn field_with(hotspots: Vec<Hotspot>) -> RiskField {
        RiskField::new(
            &Arc::new(HotspotSnapshot {
                version: 1,
                hotspots,
            }),
            PenaltyConfig::default(),
        )
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

    fn path_length_m(points: &[RoutePoint]) -> f64 {
        points
            .windows(2)
            .map(|w| haversine_m(GeoPoint::from(w[0]), GeoPoint::from(w[1])))
            .sum()
    }

    #[test]
    fn rejects_invalid_coordinates() {
        let router = Router::default();
        let field = field_with(vec![]);

        let err = router
            .route(&field, GeoPoint::new(99.0, 77.59), GeoPoint::new(12.97, 77.60))
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidCoordinate { .. }));

        let err = router
            .route(
                &field,
                GeoPoint::new(12.97, 77.59),
                GeoPoint::new(f64::NAN, 77.60),
            )
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidCoordinate { .. }));
    }

    #[test]
    fn rejects_requests_beyond_distance_ceiling() {
        let router = Router::default();
        let field = field_with(vec![]);

        // Bangalore to Chennai, ~290km
        let err = router
            .route(
                &field,
                GeoPoint::new(12.9716, 77.5946),
                GeoPoint::new(13.0827, 80.2707),
            )
            .unwrap_err();

        match err {
            RouteError::DistanceTooFar { meters, ceiling_m } => {
                assert!(meters > ceiling_m);
                assert!((ceiling_m - 50_000.0).abs() < f64::EPSILON);
            }
            other => panic!("expected DistanceTooFar, got {other:?}"),
        }
    }

    #[test]
    fn nearby_points_get_direct_route() {
        let router = Router::default();
        let field = field_with(vec![]);

        // ~20m apart, within a single grid cell
        let start = GeoPoint::new(12.971_04, 77.594_02);
        let end = GeoPoint::new(12.971_16, 77.594_13);

        let route = router.route(&field, start, end).unwrap();

        assert_eq!(route.points.len(), 2);
        assert_eq!(route.points[0], RoutePoint::from(start));
        assert_eq!(route.points[1], RoutePoint::from(end));
        assert_eq!(route.avoided_hotspots, 0);
        assert!(route.risk_score.abs() < f64::EPSILON);
    }

    #[test]
    fn finds_route_with_pinned_endpoints() {
        let router = Router::default();
        let field = field_with(vec![]);

        let start = GeoPoint::new(12.9716, 77.5946);
        let end = GeoPoint::new(12.9800, 77.6010);

        let route = router.route(&field, start, end).unwrap();

        assert!(route.points.len() >= 2);
        assert_eq!(route.points[0], RoutePoint::from(start));
        assert_eq!(route.points[route.points.len() - 1], RoutePoint::from(end));
        assert!(route.risk_score >= 0.0);

        // Roughly direct in the absence of hotspots
        let direct = haversine_m(start, end);
        assert!(path_length_m(&route.points) < direct * 1.35);
    }

    #[test]
    fn detours_around_critical_hotspot() {
        let config = RouterConfig {
            grid_step_deg: 0.0002,
            ..RouterConfig::default()
        };
        let router = Router::new(config);

        let start = GeoPoint::new(12.97, 77.5900);
        let end = GeoPoint::new(12.97, 77.5960);
        let blocker = hotspot(0, 12.97, 77.5930, 70.0, 250.0);
        let field = field_with(vec![blocker]);

        let route = router.route(&field, start, end).unwrap();

        let straight = sample_line(start, end, 10.0);
        let straight_score = field.score_path(&straight);

        // The straight line runs through the hotspot; the computed route
        // must be both longer and markedly safer.
        assert!(straight_score > 0.0);
        assert!(route.risk_score < straight_score);
        assert_eq!(route.avoided_hotspots, 1);

        let direct = haversine_m(start, end);
        assert!(path_length_m(&route.points) > direct);
    }

    #[test]
    fn no_path_when_search_area_excludes_every_cell() {
        let config = RouterConfig {
            search_margin_m: 0.0,
            ..RouterConfig::default()
        };
        let router = Router::new(config);
        let field = field_with(vec![]);

        // Same latitude, exactly between two grid lines: with no margin
        // the searchable area is a sliver no cell center falls inside, so
        // the open set drains without reaching the goal.
        let start = GeoPoint::new(12.9705, 77.5900);
        let end = GeoPoint::new(12.9705, 77.5906);

        let err = router.route(&field, start, end).unwrap_err();
        assert!(matches!(err, RouteError::NoPathFound));
    }

    #[test]
    fn budget_exhaustion_is_reported() {
        let config = RouterConfig {
            max_expanded_nodes: 10,
            ..RouterConfig::default()
        };
        let router = Router::new(config);
        let field = field_with(vec![]);

        let err = router
            .route(
                &field,
                GeoPoint::new(12.9716, 77.5946),
                GeoPoint::new(12.9352, 77.6245),
            )
            .unwrap_err();

        assert!(matches!(err, RouteError::SearchBudgetExceeded { expanded } if expanded > 10));
    }

    #[test]
    fn risk_score_uses_the_shared_scorer() {
        let router = Router::default();
        let spot = hotspot(0, 12.9758, 77.5978, 400.0, 250.0);
        let field = field_with(vec![spot]);

        let start = GeoPoint::new(12.9716, 77.5946);
        let end = GeoPoint::new(12.9800, 77.6010);

        let route = router.route(&field, start, end).unwrap();

        let geo_points: Vec<GeoPoint> = route.points.iter().map(|&p| p.into()).collect();
        assert!((route.risk_score - field.score_path(&geo_points)).abs() < 1e-9);
    }

    #[test]
    fn polyline_matches_points() {
        let router = Router::default();
        let field = field_with(vec![]);

        let route = router
            .route(
                &field,
                GeoPoint::new(12.9716, 77.5946),
                GeoPoint::new(12.9770, 77.5990),
            )
            .unwrap();

        let decoded = polyline::decode(&route.polyline).unwrap();
        assert_eq!(decoded.len(), route.points.len());
        for (d, p) in decoded.iter().zip(&route.points) {
            assert!((d.lat - p.lat).abs() < 1e-5);
            assert!((d.lng - p.lng).abs() < 1e-5);
        }
    }
}
