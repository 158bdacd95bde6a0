//! Density-based incident clustering.
//!
//! DBSCAN over great-circle distances: an incident with at least
//! `min_points` neighbors (itself included) within `eps_m` meters seeds a
//! cluster, which grows by breadth-first absorption of the neighbors of
//! every dense member. Incidents that never join a cluster are noise and
//! produce no hotspot.
//!
//! Output is deterministic for a fixed input ordering: clusters are seeded
//! in input order and neighbor candidate lists are sorted by incident
//! index before expansion.

use std::collections::VecDeque;

use rstar::{AABB, RTree, primitives::GeomWithData};
use saferoute_geo::{BoundingBox, GeoPoint, haversine_m};
use saferoute_incident_models::Incident;

use crate::Hotspot;

/// How a hotspot's radius of influence is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadiusRule {
    /// Every hotspot gets the same fixed radius, in meters.
    Fixed(f64),
    /// Radius grows with intensity: `min(150 + 0.8 * intensity, 2500)`
    /// meters.
    FromIntensity,
}

impl RadiusRule {
    fn radius_m(self, intensity: f64) -> f64 {
        match self {
            Self::Fixed(meters) => meters,
            Self::FromIntensity => 0.8f64.mul_add(intensity, 150.0).min(2500.0),
        }
    }
}

/// Parameters for a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterParams {
    /// Maximum neighbor distance in meters.
    pub eps_m: f64,
    /// Minimum neighborhood size (the point itself counts) to seed a
    /// cluster.
    pub min_points: usize,
    /// When `true`, intensity is the sum of member severity values instead
    /// of the member count.
    pub severity_weighted: bool,
    /// Radius derivation rule for output hotspots.
    pub radius: RadiusRule,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps_m: 150.0,
            min_points: 5,
            severity_weighted: false,
            radius: RadiusRule::FromIntensity,
        }
    }
}

/// Result of one clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutcome {
    /// One hotspot per discovered cluster, ordered by cluster id.
    pub hotspots: Vec<Hotspot>,
    /// Incidents rejected for malformed coordinates.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Label {
    Unvisited,
    Noise,
    Cluster(usize),
}

/// Groups spatially dense incidents into hotspots, discarding sparse noise.
///
/// Incidents with non-finite or out-of-range coordinates are skipped
/// individually and counted in [`ClusterOutcome::skipped`]; they never
/// abort the run. An empty input produces an empty hotspot set.
#[must_use]
pub fn cluster(incidents: &[Incident], params: &ClusterParams) -> ClusterOutcome {
    let mut points = Vec::with_capacity(incidents.len());
    let mut skipped = 0;

    for incident in incidents {
        let point = GeoPoint::new(incident.latitude, incident.longitude);
        if point.is_valid() {
            points.push((point, f64::from(incident.severity.value())));
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} incidents with malformed coordinates");
    }

    if points.is_empty() {
        return ClusterOutcome {
            hotspots: Vec::new(),
            skipped,
        };
    }

    let tree = RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(i, (p, _))| GeomWithData::new([p.lng, p.lat], i))
            .collect(),
    );

    let mut labels = vec![Label::Unvisited; points.len()];
    let mut cluster_count = 0;

    for seed in 0..points.len() {
        if labels[seed] != Label::Unvisited {
            continue;
        }

        let seed_neighbors = neighbors(&tree, &points, seed, params.eps_m);
        if seed_neighbors.len() < params.min_points {
            labels[seed] = Label::Noise;
            continue;
        }

        let cluster_id = cluster_count;
        cluster_count += 1;
        labels[seed] = Label::Cluster(cluster_id);

        let mut queue: VecDeque<usize> = seed_neighbors.into();
        while let Some(idx) = queue.pop_front() {
            match labels[idx] {
                Label::Cluster(_) => continue,
                // Noise points are density-reachable but not dense
                // themselves; they join the cluster without expanding it.
                Label::Noise => {
                    labels[idx] = Label::Cluster(cluster_id);
                    continue;
                }
                Label::Unvisited => {
                    labels[idx] = Label::Cluster(cluster_id);
                    let idx_neighbors = neighbors(&tree, &points, idx, params.eps_m);
                    if idx_neighbors.len() >= params.min_points {
                        queue.extend(idx_neighbors);
                    }
                }
            }
        }
    }

    let mut hotspots = Vec::with_capacity(cluster_count);
    for cluster_id in 0..cluster_count {
        let members: Vec<&(GeoPoint, f64)> = labels
            .iter()
            .zip(&points)
            .filter(|(label, _)| **label == Label::Cluster(cluster_id))
            .map(|(_, point)| point)
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let count = members.len() as f64;
        let lat = members.iter().map(|(p, _)| p.lat).sum::<f64>() / count;
        let lng = members.iter().map(|(p, _)| p.lng).sum::<f64>() / count;
        let intensity = if params.severity_weighted {
            members.iter().map(|(_, severity)| severity).sum()
        } else {
            count
        };

        #[allow(clippy::cast_possible_truncation)]
        hotspots.push(Hotspot {
            id: cluster_id as u32,
            lat,
            lng,
            radius: params.radius.radius_m(intensity),
            intensity,
            member_count: members.len(),
        });
    }

    log::debug!(
        "Clustered {} incidents into {} hotspots ({} skipped)",
        points.len(),
        hotspots.len(),
        skipped
    );

    ClusterOutcome { hotspots, skipped }
}

/// Indices of all points within `eps_m` meters of `idx`, itself included,
/// sorted ascending for deterministic expansion order.
fn neighbors(
    tree: &RTree<GeomWithData<[f64; 2], usize>>,
    points: &[(GeoPoint, f64)],
    idx: usize,
    eps_m: f64,
) -> Vec<usize> {
    let center = points[idx].0;
    let bbox = BoundingBox::around(center, eps_m);
    let envelope = AABB::from_corners([bbox.west, bbox.south], [bbox.east, bbox.north]);

    let mut found: Vec<usize> = tree
        .locate_in_envelope_intersecting(&envelope)
        .map(|entry| entry.data)
        .filter(|&candidate| haversine_m(center, points[candidate].0) <= eps_m)
        .collect();
    found.sort_unstable();
    found
}
