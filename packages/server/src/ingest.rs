//! Incident-file ingestion.
//!
//! Lets a deployment point the server at a raw incident export instead of
//! a pre-clustered hotspot feed: each refresh re-reads the file and runs
//! the clustering pipeline, so hotspots track the incident data without a
//! separate batch job.

use std::path::PathBuf;

use saferoute_hotspot::{ClusterParams, Hotspot, HotspotError, HotspotSource, cluster};
use saferoute_incident_models::Incident;

/// A [`HotspotSource`] that clusters a JSON incident file on every load.
pub struct IncidentClusterSource {
    path: PathBuf,
    params: ClusterParams,
}

impl IncidentClusterSource {
    /// Creates a source over the given incident file with explicit
    /// clustering parameters.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, params: ClusterParams) -> Self {
        Self {
            path: path.into(),
            params,
        }
    }

    /// Creates a source with parameters taken from the environment:
    /// `CLUSTER_EPS_M` and `CLUSTER_MIN_POINTS` override the defaults,
    /// `CLUSTER_SEVERITY_WEIGHTED=1` switches intensity from member count
    /// to summed severity.
    #[must_use]
    pub fn from_env(path: impl Into<PathBuf>) -> Self {
        let mut params = ClusterParams::default();

        if let Some(eps) = env_parse::<f64>("CLUSTER_EPS_M") {
            params.eps_m = eps;
        }
        if let Some(min_points) = env_parse::<usize>("CLUSTER_MIN_POINTS") {
            params.min_points = min_points;
        }
        if std::env::var("CLUSTER_SEVERITY_WEIGHTED").is_ok_and(|v| v == "1") {
            params.severity_weighted = true;
        }

        Self::new(path, params)
    }
}

impl HotspotSource for IncidentClusterSource {
    fn load(&self) -> Result<Vec<Hotspot>, HotspotError> {
        let contents = std::fs::read_to_string(&self.path)?;
        let incidents: Vec<Incident> = serde_json::from_str(&contents)?;

        let outcome = cluster(&incidents, &self.params);
        log::info!(
            "Clustered {} incidents from {} into {} hotspots ({} skipped)",
            incidents.len(),
            self.path.display(),
            outcome.hotspots.len(),
            outcome.skipped
        );

        Ok(outcome.hotspots)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
