//! Versioned hotspot snapshot storage.
//!
//! Route computations must never observe a partially updated hotspot set,
//! so the currently published set lives behind an `Arc` that is swapped
//! wholesale. Readers grab the `Arc` once per request and keep using it
//! even if a refresh publishes a newer snapshot mid-search.

use std::sync::{Arc, RwLock};

use crate::Hotspot;

/// An immutable, versioned hotspot set.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotSnapshot {
    /// Monotonically increasing snapshot version, starting at 0 for the
    /// empty initial snapshot.
    pub version: u64,
    /// The published hotspots.
    pub hotspots: Vec<Hotspot>,
}

impl HotspotSnapshot {
    /// The empty initial snapshot.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            version: 0,
            hotspots: Vec::new(),
        }
    }
}

/// Holds the currently published [`HotspotSnapshot`] and swaps it
/// atomically on refresh.
pub struct HotspotStore {
    current: RwLock<Arc<HotspotSnapshot>>,
}

impl Default for HotspotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HotspotStore {
    /// Creates a store holding the empty snapshot (version 0).
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(HotspotSnapshot::empty())),
        }
    }

    /// Returns the currently published snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn current(&self) -> Arc<HotspotSnapshot> {
        Arc::clone(&self.current.read().expect("hotspot store lock poisoned"))
    }

    /// Publishes a full replacement hotspot set and returns the new
    /// version. Hotspots failing their invariants (NaN center, negative
    /// radius or intensity) are dropped with a warning.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn publish(&self, hotspots: Vec<Hotspot>) -> u64 {
        let before = hotspots.len();
        let hotspots: Vec<Hotspot> = hotspots.into_iter().filter(Hotspot::is_valid).collect();
        if hotspots.len() < before {
            log::warn!(
                "Dropped {} invalid hotspots before publishing",
                before - hotspots.len()
            );
        }

        let mut guard = self.current.write().expect("hotspot store lock poisoned");
        let version = guard.version + 1;
        *guard = Arc::new(HotspotSnapshot { version, hotspots });
        log::info!(
            "Published hotspot snapshot v{version} ({} hotspots)",
            guard.hotspots.len()
        );
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotspot(id: u32, intensity: f64) -> Hotspot {
        Hotspot {
            id,
            lat: 12.97,
            lng: 77.59,
            radius: 200.0,
            intensity,
            member_count: 5,
        }
    }

    #[test]
    fn starts_empty_at_version_zero() {
        let store = HotspotStore::new();
        let snapshot = store.current();
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.hotspots.is_empty());
    }

    #[test]
    fn publish_replaces_wholesale_and_bumps_version() {
        let store = HotspotStore::new();

        let v1 = store.publish(vec![hotspot(0, 50.0), hotspot(1, 120.0)]);
        assert_eq!(v1, 1);
        assert_eq!(store.current().hotspots.len(), 2);

        let v2 = store.publish(vec![hotspot(0, 10.0)]);
        assert_eq!(v2, 2);
        let snapshot = store.current();
        assert_eq!(snapshot.hotspots.len(), 1);
        assert!((snapshot.hotspots[0].intensity - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn readers_keep_old_snapshot_across_publish() {
        let store = HotspotStore::new();
        store.publish(vec![hotspot(0, 50.0)]);

        let held = store.current();
        store.publish(vec![]);

        assert_eq!(held.version, 1);
        assert_eq!(held.hotspots.len(), 1);
        assert_eq!(store.current().version, 2);
    }

    #[test]
    fn invalid_hotspots_are_dropped_on_publish() {
        let store = HotspotStore::new();
        let mut bad = hotspot(1, 50.0);
        bad.radius = -5.0;
        let mut nan_center = hotspot(2, 50.0);
        nan_center.lat = f64::NAN;

        store.publish(vec![hotspot(0, 50.0), bad, nan_center]);

        assert_eq!(store.current().hotspots.len(), 1);
    }
}
