//! Hotspot feed sources.
//!
//! The routing core consumes hotspots through the [`HotspotSource`] trait
//! rather than reading files per-request, so tests can inject fixtures and
//! the refresh loop stays the only place that touches I/O.

use std::path::PathBuf;

use crate::{Hotspot, HotspotError};

/// A repository of hotspots refreshed out-of-band, not per-request.
pub trait HotspotSource: Send + Sync {
    /// Loads the full current hotspot set.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying feed cannot be read or parsed.
    fn load(&self) -> Result<Vec<Hotspot>, HotspotError>;
}

/// Loads hotspots from a JSON feed file.
///
/// Expected format is a flat array of
/// `{ "lat": .., "lng": .., "radius": .., "intensity": .. }` objects.
/// Ids are reassigned sequentially so every snapshot has unique ids even
/// when the feed omits them.
pub struct JsonFeedSource {
    path: PathBuf,
}

impl JsonFeedSource {
    /// Creates a source reading from the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HotspotSource for JsonFeedSource {
    fn load(&self) -> Result<Vec<Hotspot>, HotspotError> {
        let contents = std::fs::read_to_string(&self.path)?;
        let mut hotspots: Vec<Hotspot> = serde_json::from_str(&contents)?;

        for (i, hotspot) in hotspots.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            {
                hotspot.id = i as u32;
            }
        }

        log::debug!(
            "Loaded {} hotspots from {}",
            hotspots.len(),
            self.path.display()
        );
        Ok(hotspots)
    }
}

/// A fixed in-memory hotspot set, for tests and embedding.
pub struct InMemorySource {
    hotspots: Vec<Hotspot>,
}

impl InMemorySource {
    /// Creates a source that always returns the given hotspots.
    #[must_use]
    pub const fn new(hotspots: Vec<Hotspot>) -> Self {
        Self { hotspots }
    }
}

impl HotspotSource for InMemorySource {
    fn load(&self) -> Result<Vec<Hotspot>, HotspotError> {
        Ok(self.hotspots.clone())
    }
}
