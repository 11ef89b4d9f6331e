//! Distance/azimuth service.

use std::collections::HashMap;
use std::sync::RwLock;

use super::types::{FaultSection, SectionId};
use super::util::{azimuth_deg, polyline_distance};

/// Distance (km) and azimuth (degrees) between two sections.
///
/// Queried from many worker threads during connection building, hence
/// `Send + Sync`. Distances must be symmetric; `+inf` means "unreachable".
pub trait DistAzCalc: Send + Sync {
    fn distance(&self, a: &FaultSection, b: &FaultSection) -> f64;
    fn azimuth(&self, a: &FaultSection, b: &FaultSection) -> f64;
}

#[inline]
fn unordered(a: SectionId, b: SectionId) -> (SectionId, SectionId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Geometric calculator with memoization.
///
/// Distance is the minimum trace-to-trace distance; azimuth runs from the
/// midpoint of `a` to the midpoint of `b`. A poisoned cache lock only disables
/// caching; values are recomputed.
#[derive(Debug, Default)]
pub struct SectionDistAzCalc {
    dist_cache: RwLock<HashMap<(SectionId, SectionId), f64>>,
    az_cache: RwLock<HashMap<(SectionId, SectionId), f64>>,
}

impl SectionDistAzCalc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized distances.
    pub fn cache_len(&self) -> usize {
        self.dist_cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl DistAzCalc for SectionDistAzCalc {
    fn distance(&self, a: &FaultSection, b: &FaultSection) -> f64 {
        if a.id == b.id {
            return 0.0;
        }
        let key = unordered(a.id, b.id);
        if let Some(d) = self.dist_cache.read().ok().and_then(|c| c.get(&key).copied()) {
            return d;
        }
        let d = polyline_distance(&a.trace, &b.trace);
        if let Ok(mut cache) = self.dist_cache.write() {
            cache.insert(key, d);
        }
        d
    }

    fn azimuth(&self, a: &FaultSection, b: &FaultSection) -> f64 {
        if a.id == b.id {
            return a.strike();
        }
        let key = (a.id, b.id);
        if let Some(az) = self.az_cache.read().ok().and_then(|c| c.get(&key).copied()) {
            return az;
        }
        let az = azimuth_deg(a.midpoint(), b.midpoint());
        if let Ok(mut cache) = self.az_cache.write() {
            cache.insert(key, az);
        }
        az
    }
}

/// Explicit symmetric distance table; unlisted pairs take `default`.
///
/// Azimuths are geometric (midpoint to midpoint).
#[derive(Clone, Debug)]
pub struct DistanceTable {
    distances: HashMap<(SectionId, SectionId), f64>,
    default: f64,
}

impl DistanceTable {
    pub fn new(default: f64) -> Self {
        Self {
            distances: HashMap::new(),
            default,
        }
    }

    pub fn insert(&mut self, a: SectionId, b: SectionId, distance: f64) -> &mut Self {
        self.distances.insert(unordered(a, b), distance);
        self
    }

    pub fn with(mut self, a: usize, b: usize, distance: f64) -> Self {
        self.insert(SectionId(a), SectionId(b), distance);
        self
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

impl DistAzCalc for DistanceTable {
    fn distance(&self, a: &FaultSection, b: &FaultSection) -> f64 {
        if a.id == b.id {
            return 0.0;
        }
        self.distances
            .get(&unordered(a.id, b.id))
            .copied()
            .unwrap_or(self.default)
    }

    fn azimuth(&self, a: &FaultSection, b: &FaultSection) -> f64 {
        if a.id == b.id {
            return a.strike();
        }
        azimuth_deg(a.midpoint(), b.midpoint())
    }
}
