//! Filters on the overall shape of the rupture.

use tracing::debug;

use super::types::{FilterContext, PlausibilityFilter, PlausibilityResult, ScalarValuedFilter};
use crate::error::{Result, RuptureError};
use crate::rupture::{ClusterRupture, RuptureCluster};
use crate::sections::{angle_diff, SectionId};

/// Sum of direction changes along the primary strand, section to section.
#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeAzimuthChangeFilter {
    pub max_cumulative: f64,
}

impl CumulativeAzimuthChangeFilter {
    pub fn new(max_cumulative: f64) -> Result<Self> {
        if !(max_cumulative.is_finite() && max_cumulative >= 0.0) {
            return Err(RuptureError::config(
                "cumulative_azimuth_change: max_cumulative must be finite and >= 0",
            ));
        }
        Ok(Self { max_cumulative })
    }
}

impl PlausibilityFilter for CumulativeAzimuthChangeFilter {
    fn name(&self) -> String {
        format!("cumulative_azimuth_change<={}deg", self.max_cumulative)
    }

    fn apply(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult {
        let total = self.value(rupture, ctx).unwrap_or(0.0);
        if verbose {
            debug!(value = total, threshold = self.max_cumulative, "cumulative_azimuth_change");
        }
        if total > self.max_cumulative {
            PlausibilityResult::FailHardStop
        } else {
            PlausibilityResult::Pass
        }
    }

    fn as_scalar(&self) -> Option<&dyn ScalarValuedFilter> {
        Some(self)
    }
}

impl ScalarValuedFilter for CumulativeAzimuthChangeFilter {
    fn value(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>) -> Option<f64> {
        let path: Vec<SectionId> = rupture.primary_sections().collect();
        let azimuths: Vec<f64> = path.windows(2).map(|w| ctx.azimuth(w[0], w[1])).collect();
        Some(azimuths.windows(2).map(|w| angle_diff(w[0], w[1])).sum())
    }

    fn threshold(&self) -> f64 {
        self.max_cumulative
    }

    fn units(&self) -> &'static str {
        "deg"
    }
}

/// Every cluster piece must hold at least `min_sects` sections, or the whole
/// cluster when it is shorter than that.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinSectsPerParentFilter {
    pub min_sects: usize,
}

impl MinSectsPerParentFilter {
    pub fn new(min_sects: usize) -> Result<Self> {
        if min_sects == 0 {
            return Err(RuptureError::config("min_sects_per_parent: min_sects must be >= 1"));
        }
        Ok(Self { min_sects })
    }

    fn short_piece<'r>(&self, rupture: &'r ClusterRupture, ctx: &FilterContext<'_>) -> Option<&'r RuptureCluster> {
        rupture
            .clusters
            .iter()
            .find(|c| c.len() < self.min_sects.min(ctx.full_cluster_len(c)))
            .or_else(|| {
                rupture
                    .splays
                    .iter()
                    .find_map(|sp| self.short_piece(&sp.rupture, ctx))
            })
    }
}

impl PlausibilityFilter for MinSectsPerParentFilter {
    fn name(&self) -> String {
        format!("min_sects_per_parent>={}", self.min_sects)
    }

    fn apply(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult {
        match self.short_piece(rupture, ctx) {
            Some(piece) => {
                if verbose {
                    debug!(piece = %piece, min = self.min_sects, "min_sects_per_parent");
                }
                PlausibilityResult::FailHardStop
            }
            None => PlausibilityResult::Pass,
        }
    }
}
