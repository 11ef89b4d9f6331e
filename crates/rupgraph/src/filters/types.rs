use std::fmt;

use serde::{Deserialize, Serialize};

use crate::connections::{ClusterConnectionStrategy, FaultSubsectionCluster};
use crate::rupture::{ClusterRupture, RuptureCluster};
use crate::sections::{DistAzCalc, FaultSection, SectionId};

/// Filter outcome, declared in increasing severity so `Ord` ranks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlausibilityResult {
    Pass,
    Fail,
    FailHardStop,
}

impl PlausibilityResult {
    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }

    /// Growth may continue past this rupture.
    pub fn can_continue(self) -> bool {
        self != Self::FailHardStop
    }

    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn best(self, other: Self) -> Self {
        self.min(other)
    }
}

impl fmt::Display for PlausibilityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::FailHardStop => "fail_hard_stop",
        })
    }
}

/// Read-only view a filter sees: geometry, clusters and the distance service.
#[derive(Clone, Copy)]
pub struct FilterContext<'a> {
    pub sections: &'a [FaultSection],
    pub clusters: &'a [FaultSubsectionCluster],
    pub calc: &'a dyn DistAzCalc,
    /// Threshold the jump graph was built with (`+inf` when unconstrained).
    pub max_jump_dist: f64,
}

impl<'a> FilterContext<'a> {
    pub fn from_strategy(strategy: &'a ClusterConnectionStrategy, calc: &'a dyn DistAzCalc) -> Self {
        Self {
            sections: strategy.sections(),
            clusters: strategy.clusters(),
            calc,
            max_jump_dist: strategy.max_jump_dist(),
        }
    }

    pub fn section(&self, id: SectionId) -> &'a FaultSection {
        &self.sections[id.0]
    }

    /// Number of sections in the full cluster `piece` was taken from.
    pub fn full_cluster_len(&self, piece: &RuptureCluster) -> usize {
        self.clusters
            .get(piece.cluster.0)
            .map_or(piece.len(), FaultSubsectionCluster::len)
    }

    pub fn azimuth(&self, a: SectionId, b: SectionId) -> f64 {
        self.calc.azimuth(self.section(a), self.section(b))
    }
}

/// A plausibility rule over a candidate rupture.
pub trait PlausibilityFilter: Send + Sync + fmt::Debug {
    fn name(&self) -> String;

    fn apply(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult;

    /// Whether the outcome can depend on which end the rupture was grown from.
    fn is_directional(&self, _splayed: bool) -> bool {
        false
    }

    fn as_scalar(&self) -> Option<&dyn ScalarValuedFilter> {
        None
    }
}

/// Filters that reduce a rupture to one number compared against a threshold.
pub trait ScalarValuedFilter {
    /// `None` when the quantity is undefined for this rupture (e.g. no jumps).
    fn value(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>) -> Option<f64>;

    fn threshold(&self) -> f64;

    fn units(&self) -> &'static str;
}
