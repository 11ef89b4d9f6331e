use serde::{Deserialize, Serialize};

use crate::error::{Result, RuptureError};
use crate::filters::FilterTally;
use crate::rupture::ClusterRupture;
use crate::sections::ParentId;

/// Which clusters start a growth search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// One search per cluster, in cluster order.
    #[default]
    AllClusters,
    /// Only clusters belonging to these parents.
    Parents(Vec<ParentId>),
}

/// How a cluster is entered when a jump lands in it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermutationStrategy {
    /// The whole cluster, oriented so the landing section is in its first half.
    #[default]
    WholeCluster,
    /// Every contiguous run starting at the landing section, forward then backward.
    Contiguous,
}

/// Growth search configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildCfg {
    /// Splays allowed per rupture; 0 disables splays.
    pub max_splays: usize,
    /// Seed workers; 1 runs inline, 0 uses all cores.
    pub threads: usize,
    pub seeds: SeedPolicy,
    pub permutations: PermutationStrategy,
    /// Log every filter rejection at debug level.
    pub verbose: bool,
}

impl Default for BuildCfg {
    fn default() -> Self {
        Self {
            max_splays: 1,
            threads: 1,
            seeds: SeedPolicy::AllClusters,
            permutations: PermutationStrategy::WholeCluster,
            verbose: false,
        }
    }
}

impl BuildCfg {
    pub(crate) fn validate(&self) -> Result<()> {
        if let SeedPolicy::Parents(p) = &self.seeds {
            if p.is_empty() {
                return Err(RuptureError::config("seed parent list is empty"));
            }
        }
        Ok(())
    }
}

/// Result of growing from one seed cluster.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SeedOutput {
    /// Accepted ruptures, unique within the seed, in discovery order.
    pub ruptures: Vec<ClusterRupture>,
    pub tally: FilterTally,
    /// Tentative extensions evaluated by the pipeline.
    pub candidates: usize,
    /// Accepted ruptures dropped as already seen.
    pub duplicates: usize,
}

/// Merged result of a whole build.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BuildOutput {
    pub ruptures: Vec<ClusterRupture>,
    pub tally: FilterTally,
    pub seeds: usize,
    pub candidates: usize,
    pub duplicates: usize,
}
