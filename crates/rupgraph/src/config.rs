//! Whole-run configuration: connections, filters and growth.

use serde::{Deserialize, Serialize};

use crate::builder::BuildCfg;
use crate::connections::{ClusterConnectionStrategy, ConnectionRule};
use crate::error::Result;
use crate::filters::{FilterCfg, FilterPipeline};
use crate::sections::FaultSection;

/// Everything a rupture-set run needs besides the sections.
///
/// Every field has a default, so partial JSON files are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunCfg {
    /// Maximum jump distance (km); `None` means unconstrained.
    pub max_jump_dist: Option<f64>,
    pub rule: ConnectionRule,
    /// Connection workers; 0 uses all cores.
    pub connect_threads: usize,
    pub build: BuildCfg,
    /// Filters in evaluation order.
    pub filters: Vec<FilterCfg>,
}

impl Default for RunCfg {
    fn default() -> Self {
        Self {
            max_jump_dist: Some(5.0),
            rule: ConnectionRule::ClosestSectionPair,
            connect_threads: 0,
            build: BuildCfg::default(),
            filters: Vec::new(),
        }
    }
}

impl RunCfg {
    /// Unpopulated strategy over `sections` with this run's rule and threshold.
    pub fn strategy(&self, sections: Vec<FaultSection>) -> Result<ClusterConnectionStrategy> {
        ClusterConnectionStrategy::new(sections, self.rule, self.max_jump_dist)
    }

    pub fn pipeline(&self) -> Result<FilterPipeline> {
        FilterPipeline::from_cfgs(&self.filters)
    }

    /// Check everything that can be checked without sections.
    pub fn validate(&self) -> Result<()> {
        self.pipeline()?;
        self.build.validate()
    }
}
