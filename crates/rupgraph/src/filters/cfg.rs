use serde::{Deserialize, Serialize};

use super::jump::{CumulativeProbabilityFilter, JumpAzimuthChangeFilter, JumpDistFilter};
use super::shape::{CumulativeAzimuthChangeFilter, MinSectsPerParentFilter};
use super::splay::{SplayCountFilter, SplayLengthFilter};
use super::types::PlausibilityFilter;
use crate::error::Result;

fn default_r0() -> f64 {
    3.0
}

/// Serializable filter description, one entry per pipeline stage.
///
/// ```json
/// {"type": "splay_length", "max_len": 10.0, "is_fract_of_main": false}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterCfg {
    JumpDist {
        max_dist: f64,
    },
    SplayLength {
        max_len: f64,
        #[serde(default)]
        is_fract_of_main: bool,
        #[serde(default)]
        total_across_splays: bool,
        #[serde(default)]
        allow_full_cluster: bool,
    },
    SplayCount {
        max_splays: usize,
    },
    JumpAzimuthChange {
        max_change: f64,
    },
    CumulativeAzimuthChange {
        max_cumulative: f64,
    },
    CumulativeProbability {
        min_prob: f64,
        #[serde(default = "default_r0")]
        r0: f64,
    },
    MinSectsPerParent {
        min_sects: usize,
    },
}

impl FilterCfg {
    /// Validate parameters and build the filter.
    pub fn build(&self) -> Result<Box<dyn PlausibilityFilter>> {
        let filter: Box<dyn PlausibilityFilter> = match *self {
            Self::JumpDist { max_dist } => Box::new(JumpDistFilter::new(max_dist)?),
            Self::SplayLength {
                max_len,
                is_fract_of_main,
                total_across_splays,
                allow_full_cluster,
            } => Box::new(
                SplayLengthFilter::new(max_len, is_fract_of_main, total_across_splays)?
                    .allowing_full_cluster(allow_full_cluster),
            ),
            Self::SplayCount { max_splays } => Box::new(SplayCountFilter { max_splays }),
            Self::JumpAzimuthChange { max_change } => Box::new(JumpAzimuthChangeFilter::new(max_change)?),
            Self::CumulativeAzimuthChange { max_cumulative } => {
                Box::new(CumulativeAzimuthChangeFilter::new(max_cumulative)?)
            }
            Self::CumulativeProbability { min_prob, r0 } => {
                Box::new(CumulativeProbabilityFilter::new(min_prob, r0)?)
            }
            Self::MinSectsPerParent { min_sects } => Box::new(MinSectsPerParentFilter::new(min_sects)?),
        };
        Ok(filter)
    }
}
