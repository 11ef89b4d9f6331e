//! Filters limiting splays.

use tracing::debug;

use super::types::{FilterContext, PlausibilityFilter, PlausibilityResult, ScalarValuedFilter};
use crate::error::{Result, RuptureError};
use crate::rupture::{ClusterRupture, Splay};

/// Limits splay length, either in km or as a fraction of the primary strand.
///
/// Exceeding an absolute limit is a hard stop: splays only get longer. A
/// fractional limit may recover once the primary strand grows, so it only fails.
#[derive(Clone, Debug, PartialEq)]
pub struct SplayLengthFilter {
    pub max_len: f64,
    pub is_fract_of_main: bool,
    /// Compare the sum of all splays instead of the longest one.
    pub total_across_splays: bool,
    /// Splays consisting of exactly one whole cluster are not measured.
    pub allow_full_cluster: bool,
}

impl SplayLengthFilter {
    pub fn new(max_len: f64, is_fract_of_main: bool, total_across_splays: bool) -> Result<Self> {
        if !(max_len.is_finite() && max_len > 0.0) {
            return Err(RuptureError::config("splay_length: max_len must be finite and > 0"));
        }
        Ok(Self {
            max_len,
            is_fract_of_main,
            total_across_splays,
            allow_full_cluster: false,
        })
    }

    pub fn allowing_full_cluster(mut self, allow: bool) -> Self {
        self.allow_full_cluster = allow;
        self
    }

    fn is_exempt(&self, sp: &Splay, ctx: &FilterContext<'_>) -> bool {
        if !self.allow_full_cluster || sp.rupture.is_splayed() {
            return false;
        }
        match sp.rupture.clusters.as_slice() {
            [only] => only.len() == ctx.full_cluster_len(only),
            _ => false,
        }
    }
}

impl PlausibilityFilter for SplayLengthFilter {
    fn name(&self) -> String {
        let scope = if self.total_across_splays { "total" } else { "each" };
        if self.is_fract_of_main {
            format!("splay_length[{scope}]<={}xprimary", self.max_len)
        } else {
            format!("splay_length[{scope}]<={}km", self.max_len)
        }
    }

    fn apply(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult {
        let measured = self.value(rupture, ctx);
        if verbose {
            debug!(value = ?measured, threshold = self.max_len, "splay_length");
        }
        match measured {
            Some(v) if v > self.max_len && self.is_fract_of_main => PlausibilityResult::Fail,
            Some(v) if v > self.max_len => PlausibilityResult::FailHardStop,
            _ => PlausibilityResult::Pass,
        }
    }

    fn is_directional(&self, splayed: bool) -> bool {
        splayed
    }

    fn as_scalar(&self) -> Option<&dyn ScalarValuedFilter> {
        Some(self)
    }
}

impl ScalarValuedFilter for SplayLengthFilter {
    /// Longest (or total) measured splay length; `None` when nothing is measured.
    fn value(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>) -> Option<f64> {
        let lens: Vec<f64> = rupture
            .splays
            .iter()
            .filter(|sp| !self.is_exempt(sp, ctx))
            .map(|sp| sp.rupture.length(ctx.sections))
            .collect();
        let raw = if self.total_across_splays {
            if lens.is_empty() {
                return None;
            }
            lens.iter().sum()
        } else {
            lens.into_iter().reduce(f64::max)?
        };
        if self.is_fract_of_main {
            let main = rupture.primary_length(ctx.sections);
            Some(if main > 0.0 { raw / main } else { f64::INFINITY })
        } else {
            Some(raw)
        }
    }

    fn threshold(&self) -> f64 {
        self.max_len
    }

    fn units(&self) -> &'static str {
        if self.is_fract_of_main {
            "fraction of primary"
        } else {
            "km"
        }
    }
}

/// Rejects ruptures with more than `max_splays` splays (nested ones included).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplayCountFilter {
    pub max_splays: usize,
}

impl PlausibilityFilter for SplayCountFilter {
    fn name(&self) -> String {
        format!("splay_count<={}", self.max_splays)
    }

    fn apply(&self, rupture: &ClusterRupture, _ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult {
        let n = rupture.splay_count();
        if verbose {
            debug!(value = n, threshold = self.max_splays, "splay_count");
        }
        if n > self.max_splays {
            PlausibilityResult::FailHardStop
        } else {
            PlausibilityResult::Pass
        }
    }
}
