//! Filters judging individual jumps or their accumulation.

use tracing::debug;

use super::types::{FilterContext, PlausibilityFilter, PlausibilityResult, ScalarValuedFilter};
use crate::connections::Jump;
use crate::error::{Result, RuptureError};
use crate::rupture::{ClusterRupture, RuptureCluster};
use crate::sections::{angle_diff, SectionId};

fn hard_stop_if(exceeded: bool) -> PlausibilityResult {
    if exceeded {
        PlausibilityResult::FailHardStop
    } else {
        PlausibilityResult::Pass
    }
}

/// Rejects ruptures containing any jump longer than `max_dist` (km).
#[derive(Clone, Debug, PartialEq)]
pub struct JumpDistFilter {
    pub max_dist: f64,
}

impl JumpDistFilter {
    pub fn new(max_dist: f64) -> Result<Self> {
        if !(max_dist.is_finite() && max_dist >= 0.0) {
            return Err(RuptureError::config("jump_dist: max_dist must be finite and >= 0"));
        }
        Ok(Self { max_dist })
    }
}

impl PlausibilityFilter for JumpDistFilter {
    fn name(&self) -> String {
        format!("jump_dist<={}km", self.max_dist)
    }

    fn apply(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult {
        // every jump in the graph is already within the build threshold
        if self.max_dist >= ctx.max_jump_dist {
            return PlausibilityResult::Pass;
        }
        let worst = self.value(rupture, ctx);
        if verbose {
            debug!(value = ?worst, threshold = self.max_dist, "jump_dist");
        }
        hard_stop_if(worst.is_some_and(|d| d > self.max_dist))
    }

    fn as_scalar(&self) -> Option<&dyn ScalarValuedFilter> {
        Some(self)
    }
}

impl ScalarValuedFilter for JumpDistFilter {
    fn value(&self, rupture: &ClusterRupture, _ctx: &FilterContext<'_>) -> Option<f64> {
        rupture
            .all_jumps()
            .iter()
            .map(|j| j.distance)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))))
    }

    fn threshold(&self) -> f64 {
        self.max_dist
    }

    fn units(&self) -> &'static str {
        "km"
    }
}

/// Product over jumps of `exp(-d / r0)`; rejects below `min_prob`.
#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeProbabilityFilter {
    pub min_prob: f64,
    pub r0: f64,
}

impl CumulativeProbabilityFilter {
    pub fn new(min_prob: f64, r0: f64) -> Result<Self> {
        if !(min_prob > 0.0 && min_prob <= 1.0) {
            return Err(RuptureError::config("cumulative_probability: min_prob must be in (0, 1]"));
        }
        if !(r0.is_finite() && r0 > 0.0) {
            return Err(RuptureError::config("cumulative_probability: r0 must be finite and > 0"));
        }
        Ok(Self { min_prob, r0 })
    }
}

impl PlausibilityFilter for CumulativeProbabilityFilter {
    fn name(&self) -> String {
        format!("cumulative_probability>={}", self.min_prob)
    }

    fn apply(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult {
        let p = self.value(rupture, ctx).unwrap_or(1.0);
        if verbose {
            debug!(value = p, threshold = self.min_prob, "cumulative_probability");
        }
        hard_stop_if(p < self.min_prob)
    }

    fn as_scalar(&self) -> Option<&dyn ScalarValuedFilter> {
        Some(self)
    }
}

impl ScalarValuedFilter for CumulativeProbabilityFilter {
    fn value(&self, rupture: &ClusterRupture, _ctx: &FilterContext<'_>) -> Option<f64> {
        Some(
            rupture
                .all_jumps()
                .iter()
                .map(|j| (-j.distance / self.r0).exp())
                .product(),
        )
    }

    fn threshold(&self) -> f64 {
        self.min_prob
    }

    fn units(&self) -> &'static str {
        "probability"
    }
}

/// Rejects ruptures where the travel direction turns by more than
/// `max_change` degrees across any single jump.
#[derive(Clone, Debug, PartialEq)]
pub struct JumpAzimuthChangeFilter {
    pub max_change: f64,
}

impl JumpAzimuthChangeFilter {
    pub fn new(max_change: f64) -> Result<Self> {
        if !(0.0..=180.0).contains(&max_change) {
            return Err(RuptureError::config("jump_azimuth_change: max_change must be in [0, 180]"));
        }
        Ok(Self { max_change })
    }

    fn changes(rupture: &ClusterRupture, ctx: &FilterContext<'_>) -> Vec<f64> {
        let mut out = Vec::new();
        for_each_link(rupture, &mut |from, jump, to| {
            let before = travel_azimuth(ctx, from, jump.from_section);
            let after = travel_azimuth(ctx, to, jump.to_section);
            out.push(angle_diff(before, after));
        });
        out
    }
}

impl PlausibilityFilter for JumpAzimuthChangeFilter {
    fn name(&self) -> String {
        format!("jump_azimuth_change<={}deg", self.max_change)
    }

    fn apply(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult {
        let worst = self.value(rupture, ctx);
        if verbose {
            debug!(value = ?worst, threshold = self.max_change, "jump_azimuth_change");
        }
        hard_stop_if(worst.is_some_and(|c| c > self.max_change))
    }

    fn is_directional(&self, splayed: bool) -> bool {
        splayed
    }

    fn as_scalar(&self) -> Option<&dyn ScalarValuedFilter> {
        Some(self)
    }
}

impl ScalarValuedFilter for JumpAzimuthChangeFilter {
    fn value(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>) -> Option<f64> {
        Self::changes(rupture, ctx).into_iter().reduce(f64::max)
    }

    fn threshold(&self) -> f64 {
        self.max_change
    }

    fn units(&self) -> &'static str {
        "deg"
    }
}

/// Visit every jump of the tree with the pieces it leaves and enters.
fn for_each_link<'r>(
    rupture: &'r ClusterRupture,
    f: &mut dyn FnMut(&'r RuptureCluster, &'r Jump, &'r RuptureCluster),
) {
    for (i, jump) in rupture.internal_jumps.iter().enumerate() {
        f(&rupture.clusters[i], jump, &rupture.clusters[i + 1]);
    }
    for sp in &rupture.splays {
        let from = rupture.clusters.iter().find(|c| c.contains(sp.jump.from_section));
        if let Some(from) = from {
            f(from, &sp.jump, &sp.rupture.clusters[0]);
        }
        for_each_link(&sp.rupture, f);
    }
}

/// Direction of travel through `piece` at section `at`, in degrees.
///
/// Single-section pieces fall back to the section's own strike.
pub(crate) fn travel_azimuth(ctx: &FilterContext<'_>, piece: &RuptureCluster, at: SectionId) -> f64 {
    let s = &piece.sections;
    match piece.position(at) {
        Some(i) if s.len() >= 2 => {
            if i + 1 < s.len() {
                ctx.azimuth(s[i], s[i + 1])
            } else {
                ctx.azimuth(s[i - 1], s[i])
            }
        }
        _ => ctx.section(at).strike(),
    }
}
