//! Reconstruct a cluster rupture from an ordered flat section list.

use std::collections::HashSet;

use super::types::{ClusterRupture, RuptureCluster};
use crate::connections::{ClusterConnectionStrategy, FaultSubsectionCluster, Jump, JumpGraph};
use crate::error::{Result, RuptureError};
use crate::filters::{FilterContext, FilterPipeline, PlausibilityResult};
use crate::sections::{DistAzCalc, SectionId};

/// Inverse of growth: matches consecutive sections against the known jump graph.
pub struct RuptureConnectionSearch<'a> {
    strategy: &'a ClusterConnectionStrategy,
    graph: &'a JumpGraph,
}

impl<'a> RuptureConnectionSearch<'a> {
    /// Requires a populated strategy.
    pub fn new(strategy: &'a ClusterConnectionStrategy) -> Result<Self> {
        Ok(Self {
            strategy,
            graph: strategy.jump_graph()?,
        })
    }

    fn cluster_of(&self, s: SectionId) -> Result<&'a FaultSubsectionCluster> {
        self.strategy
            .cluster_for_section(s)
            .and_then(|c| self.strategy.cluster(c))
            .ok_or(RuptureError::UnknownSection(s.0))
    }

    /// Rupture tree whose flattened sections are `ids`, in the order
    /// `ClusterRupture::all_sections` produces: primary strand first, then
    /// each splay.
    ///
    /// Within a cluster the list must walk adjacent sections in one direction,
    /// and a cluster may appear only once. Each later run attaches through the
    /// first known jump (in jump-graph order) landing anywhere in it, tried
    /// from the primary end while no splay is open, then from the newest
    /// splay's end, then from interior primary sections in strand order as a
    /// new splay.
    pub fn build_rupture(&self, ids: &[SectionId]) -> Result<ClusterRupture> {
        let mut runs = self.split_runs(ids)?.into_iter();
        let Some(first) = runs.next() else {
            return Err(RuptureError::EmptyRupture);
        };
        let mut prev = first.last_section();
        let mut rup = ClusterRupture::single(first);
        for next in runs {
            let (from, to) = (prev, next.first_section());
            prev = next.last_section();
            rup = self
                .attach(&rup, next)?
                .ok_or(RuptureError::Disconnected { from, to })?;
        }
        Ok(rup)
    }

    fn split_runs(&self, ids: &[SectionId]) -> Result<Vec<RuptureCluster>> {
        if ids.is_empty() {
            return Err(RuptureError::EmptyRupture);
        }
        let mut seen = HashSet::new();
        let mut runs: Vec<RuptureCluster> = Vec::new();
        for &s in ids {
            if !seen.insert(s) {
                return Err(RuptureError::DuplicateSection(s));
            }
            let c = self.cluster_of(s)?;
            match runs.last_mut() {
                Some(run) if run.cluster == c.id => {
                    let prev = run.last_section();
                    let step = index(c, s)? - index(c, prev)?;
                    let dir = match run.sections.as_slice() {
                        [.., a, b] => index(c, *b)? - index(c, *a)?,
                        _ => step.signum(),
                    };
                    if step.abs() != 1 || step != dir {
                        return Err(RuptureError::NonContiguousRun {
                            parent: c.parent_id,
                            a: prev,
                            b: s,
                        });
                    }
                    run.sections.push(s);
                }
                _ => {
                    if let Some(earlier) = runs.iter().find(|r| r.cluster == c.id) {
                        return Err(RuptureError::NonContiguousRun {
                            parent: c.parent_id,
                            a: earlier.last_section(),
                            b: s,
                        });
                    }
                    runs.push(RuptureCluster {
                        cluster: c.id,
                        parent_id: c.parent_id,
                        sections: vec![s],
                    });
                }
            }
        }
        Ok(runs)
    }

    /// `rup` with `next` attached, or `None` when no known jump reaches it.
    fn attach(&self, rup: &ClusterRupture, next: RuptureCluster) -> Result<Option<ClusterRupture>> {
        if !rup.is_splayed() {
            if let Some(jump) = self.link(rup.end_section(), &next) {
                return rup.take(jump, next).map(Some);
            }
        }
        if let Some(idx) = rup.splays.len().checked_sub(1) {
            if let Some(jump) = self.link(rup.splays[idx].rupture.end_section(), &next) {
                return rup.extend_splay(idx, jump, next).map(Some);
            }
        }
        let primary: Vec<SectionId> = rup.primary_sections().collect();
        let interior = primary.get(1..primary.len() - 1).unwrap_or(&[]);
        for &s in interior {
            if let Some(jump) = self.link(s, &next) {
                return rup.take_splay(jump, next).map(Some);
            }
        }
        Ok(None)
    }

    fn link(&self, from: SectionId, next: &RuptureCluster) -> Option<Jump> {
        self.graph
            .jumps_from(from)
            .iter()
            .find(|j| j.to_cluster == next.cluster && next.contains(j.to_section))
            .copied()
    }

    /// Evaluate `rup`; for a direction-sensitive pipeline a failing single strand
    /// is also tried reversed and the better outcome wins.
    pub fn check(
        &self,
        rup: &ClusterRupture,
        pipeline: &FilterPipeline,
        calc: &dyn DistAzCalc,
        verbose: bool,
    ) -> PlausibilityResult {
        let ctx = FilterContext::from_strategy(self.strategy, calc);
        let result = pipeline.apply(rup, &ctx, verbose);
        if result.is_pass() || !pipeline.is_directional(rup.is_splayed()) {
            return result;
        }
        match rup.reversed() {
            Some(rev) => result.best(pipeline.apply(&rev, &ctx, verbose)),
            None => result,
        }
    }
}

fn index(c: &FaultSubsectionCluster, s: SectionId) -> Result<isize> {
    c.index_of(s)
        .map(|i| i as isize)
        .ok_or(RuptureError::UnknownSection(s.0))
}
