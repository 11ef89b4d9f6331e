//! Parallel all-pairs connection search (partition, barrier, merge).

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::types::{build_clusters, ClusterId, ConnectionRule, FaultSubsectionCluster, Jump, JumpGraph};
use crate::error::{Result, RuptureError};
use crate::sections::{DistAzCalc, FaultSection, ParentId, SectionId};

/// Owns the section list, the clusters and (once built) the jump graph.
///
/// The graph is single-assignment: the first successful `build_connections`
/// populates it under the merge lock; later calls return the same graph.
/// After population everything here is read-only and shareable across threads.
#[derive(Debug)]
pub struct ClusterConnectionStrategy {
    sections: Arc<[FaultSection]>,
    clusters: Vec<FaultSubsectionCluster>,
    section_cluster: Vec<ClusterId>,
    rule: ConnectionRule,
    max_jump_dist: Option<f64>,
    merge_lock: Mutex<()>,
    pub(super) graph: OnceLock<JumpGraph>,
}

impl ClusterConnectionStrategy {
    /// Validate sections, group clusters and check the threshold.
    ///
    /// `max_jump_dist = None` means unconstrained, which only `ClosestSectionPair` accepts.
    pub fn new(
        sections: Vec<FaultSection>,
        rule: ConnectionRule,
        max_jump_dist: Option<f64>,
    ) -> Result<Self> {
        match (rule, max_jump_dist) {
            (_, Some(d)) if !d.is_finite() || d < 0.0 => {
                return Err(RuptureError::config(format!(
                    "max jump distance must be finite and non-negative, got {d}"
                )))
            }
            (ConnectionRule::AllWithinDistance, None) => {
                return Err(RuptureError::config(
                    "all-within-distance connections need a finite max jump distance",
                ))
            }
            _ => {}
        }
        let clusters = build_clusters(&sections)?;
        let mut section_cluster = vec![ClusterId(0); sections.len()];
        for c in &clusters {
            for s in &c.sections {
                section_cluster[s.0] = c.id;
            }
        }
        Ok(Self {
            sections: sections.into(),
            clusters,
            section_cluster,
            rule,
            max_jump_dist,
            merge_lock: Mutex::new(()),
            graph: OnceLock::new(),
        })
    }

    pub fn sections(&self) -> &[FaultSection] {
        &self.sections
    }

    /// Shared handle to the section list.
    pub fn shared_sections(&self) -> Arc<[FaultSection]> {
        Arc::clone(&self.sections)
    }

    pub fn section(&self, id: SectionId) -> Option<&FaultSection> {
        self.sections.get(id.0)
    }

    pub fn clusters(&self) -> &[FaultSubsectionCluster] {
        &self.clusters
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&FaultSubsectionCluster> {
        self.clusters.get(id.0)
    }

    pub fn cluster_for_section(&self, s: SectionId) -> Option<ClusterId> {
        self.section_cluster.get(s.0).copied()
    }

    pub fn clusters_for_parent(&self, p: ParentId) -> impl Iterator<Item = ClusterId> + '_ {
        self.clusters
            .iter()
            .filter(move |c| c.parent_id == p)
            .map(|c| c.id)
    }

    pub fn rule(&self) -> ConnectionRule {
        self.rule
    }

    /// Configured threshold, or `+inf` when unconstrained.
    pub fn max_jump_dist(&self) -> f64 {
        self.max_jump_dist.unwrap_or(f64::INFINITY)
    }

    pub fn is_populated(&self) -> bool {
        self.graph.get().is_some()
    }

    pub fn jump_graph(&self) -> Result<&JumpGraph> {
        self.graph.get().ok_or(RuptureError::NotPopulated)
    }

    pub fn all_possible_jumps(&self) -> Result<Vec<Jump>> {
        Ok(self.jump_graph()?.all_possible_jumps().copied().collect())
    }

    pub fn jumps_from(&self, s: SectionId) -> Result<&[Jump]> {
        Ok(self.jump_graph()?.jumps_from(s))
    }

    pub fn are_parents_connected(&self, a: ParentId, b: ParentId) -> Result<bool> {
        Ok(self.jump_graph()?.are_parents_connected(a, b))
    }

    /// Evaluate every unordered cluster pair on a pool of `concurrency` workers
    /// (0 = one per core), then merge all results in pair order.
    ///
    /// The first worker error fails the build and nothing is merged.
    pub fn build_connections(&self, calc: &dyn DistAzCalc, concurrency: usize) -> Result<&JumpGraph> {
        if let Some(g) = self.graph.get() {
            debug!("connections already populated");
            return Ok(g);
        }
        let t0 = Instant::now();
        let n = self.clusters.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        info!(
            clusters = n,
            pairs = pairs.len(),
            workers = concurrency,
            rule = ?self.rule,
            max_jump_dist = ?self.max_jump_dist,
            "building cluster connections"
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .build()?;
        let found: Vec<Vec<Jump>> = pool.install(|| {
            pairs
                .par_iter()
                .map(|&(i, j)| self.eval_pair(calc, &self.clusters[i], &self.clusters[j]))
                .collect::<Result<Vec<_>>>()
        })?;

        let _guard = self.merge_lock.lock().map_err(|_| RuptureError::LockPoisoned)?;
        if let Some(g) = self.graph.get() {
            debug!("connections populated concurrently; discarding duplicate result");
            return Ok(g);
        }
        let graph = JumpGraph::from_one_way(&self.clusters, self.sections.len(), found.into_iter().flatten());
        if graph.num_jumps() == 0 && n > 1 {
            warn!("no jumps found between {n} clusters");
        }
        info!(
            jumps = graph.num_jumps(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "cluster connections built"
        );
        Ok(self.graph.get_or_init(|| graph))
    }

    /// Admissible jumps from `c1` to `c2` (one direction only).
    fn eval_pair(
        &self,
        calc: &dyn DistAzCalc,
        c1: &FaultSubsectionCluster,
        c2: &FaultSubsectionCluster,
    ) -> Result<Vec<Jump>> {
        let max = self.max_jump_dist();
        let mut out = Vec::new();
        let mut closest: Option<Jump> = None;
        for &s1 in &c1.sections {
            let a = &self.sections[s1.0];
            for &s2 in &c2.sections {
                let b = &self.sections[s2.0];
                let d = calc.distance(a, b);
                if d.is_nan() || d < 0.0 {
                    return Err(RuptureError::NonFiniteDistance { a: s1, b: s2 });
                }
                if d.is_infinite() || d > max {
                    continue;
                }
                let jump = Jump {
                    from_section: s1,
                    from_cluster: c1.id,
                    to_section: s2,
                    to_cluster: c2.id,
                    distance: d,
                };
                match self.rule {
                    ConnectionRule::AllWithinDistance => out.push(jump),
                    ConnectionRule::ClosestSectionPair => {
                        if closest.map_or(true, |c| d < c.distance) {
                            closest = Some(jump);
                        }
                    }
                }
            }
        }
        out.extend(closest);
        Ok(out)
    }
}
