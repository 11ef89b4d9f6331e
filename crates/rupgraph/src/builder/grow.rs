//! Backtracking rupture growth with filter-driven pruning.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, info};

use super::types::{BuildCfg, BuildOutput, PermutationStrategy, SeedOutput, SeedPolicy};
use crate::connections::{ClusterConnectionStrategy, ClusterId, FaultSubsectionCluster, Jump, JumpGraph};
use crate::error::{Result, RuptureError};
use crate::filters::{FilterContext, FilterPipeline, FilterTally, PlausibilityResult};
use crate::rupture::{ClusterRupture, RuptureCluster, UniqueRupture};
use crate::sections::{DistAzCalc, SectionId};

/// Enumerates accepted ruptures over a populated connection strategy.
pub struct RuptureBuilder<'a> {
    strategy: &'a ClusterConnectionStrategy,
    graph: &'a JumpGraph,
    pipeline: &'a FilterPipeline,
    calc: &'a dyn DistAzCalc,
    cfg: BuildCfg,
}

impl<'a> RuptureBuilder<'a> {
    pub fn new(
        strategy: &'a ClusterConnectionStrategy,
        pipeline: &'a FilterPipeline,
        calc: &'a dyn DistAzCalc,
        cfg: BuildCfg,
    ) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            strategy,
            graph: strategy.jump_graph()?,
            pipeline,
            calc,
            cfg,
        })
    }

    pub fn cfg(&self) -> &BuildCfg {
        &self.cfg
    }

    /// Seed clusters selected by the seed policy, in cluster order.
    pub fn seeds(&self) -> Result<Vec<ClusterId>> {
        match &self.cfg.seeds {
            SeedPolicy::AllClusters => Ok(self.strategy.clusters().iter().map(|c| c.id).collect()),
            SeedPolicy::Parents(parents) => {
                let mut out = Vec::new();
                for &p in parents {
                    let before = out.len();
                    out.extend(self.strategy.clusters_for_parent(p));
                    if out.len() == before {
                        return Err(RuptureError::UnknownParent(p));
                    }
                }
                out.sort_unstable();
                out.dedup();
                Ok(out)
            }
        }
    }

    /// Grow every rupture reachable from one seed cluster.
    ///
    /// Single-threaded; callers may drive their own seed loop under an
    /// external budget.
    pub fn build_seed(&self, seed: ClusterId) -> Result<SeedOutput> {
        let cluster = self
            .strategy
            .cluster(seed)
            .ok_or_else(|| RuptureError::config(format!("unknown seed cluster {seed}")))?;
        let mut runner = GrowRunner::new(self);
        for piece in seed_pieces(cluster, self.cfg.permutations) {
            let state = runner.start(piece);
            runner.emit(&state.rupture)?;
            runner.recur(state)?;
        }
        debug!(
            seed = %seed,
            ruptures = runner.out.len(),
            candidates = runner.candidates,
            "seed done"
        );
        Ok(SeedOutput {
            ruptures: runner.out,
            tally: runner.tally,
            candidates: runner.candidates,
            duplicates: runner.duplicates,
        })
    }

    /// Run all seeds and merge in seed order, dropping ruptures already
    /// produced by an earlier seed.
    pub fn build(&self) -> Result<BuildOutput> {
        let seeds = self.seeds()?;
        info!(
            seeds = seeds.len(),
            filters = self.pipeline.len(),
            threads = self.cfg.threads,
            "building ruptures"
        );
        let per_seed = if self.cfg.threads == 1 {
            seeds.iter().map(|&s| self.build_seed(s)).collect::<Result<Vec<_>>>()?
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.cfg.threads)
                .build()?;
            pool.install(|| {
                seeds
                    .par_iter()
                    .map(|&s| self.build_seed(s))
                    .collect::<Result<Vec<_>>>()
            })?
        };

        let mut out = BuildOutput {
            tally: self.pipeline.new_tally(),
            seeds: seeds.len(),
            ..BuildOutput::default()
        };
        let mut seen: HashSet<UniqueRupture> = HashSet::new();
        for seed_out in per_seed {
            out.candidates += seed_out.candidates;
            out.duplicates += seed_out.duplicates;
            out.tally.merge(&seed_out.tally);
            for rup in seed_out.ruptures {
                if seen.insert(rup.unique()) {
                    out.ruptures.push(rup);
                } else {
                    out.duplicates += 1;
                }
            }
        }
        info!(
            ruptures = out.ruptures.len(),
            candidates = out.candidates,
            duplicates = out.duplicates,
            "rupture build done"
        );
        Ok(out)
    }
}

/// One node of the search: the rupture so far plus occupancy flags.
#[derive(Clone)]
struct Growth {
    rupture: ClusterRupture,
    sections: Vec<bool>,
    clusters: Vec<bool>,
}

impl Growth {
    fn mark(&mut self, piece: &RuptureCluster) {
        self.clusters[piece.cluster.0] = true;
        for s in &piece.sections {
            self.sections[s.0] = true;
        }
    }
}

/// Where a frontier jump attaches.
#[derive(Clone, Copy, Debug)]
enum Attach {
    Primary,
    ExtendSplay(usize),
    NewSplay,
}

/// Hashable tree layout; equal layouts over one jump graph are equal ruptures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Mark {
    Section(SectionId),
    Cluster,
    Jump(SectionId, SectionId),
    Splay,
    End,
}

fn layout(rup: &ClusterRupture, out: &mut Vec<Mark>) {
    for c in &rup.clusters {
        out.extend(c.sections.iter().copied().map(Mark::Section));
        out.push(Mark::Cluster);
    }
    for j in &rup.internal_jumps {
        out.push(Mark::Jump(j.from_section, j.to_section));
    }
    for sp in &rup.splays {
        out.push(Mark::Splay);
        out.push(Mark::Jump(sp.jump.from_section, sp.jump.to_section));
        layout(&sp.rupture, out);
    }
    out.push(Mark::End);
}

/// Per-seed search state and accumulators.
struct GrowRunner<'b, 'a> {
    b: &'b RuptureBuilder<'a>,
    ctx: FilterContext<'b>,
    seen: HashSet<UniqueRupture>,
    /// Trees already evaluated in this seed; a repeat has an identical subtree.
    expanded: HashSet<Vec<Mark>>,
    out: Vec<ClusterRupture>,
    tally: FilterTally,
    candidates: usize,
    duplicates: usize,
}

impl<'b, 'a> GrowRunner<'b, 'a> {
    fn new(b: &'b RuptureBuilder<'a>) -> Self {
        Self {
            b,
            ctx: FilterContext::from_strategy(b.strategy, b.calc),
            seen: HashSet::new(),
            expanded: HashSet::new(),
            out: Vec::new(),
            tally: b.pipeline.new_tally(),
            candidates: 0,
            duplicates: 0,
        }
    }

    fn start(&self, piece: RuptureCluster) -> Growth {
        let mut state = Growth {
            rupture: ClusterRupture::single(piece.clone()),
            sections: vec![false; self.b.strategy.sections().len()],
            clusters: vec![false; self.b.strategy.clusters().len()],
        };
        state.mark(&piece);
        state
    }

    fn emit(&mut self, rup: &ClusterRupture) -> Result<()> {
        rup.validate()?;
        if self.seen.insert(rup.unique()) {
            self.out.push(rup.clone());
        } else {
            self.duplicates += 1;
        }
        Ok(())
    }

    /// Frontier in search order: primary end, splay ends, then splay origins.
    fn frontier(&self, rup: &ClusterRupture) -> Vec<(Attach, SectionId)> {
        let mut f = vec![(Attach::Primary, rup.end_section())];
        for (i, sp) in rup.splays.iter().enumerate() {
            f.push((Attach::ExtendSplay(i), sp.rupture.end_section()));
        }
        if rup.splay_count() < self.b.cfg.max_splays {
            let primary: Vec<SectionId> = rup.primary_sections().collect();
            if primary.len() > 2 {
                for &s in &primary[1..primary.len() - 1] {
                    f.push((Attach::NewSplay, s));
                }
            }
        }
        f
    }

    fn extend(&self, rup: &ClusterRupture, at: Attach, jump: Jump, piece: RuptureCluster) -> Result<ClusterRupture> {
        match at {
            Attach::Primary => rup.take(jump, piece),
            Attach::ExtendSplay(i) => rup.extend_splay(i, jump, piece),
            Attach::NewSplay => rup.take_splay(jump, piece),
        }
    }

    fn recur(&mut self, state: Growth) -> Result<()> {
        let graph = self.b.graph;
        for (at, from) in self.frontier(&state.rupture) {
            for jump in graph.jumps_from(from) {
                if state.clusters[jump.to_cluster.0] {
                    continue;
                }
                let Some(target) = self.b.strategy.cluster(jump.to_cluster) else {
                    return Err(RuptureError::jump(format!("{jump} targets an unknown cluster")));
                };
                if target.sections.iter().any(|s| state.sections[s.0]) {
                    continue;
                }
                for piece in permutations(target, jump.to_section, self.b.cfg.permutations) {
                    let child = self.extend(&state.rupture, at, *jump, piece.clone())?;
                    let mut key = Vec::new();
                    layout(&child, &mut key);
                    if !self.expanded.insert(key) {
                        continue;
                    }
                    self.candidates += 1;
                    let verdict = self.b.pipeline.evaluate(
                        &child,
                        &self.ctx,
                        self.b.cfg.verbose,
                        Some(&mut self.tally),
                    );
                    match verdict.result {
                        PlausibilityResult::FailHardStop => continue,
                        PlausibilityResult::Fail => {}
                        PlausibilityResult::Pass => self.emit(&child)?,
                    }
                    let mut next = Growth {
                        rupture: child,
                        sections: state.sections.clone(),
                        clusters: state.clusters.clone(),
                    };
                    next.mark(&piece);
                    self.recur(next)?;
                }
            }
        }
        Ok(())
    }
}

/// Pieces a seed cluster starts from.
fn seed_pieces(c: &FaultSubsectionCluster, strategy: PermutationStrategy) -> Vec<RuptureCluster> {
    match strategy {
        PermutationStrategy::WholeCluster => {
            let fwd = RuptureCluster::whole(c);
            if c.len() > 1 {
                let rev = fwd.reversed();
                vec![fwd, rev]
            } else {
                vec![fwd]
            }
        }
        PermutationStrategy::Contiguous => c
            .sections
            .iter()
            .flat_map(|&s| permutations(c, s, strategy))
            .collect(),
    }
}

/// Pieces of `c` a jump landing on `at` may add.
fn permutations(c: &FaultSubsectionCluster, at: SectionId, strategy: PermutationStrategy) -> Vec<RuptureCluster> {
    let Some(idx) = c.index_of(at) else {
        return Vec::new();
    };
    let piece = |sections: Vec<SectionId>| RuptureCluster {
        cluster: c.id,
        parent_id: c.parent_id,
        sections,
    };
    match strategy {
        PermutationStrategy::WholeCluster => {
            let whole = RuptureCluster::whole(c);
            if idx * 2 <= c.len() - 1 {
                vec![whole]
            } else {
                vec![whole.reversed()]
            }
        }
        PermutationStrategy::Contiguous => {
            let n = c.len();
            let mut out = Vec::with_capacity(n);
            for end in idx + 1..=n {
                out.push(piece(c.sections[idx..end].to_vec()));
            }
            for start in (0..idx).rev() {
                out.push(piece(c.sections[start..=idx].iter().rev().copied().collect()));
            }
            out
        }
    }
}
