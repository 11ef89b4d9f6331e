//! Cluster-rupture tree: primary strand plus splays, by id.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::connections::{ClusterId, FaultSubsectionCluster, Jump};
use crate::error::{Result, RuptureError};
use crate::sections::{FaultSection, ParentId, SectionId};

/// An oriented run of sections taken from one cluster.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuptureCluster {
    pub cluster: ClusterId,
    pub parent_id: ParentId,
    pub sections: Vec<SectionId>,
}

impl RuptureCluster {
    /// The whole cluster in trace order.
    pub fn whole(c: &FaultSubsectionCluster) -> Self {
        Self {
            cluster: c.id,
            parent_id: c.parent_id,
            sections: c.sections.clone(),
        }
    }

    pub fn first_section(&self) -> SectionId {
        self.sections[0]
    }

    pub fn last_section(&self) -> SectionId {
        self.sections[self.sections.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains(&self, s: SectionId) -> bool {
        self.sections.contains(&s)
    }

    pub fn position(&self, s: SectionId) -> Option<usize> {
        self.sections.iter().position(|&x| x == s)
    }

    pub fn reversed(&self) -> Self {
        let mut sections = self.sections.clone();
        sections.reverse();
        Self {
            cluster: self.cluster,
            parent_id: self.parent_id,
            sections,
        }
    }

    pub fn length(&self, sections: &[FaultSection]) -> f64 {
        self.sections.iter().map(|s| sections[s.0].length).sum()
    }
}

/// A branch off the primary strand, keyed by the jump it leaves through.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Splay {
    pub jump: Jump,
    pub rupture: ClusterRupture,
}

/// Rooted rupture tree.
///
/// Invariants (checked by `validate`):
/// - `clusters` is non-empty and `internal_jumps.len() == clusters.len() - 1`.
/// - Internal jump `i` leaves the last section of `clusters[i]` and lands in `clusters[i + 1]`.
/// - A splay jump leaves a primary section and lands in the splay's first cluster.
/// - No section appears twice anywhere in the tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterRupture {
    pub clusters: Vec<RuptureCluster>,
    pub internal_jumps: Vec<Jump>,
    pub splays: Vec<Splay>,
}

/// Order-independent identity of a rupture: its sorted section ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UniqueRupture(Vec<SectionId>);

impl UniqueRupture {
    pub fn sections(&self) -> &[SectionId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ClusterRupture {
    pub fn single(cluster: RuptureCluster) -> Self {
        Self {
            clusters: vec![cluster],
            internal_jumps: Vec::new(),
            splays: Vec::new(),
        }
    }

    /// Continue the primary strand through `jump` into `next`.
    pub fn take(&self, jump: Jump, next: RuptureCluster) -> Result<Self> {
        if jump.from_section != self.end_section() || !next.contains(jump.to_section) {
            return Err(RuptureError::jump(format!(
                "{jump} does not continue the strand ending at {}",
                self.end_section()
            )));
        }
        let mut out = self.clone();
        out.internal_jumps.push(jump);
        out.clusters.push(next);
        Ok(out)
    }

    /// Open a new splay from a primary section through `jump` into `next`.
    pub fn take_splay(&self, jump: Jump, next: RuptureCluster) -> Result<Self> {
        if !self.primary_contains(jump.from_section) || !next.contains(jump.to_section) {
            return Err(RuptureError::jump(format!(
                "{jump} does not branch off the primary strand"
            )));
        }
        let mut out = self.clone();
        out.splays.push(Splay {
            jump,
            rupture: ClusterRupture::single(next),
        });
        Ok(out)
    }

    /// Continue splay `idx` from its own end.
    pub fn extend_splay(&self, idx: usize, jump: Jump, next: RuptureCluster) -> Result<Self> {
        let mut out = self.clone();
        let splay = out
            .splays
            .get_mut(idx)
            .ok_or_else(|| RuptureError::jump(format!("no splay {idx} to extend")))?;
        splay.rupture = splay.rupture.take(jump, next)?;
        Ok(out)
    }

    pub fn start_section(&self) -> SectionId {
        self.clusters[0].first_section()
    }

    /// Last section of the primary strand.
    pub fn end_section(&self) -> SectionId {
        self.clusters[self.clusters.len() - 1].last_section()
    }

    pub fn primary_sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.clusters.iter().flat_map(|c| c.sections.iter().copied())
    }

    pub fn primary_contains(&self, s: SectionId) -> bool {
        self.clusters.iter().any(|c| c.contains(s))
    }

    /// Primary strand sections in order, then each splay's sections (depth first).
    pub fn all_sections(&self) -> Vec<SectionId> {
        let mut out: Vec<SectionId> = self.primary_sections().collect();
        for sp in &self.splays {
            out.extend(sp.rupture.all_sections());
        }
        out
    }

    pub fn contains_section(&self, s: SectionId) -> bool {
        self.primary_contains(s) || self.splays.iter().any(|sp| sp.rupture.contains_section(s))
    }

    pub fn total_section_count(&self) -> usize {
        self.clusters.iter().map(RuptureCluster::len).sum::<usize>()
            + self
                .splays
                .iter()
                .map(|sp| sp.rupture.total_section_count())
                .sum::<usize>()
    }

    pub fn total_jump_count(&self) -> usize {
        self.internal_jumps.len()
            + self
                .splays
                .iter()
                .map(|sp| 1 + sp.rupture.total_jump_count())
                .sum::<usize>()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
            + self
                .splays
                .iter()
                .map(|sp| sp.rupture.cluster_count())
                .sum::<usize>()
    }

    pub fn is_splayed(&self) -> bool {
        !self.splays.is_empty()
    }

    pub fn splay_count(&self) -> usize {
        self.splays.len()
            + self
                .splays
                .iter()
                .map(|sp| sp.rupture.splay_count())
                .sum::<usize>()
    }

    pub fn splay_at(&self, jump: &Jump) -> Option<&ClusterRupture> {
        self.splays
            .iter()
            .find(|sp| sp.jump.same_link(jump))
            .map(|sp| &sp.rupture)
    }

    /// Every jump in the tree: internal jumps, then per splay its jump and its own jumps.
    pub fn all_jumps(&self) -> Vec<Jump> {
        let mut out = self.internal_jumps.clone();
        for sp in &self.splays {
            out.push(sp.jump);
            out.extend(sp.rupture.all_jumps());
        }
        out
    }

    pub fn unique(&self) -> UniqueRupture {
        let mut ids = self.all_sections();
        ids.sort_unstable();
        UniqueRupture(ids)
    }

    /// The same single strand walked the other way; `None` for splayed ruptures.
    pub fn reversed(&self) -> Option<Self> {
        if self.is_splayed() {
            return None;
        }
        Some(Self {
            clusters: self.clusters.iter().rev().map(RuptureCluster::reversed).collect(),
            internal_jumps: self.internal_jumps.iter().rev().map(Jump::reversed).collect(),
            splays: Vec::new(),
        })
    }

    /// Total length of every section in the tree (km).
    pub fn length(&self, sections: &[FaultSection]) -> f64 {
        self.primary_length(sections)
            + self
                .splays
                .iter()
                .map(|sp| sp.rupture.length(sections))
                .sum::<f64>()
    }

    pub fn primary_length(&self, sections: &[FaultSection]) -> f64 {
        self.clusters.iter().map(|c| c.length(sections)).sum()
    }

    /// Check the structural invariants listed on the type.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for s in self.all_sections() {
            if !seen.insert(s) {
                return Err(RuptureError::DuplicateSection(s));
            }
        }
        self.validate_links()
    }

    fn validate_links(&self) -> Result<()> {
        if self.clusters.is_empty() || self.clusters.iter().any(RuptureCluster::is_empty) {
            return Err(RuptureError::EmptyRupture);
        }
        if self.internal_jumps.len() + 1 != self.clusters.len() {
            return Err(RuptureError::jump(format!(
                "{} jumps for {} clusters",
                self.internal_jumps.len(),
                self.clusters.len()
            )));
        }
        for (i, j) in self.internal_jumps.iter().enumerate() {
            let (a, b) = (&self.clusters[i], &self.clusters[i + 1]);
            if j.from_section != a.last_section()
                || j.from_cluster != a.cluster
                || j.to_cluster != b.cluster
                || !b.contains(j.to_section)
            {
                return Err(RuptureError::jump(format!(
                    "{j} does not link {} to {}",
                    a.cluster, b.cluster
                )));
            }
        }
        for sp in &self.splays {
            sp.rupture.validate_links()?;
            let first = &sp.rupture.clusters[0];
            let from_ok = self
                .clusters
                .iter()
                .any(|c| c.cluster == sp.jump.from_cluster && c.contains(sp.jump.from_section));
            if !from_ok || first.cluster != sp.jump.to_cluster || !first.contains(sp.jump.to_section) {
                return Err(RuptureError::jump(format!(
                    "splay jump {} does not attach its splay",
                    sp.jump
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for RuptureCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}[", self.parent_id)?;
        for (i, s) in self.sections.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{s}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for ClusterRupture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.clusters.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{c}")?;
        }
        for sp in &self.splays {
            write!(f, " {{splay@{}: {}}}", sp.jump.from_section, sp.rupture)?;
        }
        Ok(())
    }
}
