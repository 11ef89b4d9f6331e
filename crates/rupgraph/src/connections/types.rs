//! Clusters, jumps and the frozen jump graph.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuptureError};
use crate::sections::{validate_sections, FaultSection, ParentId, SectionId};

/// Index of a cluster in the strategy's cluster list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub usize);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A contiguous run of sections sharing one parent, in trace order.
///
/// Invariant: non-empty; since section ids equal list positions, the run is the
/// id range `first_section..=last_section`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FaultSubsectionCluster {
    pub id: ClusterId,
    pub parent_id: ParentId,
    pub parent_name: String,
    pub sections: Vec<SectionId>,
}

impl FaultSubsectionCluster {
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
        s >= self.first_section() && s <= self.last_section()
    }

    /// Position of `s` in trace order.
    pub fn index_of(&self, s: SectionId) -> Option<usize> {
        self.contains(s).then(|| s.0 - self.first_section().0)
    }
}

/// Group a validated section list into clusters, one per contiguous parent run.
pub fn build_clusters(sections: &[FaultSection]) -> Result<Vec<FaultSubsectionCluster>> {
    validate_sections(sections)?;
    let mut clusters: Vec<FaultSubsectionCluster> = Vec::new();
    for s in sections {
        match clusters.last_mut() {
            Some(c) if c.parent_id == s.parent_id => c.sections.push(s.id),
            _ => clusters.push(FaultSubsectionCluster {
                id: ClusterId(clusters.len()),
                parent_id: s.parent_id,
                parent_name: s.parent_name.clone(),
                sections: vec![s.id],
            }),
        }
    }
    Ok(clusters)
}

/// Directed connection between a section of one cluster and a section of another.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Jump {
    pub from_section: SectionId,
    pub from_cluster: ClusterId,
    pub to_section: SectionId,
    pub to_cluster: ClusterId,
    pub distance: f64,
}

impl Jump {
    pub fn reversed(&self) -> Jump {
        Jump {
            from_section: self.to_section,
            from_cluster: self.to_cluster,
            to_section: self.from_section,
            to_cluster: self.from_cluster,
            distance: self.distance,
        }
    }

    /// Same endpoints (ignores distance).
    pub fn same_link(&self, other: &Jump) -> bool {
        self.from_section == other.from_section && self.to_section == other.to_section
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] -> {}[{}] ({:.2} km)",
            self.from_section, self.from_cluster, self.to_section, self.to_cluster, self.distance
        )
    }
}

/// Which section pairs of two clusters become jumps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRule {
    /// Only the closest section pair, if within the threshold.
    #[default]
    ClosestSectionPair,
    /// Every section pair within the threshold.
    AllWithinDistance,
}

/// Frozen jump structure: per-cluster and per-section jump lists plus the
/// symmetric parent adjacency index.
///
/// Jump lists are sorted by (target cluster, distance, target section).
#[derive(Clone, Debug, Default)]
pub struct JumpGraph {
    by_cluster: Vec<Vec<Jump>>,
    by_section: Vec<Vec<Jump>>,
    parent_pairs: HashSet<(ParentId, ParentId)>,
    num_jumps: usize,
}

impl JumpGraph {
    fn empty(num_clusters: usize, num_sections: usize) -> Self {
        Self {
            by_cluster: vec![Vec::new(); num_clusters],
            by_section: vec![Vec::new(); num_sections],
            parent_pairs: HashSet::new(),
            num_jumps: 0,
        }
    }

    fn insert(&mut self, clusters: &[FaultSubsectionCluster], j: Jump) {
        self.by_cluster[j.from_cluster.0].push(j);
        self.by_section[j.from_section.0].push(j);
        let (pa, pb) = (
            clusters[j.from_cluster.0].parent_id,
            clusters[j.to_cluster.0].parent_id,
        );
        self.parent_pairs.insert((pa, pb));
        self.parent_pairs.insert((pb, pa));
        self.num_jumps += 1;
    }

    fn sort(&mut self) {
        let key = |a: &Jump, b: &Jump| {
            a.to_cluster
                .cmp(&b.to_cluster)
                .then(a.distance.total_cmp(&b.distance))
                .then(a.to_section.cmp(&b.to_section))
        };
        for list in self.by_cluster.iter_mut().chain(self.by_section.iter_mut()) {
            list.sort_by(key);
        }
    }

    /// Merge one-way jumps (as found per cluster pair); reverses are materialized here.
    pub(crate) fn from_one_way(
        clusters: &[FaultSubsectionCluster],
        num_sections: usize,
        found: impl IntoIterator<Item = Jump>,
    ) -> Self {
        let mut g = Self::empty(clusters.len(), num_sections);
        for j in found {
            g.insert(clusters, j);
            g.insert(clusters, j.reversed());
        }
        g.sort();
        g
    }

    /// Merge jumps that already list both directions (interchange import).
    pub(crate) fn from_directed(
        clusters: &[FaultSubsectionCluster],
        num_sections: usize,
        jumps: impl IntoIterator<Item = Jump>,
    ) -> Result<Self> {
        let mut g = Self::empty(clusters.len(), num_sections);
        let mut seen = HashSet::new();
        for j in jumps {
            if !seen.insert((j.from_section, j.to_section)) {
                return Err(RuptureError::jump(format!("duplicate jump {j}")));
            }
            g.insert(clusters, j);
        }
        g.sort();
        Ok(g)
    }

    /// All jumps, both directions, grouped by source cluster.
    pub fn all_possible_jumps(&self) -> impl Iterator<Item = &Jump> + '_ {
        self.by_cluster.iter().flatten()
    }

    pub fn jumps_from(&self, s: SectionId) -> &[Jump] {
        self.by_section.get(s.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn jumps_for_cluster(&self, c: ClusterId) -> &[Jump] {
        self.by_cluster.get(c.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn are_parents_connected(&self, a: ParentId, b: ParentId) -> bool {
        self.parent_pairs.contains(&(a, b))
    }

    /// Number of directed jumps (each connection counts twice).
    pub fn num_jumps(&self) -> usize {
        self.num_jumps
    }

    /// Every jump A→B has a reverse B→A with identical distance.
    pub fn check_symmetry(&self) -> Result<()> {
        for j in self.all_possible_jumps() {
            let back = self
                .jumps_from(j.to_section)
                .iter()
                .find(|r| r.to_section == j.from_section);
            match back {
                Some(r) if r.distance == j.distance && r.to_cluster == j.from_cluster => {}
                Some(r) => {
                    return Err(RuptureError::jump(format!(
                        "reverse of {j} disagrees: {r}"
                    )))
                }
                None => return Err(RuptureError::jump(format!("{j} has no reverse"))),
            }
        }
        Ok(())
    }
}
