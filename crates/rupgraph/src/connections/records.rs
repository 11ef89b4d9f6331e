//! Interchange records: lossless jump graph export/import without distance calls.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::build::ClusterConnectionStrategy;
use super::types::{ConnectionRule, Jump, JumpGraph};
use crate::error::{Result, RuptureError};
use crate::sections::{FaultSection, ParentId, SectionId};

/// One cluster and its outgoing jumps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub parent_id: ParentId,
    pub parent_name: String,
    pub section_ids: Vec<SectionId>,
    pub jumps: Vec<JumpRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JumpRecord {
    pub from_section_id: SectionId,
    pub to_parent_id: ParentId,
    pub to_section_id: SectionId,
    pub distance: f64,
}

impl ClusterConnectionStrategy {
    /// Export the populated graph, one record per cluster in cluster order.
    pub fn to_records(&self) -> Result<Vec<ClusterRecord>> {
        let graph = self.jump_graph()?;
        Ok(self
            .clusters()
            .iter()
            .map(|c| ClusterRecord {
                parent_id: c.parent_id,
                parent_name: c.parent_name.clone(),
                section_ids: c.sections.clone(),
                jumps: graph
                    .jumps_for_cluster(c.id)
                    .iter()
                    .map(|j| JumpRecord {
                        from_section_id: j.from_section,
                        to_parent_id: self.clusters()[j.to_cluster.0].parent_id,
                        to_section_id: j.to_section,
                        distance: j.distance,
                    })
                    .collect(),
            })
            .collect())
    }

    /// Rebuild a populated strategy from exported records.
    ///
    /// The records must describe exactly the clusters derived from `sections`,
    /// and list every jump in both directions with equal distances. Every jump
    /// must be admissible under `rule` and `max_jump_dist`: no longer than the
    /// threshold, and at most one per ordered cluster pair for the closest rule.
    pub fn from_records(
        sections: Vec<FaultSection>,
        rule: ConnectionRule,
        max_jump_dist: Option<f64>,
        records: &[ClusterRecord],
    ) -> Result<Self> {
        let strategy = Self::new(sections, rule, max_jump_dist)?;
        if records.len() != strategy.clusters().len() {
            return Err(RuptureError::malformed(format!(
                "{} cluster records for {} clusters",
                records.len(),
                strategy.clusters().len()
            )));
        }
        let max = strategy.max_jump_dist();
        let mut linked = HashSet::new();
        let mut jumps = Vec::new();
        for (c, rec) in strategy.clusters().iter().zip(records) {
            if rec.parent_id != c.parent_id || rec.section_ids != c.sections {
                return Err(RuptureError::malformed(format!(
                    "cluster record for parent {} does not match cluster {} (parent {})",
                    rec.parent_id, c.id, c.parent_id
                )));
            }
            for jr in &rec.jumps {
                if !c.contains(jr.from_section_id) {
                    return Err(RuptureError::jump(format!(
                        "jump source {} is outside cluster {}",
                        jr.from_section_id, c.id
                    )));
                }
                let to_cluster = strategy
                    .cluster_for_section(jr.to_section_id)
                    .ok_or(RuptureError::UnknownSection(jr.to_section_id.0))?;
                if to_cluster == c.id {
                    return Err(RuptureError::jump(format!(
                        "jump {} -> {} stays inside cluster {}",
                        jr.from_section_id, jr.to_section_id, c.id
                    )));
                }
                if strategy.clusters()[to_cluster.0].parent_id != jr.to_parent_id {
                    return Err(RuptureError::jump(format!(
                        "jump target {} is not on parent {}",
                        jr.to_section_id, jr.to_parent_id
                    )));
                }
                if !jr.distance.is_finite() || jr.distance < 0.0 {
                    return Err(RuptureError::NonFiniteDistance {
                        a: jr.from_section_id,
                        b: jr.to_section_id,
                    });
                }
                if jr.distance > max {
                    return Err(RuptureError::jump(format!(
                        "jump {} -> {} is {} km, beyond the {max} km threshold",
                        jr.from_section_id, jr.to_section_id, jr.distance
                    )));
                }
                if strategy.rule() == ConnectionRule::ClosestSectionPair && !linked.insert((c.id, to_cluster)) {
                    return Err(RuptureError::jump(format!(
                        "more than one jump from cluster {} to cluster {to_cluster} under the closest-pair rule",
                        c.id
                    )));
                }
                jumps.push(Jump {
                    from_section: jr.from_section_id,
                    from_cluster: c.id,
                    to_section: jr.to_section_id,
                    to_cluster,
                    distance: jr.distance,
                });
            }
        }
        let graph = JumpGraph::from_directed(strategy.clusters(), strategy.sections().len(), jumps)?;
        graph.check_symmetry()?;
        strategy.graph.get_or_init(|| graph);
        Ok(strategy)
    }
}
