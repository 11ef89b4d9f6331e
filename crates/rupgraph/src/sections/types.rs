//! Section identity and trace types, plus the serde input record.

use std::fmt;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::util::{azimuth_deg, point_along, trace_length};
use crate::error::{Result, RuptureError};

/// Index of a section in the model's section list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub usize);

/// Identifier of the parent fault a section belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentId(pub u32);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One subsection of a parent fault. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct FaultSection {
    pub id: SectionId,
    pub parent_id: ParentId,
    pub parent_name: String,
    /// Ordered trace points (km).
    pub trace: Vec<Vector2<f64>>,
    /// Trace length (km), computed at construction.
    pub length: f64,
}

impl FaultSection {
    pub fn new(
        id: SectionId,
        parent_id: ParentId,
        parent_name: impl Into<String>,
        trace: Vec<Vector2<f64>>,
    ) -> Result<Self> {
        if trace.len() < 2 {
            return Err(RuptureError::malformed(format!(
                "section {id} trace needs at least two points"
            )));
        }
        if trace.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(RuptureError::malformed(format!(
                "section {id} trace has a non-finite coordinate"
            )));
        }
        let length = trace_length(&trace);
        Ok(Self {
            id,
            parent_id,
            parent_name: parent_name.into(),
            trace,
            length,
        })
    }

    /// Point halfway along the trace.
    pub fn midpoint(&self) -> Vector2<f64> {
        point_along(&self.trace, 0.5)
    }

    /// Azimuth from the first to the last trace point.
    pub fn strike(&self) -> f64 {
        azimuth_deg(self.trace[0], self.trace[self.trace.len() - 1])
    }
}

/// Boundary representation of a section (JSON/CSV input and synth output).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: usize,
    #[serde(default)]
    pub parent_id: Option<u32>,
    #[serde(default)]
    pub parent_name: Option<String>,
    pub trace: Vec<[f64; 2]>,
}

impl TryFrom<SectionRecord> for FaultSection {
    type Error = RuptureError;

    fn try_from(rec: SectionRecord) -> Result<Self> {
        let parent = rec
            .parent_id
            .map(ParentId)
            .ok_or(RuptureError::MissingParent { id: rec.id })?;
        let name = rec
            .parent_name
            .unwrap_or_else(|| format!("Parent {parent}"));
        let trace = rec
            .trace
            .into_iter()
            .map(|[x, y]| Vector2::new(x, y))
            .collect();
        FaultSection::new(SectionId(rec.id), parent, name, trace)
    }
}

impl From<&FaultSection> for SectionRecord {
    fn from(s: &FaultSection) -> Self {
        Self {
            id: s.id.0,
            parent_id: Some(s.parent_id.0),
            parent_name: Some(s.parent_name.clone()),
            trace: s.trace.iter().map(|p| [p.x, p.y]).collect(),
        }
    }
}

/// Convert boundary records into a validated section list.
pub fn sections_from_records(records: Vec<SectionRecord>) -> Result<Vec<FaultSection>> {
    let sections = records
        .into_iter()
        .map(FaultSection::try_from)
        .collect::<Result<Vec<_>>>()?;
    validate_sections(&sections)?;
    Ok(sections)
}

/// Non-empty, and every section id equals its index.
pub fn validate_sections(sections: &[FaultSection]) -> Result<()> {
    if sections.is_empty() {
        return Err(RuptureError::malformed("no sections"));
    }
    for (i, s) in sections.iter().enumerate() {
        if s.id.0 != i {
            return Err(RuptureError::malformed(format!(
                "section at index {i} has id {}; ids must match list positions",
                s.id
            )));
        }
    }
    Ok(())
}
