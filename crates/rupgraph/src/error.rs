//! Error type shared by the whole crate.
//!
//! Filter rejections are not errors; they are `PlausibilityResult` values
//! handled inside the search.

use thiserror::Error;

use crate::sections::{ParentId, SectionId};

#[derive(Debug, Error)]
pub enum RuptureError {
    // Configuration: fail before any clustering or search.
    #[error("section {id} has no parent fault id")]
    MissingParent { id: usize },

    #[error("malformed section list: {reason}")]
    MalformedSections { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("unknown parent fault {0}")]
    UnknownParent(ParentId),

    #[error("unknown section {0}")]
    UnknownSection(usize),

    // Connection building.
    #[error("distance service returned an invalid distance for sections {a} and {b}")]
    NonFiniteDistance { a: SectionId, b: SectionId },

    #[error("connections have not been built")]
    NotPopulated,

    #[error("could not start worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("connection merge lock poisoned")]
    LockPoisoned,

    // Structural invariants of ruptures and jumps.
    #[error("rupture is empty")]
    EmptyRupture,

    #[error("section {0} appears more than once in a rupture")]
    DuplicateSection(SectionId),

    #[error("inconsistent jump: {reason}")]
    InconsistentJump { reason: String },

    #[error("sections {from} and {to} are not connected by any known jump")]
    Disconnected { from: SectionId, to: SectionId },

    #[error("sections {a} and {b} are not adjacent within parent {parent}")]
    NonContiguousRun {
        parent: ParentId,
        a: SectionId,
        b: SectionId,
    },
}

impl RuptureError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSections {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn jump(reason: impl Into<String>) -> Self {
        Self::InconsistentJump {
            reason: reason.into(),
        }
    }

    /// Structural errors indicate a bug in a search or a corrupt input graph,
    /// never a plausibility judgment.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::EmptyRupture
                | Self::DuplicateSection(_)
                | Self::InconsistentJump { .. }
                | Self::Disconnected { .. }
                | Self::NonContiguousRun { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RuptureError>;
