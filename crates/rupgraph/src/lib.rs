//! Multi-fault rupture enumeration over a network of fault subsections.
//!
//! Pipeline
//! - `sections`: immutable subsection records and the distance/azimuth service.
//! - `connections`: clusters (contiguous parent-fault runs) and the jump graph,
//!   built by a parallel all-pairs proximity search.
//! - `rupture`: the cluster-rupture tree (primary strand plus splays) and the
//!   reconstruction of a rupture from a flat section list.
//! - `filters`: plausibility filters and the ordered pipeline that drives pruning.
//! - `builder`: the backtracking growth search producing accepted ruptures.
//!
//! API Policy
//! - Project-internal crate; the CLI is the only in-tree consumer. `api` is the
//!   curated import surface.

pub mod api;
pub mod builder;
pub mod config;
pub mod connections;
pub mod error;
pub mod filters;
pub mod rupture;
pub mod sections;
pub mod synth;

pub use error::{Result, RuptureError};

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::builder::{BuildCfg, BuildOutput, PermutationStrategy, RuptureBuilder, SeedPolicy};
    pub use crate::config::RunCfg;
    pub use crate::connections::{
        ClusterConnectionStrategy, ClusterId, ConnectionRule, FaultSubsectionCluster, Jump,
        JumpGraph,
    };
    pub use crate::filters::{
        FilterCfg, FilterContext, FilterPipeline, PlausibilityFilter, PlausibilityResult,
    };
    pub use crate::rupture::{ClusterRupture, RuptureCluster, RuptureConnectionSearch};
    pub use crate::sections::{DistAzCalc, FaultSection, ParentId, SectionDistAzCalc, SectionId};
    pub use nalgebra::Vector2 as Vec2;
}
