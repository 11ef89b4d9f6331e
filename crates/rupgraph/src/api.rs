//! Curated import surface for the CLI, benches and integration tests.
//!
//! Important
//! - Project-internal; breaking changes are allowed. Prefer these re-exports
//!   over deep module paths so call sites stay uniform.

// Sections and distances
pub use crate::sections::{
    angle_diff, azimuth_deg, sections_from_records, validate_sections, DistAzCalc, DistanceTable,
    FaultSection, ParentId, SectionDistAzCalc, SectionId, SectionRecord,
};
// Synthetic networks
pub use crate::synth::{draw_network, straight_fault, ReplayToken as SynthReplay, SectionCount, SynthCfg};
// Connections
pub use crate::connections::{
    build_clusters, ClusterConnectionStrategy, ClusterId, ClusterRecord, ConnectionRule,
    FaultSubsectionCluster, Jump, JumpGraph, JumpRecord,
};
// Ruptures
pub use crate::rupture::{ClusterRupture, RuptureCluster, RuptureConnectionSearch, Splay, UniqueRupture};
// Filters
pub use crate::filters::{
    CumulativeAzimuthChangeFilter, CumulativeProbabilityFilter, FilterCfg, FilterContext,
    FilterCounts, FilterPipeline, FilterTally, JumpAzimuthChangeFilter, JumpDistFilter,
    MinSectsPerParentFilter, PlausibilityFilter, PlausibilityResult, ScalarValuedFilter,
    SplayCountFilter, SplayLengthFilter, Verdict,
};
// Growth
pub use crate::builder::{BuildCfg, BuildOutput, PermutationStrategy, RuptureBuilder, SeedOutput, SeedPolicy};
pub use crate::config::RunCfg;
pub use crate::error::{Result, RuptureError};
