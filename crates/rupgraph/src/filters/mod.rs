//! Plausibility filters and the ordered pipeline that drives pruning.
//!
//! Purpose
//! - Judge candidate ruptures during growth. A filter never mutates the rupture.
//!
//! Model
//! - Three outcomes, ordered by severity: `Pass` (emit, keep growing),
//!   `Fail` (do not emit, keep growing), `FailHardStop` (do not emit, abandon
//!   this branch). Hard stops are reserved for properties that can only get
//!   worse as the rupture grows.
//! - The pipeline runs filters in configured order and stops at the first hard
//!   stop; otherwise the combined result is the most severe one seen.
//!
//! Layout
//! - `types.rs` (result, traits, context), `pipeline.rs` (pipeline + tally),
//!   `cfg.rs` (serde configuration), `jump.rs`, `splay.rs`, `shape.rs` (filters).

mod cfg;
mod jump;
mod pipeline;
mod shape;
mod splay;
mod types;

pub use cfg::FilterCfg;
pub use jump::{CumulativeProbabilityFilter, JumpAzimuthChangeFilter, JumpDistFilter};
pub use pipeline::{FilterCounts, FilterPipeline, FilterTally, Verdict};
pub use shape::{CumulativeAzimuthChangeFilter, MinSectsPerParentFilter};
pub use splay::{SplayCountFilter, SplayLengthFilter};
pub use types::{FilterContext, PlausibilityFilter, PlausibilityResult, ScalarValuedFilter};
