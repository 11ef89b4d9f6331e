//! Rupture builder: depth-first growth from seed clusters.
//!
//! Purpose
//! - Enumerate every rupture reachable from each seed by chaining jumps,
//!   opening and extending splays, and pruning with the filter pipeline.
//!
//! Model
//! - A search node is a rupture plus section/cluster occupancy flags; children
//!   are tried in a fixed order (frontier order, then jump-graph order, then
//!   permutation order), so repeated runs enumerate identically.
//! - A soft `Fail` suppresses the candidate but keeps growing it; a hard stop
//!   prunes the whole subtree. Seeds are emitted unfiltered.
//! - Seeds are independent and may run on a rayon pool; outputs are merged in
//!   seed order and de-duplicated by section set.
//!
//! Layout
//! - `types.rs` (config + outputs), `grow.rs` (builder and search runner).

mod grow;
mod types;

pub use grow::RuptureBuilder;
pub use types::{BuildCfg, BuildOutput, PermutationStrategy, SeedOutput, SeedPolicy};
