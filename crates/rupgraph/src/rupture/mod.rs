//! Cluster ruptures and flat-list reconstruction.
//!
//! A rupture is a tree: an ordered primary strand of cluster runs linked by
//! jumps, plus splays (nested ruptures keyed by the jump they branch through).
//! Clusters and sections are referenced by id, so ruptures are cheap to clone
//! and safe to share across threads.

mod search;
mod types;

pub use search::RuptureConnectionSearch;
pub use types::{ClusterRupture, RuptureCluster, Splay, UniqueRupture};

#[cfg(test)]
mod tests;
