//! Cluster connection strategy: clusters, jumps and the jump graph.
//!
//! Purpose
//! - Group sections into clusters (contiguous parent runs) and discover which
//!   section pairs of different clusters form admissible jumps.
//!
//! Model
//! - Work is partitioned by unordered cluster pair and evaluated on a rayon pool
//!   with read-only access to sections and the distance service.
//! - All pair results are collected (order-preserving) before a single merge
//!   under the merge lock materializes reverse jumps, sorts jump lists and
//!   builds the parent adjacency index. The final graph is therefore identical
//!   for any worker count.
//!
//! Layout
//! - `types.rs` (clusters, jumps, graph), `build.rs` (strategy + parallel
//!   search), `records.rs` (interchange import/export).

mod build;
mod records;
mod types;

pub use build::ClusterConnectionStrategy;
pub use records::{ClusterRecord, JumpRecord};
pub use types::{build_clusters, ClusterId, ConnectionRule, FaultSubsectionCluster, Jump, JumpGraph};
