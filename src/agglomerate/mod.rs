//! Bounded greedy agglomeration.
//!
//! Classic agglomerative clustering merges the two closest clusters until
//! one remains and leaves the "where to cut" decision to the caller. Here
//! the cut is built into the merge loop instead: the caller supplies hard
//! per-cluster bounds, and the loop decides merge by merge whether the
//! result may still become an output cluster.
//!
//! Each merged cluster is checked against a **finality predicate**:
//!
//! ```text
//! candidate(m) = can_be_final(m) AND m.radius < max_radius AND m.size < max_size
//! ```
//!
//! A passing cluster is marked final and stays active (it may still be
//! merged further upward). A failing cluster is split back into its two
//! children, which are promoted to the output set. `can_be_final` requires
//! both children to be final, so the predicate is monotone: once a cluster
//! fails the bounds, nothing built on top of it can pass them.
//!
//! ```text
//!          merge loop                       output set
//!  [a] [b] [c] [d] ... ──pop──▶ (a,b) ──▶ within bounds? ──yes──▶ re-queue
//!                                              │no
//!                                              └──▶ promote a, promote b
//! ```
//!
//! The result is a set of disjoint clusters, each strictly within both
//! bounds, whose members partition the input batch exactly.

mod builder;
mod cluster;
mod queue;

pub use builder::AgglomerativeClustering;
pub use cluster::Cluster;
pub use queue::{ClusterPair, ClusterQueue, CostFn};
