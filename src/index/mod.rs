//! Cluster index tree: nearest-cluster lookup over batch output.
//!
//! Once a batch has been agglomerated, downstream stages need to answer
//! "which cluster does this fresh point belong to?" without the merge tree,
//! which is transient. The index tree holds one leaf per promoted final
//! cluster (just its id and clustroid, never the member points) under
//! inner nodes with a fixed maximum fan-out (`degree`), in the manner of a
//! GRGPF cluster tree.
//!
//! ```text
//!                 inner
//!               /   |   \
//!          inner  leaf c4  inner
//!          /   \           /   \
//!      leaf c0 leaf c1  leaf c2 leaf c3
//! ```
//!
//! Supported operations: leaf insertion with closest-child descent, node
//! detachment by path, folding two detached subtrees into one node,
//! exact nearest-cluster lookup, lazy leaf traversal, and a self-describing
//! JSON snapshot ([`ClusterTree::to_json`] / [`ClusterTree::from_json`]).
//!
//! The tree is single-writer: callers needing concurrent access serialize
//! writers externally or hand readers copy-on-write snapshots.

mod snapshot;
mod tree;

pub use tree::{ClusterTree, Leaves, Node};
