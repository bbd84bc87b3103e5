//! # clustree
//!
//! Bounded greedy agglomerative clustering plus a fan-out-bounded index tree
//! over the resulting cluster representatives (a GRGPF-style cluster tree).
//!
//! The crate has two halves that meet at the final clusters:
//!
//! | Half | Entry point | Job |
//! |------|-------------|-----|
//! | [`agglomerate`] | [`AgglomerativeClustering`] | merge a batch of points into disjoint clusters, each strictly within caller-supplied size/radius bounds |
//! | [`index`] | [`ClusterTree`] | answer nearest-cluster queries over the emitted representatives; snapshot to/from JSON |
//!
//! [`BatchClustering`] wires them together for pipeline use: points in,
//! [`ClusterRecord`]s out, optionally with a freshly built index.
//!
//! ```rust
//! use clustree::{BatchClustering, Point};
//!
//! let batch = vec![
//!     Point::new(vec![0.0, 0.0]),
//!     Point::new(vec![0.5, 0.0]),
//!     Point::new(vec![40.0, 40.0]),
//! ];
//! let service = BatchClustering::new(5.0, 10)?;
//! let (records, index) = service.run_indexed(batch, 4)?;
//!
//! assert_eq!(records.len(), 2);
//! let id = index.nearest(&Point::new(vec![0.1, 0.2]))?;
//! assert!(records.iter().any(|r| r.id == id && r.points.len() == 2));
//! # Ok::<(), clustree::Error>(())
//! ```
//!
//! Everything is single-threaded and synchronous: one batch is clustered to
//! completion in memory, and the index tree expects external serialization
//! of writers.

pub mod agglomerate;
/// Error types used across `clustree`.
pub mod error;
pub mod index;
pub mod point;

mod batch;


pub use agglomerate::{AgglomerativeClustering, Cluster, ClusterPair, ClusterQueue, CostFn};
pub use batch::{BatchClustering, ClusterRecord};
pub use error::{Error, Result};
pub use index::{ClusterTree, Leaves, Node};
pub use point::Point;
