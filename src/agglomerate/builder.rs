//! Greedy agglomerative merge loop with size and radius bounds.

use super::cluster::Cluster;
use super::queue::{ClusterQueue, CostFn};
use crate::error::{Error, Result};
use crate::point::Point;

/// Bounded greedy agglomerative clustering.
///
/// Starts from one leaf cluster per input point and repeatedly merges the
/// two cheapest active clusters. A merged cluster that stays strictly within
/// the configured bounds is marked final and remains active, so it can still
/// be merged further upward; one that does not is split back into its
/// children, which are promoted to the output set. The loop ends when a
/// single active cluster remains.
///
/// The output is a list of disjoint final clusters, each with
/// `size < max_size` and `radius < max_radius`, whose member points
/// partition the input exactly. Given identical inputs, cluster membership
/// and ids are fully deterministic.
#[derive(Debug, Clone)]
pub struct AgglomerativeClustering {
    max_radius: f64,
    max_size: usize,
    cost: Option<CostFn>,
}

impl AgglomerativeClustering {
    /// Create a clusterer with the given bounds.
    ///
    /// Both bounds are strict, so `max_radius` must be positive and
    /// `max_size` at least 2 for any merge to be admissible at all.
    pub fn new(max_radius: f64, max_size: usize) -> Result<Self> {
        if !(max_radius > 0.0) {
            return Err(Error::InvalidParameter {
                name: "max_radius",
                message: "must be positive",
            });
        }
        if max_size < 2 {
            return Err(Error::InvalidParameter {
                name: "max_size",
                message: "must be at least 2",
            });
        }
        Ok(Self {
            max_radius,
            max_size,
            cost: None,
        })
    }

    /// Price merges with a custom cost instead of clustroid Euclidean
    /// distance.
    pub fn with_cost(mut self, cost: CostFn) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Maximum (exclusive) cluster radius.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Maximum (exclusive) cluster size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Cluster one batch of points.
    ///
    /// An empty batch yields no clusters; a single point becomes the lone
    /// final cluster of size 1 and radius 0.
    pub fn cluster(&self, points: Vec<Point>) -> Result<Vec<Cluster>> {
        if let Some(first) = points.first() {
            let dim = first.dim();
            if let Some(p) = points.iter().find(|p| p.dim() != dim) {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    found: p.dim(),
                });
            }
        }

        let mut next_id = 0u64;
        let mut queue = match self.cost {
            Some(cost) => ClusterQueue::with_cost(cost),
            None => ClusterQueue::new(),
        };
        for point in points {
            queue.add(Cluster::leaf(alloc_id(&mut next_id), point));
        }

        let mut output = Vec::new();
        while queue.active_count() > 1 {
            let pair = queue.pop_best()?;
            // Both endpoints were just confirmed active by pop_best.
            let c1 = queue.remove(pair.first()).ok_or(Error::EmptyQueue)?;
            let c2 = queue.remove(pair.second()).ok_or(Error::EmptyQueue)?;

            let mut merged = Cluster::merge(alloc_id(&mut next_id), c1, c2);
            if self.is_final_candidate(&merged) {
                merged.mark_final(true);
                queue.add(merged);
            } else {
                // The merge went out of bounds: back off to the largest
                // sub-clusters that still satisfy them.
                match merged.into_children() {
                    Ok((left, right)) => {
                        promote(left, &mut output);
                        promote(right, &mut output);
                    }
                    Err(leaf) => promote(leaf, &mut output),
                }
            }
        }
        for cluster in queue.into_clusters() {
            promote(cluster, &mut output);
        }
        Ok(output)
    }

    /// The finality predicate: structurally eligible and strictly within
    /// both bounds.
    ///
    /// `can_be_final` requires both children to be final, which guarantees
    /// `!candidate(c1) || !candidate(c2) => !candidate(merge(c1, c2))`.
    fn is_final_candidate(&self, cluster: &Cluster) -> bool {
        cluster.can_be_final()
            && cluster.radius() < self.max_radius
            && cluster.size() < self.max_size
    }
}

fn alloc_id(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter += 1;
    id
}

/// Move a cluster into the output set, expanding any non-final cluster into
/// its children down to the largest final sub-clusters.
///
/// Explicit worklist rather than call recursion, so degenerate merge-tree
/// shapes cannot overflow the stack.
fn promote(cluster: Cluster, output: &mut Vec<Cluster>) {
    let mut worklist = vec![cluster];
    while let Some(cluster) = worklist.pop() {
        if cluster.is_final() {
            output.push(cluster);
        } else {
            match cluster.into_children() {
                Ok((left, right)) => {
                    worklist.push(right);
                    worklist.push(left);
                }
                // Leaves are created final; promote one as-is rather than
                // lose its point.
                Err(leaf) => output.push(leaf),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[f64]) -> Vec<Point> {
        coords.iter().map(|&x| Point::new(vec![x])).collect()
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            AgglomerativeClustering::new(0.0, 10),
            Err(Error::InvalidParameter {
                name: "max_radius",
                ..
            })
        ));
        assert!(matches!(
            AgglomerativeClustering::new(1.0, 1),
            Err(Error::InvalidParameter {
                name: "max_size",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_batch() {
        let clustering = AgglomerativeClustering::new(10.0, 10).unwrap();
        let output = clustering.cluster(Vec::new()).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_single_point() {
        let clustering = AgglomerativeClustering::new(10.0, 10).unwrap();
        let output = clustering.cluster(points(&[3.0])).unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].size(), 1);
        assert_eq!(output[0].radius(), 0.0);
        assert!(output[0].is_final());
    }

    #[test]
    fn test_two_points_merge() {
        // Bounds are strict, so a pair needs max_size > 2 to merge.
        let clustering = AgglomerativeClustering::new(10.0, 3).unwrap();
        let output = clustering.cluster(points(&[0.0, 1.0])).unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].size(), 2);
        assert!(output[0].radius() < 10.0);
    }

    #[test]
    fn test_strict_size_bound_blocks_merge() {
        let clustering = AgglomerativeClustering::new(10.0, 2).unwrap();
        let output = clustering.cluster(points(&[0.0, 1.0])).unwrap();
        // size 2 < 2 fails, so both points come back as singletons.
        assert_eq!(output.len(), 2);
        assert!(output.iter().all(|c| c.size() == 1));
    }

    #[test]
    fn test_near_pair_far_singleton() {
        let clustering = AgglomerativeClustering::new(5.0, 10).unwrap();
        let output = clustering.cluster(points(&[0.0, 1.0, 100.0])).unwrap();
        assert_eq!(output.len(), 2);

        let mut sizes: Vec<usize> = output.iter().map(|c| c.size()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 2]);

        let pair = output.iter().find(|c| c.size() == 2).unwrap();
        let mut members: Vec<f64> = pair.points().iter().map(|p| p.coords()[0]).collect();
        members.sort_by(f64::total_cmp);
        assert_eq!(members, vec![0.0, 1.0]);
    }

    #[test]
    fn test_output_respects_bounds() {
        let clustering = AgglomerativeClustering::new(2.5, 4).unwrap();
        let input = points(&[0.0, 0.5, 1.0, 1.5, 2.0, 7.0, 7.5, 8.0, 20.0]);
        let output = clustering.cluster(input).unwrap();
        for cluster in &output {
            assert!(cluster.size() < 4);
            assert!(cluster.radius() < 2.5);
            assert!(cluster.is_final());
        }
    }

    #[test]
    fn test_partition_property() {
        let clustering = AgglomerativeClustering::new(3.0, 5).unwrap();
        let input = points(&[4.0, 0.0, 9.0, 1.0, 8.5, 0.25, 30.0, 29.0]);
        let output = clustering.cluster(input.clone()).unwrap();

        let mut got: Vec<f64> = output
            .iter()
            .flat_map(|c| c.points())
            .map(|p| p.coords()[0])
            .collect();
        got.sort_by(f64::total_cmp);
        let mut want: Vec<f64> = input.iter().map(|p| p.coords()[0]).collect();
        want.sort_by(f64::total_cmp);
        assert_eq!(got, want);
    }

    #[test]
    fn test_deterministic() {
        let clustering = AgglomerativeClustering::new(2.0, 4).unwrap();
        let input = points(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        let a = clustering.cluster(input.clone()).unwrap();
        let b = clustering.cluster(input).unwrap();

        let ids = |out: &[Cluster]| out.iter().map(|c| c.id()).collect::<Vec<_>>();
        let members = |out: &[Cluster]| {
            out.iter()
                .map(|c| c.points().iter().map(|p| p.coords()[0]).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(members(&a), members(&b));
    }

    #[test]
    fn test_dimension_mismatch() {
        let clustering = AgglomerativeClustering::new(2.0, 4).unwrap();
        let input = vec![Point::new(vec![0.0, 0.0]), Point::new(vec![1.0])];
        let err = clustering.cluster(input).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }
}
