//! Priority queue over mergeable cluster pairs.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use super::cluster::Cluster;
use crate::error::{Error, Result};
use crate::point::Point;

/// Cost function used to price a merge between two clusters' clustroids.
///
/// Must be metric-consistent so the queue order is well defined; the default
/// is Euclidean distance.
pub type CostFn = fn(&Point, &Point) -> f64;

pub(crate) fn euclidean_cost(a: &Point, b: &Point) -> f64 {
    a.distance(b)
}

/// An unordered pair of active cluster ids plus its precomputed merge cost.
///
/// Ordering is by cost, then by the lexicographically smaller `(first,
/// second)` id pair, which keeps the merge sequence deterministic when costs
/// tie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterPair {
    cost: f64,
    first: u64,
    second: u64,
}

impl ClusterPair {
    fn new(cost: f64, a: u64, b: u64) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            cost,
            first,
            second,
        }
    }

    /// The merge cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// The smaller cluster id.
    pub fn first(&self) -> u64 {
        self.first
    }

    /// The larger cluster id.
    pub fn second(&self) -> u64 {
        self.second
    }
}

impl Eq for ClusterPair {}

impl Ord for ClusterPair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.first.cmp(&other.first))
            .then_with(|| self.second.cmp(&other.second))
    }
}

impl PartialOrd for ClusterPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Maintains every mergeable pair of active clusters, ordered by cost.
///
/// Pair entries referencing a removed cluster are invalidated lazily: they
/// stay in the heap and are skipped on pop. Cluster ids are never reused
/// within a run, so a stale entry can never alias a live cluster.
#[derive(Debug)]
pub struct ClusterQueue {
    clusters: BTreeMap<u64, Cluster>,
    pairs: BinaryHeap<Reverse<ClusterPair>>,
    cost: CostFn,
}

impl ClusterQueue {
    /// Create a queue pricing merges by clustroid Euclidean distance.
    pub fn new() -> Self {
        Self::with_cost(euclidean_cost)
    }

    /// Create a queue with a custom merge cost.
    pub fn with_cost(cost: CostFn) -> Self {
        Self {
            clusters: BTreeMap::new(),
            pairs: BinaryHeap::new(),
            cost,
        }
    }

    /// Insert a newly active cluster, pricing it against every other active
    /// cluster.
    pub fn add(&mut self, cluster: Cluster) {
        for (&id, other) in &self.clusters {
            let cost = (self.cost)(cluster.clustroid(), other.clustroid());
            self.pairs
                .push(Reverse(ClusterPair::new(cost, id, cluster.id())));
        }
        self.clusters.insert(cluster.id(), cluster);
    }

    /// The cheapest pair of currently active clusters.
    ///
    /// Stale entries are discarded along the way. Fails with
    /// [`Error::EmptyQueue`] when no live pair exists; callers check
    /// [`active_count`](Self::active_count) first, since the terminal state
    /// of the merge loop is one cluster left, not zero pairs.
    pub fn pop_best(&mut self) -> Result<ClusterPair> {
        while let Some(Reverse(pair)) = self.pairs.pop() {
            if self.clusters.contains_key(&pair.first) && self.clusters.contains_key(&pair.second)
            {
                return Ok(pair);
            }
        }
        Err(Error::EmptyQueue)
    }

    /// Remove a cluster from the active set, yielding ownership of it.
    ///
    /// Every pair entry touching the cluster becomes stale and will be
    /// skipped by later pops.
    pub fn remove(&mut self, id: u64) -> Option<Cluster> {
        self.clusters.remove(&id)
    }

    /// Look at an active cluster.
    pub fn get(&self, id: u64) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    /// Number of active clusters.
    pub fn active_count(&self) -> usize {
        self.clusters.len()
    }

    /// Drain the remaining active clusters in id order.
    pub fn into_clusters(self) -> impl Iterator<Item = Cluster> {
        self.clusters.into_values()
    }
}

impl Default for ClusterQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: u64, x: f64) -> Cluster {
        Cluster::leaf(id, Point::new(vec![x]))
    }

    #[test]
    fn test_pop_best_returns_nearest_pair() {
        let mut queue = ClusterQueue::new();
        queue.add(leaf(0, 0.0));
        queue.add(leaf(1, 10.0));
        queue.add(leaf(2, 10.5));
        assert_eq!(queue.active_count(), 3);

        let pair = queue.pop_best().unwrap();
        assert_eq!((pair.first(), pair.second()), (1, 2));
        assert!((pair.cost() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_remove_invalidates_pairs() {
        let mut queue = ClusterQueue::new();
        queue.add(leaf(0, 0.0));
        queue.add(leaf(1, 1.0));
        queue.add(leaf(2, 100.0));

        // (0, 1) is cheapest, but 1 goes away before we pop.
        queue.remove(1).unwrap();
        assert_eq!(queue.active_count(), 2);

        let pair = queue.pop_best().unwrap();
        assert_eq!((pair.first(), pair.second()), (0, 2));
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        let mut queue = ClusterQueue::new();
        // Pairs (0,1), (1,2), (2,3) all cost 1; (0,2), (1,3) cost 2; (0,3) cost 3.
        queue.add(leaf(0, 0.0));
        queue.add(leaf(1, 1.0));
        queue.add(leaf(2, 2.0));
        queue.add(leaf(3, 3.0));

        let pair = queue.pop_best().unwrap();
        assert_eq!((pair.first(), pair.second()), (0, 1));
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = ClusterQueue::new();
        assert_eq!(queue.pop_best(), Err(Error::EmptyQueue));

        queue.add(leaf(0, 0.0));
        // A single active cluster has no partner.
        assert_eq!(queue.pop_best(), Err(Error::EmptyQueue));
    }

    #[test]
    fn test_custom_cost() {
        fn manhattan(a: &Point, b: &Point) -> f64 {
            a.coords()
                .iter()
                .zip(b.coords().iter())
                .map(|(x, y)| (x - y).abs())
                .sum()
        }

        let mut queue = ClusterQueue::with_cost(manhattan);
        queue.add(leaf(0, 0.0));
        queue.add(leaf(1, 2.0));
        let pair = queue.pop_best().unwrap();
        assert!((pair.cost() - 2.0).abs() < 1e-12);
    }
}
