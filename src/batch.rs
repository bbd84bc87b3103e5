//! Batch clustering service: one in-memory batch in, cluster records out.

use serde::{Deserialize, Serialize};

use crate::agglomerate::{AgglomerativeClustering, Cluster};
use crate::error::Result;
use crate::index::ClusterTree;
use crate::point::Point;

/// One emitted final cluster.
///
/// This is the persisted record shape surrounding pipelines depend on:
/// a string identifier, the representative point, and the full ordered
/// member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    /// Cluster identifier, unique within the producing run.
    pub id: String,
    /// Representative point.
    pub clustroid: Point,
    /// Member points, in merge-tree order.
    pub points: Vec<Point>,
}

impl ClusterRecord {
    fn from_cluster(cluster: &Cluster) -> Self {
        Self {
            id: cluster.id().to_string(),
            clustroid: cluster.clustroid().clone(),
            points: cluster.points(),
        }
    }
}

/// Runs bounded agglomeration over one batch of already-decoded points and
/// emits the final clusters as independent records.
///
/// Record decoding and delivery belong to the surrounding pipeline; this
/// service only sees points and hands back [`ClusterRecord`]s.
#[derive(Debug, Clone)]
pub struct BatchClustering {
    clustering: AgglomerativeClustering,
}

impl BatchClustering {
    /// Create a service with the given cluster bounds.
    pub fn new(max_radius: f64, max_size: usize) -> Result<Self> {
        Ok(Self {
            clustering: AgglomerativeClustering::new(max_radius, max_size)?,
        })
    }

    /// Cluster `points` and emit one record per final cluster.
    pub fn run(&self, points: Vec<Point>) -> Result<Vec<ClusterRecord>> {
        let clusters = self.clustering.cluster(points)?;
        Ok(clusters.iter().map(ClusterRecord::from_cluster).collect())
    }

    /// Cluster `points` and additionally index the resulting representatives
    /// in a fresh [`ClusterTree`] with the given fan-out.
    pub fn run_indexed(
        &self,
        points: Vec<Point>,
        degree: usize,
    ) -> Result<(Vec<ClusterRecord>, ClusterTree)> {
        let records = self.run(points)?;
        let mut tree = ClusterTree::new(degree)?;
        for record in &records {
            tree.insert(record.clustroid.clone(), record.id.clone());
        }
        Ok((records, tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[f64]) -> Vec<Point> {
        coords.iter().map(|&x| Point::new(vec![x])).collect()
    }

    #[test]
    fn test_emits_one_record_per_cluster() {
        let service = BatchClustering::new(5.0, 10).unwrap();
        let records = service.run(points(&[0.0, 1.0, 100.0])).unwrap();
        assert_eq!(records.len(), 2);

        let total: usize = records.iter().map(|r| r.points.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_record_shape() {
        let service = BatchClustering::new(5.0, 10).unwrap();
        let records = service.run(points(&[4.0])).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.clustroid, Point::new(vec![4.0]));
        assert_eq!(record.points, vec![Point::new(vec![4.0])]);

        let json = serde_json::to_string(record).unwrap();
        assert_eq!(
            json,
            format!(r#"{{"id":"{}","clustroid":[4.0],"points":[[4.0]]}}"#, record.id)
        );
    }

    #[test]
    fn test_run_indexed_answers_lookups() {
        let service = BatchClustering::new(5.0, 10).unwrap();
        let (records, tree) = service
            .run_indexed(points(&[0.0, 1.0, 50.0, 51.0, 100.0]), 3)
            .unwrap();
        assert_eq!(tree.len(), records.len());

        // A fresh point lands in the cluster covering its neighborhood.
        let near_fifty = tree.nearest(&Point::new(vec![49.0])).unwrap();
        let record = records.iter().find(|r| r.id == near_fifty).unwrap();
        assert!(record.points.contains(&Point::new(vec![50.0])));
    }
}
