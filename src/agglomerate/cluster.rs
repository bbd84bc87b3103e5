//! Merge-tree clusters.

use crate::point::Point;

/// A node in the agglomeration merge tree.
///
/// A cluster is either a **leaf** wrapping a single input point, or a
/// **merged** cluster that exclusively owns its two children; the merge
/// history therefore forms a binary tree, never a DAG. Each cluster tracks
/// its clustroid (representative point), a radius bound, its size, and a
/// `final` flag meaning "eligible to become an output cluster", not
/// "terminal": a final cluster may still be merged further upward.
///
/// Ids are allocated by the builder from a counter threaded through one
/// clustering run; they increase monotonically and are never reused.
#[derive(Debug, Clone)]
pub struct Cluster {
    id: u64,
    clustroid: Point,
    radius: f64,
    size: usize,
    is_final: bool,
    kind: Kind,
}

#[derive(Debug, Clone)]
enum Kind {
    Leaf,
    Merged {
        left: Box<Cluster>,
        right: Box<Cluster>,
    },
}

impl Cluster {
    /// Create a leaf cluster around a single point.
    ///
    /// Leaves are final from the start: one point satisfies any positive
    /// size/radius bound.
    pub fn leaf(id: u64, point: Point) -> Self {
        Self {
            id,
            clustroid: point,
            radius: 0.0,
            size: 1,
            is_final: true,
            kind: Kind::Leaf,
        }
    }

    /// Merge two clusters into a new, initially non-final cluster.
    ///
    /// The merged clustroid is the size-weighted mean of the children's
    /// clustroids. The radius is the triangle-inequality bound
    /// `max over children c of d(clustroid, clustroid(c)) + radius(c)`,
    /// which bounds the distance from the new clustroid to any descendant
    /// point without rescanning members.
    pub fn merge(id: u64, left: Cluster, right: Cluster) -> Self {
        let size = left.size + right.size;
        let clustroid = weighted_mean(&left.clustroid, left.size, &right.clustroid, right.size);
        let radius = (clustroid.distance(&left.clustroid) + left.radius)
            .max(clustroid.distance(&right.clustroid) + right.radius);
        Self {
            id,
            clustroid,
            radius,
            size,
            is_final: false,
            kind: Kind::Merged {
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    /// Unique identifier within the producing run.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Representative point.
    pub fn clustroid(&self) -> &Point {
        &self.clustroid
    }

    /// Upper bound on the distance from the clustroid to any member point.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of member points.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether this cluster is currently eligible to be an output cluster.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Set the final flag.
    pub fn mark_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    /// Whether this cluster is structurally allowed to become final.
    ///
    /// A merged cluster qualifies only while both children are final. This
    /// makes eligibility monotone: once a cluster has been marked non-final,
    /// no cluster built on top of it can become final either.
    pub fn can_be_final(&self) -> bool {
        match &self.kind {
            Kind::Leaf => true,
            Kind::Merged { left, right } => left.is_final && right.is_final,
        }
    }

    /// The two children of a merged cluster, or `None` for a leaf.
    pub fn children(&self) -> Option<(&Cluster, &Cluster)> {
        match &self.kind {
            Kind::Leaf => None,
            Kind::Merged { left, right } => Some((left, right)),
        }
    }

    /// Split a merged cluster into its children; a leaf is handed back
    /// unchanged as the error value.
    pub fn into_children(self) -> std::result::Result<(Cluster, Cluster), Cluster> {
        match self.kind {
            Kind::Merged { left, right } => Ok((*left, *right)),
            Kind::Leaf => Err(self),
        }
    }

    /// Collect the member points of this cluster, left to right.
    ///
    /// Walks the merge tree with an explicit stack so pathological merge
    /// shapes cannot overflow the call stack; materialized only for
    /// clusters that become outputs.
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.size);
        let mut stack = vec![self];
        while let Some(cluster) = stack.pop() {
            match &cluster.kind {
                Kind::Leaf => points.push(cluster.clustroid.clone()),
                Kind::Merged { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        points
    }
}

/// Size-weighted mean of two clustroids, coordinate-wise.
fn weighted_mean(a: &Point, wa: usize, b: &Point, wb: usize) -> Point {
    let total = (wa + wb) as f64;
    let coords = a
        .coords()
        .iter()
        .zip(b.coords().iter())
        .map(|(x, y)| (x * wa as f64 + y * wb as f64) / total)
        .collect();
    Point::new(coords)
}
