//! Degree-bounded index tree over final cluster representatives.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point::Point;

/// A node of the cluster index tree.
///
/// Leaves point at finished final clusters (id plus clustroid), not at the
/// merge tree that produced them. Inner nodes hold up to `degree` children
/// and are exclusively owned by their parent, so every reachable node has
/// exactly one parent and traversal is always top-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// One indexed final cluster.
    Leaf {
        /// Identifier of the indexed cluster.
        id: String,
        /// The cluster's representative.
        #[serde(rename = "point")]
        clustroid: Point,
    },
    /// An internal grouping node.
    Inner {
        /// Child nodes, at most `degree` of them.
        children: Vec<Node>,
    },
}

impl Node {
    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Number of immediate children contributed when folding this node into
    /// another: a leaf counts as itself.
    fn immediate_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Inner { children } => children.len(),
        }
    }

    /// Distance from `point` to the nearest leaf in this subtree, or `None`
    /// if the subtree holds no leaves.
    pub fn min_distance(&self, point: &Point) -> Option<f64> {
        self.leaves()
            .map(|(_, clustroid)| clustroid.distance(point))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Lazy left-to-right traversal of the leaves in this subtree.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }
}

/// Lazy, restartable iterator over `(cluster id, clustroid)` leaves.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (&'a str, &'a Point);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf { id, clustroid } => return Some((id, clustroid)),
                Node::Inner { children } => self.stack.extend(children.iter().rev()),
            }
        }
        None
    }
}

/// A rooted multiway tree over cluster representatives with fixed maximum
/// fan-out, supporting insertion, removal, subtree folding, nearest-cluster
/// lookup, and snapshot round-trips.
///
/// The tree indexes only `(id, clustroid)` pairs of promoted final clusters;
/// full point membership stays with the emitting pipeline. It is not
/// designed for concurrent mutation; callers serialize writers externally.
/// Decoding goes through `from_json`, which validates the fan-out bound
/// before a tree is constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterTree {
    degree: usize,
    root: Node,
}

impl ClusterTree {
    /// Create an empty tree with the given maximum fan-out.
    pub fn new(degree: usize) -> Result<Self> {
        if degree < 2 {
            return Err(Error::InvalidParameter {
                name: "degree",
                message: "must be at least 2",
            });
        }
        Ok(Self {
            degree,
            root: Node::Inner {
                children: Vec::new(),
            },
        })
    }

    /// Maximum fan-out of inner nodes.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub(crate) fn from_parts(degree: usize, root: Node) -> Self {
        Self { degree, root }
    }

    /// Insert a leaf for a finished cluster.
    ///
    /// Descends toward geometrically close members: a leaf is pushed
    /// directly while the current inner node has room; once full, descent
    /// continues into the child whose subtree holds the leaf nearest the new
    /// clustroid. A full path ending at a leaf wraps that leaf and the new
    /// one in a fresh inner pair, so the fan-out bound always holds.
    pub fn insert(&mut self, clustroid: Point, cluster_id: impl Into<String>) {
        let id = cluster_id.into();
        if self.root.is_leaf() {
            let occupant = std::mem::replace(
                &mut self.root,
                Node::Inner {
                    children: Vec::new(),
                },
            );
            if let Node::Inner { children } = &mut self.root {
                children.push(occupant);
            }
        }

        let degree = self.degree;
        let mut node = &mut self.root;
        loop {
            match node {
                Node::Inner { children } if children.len() < degree => {
                    children.push(Node::Leaf { id, clustroid });
                    return;
                }
                Node::Inner { children } => {
                    let nearest = nearest_child(children, &clustroid);
                    node = &mut children[nearest];
                }
                Node::Leaf { .. } => {
                    let occupant = std::mem::replace(
                        node,
                        Node::Inner {
                            children: Vec::with_capacity(2),
                        },
                    );
                    if let Node::Inner { children } = node {
                        children.push(occupant);
                        children.push(Node::Leaf { id, clustroid });
                    }
                    return;
                }
            }
        }
    }

    /// Detach the node addressed by a child-index `path` and return it.
    ///
    /// The empty path detaches the whole tree: the old root is returned and
    /// a fresh empty root takes its place. Detaching an inner node removes
    /// its entire subtree. Returns `None` if the path addresses nothing.
    pub fn remove(&mut self, path: &[usize]) -> Option<Node> {
        let Some((&last, prefix)) = path.split_last() else {
            return Some(std::mem::replace(
                &mut self.root,
                Node::Inner {
                    children: Vec::new(),
                },
            ));
        };
        let mut node = &mut self.root;
        for &idx in prefix {
            match node {
                Node::Inner { children } => node = children.get_mut(idx)?,
                Node::Leaf { .. } => return None,
            }
        }
        match node {
            Node::Inner { children } if last < children.len() => Some(children.remove(last)),
            _ => None,
        }
    }

    /// Path of the leaf indexing `cluster_id`, if present.
    ///
    /// Combined with [`remove`](Self::remove), this gives id-based removal.
    pub fn find(&self, cluster_id: &str) -> Option<Vec<usize>> {
        let mut stack = vec![(&self.root, Vec::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                Node::Leaf { id, .. } => {
                    if id == cluster_id {
                        return Some(path);
                    }
                }
                Node::Inner { children } => {
                    for (i, child) in children.iter().enumerate().rev() {
                        let mut child_path = path.clone();
                        child_path.push(i);
                        stack.push((child, child_path));
                    }
                }
            }
        }
        None
    }

    /// Fold two detached subtrees into one new inner node.
    ///
    /// Each side contributes its immediate children; a leaf contributes
    /// itself rather than being unwrapped. When the union would exceed the
    /// fan-out bound, both nodes are kept intact as the only two children
    /// instead.
    pub fn merge(&self, a: Node, b: Node) -> Node {
        if a.immediate_count() + b.immediate_count() > self.degree {
            return Node::Inner {
                children: vec![a, b],
            };
        }
        let mut children = Vec::with_capacity(a.immediate_count() + b.immediate_count());
        flatten_into(a, &mut children);
        flatten_into(b, &mut children);
        Node::Inner { children }
    }

    /// Install `node` as the new root, returning the old root.
    ///
    /// Used to re-attach the result of [`merge`](Self::merge) when
    /// rebuilding after batched changes.
    pub fn set_root(&mut self, node: Node) -> Node {
        std::mem::replace(&mut self.root, node)
    }

    /// Identifier of the indexed cluster nearest to `point`.
    ///
    /// Descends from the root, at each inner node choosing the child whose
    /// subtree holds the smallest leaf distance, so the returned leaf is the
    /// exact nearest. Fails with [`Error::TreeEmpty`] when no leaves exist.
    pub fn nearest(&self, point: &Point) -> Result<&str> {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { id, .. } => return Ok(id),
                Node::Inner { children } => {
                    let mut best: Option<(usize, f64)> = None;
                    for (i, child) in children.iter().enumerate() {
                        if let Some(d) = child.min_distance(point) {
                            if best.map_or(true, |(_, bd)| d < bd) {
                                best = Some((i, d));
                            }
                        }
                    }
                    match best {
                        Some((i, _)) => node = &children[i],
                        None => return Err(Error::TreeEmpty),
                    }
                }
            }
        }
    }

    /// All indexed leaves, left to right.
    pub fn leaves(&self) -> Leaves<'_> {
        self.root.leaves()
    }

    /// Representatives of every indexed cluster.
    pub fn clustroids(&self) -> Vec<&Point> {
        self.leaves().map(|(_, clustroid)| clustroid).collect()
    }

    /// Identifiers of every indexed cluster.
    pub fn cluster_ids(&self) -> Vec<&str> {
        self.leaves().map(|(id, _)| id).collect()
    }

    /// Number of indexed clusters.
    pub fn len(&self) -> usize {
        self.leaves().count()
    }

    /// Whether the tree indexes no clusters.
    pub fn is_empty(&self) -> bool {
        self.leaves().next().is_none()
    }
}

fn flatten_into(node: Node, children: &mut Vec<Node>) {
    match node {
        Node::Leaf { .. } => children.push(node),
        Node::Inner { children: sub } => children.extend(sub),
    }
}

fn nearest_child(children: &[Node], target: &Point) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, child) in children.iter().enumerate() {
        let d = child.min_distance(target).unwrap_or(f64::INFINITY);
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}

impl fmt::Display for ClusterTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cluster tree (degree {}):", self.degree)?;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, indent)) = stack.pop() {
            for _ in 0..indent {
                write!(f, "  ")?;
            }
            match node {
                Node::Leaf { id, clustroid } => writeln!(f, "leaf {id} @ {clustroid}")?,
                Node::Inner { children } => {
                    writeln!(f, "inner ({} children)", children.len())?;
                    for child in children.iter().rev() {
                        stack.push((child, indent + 1));
                    }
                }
            }
        }
        Ok(())
    }
}
