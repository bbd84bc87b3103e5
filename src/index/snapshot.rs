//! Self-describing JSON snapshots of the index tree.
//!
//! The wire shape is `{ "degree": d, "root": <node> }`, where `<node>` is
//! either `{ "kind": "leaf", "id": "...", "point": [..] }` or
//! `{ "kind": "inner", "children": [<node>, ...] }`. Decoding validates the
//! declared fan-out before a tree is handed back, so a malformed snapshot
//! never yields a partially constructed tree.

use serde::Deserialize;

use super::tree::{ClusterTree, Node};
use crate::error::{Error, Result};

#[derive(Deserialize)]
struct RawSnapshot {
    degree: usize,
    root: Node,
}

impl ClusterTree {
    /// Encode the tree to its JSON snapshot.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::MalformedSnapshot(e.to_string()))
    }

    /// Decode a tree from its JSON snapshot.
    ///
    /// Fails with [`Error::MalformedSnapshot`] on an unknown node tag, a
    /// degree below 2, or an inner node holding more children than the
    /// declared fan-out.
    pub fn from_json(snapshot: &str) -> Result<Self> {
        let raw: RawSnapshot =
            serde_json::from_str(snapshot).map_err(|e| Error::MalformedSnapshot(e.to_string()))?;
        validate(raw.degree, &raw.root)?;
        Ok(ClusterTree::from_parts(raw.degree, raw.root))
    }
}

fn validate(degree: usize, root: &Node) -> Result<()> {
    if degree < 2 {
        return Err(Error::MalformedSnapshot(format!(
            "degree {degree} is below 2"
        )));
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Node::Inner { children } = node {
            if children.len() > degree {
                return Err(Error::MalformedSnapshot(format!(
                    "inner node holds {} children, fan-out bound is {degree}",
                    children.len()
                )));
            }
            stack.extend(children.iter());
        }
    }
    Ok(())
}
