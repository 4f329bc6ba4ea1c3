use serde_json::Value;

use crate::error::{Error, Result};

pub mod color;
pub mod layout;
pub mod painter;
pub mod threshold;

pub type NodeId = usize;

/// Depth guard for document normalization. A linkage tree over `n` items is
/// at most `n` deep, so anything past this is a cycle or garbage input.
pub const MAX_TREE_DEPTH: usize = 10_000;

/// Node within a clustering dendrogram.
///
/// Identity is positional: ids are pre-order indices into the owning
/// [`ClusterTree`] arena, assigned during normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterNode {
    pub id: NodeId,
    /// Leaf or cluster label; empty labels are normalized to `None`.
    pub name: Option<String>,
    /// Dissimilarity at which this node's children merged; `None` for leaves.
    pub distance: Option<f64>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl ClusterNode {
    fn new(id: NodeId, name: Option<String>, distance: Option<f64>) -> Self {
        Self {
            id,
            name,
            distance,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A normalized hierarchical-clustering tree with an explicit node list.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTree {
    pub root: NodeId,
    pub nodes: Vec<ClusterNode>,
    num_leaves: usize,
    domain: Option<(f64, f64)>,
}

impl ClusterTree {
    /// Normalizes a parsed dendrogram document into the canonical arena form.
    ///
    /// The wire format uses compact keys (`"n"` name, `"d"` distance, `"c"`
    /// children); the long-form aliases `"name"` / `"distance"` /
    /// `"children"` are accepted as well. A missing or `null` child list
    /// marks a leaf. The walk is iterative with an explicit work stack and a
    /// depth guard, so cyclic or absurdly deep input fails with
    /// [`Error::CyclicTree`] instead of overflowing.
    pub fn from_document(doc: &Value) -> Result<Self> {
        struct Frame<'a> {
            value: &'a Value,
            parent: Option<NodeId>,
            depth: usize,
            path: String,
        }

        let mut nodes: Vec<ClusterNode> = Vec::new();
        let mut stack = vec![Frame {
            value: doc,
            parent: None,
            depth: 0,
            path: "root".to_string(),
        }];

        while let Some(frame) = stack.pop() {
            if frame.depth >= MAX_TREE_DEPTH {
                return Err(Error::CyclicTree {
                    max_depth: MAX_TREE_DEPTH,
                });
            }

            let obj = frame.value.as_object().ok_or_else(|| Error::MalformedTree {
                path: frame.path.clone(),
                reason: "node is not an object".to_string(),
            })?;

            let name = obj
                .get("n")
                .or_else(|| obj.get("name"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            let distance = match obj.get("d").or_else(|| obj.get("distance")) {
                None | Some(Value::Null) => None,
                Some(value) => Some(value.as_f64().ok_or_else(|| Error::MalformedTree {
                    path: frame.path.clone(),
                    reason: "distance is not a number".to_string(),
                })?),
            };

            let id = nodes.len();
            let mut node = ClusterNode::new(id, name, distance);
            node.parent = frame.parent;
            nodes.push(node);

            if let Some(parent) = frame.parent {
                nodes[parent].children.push(id);
            }

            match obj.get("c").or_else(|| obj.get("children")) {
                None | Some(Value::Null) => {}
                Some(Value::Array(children)) => {
                    // LIFO stack: push in reverse so siblings keep their
                    // document order (and pre-order ids).
                    for (index, child) in children.iter().enumerate().rev() {
                        stack.push(Frame {
                            value: child,
                            parent: Some(id),
                            depth: frame.depth + 1,
                            path: format!("{}.c[{}]", frame.path, index),
                        });
                    }
                }
                Some(_) => {
                    return Err(Error::MalformedTree {
                        path: frame.path,
                        reason: "children field is not an ordered sequence".to_string(),
                    });
                }
            }
        }

        let num_leaves = nodes.iter().filter(|node| node.is_leaf()).count();
        let domain = distance_domain(&nodes);

        log::debug!(
            "normalized tree: {} nodes, {} leaves, domain {:?}",
            nodes.len(),
            num_leaves,
            domain
        );

        Ok(Self {
            root: 0,
            nodes,
            num_leaves,
            domain,
        })
    }

    /// Convenience wrapper for callers holding raw JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(raw).map_err(|err| Error::MalformedTree {
            path: "root".to_string(),
            reason: err.to_string(),
        })?;
        Self::from_document(&doc)
    }

    pub fn node(&self, id: NodeId) -> Option<&ClusterNode> {
        self.nodes.get(id)
    }

    pub fn root_node(&self) -> &ClusterNode {
        &self.nodes[self.root]
    }

    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// `(d_min, d_max)` over all nodes with a defined distance; `None` when
    /// no node carries one (e.g. a single bare leaf).
    pub fn distance_domain(&self) -> Option<(f64, f64)> {
        self.domain
    }

    pub fn leaves(&self) -> impl Iterator<Item = &ClusterNode> {
        self.nodes.iter().filter(|node| node.is_leaf())
    }

    /// Merge distances of all internal nodes, in arena order.
    pub fn merge_distances(&self) -> Vec<f64> {
        self.nodes
            .iter()
            .filter(|node| !node.is_leaf())
            .filter_map(|node| node.distance)
            .collect()
    }
}

fn distance_domain(nodes: &[ClusterNode]) -> Option<(f64, f64)> {
    let mut domain: Option<(f64, f64)> = None;
    for node in nodes {
        if let Some(d) = node.distance {
            domain = Some(match domain {
                Some((min, max)) => (min.min(d), max.max(d)),
                None => (d, d),
            });
        }
    }
    domain
}
