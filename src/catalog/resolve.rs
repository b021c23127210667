//! Path-based access to a [`UtilizationTree`].
//!
//! The tree is typed, but hosts address metrics by namespace segments. This
//! adapter exposes the tree as nested nodes: the root maps CPU ids to CPU
//! nodes, and each CPU node maps leaf names (`user_percentage`, ...) to
//! numeric leaves.

use crate::catalog::namespace::{SEPARATOR, parse_leaf};
use crate::model::CpuId;
use crate::rates::{CpuUtilization, UtilizationTree};

/// Errors answering a metric query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The name or path does not lead to a known entry.
    NotFound(String),
    /// The path ends on a node that is not a numeric leaf.
    TypeMismatch(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::NotFound(path) => write!(f, "metric not found: {}", path),
            QueryError::TypeMismatch(path) => write!(f, "not a numeric metric: {}", path),
        }
    }
}

impl std::error::Error for QueryError {}

/// A node of the tree as seen through a namespace path.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Root(&'a UtilizationTree),
    Cpu(&'a CpuUtilization),
    /// Numeric leaf; `None` when the value was suppressed this cycle.
    Leaf(Option<f64>),
}

impl<'a> Node<'a> {
    /// Child named `segment`, if this node is a mapping that contains it.
    pub fn child(&self, segment: &str) -> Option<Node<'a>> {
        match self {
            Node::Root(tree) => {
                let cpu: CpuId = segment.parse().ok()?;
                tree.get(cpu).map(Node::Cpu)
            }
            Node::Cpu(cpu) => {
                let (category, representation) = parse_leaf(segment)?;
                Some(Node::Leaf(cpu.value(category, representation)))
            }
            Node::Leaf(_) => None,
        }
    }
}

/// Walks `path` from the root of `tree` and returns the numeric leaf.
///
/// `Ok(None)` is a leaf whose value is absent this cycle, not an error.
pub fn resolve<S: AsRef<str>>(
    tree: &UtilizationTree,
    path: &[S],
) -> Result<Option<f64>, QueryError> {
    let joined = || {
        path.iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(SEPARATOR.to_string().as_str())
    };

    if path.is_empty() {
        return Err(QueryError::NotFound(String::new()));
    }

    let mut node = Node::Root(tree);
    for segment in path {
        node = node
            .child(segment.as_ref())
            .ok_or_else(|| QueryError::NotFound(joined()))?;
    }

    match node {
        Node::Leaf(value) => Ok(value),
        _ => Err(QueryError::TypeMismatch(joined())),
    }
}
