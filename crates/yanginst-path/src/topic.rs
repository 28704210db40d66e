//! Subscription topics.
//!
//! A topic is the structural pair `(path, kind)`. It is never flattened into
//! a string, so member names may contain any character without two paths
//! ever sharing a topic.

use std::fmt;

use crate::types::InstancePath;

/// What kind of refresh a subscriber at a path expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    /// An array node: subscribers refresh the whole collection.
    Collection,
    /// An object or leaf node: subscribers refresh one value or sub-tree.
    Node,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Topic {
    path: InstancePath,
    kind: NodeKind,
}

impl Topic {
    /// The topic of the document root.
    pub fn root() -> Self {
        Self {
            path: InstancePath::root(),
            kind: NodeKind::Node,
        }
    }

    pub fn path(&self) -> &InstancePath {
        &self.path
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_root(&self) -> bool {
        *self == Self::root()
    }
}

/// Derive the topic for a node at `path` of the given kind.
///
/// Deterministic and injective: equal inputs give equal topics, distinct
/// inputs give distinct topics.
pub fn topic(path: impl Into<InstancePath>, kind: NodeKind) -> Topic {
    Topic {
        path: path.into(),
        kind,
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Collection => write!(f, "{}[]", self.path),
            NodeKind::Node => write!(f, "{}", self.path),
        }
    }
}
