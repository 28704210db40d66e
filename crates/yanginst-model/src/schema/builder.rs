//! Fluent construction of schema trees.
//!
//! ```
//! use yanginst_model::schema::builder::*;
//! use yanginst_model::schema::LeafType;
//!
//! let schema = root([
//!     leaf("hostname", LeafType::string()).mandatory(),
//!     list("interface", ["name"], [leaf("name", LeafType::string())]),
//! ]);
//! assert!(schema.child("hostname").unwrap().is_mandatory());
//! ```

use std::sync::Arc;

use serde_json::Value;

use super::{Children, LeafType, SchemaKind, SchemaNode};

fn node(name: &str, kind: SchemaKind) -> SchemaNode {
    SchemaNode {
        name: name.to_string(),
        config: true,
        description: None,
        units: None,
        kind,
    }
}

fn collect_children(children: impl IntoIterator<Item = SchemaNode>) -> Children {
    children
        .into_iter()
        .map(|child| (child.name.clone(), Arc::new(child)))
        .collect()
}

/// The unnamed top-level container.
pub fn root(children: impl IntoIterator<Item = SchemaNode>) -> SchemaNode {
    container("", children)
}

pub fn container(name: &str, children: impl IntoIterator<Item = SchemaNode>) -> SchemaNode {
    node(
        name,
        SchemaKind::Container {
            presence: false,
            children: collect_children(children),
        },
    )
}

pub fn list<K, S>(name: &str, keys: K, children: impl IntoIterator<Item = SchemaNode>) -> SchemaNode
where
    K: IntoIterator<Item = S>,
    S: Into<String>,
{
    node(
        name,
        SchemaKind::List {
            keys: keys.into_iter().map(Into::into).collect(),
            min_elements: 0,
            max_elements: None,
            children: collect_children(children),
        },
    )
}

pub fn leaf_list(name: &str, leaf_type: LeafType) -> SchemaNode {
    node(
        name,
        SchemaKind::LeafList {
            leaf_type,
            min_elements: 0,
            max_elements: None,
        },
    )
}

pub fn leaf(name: &str, leaf_type: LeafType) -> SchemaNode {
    node(
        name,
        SchemaKind::Leaf {
            leaf_type,
            mandatory: false,
            default: None,
        },
    )
}

impl SchemaNode {
    /// Marks a leaf mandatory. No effect on other kinds.
    pub fn mandatory(mut self) -> Self {
        if let SchemaKind::Leaf { mandatory, .. } = &mut self.kind {
            *mandatory = true;
        }
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        if let SchemaKind::Leaf { default, .. } = &mut self.kind {
            *default = Some(value);
        }
        self
    }

    pub fn presence(mut self) -> Self {
        if let SchemaKind::Container { presence, .. } = &mut self.kind {
            *presence = true;
        }
        self
    }

    pub fn min_elements(mut self, n: usize) -> Self {
        match &mut self.kind {
            SchemaKind::List { min_elements, .. } | SchemaKind::LeafList { min_elements, .. } => {
                *min_elements = n;
            }
            _ => {}
        }
        self
    }

    pub fn max_elements(mut self, n: usize) -> Self {
        match &mut self.kind {
            SchemaKind::List { max_elements, .. } | SchemaKind::LeafList { max_elements, .. } => {
                *max_elements = Some(n);
            }
            _ => {}
        }
        self
    }

    /// State data (`config false`).
    pub fn state(mut self) -> Self {
        self.config = false;
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }
}
