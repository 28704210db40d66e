//! Schema tree.
//!
//! | Kind        | Instance value     | Entries                  |
//! |-------------|--------------------|--------------------------|
//! | `Container` | object             | -                        |
//! | `List`      | array of objects   | objects keyed by `keys`  |
//! | `LeafList`  | array of scalars   | scalars                  |
//! | `Leaf`      | scalar             | -                        |
//!
//! Entries of a list or leaf-list share the schema node of the list itself.

pub mod builder;
pub mod def;
pub mod types;

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

pub use types::{Bounds, IntBase, LeafType, Pattern};

pub type Children = IndexMap<String, Arc<SchemaNode>>;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Container {
        presence: bool,
        children: Children,
    },
    List {
        keys: Vec<String>,
        min_elements: usize,
        max_elements: Option<usize>,
        children: Children,
    },
    LeafList {
        leaf_type: LeafType,
        min_elements: usize,
        max_elements: Option<usize>,
    },
    Leaf {
        leaf_type: LeafType,
        mandatory: bool,
        default: Option<Value>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub name: String,
    pub config: bool,
    pub description: Option<String>,
    pub units: Option<String>,
    pub kind: SchemaKind,
}

impl SchemaNode {
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SchemaKind::Container { .. } => "container",
            SchemaKind::List { .. } => "list",
            SchemaKind::LeafList { .. } => "leaf-list",
            SchemaKind::Leaf { .. } => "leaf",
        }
    }

    /// Child schema nodes of a container or list entry.
    pub fn children(&self) -> Option<&Children> {
        match &self.kind {
            SchemaKind::Container { children, .. } | SchemaKind::List { children, .. } => {
                Some(children)
            }
            SchemaKind::LeafList { .. } | SchemaKind::Leaf { .. } => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Arc<SchemaNode>> {
        self.children().and_then(|c| c.get(name))
    }

    /// Nodes whose values are arrays.
    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, SchemaKind::List { .. } | SchemaKind::LeafList { .. })
    }

    pub fn leaf_type(&self) -> Option<&LeafType> {
        match &self.kind {
            SchemaKind::Leaf { leaf_type, .. } | SchemaKind::LeafList { leaf_type, .. } => {
                Some(leaf_type)
            }
            _ => None,
        }
    }

    pub fn keys(&self) -> &[String] {
        match &self.kind {
            SchemaKind::List { keys, .. } => keys,
            _ => &[],
        }
    }

    /// Whether an instance of this node must be present in its parent.
    ///
    /// Mandatory leaves, lists or leaf-lists with `min-elements > 0`, and
    /// non-presence containers with a mandatory node somewhere below.
    /// List keys are handled by [`SchemaNode::mandatory_children`].
    pub fn is_mandatory(&self) -> bool {
        match &self.kind {
            SchemaKind::Leaf { mandatory, .. } => *mandatory,
            SchemaKind::List { min_elements, .. } | SchemaKind::LeafList { min_elements, .. } => {
                *min_elements > 0
            }
            SchemaKind::Container { presence: true, .. } => false,
            SchemaKind::Container {
                presence: false,
                children,
            } => children.values().any(|child| child.is_mandatory()),
        }
    }

    pub fn is_presence(&self) -> bool {
        matches!(self.kind, SchemaKind::Container { presence: true, .. })
    }

    /// Children that must be present in an object of this node.
    pub fn mandatory_children(&self) -> impl Iterator<Item = &Arc<SchemaNode>> {
        let keys = self.keys();
        self.children()
            .into_iter()
            .flat_map(|c| c.values())
            .filter(move |child| child.is_mandatory() || keys.contains(&child.name))
    }

    /// Leaf children that declare a default, with that default.
    pub fn default_children(&self) -> impl Iterator<Item = (&Arc<SchemaNode>, &Value)> {
        self.children()
            .into_iter()
            .flat_map(|c| c.values())
            .filter_map(|child| match &child.kind {
                SchemaKind::Leaf {
                    default: Some(default),
                    ..
                } => Some((child, default)),
                _ => None,
            })
    }

    /// Raw data a newly created instance of this node gets.
    ///
    /// Containers are populated with their mandatory and defaulted children,
    /// lists and leaf-lists start empty.
    pub fn default_raw(&self) -> Value {
        match &self.kind {
            SchemaKind::Container { .. } => self.default_object(),
            SchemaKind::List { .. } | SchemaKind::LeafList { .. } => Value::Array(Vec::new()),
            SchemaKind::Leaf {
                leaf_type, default, ..
            } => default.clone().unwrap_or_else(|| leaf_type.zero()),
        }
    }

    /// Raw data for a new entry of a list or leaf-list.
    pub fn entry_default_raw(&self) -> Value {
        match &self.kind {
            SchemaKind::List { .. } => self.default_object(),
            SchemaKind::LeafList { leaf_type, .. } => leaf_type.zero(),
            _ => self.default_raw(),
        }
    }

    fn default_object(&self) -> Value {
        let mut map = Map::new();
        if let Some(children) = self.children() {
            for child in children.values() {
                let wanted = child.is_mandatory()
                    || self.keys().contains(&child.name)
                    || matches!(child.kind, SchemaKind::Leaf { default: Some(_), .. });
                if wanted {
                    map.insert(child.name.clone(), child.default_raw());
                }
            }
        }
        Value::Object(map)
    }

    /// Resolve an absolute schema path of member names.
    pub fn resolve(&self, names: &[String]) -> Option<&SchemaNode> {
        let mut node = self;
        for name in names {
            node = node.child(name)?;
        }
        Some(node)
    }
}
