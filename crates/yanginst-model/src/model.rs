//! The schema service consumed by the repository.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{ModelError, SchemaError, ValidationError};
use crate::instance::{Document, InstanceNode};
use crate::schema::def::NodeDef;
use crate::schema::{Children, LeafType, SchemaKind, SchemaNode};
use crate::validate::{validate_node, ContentType};

pub const DEFAULT_INDENT: usize = 4;

/// Parsing, per-node validation and canonical encoding of instance data.
pub trait SchemaService {
    /// Decode raw data into a new document.
    fn from_raw(&self, raw: &Value) -> Result<Document, ModelError>;

    /// Check one node. Only the first failure is reported: an object missing
    /// several mandatory children reports the first in schema order, and the
    /// next one shows up once that one is present.
    fn validate(&self, node: &InstanceNode, scope: ContentType) -> Result<(), ValidationError>;

    fn raw_value(&self, doc: &Document) -> Value {
        doc.raw_value()
    }

    /// The persisted text of a document.
    fn canonical_string(&self, doc: &Document) -> Result<String, ModelError>;

    fn mandatory_children(&self, schema: &SchemaNode) -> Vec<Arc<SchemaNode>> {
        schema.mandatory_children().cloned().collect()
    }

    fn default_children(&self, schema: &SchemaNode) -> Vec<(Arc<SchemaNode>, Value)> {
        schema
            .default_children()
            .map(|(child, value)| (child.clone(), value.clone()))
            .collect()
    }
}

/// A checked schema tree.
#[derive(Debug, Clone)]
pub struct DataModel {
    schema: Arc<SchemaNode>,
    indent: usize,
}

impl DataModel {
    /// Check the schema and propagate `config false` to descendants.
    pub fn new(schema: SchemaNode) -> Result<Self, SchemaError> {
        if !matches!(schema.kind, SchemaKind::Container { .. }) {
            return Err(SchemaError::RootNotContainer);
        }
        let schema = propagate_config(schema, true);
        check_node(&schema, &schema)?;
        Ok(Self {
            schema: Arc::new(schema),
            indent: DEFAULT_INDENT,
        })
    }

    pub fn from_json(raw: &Value) -> Result<Self, SchemaError> {
        let def = NodeDef::deserialize(raw)?;
        Self::new(def.into_schema("")?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let def: NodeDef = serde_json::from_str(text)?;
        Self::new(def.into_schema("")?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading schema");
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    pub fn indent(&self) -> usize {
        self.indent
    }
}

impl SchemaService for DataModel {
    fn from_raw(&self, raw: &Value) -> Result<Document, ModelError> {
        Document::from_raw(raw, self.schema.clone())
    }

    fn validate(&self, node: &InstanceNode, scope: ContentType) -> Result<(), ValidationError> {
        validate_node(node, scope)
    }

    fn canonical_string(&self, doc: &Document) -> Result<String, ModelError> {
        encode_pretty(&doc.raw_value(), self.indent)
    }
}

/// Pretty JSON with `indent` spaces per level.
pub fn encode_pretty(raw: &Value, indent: usize) -> Result<String, ModelError> {
    let indent = vec![b' '; indent];
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
    raw.serialize(&mut ser)
        .map_err(|e| ModelError::Encode(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| ModelError::Encode(e.to_string()))
}

fn propagate_config(mut node: SchemaNode, parent_config: bool) -> SchemaNode {
    node.config &= parent_config;
    let config = node.config;
    if let SchemaKind::Container { children, .. } | SchemaKind::List { children, .. } =
        &mut node.kind
    {
        let taken: Children = std::mem::take(children)
            .into_iter()
            .map(|(name, child)| {
                let child = Arc::try_unwrap(child).unwrap_or_else(|shared| (*shared).clone());
                (name, Arc::new(propagate_config(child, config)))
            })
            .collect();
        *children = taken;
    }
    node
}

fn check_node(root: &SchemaNode, node: &SchemaNode) -> Result<(), SchemaError> {
    match &node.kind {
        SchemaKind::List { keys, children, .. } => {
            for key in keys {
                let is_leaf = children
                    .get(key)
                    .is_some_and(|c| matches!(c.kind, SchemaKind::Leaf { .. }));
                if !is_leaf {
                    return Err(SchemaError::InvalidKey {
                        list: node.name.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        SchemaKind::Leaf {
            leaf_type, default, ..
        } => {
            check_type(root, &node.name, leaf_type)?;
            if let Some(default) = default {
                check_default(&node.name, leaf_type, default)?;
            }
        }
        SchemaKind::LeafList { leaf_type, .. } => check_type(root, &node.name, leaf_type)?,
        SchemaKind::Container { .. } => {}
    }
    for child in node.children().into_iter().flat_map(|c| c.values()) {
        check_node(root, child)?;
    }
    Ok(())
}

fn check_type(root: &SchemaNode, leaf: &str, leaf_type: &LeafType) -> Result<(), SchemaError> {
    match leaf_type {
        LeafType::Leafref { path, .. } => {
            let target = root.resolve(path);
            let is_leafy = target.is_some_and(|t| {
                matches!(t.kind, SchemaKind::Leaf { .. } | SchemaKind::LeafList { .. })
            });
            if !is_leafy {
                return Err(SchemaError::InvalidLeafref {
                    leaf: leaf.to_string(),
                    target: format!("/{}", path.join("/")),
                });
            }
        }
        LeafType::Integer {
            base,
            range: Some(range),
        } => {
            let bounds = base.bounds();
            if range.min > range.max || !bounds.contains(range.min) || !bounds.contains(range.max)
            {
                return Err(SchemaError::InvalidRange(format!(
                    "{leaf}: {}..{} not within {}",
                    range.min,
                    range.max,
                    base.as_str()
                )));
            }
        }
        LeafType::Decimal64 {
            range: Some(range), ..
        } if range.min > range.max => {
            return Err(SchemaError::InvalidRange(format!(
                "{leaf}: {}..{}",
                range.min, range.max
            )));
        }
        LeafType::String {
            length: Some(length),
            ..
        } if length.min > length.max => {
            return Err(SchemaError::InvalidRange(format!(
                "{leaf}: length {}..{}",
                length.min, length.max
            )));
        }
        _ => {}
    }
    Ok(())
}

fn check_default(leaf: &str, leaf_type: &LeafType, default: &Value) -> Result<(), SchemaError> {
    if matches!(leaf_type, LeafType::Leafref { .. }) {
        return Ok(());
    }
    if !leaf_type.accepts_raw(default) {
        return Err(SchemaError::InvalidDefault {
            leaf: leaf.to_string(),
            message: format!("{default} is not a {}", leaf_type.base_name()),
        });
    }
    leaf_type
        .check(default)
        .map_err(|message| SchemaError::InvalidDefault {
            leaf: leaf.to_string(),
            message,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builder::*;
    use serde_json::json;

    #[test]
    fn state_propagates_to_descendants() {
        let model = DataModel::new(root([container("stats", [leaf("rx", LeafType::uint16())])
            .state()]))
        .unwrap();
        let rx = model.schema().resolve(&["stats".into(), "rx".into()]).unwrap();
        assert!(!rx.config);
    }

    #[test]
    fn list_key_must_be_leaf_child() {
        let err = DataModel::new(root([list("l", ["missing"], [leaf("k", LeafType::string())])]))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKey { .. }));
    }

    #[test]
    fn leafref_target_must_resolve() {
        let err = DataModel::new(root([leaf("r", LeafType::leafref("/nowhere"))])).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidLeafref { .. }));
    }

    #[test]
    fn default_must_satisfy_type() {
        let err = DataModel::new(root([leaf("n", LeafType::uint16()).with_default(json!(-1))]))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn root_must_be_container() {
        let err = DataModel::new(leaf("x", LeafType::string())).unwrap_err();
        assert!(matches!(err, SchemaError::RootNotContainer));
    }

    #[test]
    fn canonical_string_uses_four_space_indent() {
        let model = DataModel::new(root([leaf("a", LeafType::int32())])).unwrap();
        let doc = model.from_raw(&json!({"a": 1})).unwrap();
        assert_eq!(model.canonical_string(&doc).unwrap(), "{\n    \"a\": 1\n}");
    }

    #[test]
    fn reads_json_declaration() {
        let model = DataModel::from_json_str(
            r#"{"kind": "container", "children": {"a": {"kind": "leaf", "type": {"base": "int8"}}}}"#,
        )
        .unwrap();
        assert!(model.schema().child("a").is_some());
    }
}
