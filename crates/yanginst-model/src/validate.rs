//! Per-node validation.
//!
//! [`validate_node`] checks a single node and reports the first failure.
//! Walking the document and collecting reports is the caller's business.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ValidationError;
use crate::instance::InstanceNode;
use crate::schema::{LeafType, SchemaKind, SchemaNode};
use crate::value::InstanceValue;

/// Which part of the data a validation pass is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// Configuration only. State nodes are reported as not allowed.
    Config,
    /// State only. Configuration leaves are reported as not allowed.
    NonConfig,
    #[default]
    All,
}

impl ContentType {
    /// Whether `schema` belongs to data of this content type.
    pub fn admits(self, schema: &SchemaNode) -> bool {
        match self {
            ContentType::All => true,
            ContentType::Config => schema.config,
            ContentType::NonConfig => !schema.config || !is_leafy(schema),
        }
    }
}

fn is_leafy(schema: &SchemaNode) -> bool {
    matches!(schema.kind, SchemaKind::Leaf { .. } | SchemaKind::LeafList { .. })
}

pub fn validate_node(node: &InstanceNode, scope: ContentType) -> Result<(), ValidationError> {
    let schema = node.schema();
    if !scope.admits(schema) {
        return Err(ValidationError::schema_error(
            node.path().clone(),
            "member-not-allowed",
            format!("{} {:?} not allowed in {scope:?} data", schema.kind_name(), schema.name),
        ));
    }
    match (&schema.kind, node.value().as_ref()) {
        (SchemaKind::Container { .. }, InstanceValue::Object { members, .. })
        | (SchemaKind::List { .. }, InstanceValue::Object { members, .. }) => {
            check_mandatory(node, members, scope)
        }
        (
            SchemaKind::List {
                keys,
                min_elements,
                max_elements,
                ..
            },
            InstanceValue::Array { entries, .. },
        ) => {
            check_cardinality(node, entries.len(), *min_elements, *max_elements)?;
            if schema.config {
                check_unique_keys(node, keys, entries)?;
            }
            Ok(())
        }
        (
            SchemaKind::LeafList {
                min_elements,
                max_elements,
                ..
            },
            InstanceValue::Array { entries, .. },
        ) => {
            check_cardinality(node, entries.len(), *min_elements, *max_elements)?;
            if schema.config {
                check_unique_values(node, entries)?;
            }
            Ok(())
        }
        (SchemaKind::Leaf { leaf_type, .. }, InstanceValue::Leaf { value, .. })
        | (SchemaKind::LeafList { leaf_type, .. }, InstanceValue::Leaf { value, .. }) => {
            check_scalar(node, leaf_type, value)
        }
        (_, value) => Err(ValidationError::schema_error(
            node.path().clone(),
            "malformed-data",
            format!("{} {:?} holds an {}", schema.kind_name(), schema.name, value.kind_name()),
        )),
    }
}

fn check_mandatory(
    node: &InstanceNode,
    members: &crate::value::Members,
    scope: ContentType,
) -> Result<(), ValidationError> {
    for child in node.schema().mandatory_children() {
        if !scope.admits(child) || !required_in(child, scope) {
            continue;
        }
        if !members.contains_key(&child.name) {
            return Err(ValidationError::schema_error(
                node.path().child(child.name.as_str()),
                "data-missing",
                format!("mandatory {} {:?} is missing", child.kind_name(), child.name),
            ));
        }
    }
    Ok(())
}

/// A non-presence container is only required when `scope` still admits
/// one of the mandatory nodes below it.
fn required_in(schema: &SchemaNode, scope: ContentType) -> bool {
    match &schema.kind {
        SchemaKind::Container {
            presence: false,
            children,
        } => children
            .values()
            .any(|child| child.is_mandatory() && scope.admits(child) && required_in(child, scope)),
        _ => true,
    }
}

fn check_cardinality(
    node: &InstanceNode,
    len: usize,
    min: usize,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    if len < min {
        return Err(ValidationError::semantic_error(
            node.path().clone(),
            "too-few-elements",
            format!("{len} entries, at least {min} required"),
        ));
    }
    if let Some(max) = max {
        if len > max {
            return Err(ValidationError::semantic_error(
                node.path().clone(),
                "too-many-elements",
                format!("{len} entries, at most {max} allowed"),
            ));
        }
    }
    Ok(())
}

fn check_unique_keys(
    node: &InstanceNode,
    keys: &[String],
    entries: &[Arc<InstanceValue>],
) -> Result<(), ValidationError> {
    if keys.is_empty() {
        return Ok(());
    }
    let mut seen = HashSet::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let Some(members) = entry.members() else {
            continue;
        };
        let key: Vec<String> = keys
            .iter()
            .map(|k| {
                members
                    .get(k)
                    .and_then(|v| v.as_scalar())
                    .map(Value::to_string)
                    .unwrap_or_default()
            })
            .collect();
        if !seen.insert(key.clone()) {
            return Err(ValidationError::semantic_error(
                node.path().child(idx),
                "non-unique-key",
                format!("duplicate key [{}]", key.join(", ")),
            ));
        }
    }
    Ok(())
}

fn check_unique_values(
    node: &InstanceNode,
    entries: &[Arc<InstanceValue>],
) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let Some(value) = entry.as_scalar() else {
            continue;
        };
        if !seen.insert(value.to_string()) {
            return Err(ValidationError::semantic_error(
                node.path().child(idx),
                "data-not-unique",
                format!("duplicate value {value}"),
            ));
        }
    }
    Ok(())
}

fn check_scalar(
    node: &InstanceNode,
    leaf_type: &LeafType,
    value: &Value,
) -> Result<(), ValidationError> {
    if let LeafType::Leafref {
        path,
        require_instance,
    } = leaf_type
    {
        if *require_instance && !leafref_targets(node.document().value(), path).contains(&value) {
            return Err(ValidationError::semantic_error(
                node.path().clone(),
                "instance-required",
                format!("no instance of /{} with value {value}", path.join("/")),
            ));
        }
        return Ok(());
    }
    leaf_type
        .check(value)
        .map_err(|reason| ValidationError::type_error(node.path().clone(), reason))
}

/// All scalar values found at the schema path `names`, fanning out over
/// list entries on the way.
fn leafref_targets<'a>(root: &'a Arc<InstanceValue>, names: &[String]) -> Vec<&'a Value> {
    let mut frontier: Vec<&Arc<InstanceValue>> = vec![root];
    for name in names {
        let mut next = Vec::new();
        for value in frontier {
            if let Some(child) = value.members().and_then(|m| m.get(name)) {
                match child.entries() {
                    Some(entries) => next.extend(entries.iter()),
                    None => next.push(child),
                }
            }
        }
        frontier = next;
    }
    frontier.into_iter().filter_map(|v| v.as_scalar()).collect()
}
