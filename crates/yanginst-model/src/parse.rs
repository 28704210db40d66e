//! Raw JSON to instance values.
//!
//! Decoding is strict about shape: unknown members, objects where arrays are
//! declared and scalars of the wrong base kind are rejected. Restrictions
//! such as ranges or patterns are left to validation, so out-of-range data
//! can still be loaded and edited.

use std::sync::Arc;

use serde_json::Value;
use yanginst_path::InstancePath;

use crate::error::ModelError;
use crate::schema::{SchemaKind, SchemaNode};
use crate::stamp::Stamp;
use crate::value::{InstanceValue, Members};

pub(crate) fn json_kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode the instance of `schema` found at `path`.
pub fn parse_node(
    raw: &Value,
    schema: &SchemaNode,
    path: &InstancePath,
    stamp: Stamp,
) -> Result<Arc<InstanceValue>, ModelError> {
    match &schema.kind {
        SchemaKind::Container { .. } => parse_object(raw, schema, path, stamp),
        SchemaKind::List { .. } | SchemaKind::LeafList { .. } => {
            let items = raw.as_array().ok_or_else(|| ModelError::RawType {
                path: path.clone(),
                expected: "array",
                found: json_kind(raw),
            })?;
            let entries = items
                .iter()
                .enumerate()
                .map(|(idx, item)| parse_entry(item, schema, &path.child(idx), stamp))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Arc::new(InstanceValue::array(entries, stamp)))
        }
        SchemaKind::Leaf { .. } => parse_scalar(raw, schema, path, stamp),
    }
}

/// Decode one entry of a list or leaf-list.
pub fn parse_entry(
    raw: &Value,
    schema: &SchemaNode,
    path: &InstancePath,
    stamp: Stamp,
) -> Result<Arc<InstanceValue>, ModelError> {
    match &schema.kind {
        SchemaKind::List { .. } => parse_object(raw, schema, path, stamp),
        SchemaKind::LeafList { .. } => parse_scalar(raw, schema, path, stamp),
        _ => Err(ModelError::NotAnEntry { path: path.clone() }),
    }
}

fn parse_object(
    raw: &Value,
    schema: &SchemaNode,
    path: &InstancePath,
    stamp: Stamp,
) -> Result<Arc<InstanceValue>, ModelError> {
    let map = raw.as_object().ok_or_else(|| ModelError::RawType {
        path: path.clone(),
        expected: "object",
        found: json_kind(raw),
    })?;
    let mut members = Members::with_capacity(map.len());
    for (name, child_raw) in map {
        let child = schema
            .child(name)
            .ok_or_else(|| ModelError::UnknownMember {
                path: path.clone(),
                name: name.clone(),
            })?;
        let value = parse_node(child_raw, child, &path.child(name.as_str()), stamp)?;
        members.insert(name.clone(), value);
    }
    Ok(Arc::new(InstanceValue::object(members, stamp)))
}

fn parse_scalar(
    raw: &Value,
    schema: &SchemaNode,
    path: &InstancePath,
    stamp: Stamp,
) -> Result<Arc<InstanceValue>, ModelError> {
    if let Some(leaf_type) = schema.leaf_type() {
        if !leaf_type.accepts_raw(raw) {
            return Err(ModelError::RawType {
                path: path.clone(),
                expected: leaf_type.base_name(),
                found: json_kind(raw),
            });
        }
    }
    Ok(Arc::new(InstanceValue::leaf(raw.clone(), stamp)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builder::*;
    use crate::schema::LeafType;
    use serde_json::json;
    use yanginst_path::path;

    fn schema() -> SchemaNode {
        root([
            leaf("a", LeafType::int32()),
            list("l", ["k"], [leaf("k", LeafType::string())]),
            leaf_list("tags", LeafType::string()),
        ])
    }

    #[test]
    fn parses_nested_data() {
        let raw = json!({"a": 1, "l": [{"k": "x"}], "tags": ["t1", "t2"]});
        let v = parse_node(&raw, &schema(), &InstancePath::root(), Stamp::next()).unwrap();
        assert_eq!(v.to_raw(), raw);
    }

    #[test]
    fn unknown_member_rejected() {
        let err = parse_node(&json!({"zz": 1}), &schema(), &InstancePath::root(), Stamp::next())
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownMember {
                path: InstancePath::root(),
                name: "zz".to_string()
            }
        );
    }

    #[test]
    fn wrong_scalar_kind_reports_path() {
        let err = parse_node(
            &json!({"l": [{"k": 5}]}),
            &schema(),
            &InstancePath::root(),
            Stamp::next(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::RawType {
                path: path!["l", 0usize, "k"],
                expected: "string",
                found: "number",
            }
        );
    }

    #[test]
    fn out_of_range_value_still_decodes() {
        let s = root([leaf("a", LeafType::integer(crate::schema::IntBase::Int8))]);
        assert!(parse_node(&json!({"a": 1000}), &s, &InstancePath::root(), Stamp::next()).is_ok());
    }
}
