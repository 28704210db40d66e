//! Declarative schema format.
//!
//! A schema is a JSON document describing the root container:
//!
//! ```json
//! {
//!   "kind": "container",
//!   "children": {
//!     "hostname": { "kind": "leaf", "type": { "base": "string" }, "mandatory": true },
//!     "interface": {
//!       "kind": "list",
//!       "key": ["name"],
//!       "children": {
//!         "name": { "kind": "leaf", "type": { "base": "string", "pattern": "[a-z]+[0-9]*" } },
//!         "mtu":  { "kind": "leaf", "type": { "base": "uint16", "range": [68, 9000] }, "default": 1500 }
//!       }
//!     }
//!   }
//! }
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Number, Value};

use super::types::{split_schema_path, Bounds, IntBase, LeafType, Pattern};
use super::{Children, SchemaKind, SchemaNode};
use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KindDef {
    Container,
    List,
    LeafList,
    Leaf,
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NodeDef {
    pub kind: KindDef,
    #[serde(default = "yes")]
    pub config: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub presence: bool,
    #[serde(default)]
    pub key: Vec<String>,
    #[serde(default)]
    pub min_elements: usize,
    #[serde(default)]
    pub max_elements: Option<usize>,
    #[serde(default, rename = "type")]
    pub leaf_type: Option<TypeDef>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub children: IndexMap<String, NodeDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TypeDef {
    pub base: String,
    #[serde(default)]
    pub length: Option<[u64; 2]>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub range: Option<[Number; 2]>,
    #[serde(default)]
    pub fraction_digits: Option<u8>,
    #[serde(default, rename = "enum")]
    pub names: Vec<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub require_instance: Option<bool>,
}

impl NodeDef {
    pub fn into_schema(self, name: &str) -> Result<SchemaNode, SchemaError> {
        let kind = match self.kind {
            KindDef::Container => SchemaKind::Container {
                presence: self.presence,
                children: children(self.children)?,
            },
            KindDef::List => SchemaKind::List {
                keys: self.key,
                min_elements: self.min_elements,
                max_elements: self.max_elements,
                children: children(self.children)?,
            },
            KindDef::LeafList => SchemaKind::LeafList {
                leaf_type: leaf_type(name, self.leaf_type)?,
                min_elements: self.min_elements,
                max_elements: self.max_elements,
            },
            KindDef::Leaf => SchemaKind::Leaf {
                leaf_type: leaf_type(name, self.leaf_type)?,
                mandatory: self.mandatory,
                default: self.default,
            },
        };
        Ok(SchemaNode {
            name: name.to_string(),
            config: self.config,
            description: self.description,
            units: self.units,
            kind,
        })
    }
}

fn children(defs: IndexMap<String, NodeDef>) -> Result<Children, SchemaError> {
    defs.into_iter()
        .map(|(name, def)| Ok((name.clone(), Arc::new(def.into_schema(&name)?))))
        .collect()
}

fn leaf_type(leaf: &str, def: Option<TypeDef>) -> Result<LeafType, SchemaError> {
    let def = def.ok_or_else(|| SchemaError::InvalidDefault {
        leaf: leaf.to_string(),
        message: "missing type".to_string(),
    })?;
    def.into_leaf_type()
}

impl TypeDef {
    pub fn into_leaf_type(self) -> Result<LeafType, SchemaError> {
        let t = match self.base.as_str() {
            "string" => LeafType::String {
                length: self.length.map(|[min, max]| Bounds::new(min, max)),
                pattern: match &self.pattern {
                    Some(p) => Some(Pattern::new(p).map_err(|source| {
                        SchemaError::InvalidPattern {
                            pattern: p.clone(),
                            source,
                        }
                    })?),
                    None => None,
                },
            },
            "boolean" => LeafType::Boolean,
            "decimal64" => LeafType::Decimal64 {
                fraction_digits: self.fraction_digits.unwrap_or(2),
                range: match &self.range {
                    Some([min, max]) => Some(Bounds::new(float(min)?, float(max)?)),
                    None => None,
                },
            },
            "enumeration" => LeafType::Enumeration {
                names: self.names.clone(),
            },
            "leafref" => LeafType::Leafref {
                path: split_schema_path(self.path.as_deref().unwrap_or_default()),
                require_instance: self.require_instance.unwrap_or(true),
            },
            other => match IntBase::from_name(other) {
                Some(base) => LeafType::Integer {
                    base,
                    range: match &self.range {
                        Some([min, max]) => Some(Bounds::new(int(min)?, int(max)?)),
                        None => None,
                    },
                },
                None => return Err(SchemaError::UnknownBase(other.to_string())),
            },
        };
        Ok(t)
    }
}

fn int(n: &Number) -> Result<i128, SchemaError> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
        .ok_or_else(|| SchemaError::InvalidRange(format!("{n} is not an integer")))
}

fn float(n: &Number) -> Result<f64, SchemaError> {
    n.as_f64()
        .ok_or_else(|| SchemaError::InvalidRange(format!("{n} is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_declaration() {
        let def: NodeDef = serde_json::from_value(json!({
            "kind": "container",
            "children": {
                "interface": {
                    "kind": "list",
                    "key": ["name"],
                    "max-elements": 8,
                    "children": {
                        "name": {"kind": "leaf", "type": {"base": "string"}},
                        "mtu": {"kind": "leaf", "type": {"base": "uint16", "range": [68, 9000]}}
                    }
                },
                "counters": {"kind": "container", "config": false}
            }
        }))
        .unwrap();
        let schema = def.into_schema("").unwrap();
        let list = schema.child("interface").unwrap();
        assert_eq!(list.keys(), &["name".to_string()]);
        assert_eq!(
            list.child("mtu").unwrap().leaf_type(),
            Some(&LeafType::Integer {
                base: IntBase::Uint16,
                range: Some(Bounds::new(68, 9000)),
            })
        );
        assert!(!schema.child("counters").unwrap().config);
    }

    #[test]
    fn unknown_base_rejected() {
        let def: NodeDef =
            serde_json::from_value(json!({"kind": "leaf", "type": {"base": "bits"}})).unwrap();
        assert!(matches!(
            def.into_schema("x"),
            Err(SchemaError::UnknownBase(b)) if b == "bits"
        ));
    }

    #[test]
    fn bad_pattern_rejected() {
        let def: NodeDef = serde_json::from_value(
            json!({"kind": "leaf", "type": {"base": "string", "pattern": "("}}),
        )
        .unwrap();
        assert!(matches!(
            def.into_schema("x"),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }
}
