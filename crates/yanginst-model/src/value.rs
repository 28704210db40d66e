//! Immutable instance values.
//!
//! Values form a persistent tree: children are held through [`Arc`], so an
//! update allocates only the path from the root to the changed node and
//! shares every other subtree with the previous version.
//!
//! | Variant  | Raw JSON  | Topic kind               |
//! |----------|-----------|--------------------------|
//! | `Leaf`   | scalar    | [`NodeKind::Node`]       |
//! | `Object` | object    | [`NodeKind::Node`]       |
//! | `Array`  | array     | [`NodeKind::Collection`] |

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use yanginst_path::{NodeKind, PathStep};

use crate::stamp::Stamp;

pub type Members = IndexMap<String, Arc<InstanceValue>>;

#[derive(Debug, Clone)]
pub enum InstanceValue {
    Leaf { value: Value, stamp: Stamp },
    Object { members: Members, stamp: Stamp },
    Array {
        entries: Vec<Arc<InstanceValue>>,
        stamp: Stamp,
    },
}

impl InstanceValue {
    pub fn leaf(value: Value, stamp: Stamp) -> Self {
        InstanceValue::Leaf { value, stamp }
    }

    pub fn object(members: Members, stamp: Stamp) -> Self {
        InstanceValue::Object { members, stamp }
    }

    pub fn array(entries: Vec<Arc<InstanceValue>>, stamp: Stamp) -> Self {
        InstanceValue::Array { entries, stamp }
    }

    pub fn stamp(&self) -> Stamp {
        match self {
            InstanceValue::Leaf { stamp, .. }
            | InstanceValue::Object { stamp, .. }
            | InstanceValue::Array { stamp, .. } => *stamp,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            InstanceValue::Array { .. } => NodeKind::Collection,
            InstanceValue::Leaf { .. } | InstanceValue::Object { .. } => NodeKind::Node,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            InstanceValue::Leaf { .. } => "leaf",
            InstanceValue::Object { .. } => "object",
            InstanceValue::Array { .. } => "array",
        }
    }

    /// The same value with a different stamp. Children stay shared.
    pub fn restamped(&self, stamp: Stamp) -> Self {
        match self {
            InstanceValue::Leaf { value, .. } => InstanceValue::Leaf {
                value: value.clone(),
                stamp,
            },
            InstanceValue::Object { members, .. } => InstanceValue::Object {
                members: members.clone(),
                stamp,
            },
            InstanceValue::Array { entries, .. } => InstanceValue::Array {
                entries: entries.clone(),
                stamp,
            },
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            InstanceValue::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn members(&self) -> Option<&Members> {
        match self {
            InstanceValue::Object { members, .. } => Some(members),
            _ => None,
        }
    }

    pub fn entries(&self) -> Option<&[Arc<InstanceValue>]> {
        match self {
            InstanceValue::Array { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Look up a direct child. Mismatched step kinds yield `None`.
    pub fn child(&self, step: &PathStep) -> Option<&Arc<InstanceValue>> {
        match (step, self) {
            (PathStep::Member(name), InstanceValue::Object { members, .. }) => members.get(name),
            (PathStep::Index(idx), InstanceValue::Array { entries, .. }) => entries.get(*idx),
            _ => None,
        }
    }

    /// Steps of all direct children in document order.
    pub fn child_steps(&self) -> Vec<PathStep> {
        match self {
            InstanceValue::Leaf { .. } => Vec::new(),
            InstanceValue::Object { members, .. } => {
                members.keys().map(|k| PathStep::Member(k.clone())).collect()
            }
            InstanceValue::Array { entries, .. } => {
                (0..entries.len()).map(PathStep::Index).collect()
            }
        }
    }

    /// Value equality, stamps ignored. Member order does not matter.
    pub fn same_value(&self, other: &InstanceValue) -> bool {
        match (self, other) {
            (InstanceValue::Leaf { value: a, .. }, InstanceValue::Leaf { value: b, .. }) => a == b,
            (InstanceValue::Object { members: a, .. }, InstanceValue::Object { members: b, .. }) => {
                a.len() == b.len()
                    && a.iter().all(|(name, va)| match b.get(name) {
                        Some(vb) => same_arc_value(va, vb),
                        None => false,
                    })
            }
            (InstanceValue::Array { entries: a, .. }, InstanceValue::Array { entries: b, .. }) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(va, vb)| same_arc_value(va, vb))
            }
            _ => false,
        }
    }

    /// Raw JSON representation, member order preserved.
    pub fn to_raw(&self) -> Value {
        match self {
            InstanceValue::Leaf { value, .. } => value.clone(),
            InstanceValue::Object { members, .. } => {
                let mut map = Map::with_capacity(members.len());
                for (name, child) in members {
                    map.insert(name.clone(), child.to_raw());
                }
                Value::Object(map)
            }
            InstanceValue::Array { entries, .. } => {
                Value::Array(entries.iter().map(|e| e.to_raw()).collect())
            }
        }
    }

    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        match self {
            InstanceValue::Leaf { .. } => 1,
            InstanceValue::Object { members, .. } => {
                1 + members.values().map(|c| c.node_count()).sum::<usize>()
            }
            InstanceValue::Array { entries, .. } => {
                1 + entries.iter().map(|c| c.node_count()).sum::<usize>()
            }
        }
    }
}

impl PartialEq for InstanceValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

/// Pointer identity first, then value equality.
pub fn same_arc_value(a: &Arc<InstanceValue>, b: &Arc<InstanceValue>) -> bool {
    Arc::ptr_eq(a, b) || a.same_value(b)
}

/// Reuse subtrees of `old` wherever `new` holds an equal value.
///
/// Returns `old` itself when the whole value is unchanged, which lets callers
/// skip rebuilding the spine above it.
pub fn share_unchanged(old: &Arc<InstanceValue>, new: Arc<InstanceValue>) -> Arc<InstanceValue> {
    match (old.as_ref(), new.as_ref()) {
        (InstanceValue::Leaf { value: a, .. }, InstanceValue::Leaf { value: b, .. }) => {
            if a == b {
                old.clone()
            } else {
                new
            }
        }
        (
            InstanceValue::Object { members: old_members, .. },
            InstanceValue::Object {
                members: new_members,
                stamp,
            },
        ) => {
            let mut all_shared = old_members.len() == new_members.len();
            let mut members = Members::with_capacity(new_members.len());
            for (name, child) in new_members {
                let child = match old_members.get(name) {
                    Some(old_child) => {
                        let shared = share_unchanged(old_child, child.clone());
                        all_shared &= Arc::ptr_eq(&shared, old_child);
                        shared
                    }
                    None => {
                        all_shared = false;
                        child.clone()
                    }
                };
                members.insert(name.clone(), child);
            }
            if all_shared && same_order(old_members, &members) {
                old.clone()
            } else {
                Arc::new(InstanceValue::object(members, *stamp))
            }
        }
        (
            InstanceValue::Array { entries: old_entries, .. },
            InstanceValue::Array {
                entries: new_entries,
                stamp,
            },
        ) => {
            let mut all_shared = old_entries.len() == new_entries.len();
            let mut entries = Vec::with_capacity(new_entries.len());
            for (idx, entry) in new_entries.iter().enumerate() {
                let entry = match old_entries.get(idx) {
                    Some(old_entry) => {
                        let shared = share_unchanged(old_entry, entry.clone());
                        all_shared &= Arc::ptr_eq(&shared, old_entry);
                        shared
                    }
                    None => {
                        all_shared = false;
                        entry.clone()
                    }
                };
                entries.push(entry);
            }
            if all_shared {
                old.clone()
            } else {
                Arc::new(InstanceValue::array(entries, *stamp))
            }
        }
        _ => new,
    }
}

fn same_order(a: &Members, b: &Members) -> bool {
    a.keys().eq(b.keys())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(v: Value) -> Arc<InstanceValue> {
        Arc::new(InstanceValue::leaf(v, Stamp::next()))
    }

    fn obj(pairs: Vec<(&str, Arc<InstanceValue>)>) -> Arc<InstanceValue> {
        let members = pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Arc::new(InstanceValue::object(members, Stamp::next()))
    }

    #[test]
    fn equality_ignores_stamps() {
        let a = leaf(json!(1));
        let b = leaf(json!(1));
        assert_ne!(a.stamp(), b.stamp());
        assert!(a.same_value(&b));
    }

    #[test]
    fn equality_ignores_member_order() {
        let a = obj(vec![("x", leaf(json!(1))), ("y", leaf(json!(2)))]);
        let b = obj(vec![("y", leaf(json!(2))), ("x", leaf(json!(1)))]);
        assert_eq!(a, b);
    }

    #[test]
    fn share_unchanged_keeps_equal_subtrees() {
        let keep = leaf(json!("same"));
        let old = obj(vec![("a", keep.clone()), ("b", leaf(json!(1)))]);
        let new = obj(vec![("a", leaf(json!("same"))), ("b", leaf(json!(2)))]);
        let merged = share_unchanged(&old, new);
        assert!(!Arc::ptr_eq(&merged, &old));
        let a = merged.child(&PathStep::member("a")).unwrap();
        assert!(Arc::ptr_eq(a, &keep));
    }

    #[test]
    fn share_unchanged_returns_old_when_equal() {
        let old = obj(vec![("a", leaf(json!([1])))]);
        let new = obj(vec![("a", leaf(json!([1])))]);
        assert!(Arc::ptr_eq(&share_unchanged(&old, new), &old));
    }

    #[test]
    fn raw_preserves_member_order() {
        let v = obj(vec![("z", leaf(json!(1))), ("a", leaf(json!(2)))]);
        assert_eq!(serde_json::to_string(&v.to_raw()).unwrap(), r#"{"z":1,"a":2}"#);
    }
}
