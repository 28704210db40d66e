//! Documents and positioned instance nodes.
//!
//! A [`Document`] is an immutable root value plus its schema. An
//! [`InstanceNode`] is a cursor into one document version: it knows its
//! absolute path and its schema node. Every structural update returns a
//! cursor into a *new* document; the document the cursor came from is left
//! untouched and shares all unaffected subtrees with the new one.

use std::sync::Arc;

use serde_json::Value;
use yanginst_path::{InstancePath, NodeKind, PathStep};

use crate::error::ModelError;
use crate::parse::{parse_entry, parse_node};
use crate::schema::SchemaNode;
use crate::stamp::Stamp;
use crate::value::{share_unchanged, InstanceValue};

#[derive(Debug, Clone)]
pub struct Document {
    root: Arc<InstanceValue>,
    schema: Arc<SchemaNode>,
}

impl Document {
    pub fn new(root: Arc<InstanceValue>, schema: Arc<SchemaNode>) -> Self {
        Self { root, schema }
    }

    /// Decode raw data against the root schema.
    pub fn from_raw(raw: &Value, schema: Arc<SchemaNode>) -> Result<Self, ModelError> {
        let root = parse_node(raw, &schema, &InstancePath::root(), Stamp::next())?;
        Ok(Self { root, schema })
    }

    pub fn value(&self) -> &Arc<InstanceValue> {
        &self.root
    }

    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    pub fn root(&self) -> InstanceNode {
        InstanceNode {
            doc: self.clone(),
            path: InstancePath::root(),
            value: self.root.clone(),
            schema: self.schema.clone(),
        }
    }

    /// Resolve a path. `None` when any step is absent.
    pub fn goto(&self, path: &[PathStep]) -> Option<InstanceNode> {
        self.root().goto(path)
    }

    pub fn raw_value(&self) -> Value {
        self.root.to_raw()
    }

    /// Both documents are the same version.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.root.same_value(&other.root)
    }
}

#[derive(Debug, Clone)]
pub struct InstanceNode {
    doc: Document,
    path: InstancePath,
    value: Arc<InstanceValue>,
    schema: Arc<SchemaNode>,
}

impl InstanceNode {
    pub fn path(&self) -> &InstancePath {
        &self.path
    }

    pub fn value(&self) -> &Arc<InstanceValue> {
        &self.value
    }

    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    /// The document version this node belongs to.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn kind(&self) -> NodeKind {
        self.value.kind()
    }

    pub fn stamp(&self) -> Stamp {
        self.value.stamp()
    }

    pub fn raw_value(&self) -> Value {
        self.value.to_raw()
    }

    /// True for an entry of a list or leaf-list.
    pub fn is_entry(&self) -> bool {
        self.schema.is_sequence() && !matches!(*self.value, InstanceValue::Array { .. })
    }

    pub fn member(&self, name: &str) -> Option<InstanceNode> {
        let value = self.value.members()?.get(name)?;
        let schema = self.schema.child(name)?;
        Some(InstanceNode {
            doc: self.doc.clone(),
            path: self.path.child(name),
            value: value.clone(),
            schema: schema.clone(),
        })
    }

    pub fn entry(&self, index: usize) -> Option<InstanceNode> {
        let value = self.value.entries()?.get(index)?;
        Some(InstanceNode {
            doc: self.doc.clone(),
            path: self.path.child(index),
            value: value.clone(),
            schema: self.schema.clone(),
        })
    }

    pub fn step(&self, step: &PathStep) -> Option<InstanceNode> {
        match step {
            PathStep::Member(name) => self.member(name),
            PathStep::Index(idx) => self.entry(*idx),
        }
    }

    pub fn goto(&self, path: &[PathStep]) -> Option<InstanceNode> {
        let mut node = self.clone();
        for step in path {
            node = node.step(step)?;
        }
        Some(node)
    }

    pub fn children(&self) -> Vec<InstanceNode> {
        self.value
            .child_steps()
            .iter()
            .filter_map(|step| self.step(step))
            .collect()
    }

    /// The enclosing node in the same document version.
    pub fn up(&self) -> Option<InstanceNode> {
        let parent = self.path.parent()?;
        self.doc.goto(parent.steps())
    }

    /// The document version this node belongs to.
    pub fn top(&self) -> Document {
        self.doc.clone()
    }

    // ── Structural updates ────────────────────────────────────────────────

    /// Replace this node's data.
    ///
    /// Subtrees equal to the current ones are kept, and an update that
    /// changes nothing returns the node unchanged.
    pub fn update(&self, raw: &Value) -> Result<InstanceNode, ModelError> {
        let stamp = Stamp::next();
        let parsed = if self.is_entry() {
            parse_entry(raw, &self.schema, &self.path, stamp)?
        } else {
            parse_node(raw, &self.schema, &self.path, stamp)?
        };
        let shared = share_unchanged(&self.value, parsed);
        if Arc::ptr_eq(&shared, &self.value) {
            return Ok(self.clone());
        }
        self.replace(shared)
    }

    /// Create or replace a member. Returns this node in the new document.
    pub fn put_member(&self, name: &str, raw: &Value) -> Result<InstanceNode, ModelError> {
        let members = self.value.members().ok_or_else(|| ModelError::NotAnObject {
            path: self.path.clone(),
        })?;
        let child_schema = self
            .schema
            .child(name)
            .ok_or_else(|| ModelError::UnknownMember {
                path: self.path.clone(),
                name: name.to_string(),
            })?;
        let stamp = Stamp::next();
        let parsed = parse_node(raw, child_schema, &self.path.child(name), stamp)?;
        let child = match members.get(name) {
            Some(old) => {
                let shared = share_unchanged(old, parsed);
                if Arc::ptr_eq(&shared, old) {
                    return Ok(self.clone());
                }
                shared
            }
            None => parsed,
        };
        let mut members = members.clone();
        members.insert(name.to_string(), child);
        self.replace(Arc::new(InstanceValue::object(members, stamp)))
    }

    /// Create a member holding the schema's default data.
    pub fn create_member(&self, name: &str) -> Result<InstanceNode, ModelError> {
        let child_schema = self
            .schema
            .child(name)
            .ok_or_else(|| ModelError::UnknownMember {
                path: self.path.clone(),
                name: name.to_string(),
            })?;
        self.put_member(name, &child_schema.default_raw())
    }

    /// Remove a member. Returns this node in the new document.
    pub fn delete_member(&self, name: &str) -> Result<InstanceNode, ModelError> {
        let members = self.value.members().ok_or_else(|| ModelError::NotAnObject {
            path: self.path.clone(),
        })?;
        if !members.contains_key(name) {
            return Err(ModelError::NoSuchMember {
                path: self.path.clone(),
                name: name.to_string(),
            });
        }
        let mut members = members.clone();
        members.shift_remove(name);
        self.replace(Arc::new(InstanceValue::object(members, Stamp::next())))
    }

    /// Remove an entry of this array. Returns this node in the new document.
    pub fn delete_entry(&self, index: usize) -> Result<InstanceNode, ModelError> {
        let entries = self.value.entries().ok_or_else(|| ModelError::NotAnArray {
            path: self.path.clone(),
        })?;
        if index >= entries.len() {
            return Err(ModelError::IndexOutOfRange {
                path: self.path.clone(),
                index,
            });
        }
        let mut entries = entries.to_vec();
        entries.remove(index);
        self.replace(Arc::new(InstanceValue::array(entries, Stamp::next())))
    }

    /// Remove this node from its parent. Returns the parent in the new
    /// document.
    pub fn delete(&self) -> Result<InstanceNode, ModelError> {
        let parent = self.up().ok_or(ModelError::RootHasNoParent)?;
        match self.path.last() {
            Some(PathStep::Member(name)) => parent.delete_member(name),
            Some(PathStep::Index(idx)) => parent.delete_entry(*idx),
            None => Err(ModelError::RootHasNoParent),
        }
    }

    /// Insert a new entry at `index` of this array. Returns the new entry.
    pub fn insert_entry(&self, index: usize, raw: &Value) -> Result<InstanceNode, ModelError> {
        let entries = self.value.entries().ok_or_else(|| ModelError::NotAnArray {
            path: self.path.clone(),
        })?;
        if index > entries.len() {
            return Err(ModelError::IndexOutOfRange {
                path: self.path.clone(),
                index,
            });
        }
        let stamp = Stamp::next();
        let entry = parse_entry(raw, &self.schema, &self.path.child(index), stamp)?;
        let mut entries = entries.to_vec();
        entries.insert(index, entry);
        let updated = self.replace(Arc::new(InstanceValue::array(entries, stamp)))?;
        updated.entry(index).ok_or(ModelError::IndexOutOfRange {
            path: self.path.clone(),
            index,
        })
    }

    pub fn append_entry(&self, raw: &Value) -> Result<InstanceNode, ModelError> {
        let len = self.value.entries().map(|e| e.len()).unwrap_or(0);
        self.insert_entry(len, raw)
    }

    /// Insert a sibling entry before this one. Returns the new entry.
    pub fn insert_before(&self, raw: &Value) -> Result<InstanceNode, ModelError> {
        let (parent, index) = self.entry_position()?;
        parent.insert_entry(index, raw)
    }

    /// Insert a sibling entry after this one. Returns the new entry.
    pub fn insert_after(&self, raw: &Value) -> Result<InstanceNode, ModelError> {
        let (parent, index) = self.entry_position()?;
        parent.insert_entry(index + 1, raw)
    }

    /// Same value, new stamp. Observers of this node and its ancestors see a
    /// change even though no data differs.
    pub fn touch(&self) -> Result<InstanceNode, ModelError> {
        self.replace(Arc::new(self.value.restamped(Stamp::next())))
    }

    fn entry_position(&self) -> Result<(InstanceNode, usize), ModelError> {
        match self.path.last() {
            Some(PathStep::Index(idx)) => {
                let parent = self.up().ok_or(ModelError::RootHasNoParent)?;
                Ok((parent, *idx))
            }
            _ => Err(ModelError::NotAnEntry {
                path: self.path.clone(),
            }),
        }
    }

    /// Swap in `value` at this node's path, rebuilding only the spine.
    fn replace(&self, value: Arc<InstanceValue>) -> Result<InstanceNode, ModelError> {
        let stamp = Stamp::next();
        let root = replace_at(self.doc.value(), self.path.steps(), 0, value.clone(), stamp)?;
        Ok(InstanceNode {
            doc: Document::new(root, self.doc.schema.clone()),
            path: self.path.clone(),
            value,
            schema: self.schema.clone(),
        })
    }
}

fn replace_at(
    node: &Arc<InstanceValue>,
    steps: &[PathStep],
    depth: usize,
    value: Arc<InstanceValue>,
    stamp: Stamp,
) -> Result<Arc<InstanceValue>, ModelError> {
    let Some(step) = steps.get(depth) else {
        return Ok(value);
    };
    let here = || InstancePath::from(&steps[..depth]);
    match (step, node.as_ref()) {
        (PathStep::Member(name), InstanceValue::Object { members, .. }) => {
            let child = members.get(name).ok_or_else(|| ModelError::NoSuchMember {
                path: here(),
                name: name.clone(),
            })?;
            let child = replace_at(child, steps, depth + 1, value, stamp)?;
            let mut members = members.clone();
            members.insert(name.clone(), child);
            Ok(Arc::new(InstanceValue::object(members, stamp)))
        }
        (PathStep::Index(idx), InstanceValue::Array { entries, .. }) => {
            let child = entries.get(*idx).ok_or_else(|| ModelError::IndexOutOfRange {
                path: here(),
                index: *idx,
            })?;
            let child = replace_at(child, steps, depth + 1, value, stamp)?;
            let mut entries = entries.clone();
            entries[*idx] = child;
            Ok(Arc::new(InstanceValue::array(entries, stamp)))
        }
        (PathStep::Member(_), _) => Err(ModelError::NotAnObject { path: here() }),
        (PathStep::Index(_), _) => Err(ModelError::NotAnArray { path: here() }),
    }
}
