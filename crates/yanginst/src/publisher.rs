//! Change notifications.
//!
//! After a commit the previous and the new document of a slot are walked side
//! by side. A node is changed when it appears, disappears, or differs in
//! value or stamp. Unchanged subtrees are skipped without descending, so the
//! cost of a publication follows the size of the changed region.
//!
//! Arrays are always descended once they changed, so observers of individual
//! entries learn about shifted positions even though the whole-collection
//! topic fired as well.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexSet;
use yanginst_model::{Document, InstanceNode};
use yanginst_path::{topic, InstancePath, PathStep, Topic};

use crate::walker::ErrorLogEntry;

#[derive(Debug, Clone)]
pub enum Change {
    /// The node is new or differs from its previous version.
    Updated(InstanceNode),
    /// The node existed in the previous version and is gone now.
    Removed,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub slot: String,
    pub topic: Topic,
    pub change: Change,
}

impl Notification {
    pub fn path(&self) -> &InstancePath {
        self.topic.path()
    }

    pub fn node(&self) -> Option<&InstanceNode> {
        match &self.change {
            Change::Updated(node) => Some(node),
            Change::Removed => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self.change, Change::Removed)
    }
}

/// Notifications for the transition of `slot` from `old` to `new`.
///
/// `old` is `None` for a slot that held nothing, in which case every node of
/// `new` is reported. Notifications come in document pre-order.
pub fn changes(slot: &str, old: Option<&Document>, new: Option<&Document>) -> Vec<Notification> {
    let mut out = Vec::new();
    co_walk(
        slot,
        old.map(Document::root),
        new.map(Document::root),
        &mut out,
    );
    out
}

fn co_walk(
    slot: &str,
    old: Option<InstanceNode>,
    new: Option<InstanceNode>,
    out: &mut Vec<Notification>,
) {
    let changed = match (&old, &new) {
        (None, None) => return,
        (Some(o), Some(n)) => is_changed(o, n),
        _ => true,
    };
    if !changed {
        return;
    }
    let Some(present) = new.as_ref().or(old.as_ref()) else {
        return;
    };
    out.push(Notification {
        slot: slot.to_string(),
        topic: topic(present.path().clone(), present.kind()),
        change: match &new {
            Some(node) => Change::Updated(node.clone()),
            None => Change::Removed,
        },
    });

    for step in child_steps(old.as_ref(), new.as_ref()) {
        co_walk(
            slot,
            old.as_ref().and_then(|o| o.step(&step)),
            new.as_ref().and_then(|n| n.step(&step)),
            out,
        );
    }
}

fn is_changed(old: &InstanceNode, new: &InstanceNode) -> bool {
    if Arc::ptr_eq(old.value(), new.value()) {
        return false;
    }
    old.stamp() != new.stamp() || !old.value().same_value(new.value())
}

/// Member names of either version, or indices up to the longer array.
fn child_steps(old: Option<&InstanceNode>, new: Option<&InstanceNode>) -> IndexSet<PathStep> {
    let mut steps = IndexSet::new();
    for node in [new, old].into_iter().flatten() {
        steps.extend(node.value().child_steps());
    }
    steps
}

// ── Subscriptions ─────────────────────────────────────────────────────────

pub type SubscriptionId = u64;

pub(crate) type NotifyFn = Rc<RefCell<dyn FnMut(&Notification)>>;
pub(crate) type ErrorLogFn = Rc<RefCell<dyn FnMut(&[ErrorLogEntry])>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Topic { slot: String, topic: Topic },
    All,
}

/// Observer table keyed by `(slot, topic)`.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_listener_id: SubscriptionId,
    by_topic: BTreeMap<(String, Topic), BTreeMap<SubscriptionId, NotifyFn>>,
    all: BTreeMap<SubscriptionId, NotifyFn>,
    scopes: HashMap<SubscriptionId, Scope>,
    error_log: BTreeMap<SubscriptionId, ErrorLogFn>,
}

impl Subscribers {
    fn next_id(&mut self) -> SubscriptionId {
        self.next_listener_id = self.next_listener_id.saturating_add(1);
        self.next_listener_id
    }

    pub(crate) fn subscribe(&mut self, slot: &str, topic: Topic, listener: NotifyFn) -> SubscriptionId {
        let id = self.next_id();
        self.by_topic
            .entry((slot.to_string(), topic.clone()))
            .or_default()
            .insert(id, listener);
        self.scopes.insert(
            id,
            Scope::Topic {
                slot: slot.to_string(),
                topic,
            },
        );
        id
    }

    pub(crate) fn subscribe_all(&mut self, listener: NotifyFn) -> SubscriptionId {
        let id = self.next_id();
        self.all.insert(id, listener);
        self.scopes.insert(id, Scope::All);
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.scopes.remove(&id) {
            Some(Scope::Topic { slot, topic }) => {
                let key = (slot, topic);
                let removed = self
                    .by_topic
                    .get_mut(&key)
                    .is_some_and(|listeners| listeners.remove(&id).is_some());
                if self.by_topic.get(&key).is_some_and(BTreeMap::is_empty) {
                    self.by_topic.remove(&key);
                }
                removed
            }
            Some(Scope::All) => self.all.remove(&id).is_some(),
            None => false,
        }
    }

    pub(crate) fn on_error_log(&mut self, listener: ErrorLogFn) -> SubscriptionId {
        let id = self.next_id();
        self.error_log.insert(id, listener);
        id
    }

    pub(crate) fn off_error_log(&mut self, id: SubscriptionId) -> bool {
        self.error_log.remove(&id).is_some()
    }

    /// Listeners for one notification, topic subscribers first.
    pub(crate) fn targets(&self, notification: &Notification) -> Vec<NotifyFn> {
        let key = (notification.slot.clone(), notification.topic.clone());
        self.by_topic
            .get(&key)
            .into_iter()
            .flat_map(|listeners| listeners.values())
            .chain(self.all.values())
            .cloned()
            .collect()
    }

    pub(crate) fn error_log_targets(&self) -> Vec<ErrorLogFn> {
        self.error_log.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use yanginst_model::schema::builder::*;
    use yanginst_model::schema::LeafType;
    use yanginst_model::{DataModel, SchemaService};
    use yanginst_path::{path, NodeKind};

    fn model() -> DataModel {
        DataModel::new(root([
            leaf("a", LeafType::int32()),
            container("c", [leaf("x", LeafType::string())]),
            list("l", ["k"], [leaf("k", LeafType::string())]),
        ]))
        .unwrap()
    }

    fn topics(notes: &[Notification]) -> Vec<Topic> {
        notes.iter().map(|n| n.topic.clone()).collect()
    }

    fn doc(raw: Value) -> Document {
        model().from_raw(&raw).unwrap()
    }

    #[test]
    fn initial_publish_reports_every_node() {
        let d = doc(json!({"a": 1, "c": {"x": "u"}, "l": [{"k": "p"}]}));
        let notes = changes("default", None, Some(&d));
        assert_eq!(notes.len(), d.value().node_count());
        assert_eq!(notes[0].topic, Topic::root());
    }

    #[test]
    fn untouched_subtree_is_pruned() {
        let d0 = doc(json!({"a": 1, "c": {"x": "u"}}));
        let d1 = d0.root().put_member("a", &json!(2)).unwrap().top();
        let notes = changes("default", Some(&d0), Some(&d1));
        assert_eq!(
            topics(&notes),
            vec![Topic::root(), topic(path!["a"], NodeKind::Node)]
        );
    }

    #[test]
    fn same_document_is_silent() {
        let d0 = doc(json!({"a": 1}));
        assert!(changes("default", Some(&d0), Some(&d0)).is_empty());
    }

    #[test]
    fn touch_fires_without_value_change() {
        let d0 = doc(json!({"a": 1, "c": {"x": "u"}}));
        let d1 = d0.goto(path!["c", "x"].steps()).unwrap().touch().unwrap().top();
        let notes = changes("default", Some(&d0), Some(&d1));
        assert_eq!(
            topics(&notes),
            vec![
                Topic::root(),
                topic(path!["c"], NodeKind::Node),
                topic(path!["c", "x"], NodeKind::Node),
            ]
        );
    }

    #[test]
    fn removal_reaches_descendants() {
        let d0 = doc(json!({"a": 1, "c": {"x": "u"}}));
        let d1 = d0.root().delete_member("c").unwrap().top();
        let notes = changes("default", Some(&d0), Some(&d1));
        let removed: Vec<Topic> = notes
            .iter()
            .filter(|n| n.is_removed())
            .map(|n| n.topic.clone())
            .collect();
        assert_eq!(
            removed,
            vec![
                topic(path!["c"], NodeKind::Node),
                topic(path!["c", "x"], NodeKind::Node),
            ]
        );
    }

    #[test]
    fn array_indices_visited_in_order() {
        let d0 = doc(json!({"l": [{"k": "b"}, {"k": "c"}]}));
        let d1 = d0
            .goto(path!["l", 0usize].steps())
            .unwrap()
            .insert_before(&json!({"k": "a"}))
            .unwrap()
            .top();
        let notes = changes("default", Some(&d0), Some(&d1));
        let entry_paths: Vec<InstancePath> = notes
            .iter()
            .map(|n| n.path().clone())
            .filter(|p| p.len() == 2)
            .collect();
        assert_eq!(
            entry_paths,
            vec![path!["l", 0usize], path!["l", 1usize], path!["l", 2usize]]
        );
    }

    #[test]
    fn unsubscribe_forgets_listener() {
        let mut subs = Subscribers::default();
        let noop: NotifyFn = Rc::new(RefCell::new(|_: &Notification| {}));
        let id = subs.subscribe("default", Topic::root(), noop.clone());
        let all = subs.subscribe_all(noop);
        assert_eq!(subs.len(), 2);
        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        assert!(subs.unsubscribe(all));
        assert!(subs.by_topic.is_empty());
    }
}
