//! The document store.
//!
//! A [`Repository`] maps slot names to immutable document versions. Every
//! load or commit swaps one slot, re-validates the whole new version and
//! publishes the differences to subscribers, all on the caller's stack.
//!
//! The repository is single-threaded. Its state sits behind `RefCell`s so
//! observers can share it through `Rc` and read from inside their callbacks;
//! callbacks run only after every internal borrow has been released. A
//! callback that tries to commit gets [`RepoError::CommitInProgress`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use yanginst_model::{ContentType, Document, InstanceNode, ModelError, SchemaService};
use yanginst_path::{PathStep, Topic};

use crate::diff::LineDiff;
use crate::publisher::{changes, Notification, SubscriptionId, Subscribers};
use crate::walker::{walk, ErrorLog, ErrorLogEntry};

/// The live working copy.
pub const DEFAULT_SLOT: &str = "default";
/// The last loaded or saved version, compared against by [`Repository::diff_baseline`].
pub const BASELINE_SLOT: &str = "load";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("a commit is already in progress")]
    CommitInProgress,
    #[error("unknown slot {0:?}")]
    UnknownSlot(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// How [`Repository::load`] ended.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// The file could not be used; the slot holds an empty document instead.
    Recovered { reason: String },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

pub struct Repository {
    service: Box<dyn SchemaService>,
    slots: RefCell<BTreeMap<String, Document>>,
    error_log: RefCell<ErrorLog>,
    subscribers: RefCell<Subscribers>,
    committing: Cell<bool>,
}

/// Marks a commit in progress until dropped.
struct CommitGuard<'a>(&'a Cell<bool>);

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Repository {
    pub fn new(service: impl SchemaService + 'static) -> Self {
        Self {
            service: Box::new(service),
            slots: RefCell::new(BTreeMap::new()),
            error_log: RefCell::new(ErrorLog::default()),
            subscribers: RefCell::new(Subscribers::default()),
            committing: Cell::new(false),
        }
    }

    pub fn service(&self) -> &dyn SchemaService {
        self.service.as_ref()
    }

    // ── Loading and saving ────────────────────────────────────────────────

    pub fn load_raw(&self, raw: &Value) -> Result<(), RepoError> {
        self.load_raw_into(DEFAULT_SLOT, raw)
    }

    /// Decode `raw` into `slot`, which also becomes the baseline.
    pub fn load_raw_into(&self, slot: &str, raw: &Value) -> Result<(), RepoError> {
        let _guard = self.begin_commit()?;
        let doc = self.service.from_raw(raw).map_err(|err| {
            warn!(slot, error = %err, "decoding instance data failed");
            err
        })?;
        self.install(slot, doc, true);
        Ok(())
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<LoadOutcome, RepoError> {
        self.load_into(DEFAULT_SLOT, file)
    }

    /// Load `file` into `slot`.
    ///
    /// A file that cannot be read or decoded leaves an empty document in the
    /// slot and is reported as [`LoadOutcome::Recovered`].
    pub fn load_into(&self, slot: &str, file: impl AsRef<Path>) -> Result<LoadOutcome, RepoError> {
        let file = file.as_ref();
        let _guard = self.begin_commit()?;
        info!(slot, file = %file.display(), "loading instance data");
        let (doc, outcome) = match self.read_document(file) {
            Ok(doc) => (doc, LoadOutcome::Loaded),
            Err(err) => {
                warn!(slot, file = %file.display(), error = %err, "load failed, using empty document");
                let doc = self.service.from_raw(&json!({}))?;
                (
                    doc,
                    LoadOutcome::Recovered {
                        reason: err.to_string(),
                    },
                )
            }
        };
        self.install(slot, doc, true);
        Ok(outcome)
    }

    pub fn save(&self, file: impl AsRef<Path>) -> Result<(), RepoError> {
        self.save_from(DEFAULT_SLOT, file)
    }

    /// Write the canonical encoding of `slot` and make it the new baseline.
    pub fn save_from(&self, slot: &str, file: impl AsRef<Path>) -> Result<(), RepoError> {
        let file = file.as_ref();
        let doc = self
            .slot(slot)
            .ok_or_else(|| RepoError::UnknownSlot(slot.to_string()))?;
        let mut text = self.service.canonical_string(&doc)?;
        text.push('\n');
        std::fs::write(file, text).map_err(|source| RepoError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        self.slots
            .borrow_mut()
            .insert(BASELINE_SLOT.to_string(), doc);
        info!(slot, file = %file.display(), "saved instance data");
        Ok(())
    }

    fn read_document(&self, file: &Path) -> Result<Document, RepoError> {
        let text = std::fs::read_to_string(file).map_err(|source| RepoError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let raw: Value = serde_json::from_str(&text).map_err(|source| RepoError::Json {
            path: file.to_path_buf(),
            source,
        })?;
        Ok(self.service.from_raw(&raw)?)
    }

    // ── Commits ───────────────────────────────────────────────────────────

    pub fn commit(&self, doc: Document) -> Result<(), RepoError> {
        self.commit_to(DEFAULT_SLOT, doc)
    }

    /// Replace the document in `slot`, re-validate and notify.
    ///
    /// Validation failures never block a commit; they end up in the error
    /// log.
    pub fn commit_to(&self, slot: &str, doc: Document) -> Result<(), RepoError> {
        let _guard = self.begin_commit()?;
        self.install(slot, doc, false);
        Ok(())
    }

    fn begin_commit(&self) -> Result<CommitGuard<'_>, RepoError> {
        if self.committing.replace(true) {
            warn!("commit rejected: another commit is still in progress");
            return Err(RepoError::CommitInProgress);
        }
        Ok(CommitGuard(&self.committing))
    }

    fn install(&self, slot: &str, doc: Document, baseline: bool) {
        let old = {
            let mut slots = self.slots.borrow_mut();
            let old = slots.insert(slot.to_string(), doc.clone());
            if baseline {
                slots.insert(BASELINE_SLOT.to_string(), doc.clone());
            }
            old
        };
        debug!(slot, baseline, "slot swapped");
        self.revalidate(&doc);
        self.publish(slot, old.as_ref(), &doc);
    }

    fn revalidate(&self, doc: &Document) {
        let log = walk(self.service.as_ref(), doc, ContentType::All);
        debug!(errors = log.len(), "validated");
        let entries = log.entries().to_vec();
        *self.error_log.borrow_mut() = log;
        let targets = self.subscribers.borrow().error_log_targets();
        for target in targets {
            if let Ok(mut listener) = target.try_borrow_mut() {
                (&mut *listener)(&entries[..]);
            }
        }
    }

    fn publish(&self, slot: &str, old: Option<&Document>, new: &Document) {
        let notifications = changes(slot, old, Some(new));
        debug!(slot, count = notifications.len(), "publishing changes");
        for notification in &notifications {
            trace!(slot, topic = %notification.topic, removed = notification.is_removed(), "notify");
            let targets = self.subscribers.borrow().targets(notification);
            for target in targets {
                if let Ok(mut listener) = target.try_borrow_mut() {
                    (&mut *listener)(notification);
                }
            }
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// The current document of `name`.
    pub fn slot(&self, name: &str) -> Option<Document> {
        self.slots.borrow().get(name).cloned()
    }

    pub fn slot_names(&self) -> Vec<String> {
        self.slots.borrow().keys().cloned().collect()
    }

    pub fn get_resource(&self, path: &[PathStep]) -> Option<InstanceNode> {
        self.get_resource_in(DEFAULT_SLOT, path)
    }

    /// The node at `path` in `slot`, or `None` when the slot or any step of
    /// the path does not exist.
    pub fn get_resource_in(&self, slot: &str, path: &[PathStep]) -> Option<InstanceNode> {
        self.slots.borrow().get(slot)?.goto(path)
    }

    /// Line diff of the canonical encodings of two slots.
    pub fn diff(&self, slot_a: &str, slot_b: &str) -> Result<LineDiff, RepoError> {
        let a = self.canonical(slot_a)?;
        let b = self.canonical(slot_b)?;
        Ok(LineDiff::new(&a, &b))
    }

    /// What changed since the last load or save.
    pub fn diff_baseline(&self) -> Result<LineDiff, RepoError> {
        self.diff(BASELINE_SLOT, DEFAULT_SLOT)
    }

    fn canonical(&self, slot: &str) -> Result<String, RepoError> {
        let doc = self
            .slot(slot)
            .ok_or_else(|| RepoError::UnknownSlot(slot.to_string()))?;
        Ok(self.service.canonical_string(&doc)?)
    }

    /// Entries of the last validation, sorted by path.
    pub fn error_log(&self) -> Vec<ErrorLogEntry> {
        self.error_log.borrow().entries().to_vec()
    }

    pub fn is_valid(&self) -> bool {
        self.error_log.borrow().is_empty()
    }

    // ── Observers ─────────────────────────────────────────────────────────

    /// Observe `topic` in the default slot.
    pub fn subscribe<F>(&self, topic: Topic, listener: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.subscribe_in(DEFAULT_SLOT, topic, listener)
    }

    pub fn subscribe_in<F>(&self, slot: &str, topic: Topic, listener: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.subscribers
            .borrow_mut()
            .subscribe(slot, topic, Rc::new(RefCell::new(listener)))
    }

    /// Observe every notification of every slot.
    pub fn subscribe_all<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.subscribers
            .borrow_mut()
            .subscribe_all(Rc::new(RefCell::new(listener)))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow_mut().unsubscribe(id)
    }

    /// Called with the full error log after every validation.
    pub fn register_error_log_cb<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[ErrorLogEntry]) + 'static,
    {
        self.subscribers
            .borrow_mut()
            .on_error_log(Rc::new(RefCell::new(listener)))
    }

    pub fn unregister_error_log_cb(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow_mut().off_error_log(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
