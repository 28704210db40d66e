//! Versioned instance-data repository.
//!
//! Named slots hold immutable [`Document`] versions. Loading or committing
//! a document re-validates it as a whole, keeps a sorted and de-duplicated
//! error log, and notifies the observers of exactly the paths that changed.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use yanginst::Repository;
//! use yanginst_model::schema::builder::*;
//! use yanginst_model::schema::LeafType;
//! use yanginst_model::DataModel;
//! use yanginst_path::{path, topic, NodeKind};
//!
//! let model = DataModel::new(root([leaf("a", LeafType::int32()).mandatory()])).unwrap();
//! let repo = Repository::new(model);
//! repo.load_raw(&json!({})).unwrap();
//! assert_eq!(repo.error_log().len(), 1);
//!
//! let fired = Rc::new(RefCell::new(0));
//! let counter = Rc::clone(&fired);
//! repo.subscribe(topic(path!["a"], NodeKind::Node), move |_| *counter.borrow_mut() += 1);
//!
//! let next = repo.get_resource(&[]).unwrap().put_member("a", &json!(5)).unwrap();
//! repo.commit(next.top()).unwrap();
//! assert!(repo.is_valid());
//! assert_eq!(*fired.borrow(), 1);
//! ```

pub mod cli;
pub mod diff;
pub mod publisher;
pub mod repo;
pub mod settings;
pub mod walker;

pub use diff::{DiffLine, LineDiff, LineOp};
pub use publisher::{changes, Change, Notification, SubscriptionId};
pub use repo::{LoadOutcome, RepoError, Repository, BASELINE_SLOT, DEFAULT_SLOT};
pub use settings::{Settings, SettingsError};
pub use walker::{walk, ErrorLog, ErrorLogEntry};

pub use yanginst_model::{Document, InstanceNode};
pub use yanginst_path::{topic, InstancePath, NodeKind, PathStep, Topic};
