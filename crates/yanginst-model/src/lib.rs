//! Schema service for yanginst.
//!
//! Holds the schema tree, the persistent instance values documents are made
//! of, raw decoding, per-node validation and the structural update
//! operations that produce new document versions.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use yanginst_model::schema::builder::*;
//! use yanginst_model::schema::LeafType;
//! use yanginst_model::{DataModel, SchemaService};
//! use yanginst_path::path;
//!
//! let model = DataModel::new(root([leaf("mtu", LeafType::uint16())])).unwrap();
//! let v1 = model.from_raw(&json!({"mtu": 1500})).unwrap();
//! let v2 = v1.goto(path!["mtu"].steps()).unwrap().update(&json!(9000)).unwrap().top();
//!
//! assert_eq!(v1.raw_value(), json!({"mtu": 1500}));
//! assert_eq!(v2.raw_value(), json!({"mtu": 9000}));
//! ```

pub mod error;
pub mod instance;
pub mod model;
pub mod parse;
pub mod schema;
pub mod stamp;
pub mod validate;
pub mod value;

pub use error::{ErrorCategory, ModelError, SchemaError, ValidationError};
pub use instance::{Document, InstanceNode};
pub use model::{encode_pretty, DataModel, SchemaService, DEFAULT_INDENT};
pub use schema::{LeafType, SchemaKind, SchemaNode};
pub use stamp::Stamp;
pub use validate::{validate_node, ContentType};
pub use value::InstanceValue;
