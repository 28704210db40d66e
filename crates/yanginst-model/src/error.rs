use std::fmt;

use thiserror::Error;
use yanginst_path::InstancePath;

/// Errors in a schema declaration.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown base type {0:?}")]
    UnknownBase(String),
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("list {list:?}: key {key:?} is not a leaf child")]
    InvalidKey { list: String, key: String },
    #[error("leafref {leaf:?}: target {target:?} is not a leaf or leaf-list")]
    InvalidLeafref { leaf: String, target: String },
    #[error("leaf {leaf:?}: {message}")]
    InvalidDefault { leaf: String, message: String },
    #[error("schema root must be a container")]
    RootNotContainer,
    #[error("schema JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding raw data or applying a structural update.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("{path}: unknown member {name:?}")]
    UnknownMember { path: InstancePath, name: String },
    #[error("{path}: no member {name:?}")]
    NoSuchMember { path: InstancePath, name: String },
    #[error("{path}: expected {expected}, found {found}")]
    RawType {
        path: InstancePath,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{path}: index {index} out of range")]
    IndexOutOfRange { path: InstancePath, index: usize },
    #[error("{path}: not an object")]
    NotAnObject { path: InstancePath },
    #[error("{path}: not an array")]
    NotAnArray { path: InstancePath },
    #[error("{path}: not an array entry")]
    NotAnEntry { path: InstancePath },
    #[error("the root node has no parent")]
    RootHasNoParent,
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Validation failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    TypeError,
    SchemaError,
    SemanticError,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeError => "type-error",
            Self::SchemaError => "schema-error",
            Self::SemanticError => "semantic-error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure reported for one node.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[error("{path} {category} {tag}: {message}")]
pub struct ValidationError {
    pub path: InstancePath,
    pub category: ErrorCategory,
    pub tag: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        path: InstancePath,
        category: ErrorCategory,
        tag: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path,
            category,
            tag: tag.into(),
            message: message.into(),
        }
    }

    pub fn type_error(path: InstancePath, message: impl Into<String>) -> Self {
        Self::new(path, ErrorCategory::TypeError, "invalid-type", message)
    }

    pub fn schema_error(path: InstancePath, tag: &str, message: impl Into<String>) -> Self {
        Self::new(path, ErrorCategory::SchemaError, tag, message)
    }

    pub fn semantic_error(path: InstancePath, tag: &str, message: impl Into<String>) -> Self {
        Self::new(path, ErrorCategory::SemanticError, tag, message)
    }
}
