//! Sanity checks for instance paths that arrive as text.

use thiserror::Error;

/// Longest pointer text accepted, in bytes.
pub const POINTER_MAX_BYTES: usize = 1024;

/// Deepest path accepted. Schema trees never nest anywhere near this.
pub const PATH_MAX_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("instance path {0:?} is not absolute")]
    NotAbsolute(String),
    #[error("instance path is {len} bytes, the limit is {POINTER_MAX_BYTES}")]
    TooLong { len: usize },
    #[error("instance path has {depth} steps, the limit is {PATH_MAX_DEPTH}")]
    TooDeep { depth: usize },
    #[error("bad escape in path component {0:?}, only ~0 and ~1 are allowed")]
    BadEscape(String),
}

/// Check pointer text before it is split into steps.
///
/// ```
/// use yanginst_path::{validate_pointer, PathError};
///
/// assert!(validate_pointer("/interface/0/name").is_ok());
/// assert_eq!(
///     validate_pointer("interface"),
///     Err(PathError::NotAbsolute("interface".to_string()))
/// );
/// ```
pub fn validate_pointer(pointer: &str) -> Result<(), PathError> {
    if pointer.len() > POINTER_MAX_BYTES {
        return Err(PathError::TooLong { len: pointer.len() });
    }
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(PathError::NotAbsolute(pointer.to_string()));
    }
    if let Some(component) = pointer.split('/').find(|c| has_bad_escape(c)) {
        return Err(PathError::BadEscape(component.to_string()));
    }
    Ok(())
}

pub fn validate_depth(depth: usize) -> Result<(), PathError> {
    match depth {
        d if d > PATH_MAX_DEPTH => Err(PathError::TooDeep { depth: d }),
        _ => Ok(()),
    }
}

fn has_bad_escape(component: &str) -> bool {
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.next(), Some('0' | '1')) {
            return true;
        }
    }
    false
}
