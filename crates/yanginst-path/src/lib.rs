//! Instance paths and subscription topics.
//!
//! A path is an ordered sequence of [`PathStep`]s: member names for objects,
//! positions for arrays. Topics pair a path with a [`NodeKind`] and are the
//! keys observers subscribe to.
//!
//! # Example
//!
//! ```
//! use yanginst_path::{parse_pointer, topic, NodeKind, PathStep};
//!
//! let path = parse_pointer("/interfaces/interface/0").unwrap();
//! assert_eq!(path.steps()[2], PathStep::Index(0));
//! assert_eq!(path.to_pointer(), "/interfaces/interface/0");
//!
//! let t = topic(path.clone(), NodeKind::Node);
//! assert_eq!(t, topic(path, NodeKind::Node));
//! ```

pub mod topic;
pub mod types;
pub mod validate;

pub use topic::{topic, NodeKind, Topic};
pub use types::{InstancePath, PathStep};
pub use validate::{validate_depth, validate_pointer, PathError};

/// Unescapes a pointer component: `~1` becomes `/`, `~0` becomes `~`.
///
/// ```
/// use yanginst_path::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 first, otherwise "~01" would decode to "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a pointer component: `~` becomes `~0`, `/` becomes `~1`.
///
/// ```
/// use yanginst_path::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Render steps as a JSON Pointer. The root renders as the empty string.
pub fn format_pointer(steps: &[PathStep]) -> String {
    let mut out = String::new();
    for step in steps {
        out.push('/');
        match step {
            PathStep::Member(name) => out.push_str(&escape_component(name)),
            PathStep::Index(idx) => out.push_str(&idx.to_string()),
        }
    }
    out
}

/// Parse a JSON Pointer into an [`InstancePath`].
///
/// Components made only of ASCII digits become [`PathStep::Index`]; YANG
/// identifiers never start with a digit, so no member name is lost.
pub fn parse_pointer(pointer: &str) -> Result<InstancePath, PathError> {
    validate_pointer(pointer)?;
    if pointer.is_empty() {
        return Ok(InstancePath::root());
    }
    let steps: Vec<PathStep> = pointer[1..]
        .split('/')
        .map(|component| {
            if is_index(component) {
                if let Ok(idx) = component.parse::<usize>() {
                    return PathStep::Index(idx);
                }
            }
            PathStep::Member(unescape_component(component))
        })
        .collect();
    validate_depth(steps.len())?;
    Ok(InstancePath::new(steps))
}

fn is_index(component: &str) -> bool {
    !component.is_empty()
        && component.bytes().all(|b| b.is_ascii_digit())
        && (component == "0" || !component.starts_with('0'))
}
