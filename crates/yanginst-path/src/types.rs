//! Path step and path types.

use std::fmt;

/// One step of an instance path.
///
/// Object members are addressed by name, array entries by position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathStep {
    Member(String),
    Index(usize),
}

impl PathStep {
    pub fn member(name: impl Into<String>) -> Self {
        PathStep::Member(name.into())
    }

    pub fn as_member(&self) -> Option<&str> {
        match self {
            PathStep::Member(name) => Some(name),
            PathStep::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(idx) => Some(*idx),
            PathStep::Member(_) => None,
        }
    }
}

impl From<&str> for PathStep {
    fn from(name: &str) -> Self {
        PathStep::Member(name.to_string())
    }
}

impl From<String> for PathStep {
    fn from(name: String) -> Self {
        PathStep::Member(name)
    }
}

impl From<usize> for PathStep {
    fn from(idx: usize) -> Self {
        PathStep::Index(idx)
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Member(name) => f.write_str(&crate::escape_component(name)),
            PathStep::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// An absolute instance path, root first.
///
/// Ordering is lexicographic over the steps, so `/list/2` sorts before
/// `/list/10`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstancePath(Vec<PathStep>);

impl InstancePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn last(&self) -> Option<&PathStep> {
        self.0.last()
    }

    /// The path of the enclosing node, `None` for the root.
    pub fn parent(&self) -> Option<InstancePath> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Returns a new path with `step` appended.
    pub fn child(&self, step: impl Into<PathStep>) -> InstancePath {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(step.into());
        Self(steps)
    }

    pub fn push(&mut self, step: impl Into<PathStep>) {
        self.0.push(step.into());
    }

    pub fn pop(&mut self) -> Option<PathStep> {
        self.0.pop()
    }

    /// True when `self` equals `other` or lies below it.
    pub fn starts_with(&self, other: &InstancePath) -> bool {
        self.0.starts_with(&other.0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathStep> {
        self.0.iter()
    }

    pub fn into_steps(self) -> Vec<PathStep> {
        self.0
    }

    /// JSON-Pointer rendering, for display only.
    pub fn to_pointer(&self) -> String {
        crate::format_pointer(&self.0)
    }
}

impl From<Vec<PathStep>> for InstancePath {
    fn from(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }
}

impl From<&[PathStep]> for InstancePath {
    fn from(steps: &[PathStep]) -> Self {
        Self(steps.to_vec())
    }
}

impl FromIterator<PathStep> for InstancePath {
    fn from_iter<I: IntoIterator<Item = PathStep>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl AsRef<[PathStep]> for InstancePath {
    fn as_ref(&self) -> &[PathStep] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a InstancePath {
    type Item = &'a PathStep;
    type IntoIter = std::slice::Iter<'a, PathStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for step in &self.0 {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

/// Builds an [`InstancePath`] from member names and indices.
///
/// ```
/// use yanginst_path::{path, PathStep};
///
/// let p = path!["interfaces", "interface", 0usize, "name"];
/// assert_eq!(p.steps()[2], PathStep::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::InstancePath::root()
    };
    ($($step:expr),+ $(,)?) => {
        $crate::InstancePath::new(vec![$($crate::PathStep::from($step)),+])
    };
}
