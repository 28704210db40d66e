//! Whole-document validation and the error log.

use std::collections::HashSet;

use yanginst_model::{ContentType, Document, SchemaService, ValidationError};

/// One reported validation failure. Its rendered text is
/// `"<path> <category> <tag>: <message>"`.
pub type ErrorLogEntry = ValidationError;

/// Validation failures of one document, sorted by path and free of entries
/// that render identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorLog {
    entries: Vec<ErrorLogEntry>,
}

impl ErrorLog {
    /// Sort by path and drop entries whose text repeats an earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = ErrorLogEntry>) -> Self {
        let mut keyed: Vec<(String, ErrorLogEntry)> = entries
            .into_iter()
            .map(|entry| (entry.to_string(), entry))
            .collect();
        let mut seen = HashSet::with_capacity(keyed.len());
        keyed.retain(|(text, _)| seen.insert(text.clone()));
        keyed.sort_by(|(ta, a), (tb, b)| a.path.cmp(&b.path).then_with(|| ta.cmp(tb)));
        Self {
            entries: keyed.into_iter().map(|(_, entry)| entry).collect(),
        }
    }

    pub fn entries(&self) -> &[ErrorLogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorLogEntry> {
        self.entries.iter()
    }

    /// One rendered entry per line.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a ErrorLog {
    type Item = &'a ErrorLogEntry;
    type IntoIter = std::slice::Iter<'a, ErrorLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Validate every node of `doc`.
///
/// A failing node never stops the walk; its descendants and siblings are
/// still checked.
pub fn walk<S>(service: &S, doc: &Document, scope: ContentType) -> ErrorLog
where
    S: SchemaService + ?Sized,
{
    let mut found = Vec::new();
    let mut stack = vec![doc.root()];
    while let Some(node) = stack.pop() {
        if let Err(err) = service.validate(&node, scope) {
            found.push(err);
        }
        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }
    ErrorLog::from_entries(found)
}
