//! Schema entries and path schemas
//!
//! A [`PathSchema`] is the ordered table of addressable paths for one model.

use crate::descriptor::TypeDescriptor;
use regex::Regex;
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Regex segment matching one array index
pub const INDEX_SEGMENT: &str = "[0-9]+";

/// Anchored pattern matching concrete patch paths
///
/// Compared and hashed by pattern text.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile an anchored pattern from its body (without `^`/`$`)
    ///
    /// # Errors
    /// Returns error if the body is not a valid regex
    pub fn compile(body: &str) -> Result<Self, regex::Error> {
        let source = format!("^{body}$");
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    /// Whether `path` is matched in full
    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Pattern text, including anchors
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PathPattern {}

impl Hash for PathPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl Display for PathPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One addressable path of a model
///
/// Two entries are equal iff pattern text, array-element flag and value type
/// all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaEntry {
    pattern: PathPattern,
    is_array_element: bool,
    value_type: TypeDescriptor,
}

impl SchemaEntry {
    /// Create entry
    #[inline]
    #[must_use]
    pub fn new(pattern: PathPattern, is_array_element: bool, value_type: TypeDescriptor) -> Self {
        Self {
            pattern,
            is_array_element,
            value_type,
        }
    }

    /// Path pattern
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Whether the entry addresses an element by index (`/Dogs/1`)
    #[inline]
    #[must_use]
    pub fn is_array_element(&self) -> bool {
        self.is_array_element
    }

    /// Declared value type at this path
    #[inline]
    #[must_use]
    pub fn value_type(&self) -> &TypeDescriptor {
        &self.value_type
    }

    /// Whether the entry matches `path`
    #[inline]
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Ordered table of schema entries for one model
///
/// Entries keep depth-first discovery order; [`PathSchema::find`] returns the
/// first entry in that order whose pattern matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSchema {
    model: String,
    entries: Vec<SchemaEntry>,
}

impl PathSchema {
    /// Create schema
    #[inline]
    #[must_use]
    pub fn new(model: impl Into<String>, entries: Vec<SchemaEntry>) -> Self {
        Self {
            model: model.into(),
            entries,
        }
    }

    /// Name of the model this schema describes
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Entries in discovery order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in discovery order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    /// Whether an equal entry exists
    #[must_use]
    pub fn contains(&self, entry: &SchemaEntry) -> bool {
        self.entries.contains(entry)
    }

    /// First entry matching `path`
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|entry| entry.matches(path))
    }

    /// Entries of `self` that also appear in `other`, in `self`'s order
    #[must_use]
    pub fn intersect(&self, other: &PathSchema) -> PathSchema {
        let theirs: HashSet<&SchemaEntry> = other.entries.iter().collect();
        let entries = self
            .entries
            .iter()
            .filter(|entry| theirs.contains(entry))
            .cloned()
            .collect();
        PathSchema::new(format!("{} & {}", self.model, other.model), entries)
    }
}

impl<'a> IntoIterator for &'a PathSchema {
    type Item = &'a SchemaEntry;
    type IntoIter = std::slice::Iter<'a, SchemaEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
