//! Store field addresses
//!
//! Provides [`FieldPath`], the dotted address the document store uses for
//! nested fields, and its conversion from JSON Pointer patch paths.

use crate::error::PathError;
use std::fmt::{self, Display, Formatter};

/// Characters that never appear in a translatable patch path
pub const RESERVED_CHARS: [char; 5] = ['$', '{', '}', '[', ']'];

/// Whether `path` contains a store operator or query metacharacter
#[inline]
#[must_use]
pub fn has_reserved_chars(path: &str) -> bool {
    path.contains(RESERVED_CHARS)
}

/// Address of a field inside a stored document
///
/// # Examples
/// - `/Dogs/1/Name` → `Dogs.1.Name`
/// - `/Rating` → `Rating`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Parse a JSON Pointer (`/a/b~1c`) into a field path
    ///
    /// # Errors
    /// Returns error if the pointer does not start with `/`, addresses the
    /// document root, or contains an empty segment
    pub fn from_pointer(pointer: &str) -> Result<Self, PathError> {
        let body = pointer
            .strip_prefix('/')
            .ok_or_else(|| PathError::NotAPointer(pointer.to_string()))?;
        if body.is_empty() {
            return Err(PathError::Root);
        }

        let segments = body
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment(pointer.to_string()))
                } else {
                    Ok(segment.replace("~1", "/").replace("~0", "~"))
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the path addresses a top-level field
    #[inline]
    #[must_use]
    pub fn is_root_field(&self) -> bool {
        self.0.len() == 1
    }

    /// Immediate ancestor, `None` for top-level fields
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
