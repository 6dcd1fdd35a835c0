//! Filter and update fragments
//!
//! Typed predicate and mutation trees produced per operation. Rendering to
//! BSON documents happens only when a caller asks for it, so fragments can
//! be inspected and combined without knowing the wire shape.

use crate::path::FieldPath;
use bson::{Bson, Document};

/// Predicate over stored documents
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    Empty,
    /// Field is present
    Exists(FieldPath),
    /// All inner filters match
    And(Vec<Filter>),
    /// Any inner filter matches
    Or(Vec<Filter>),
    /// Caller-supplied predicate, passed through as given
    Raw(Document),
}

impl Filter {
    /// Field at `path` is present
    #[inline]
    #[must_use]
    pub fn exists(path: FieldPath) -> Self {
        Self::Exists(path)
    }

    /// Conjunction of `filters`; empty input matches everything
    #[must_use]
    pub fn and_all(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters
            .into_iter()
            .filter(|filter| !filter.is_empty())
            .collect();
        match filters.len() {
            0 => Self::Empty,
            1 => filters.remove(0),
            _ => Self::And(filters),
        }
    }

    /// Disjunction of `filters`; empty input matches everything
    #[must_use]
    pub fn or_all(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().collect();
        match filters.len() {
            0 => Self::Empty,
            1 => filters.remove(0),
            _ => Self::Or(filters),
        }
    }

    /// Whether the filter matches every document
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Raw(doc) => doc.is_empty(),
            _ => false,
        }
    }

    /// Render as a store query document
    #[must_use]
    pub fn to_document(&self) -> Document {
        match self {
            Self::Empty => Document::new(),
            Self::Exists(path) => {
                let mut condition = Document::new();
                condition.insert("$exists", true);
                let mut doc = Document::new();
                doc.insert(path.to_string(), condition);
                doc
            }
            Self::And(filters) => logical("$and", filters),
            Self::Or(filters) => logical("$or", filters),
            Self::Raw(doc) => doc.clone(),
        }
    }
}

fn logical(operator: &str, filters: &[Filter]) -> Document {
    let clauses: Vec<Bson> = filters
        .iter()
        .map(|filter| Bson::Document(filter.to_document()))
        .collect();
    let mut doc = Document::new();
    doc.insert(operator, clauses);
    doc
}

impl From<Document> for Filter {
    fn from(doc: Document) -> Self {
        Self::Raw(doc)
    }
}

/// Mutation applied to matched documents
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Set field to a coerced value
    Set(FieldPath, Bson),
    /// Remove field
    Unset(FieldPath),
    /// Apply all inner updates
    Combine(Vec<Update>),
    /// Caller-supplied mutation, passed through as given
    Raw(Document),
}

impl Update {
    /// Set field at `path` to `value`
    #[inline]
    #[must_use]
    pub fn set(path: FieldPath, value: impl Into<Bson>) -> Self {
        Self::Set(path, value.into())
    }

    /// Remove field at `path`
    #[inline]
    #[must_use]
    pub fn unset(path: FieldPath) -> Self {
        Self::Unset(path)
    }

    /// All of `updates`, in order
    #[must_use]
    pub fn combine(updates: impl IntoIterator<Item = Update>) -> Self {
        let mut updates: Vec<_> = updates.into_iter().collect();
        if updates.len() == 1 {
            updates.remove(0)
        } else {
            Self::Combine(updates)
        }
    }

    /// Render as a store update document
    ///
    /// Operator sub-documents of combined updates are merged; a later write
    /// to the same field replaces the earlier one.
    #[must_use]
    pub fn to_document(&self) -> Document {
        match self {
            Self::Set(path, value) => operator("$set", path, value.clone()),
            Self::Unset(path) => operator("$unset", path, Bson::Int32(1)),
            Self::Combine(updates) => {
                let mut merged = Document::new();
                for update in updates {
                    merge_operators(&mut merged, update.to_document());
                }
                merged
            }
            Self::Raw(doc) => doc.clone(),
        }
    }
}

fn operator(name: &str, path: &FieldPath, value: Bson) -> Document {
    let mut fields = Document::new();
    fields.insert(path.to_string(), value);
    let mut doc = Document::new();
    doc.insert(name, fields);
    doc
}

/// Merge `source` into `target`, operator by operator
pub(crate) fn merge_operators(target: &mut Document, source: Document) {
    for (name, value) in source {
        if let Bson::Document(fields) = &value {
            if let Some(Bson::Document(existing)) = target.get_mut(&name) {
                for (field, value) in fields {
                    existing.insert(field.clone(), value.clone());
                }
                continue;
            }
        }
        target.insert(name, value);
    }
}

impl From<Document> for Update {
    fn from(doc: Document) -> Self {
        Self::Raw(doc)
    }
}
