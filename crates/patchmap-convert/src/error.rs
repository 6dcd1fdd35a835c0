//! Error types for patch conversion
//!
//! Provides error handling for:
//! - Per-operation failures, collected into a conversion result
//! - Value coercion failures
//! - Apply failures at the store boundary

use crate::operation::Operation;
use std::fmt::{self, Display, Formatter};

/// Classification of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationErrorKind {
    /// Path is malformed or absent from both models
    PathNotValid,
    /// Operation cannot be expressed as a field-level mutation
    NotSupported,
    /// Value cannot be coerced to the field's declared type
    TypeError,
}

impl Display for OperationErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathNotValid => f.write_str("PathNotValid"),
            Self::NotSupported => f.write_str("NotSupported"),
            Self::TypeError => f.write_str("TypeError"),
        }
    }
}

/// Failure of one patch operation
///
/// Never raised; collected into the conversion result alongside the
/// operation that produced it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct OperationError {
    message: String,
    kind: OperationErrorKind,
    operation: Operation,
}

impl OperationError {
    /// Create operation error
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>, kind: OperationErrorKind, operation: Operation) -> Self {
        Self {
            message: message.into(),
            kind,
            operation,
        }
    }

    /// Path is not addressable on the model pair
    #[must_use]
    pub fn path_not_valid(operation: &Operation) -> Self {
        Self::new(
            format!(
                "Operation '{}' points to path '{}', which is not found on models.",
                operation.op, operation.path
            ),
            OperationErrorKind::PathNotValid,
            operation.clone(),
        )
    }

    /// Operation kind is not translatable
    #[must_use]
    pub fn not_supported(operation: &Operation) -> Self {
        Self::new(
            format!("Operation '{}' is not supported.", operation.op),
            OperationErrorKind::NotSupported,
            operation.clone(),
        )
    }

    /// Removal of an array element by index
    #[must_use]
    pub fn indexed_removal(operation: &Operation) -> Self {
        Self::new(
            "Remove array element by index is not supported",
            OperationErrorKind::NotSupported,
            operation.clone(),
        )
    }

    /// Value failed coercion at `path`
    #[must_use]
    pub fn type_error(operation: &Operation, path: impl Display, cause: &CoercionError) -> Self {
        Self::new(
            format!("Cannot convert value for property at {path}: {cause}"),
            OperationErrorKind::TypeError,
            operation.clone(),
        )
    }

    /// Human-readable message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Error classification
    #[inline]
    #[must_use]
    pub fn kind(&self) -> OperationErrorKind {
        self.kind
    }

    /// Operation that failed
    #[inline]
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }
}

/// Value could not be converted to a declared type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}{}", location_suffix(.location))]
pub struct CoercionError {
    location: String,
    reason: String,
}

impl CoercionError {
    /// Create error at the root of the value
    #[inline]
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            location: String::new(),
            reason: reason.into(),
        }
    }

    /// Prefix the location with an enclosing segment
    #[must_use]
    pub fn within(mut self, segment: impl Display) -> Self {
        self.location = format!("/{segment}{}", self.location);
        self
    }

    /// Pointer to the offending part of the value, empty for the root
    #[inline]
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// What went wrong
    #[inline]
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

fn location_suffix(location: &str) -> String {
    if location.is_empty() {
        String::new()
    } else {
        format!(" at {location}")
    }
}

/// Malformed patch path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path does not start with `/`
    #[error("'{0}' is not a JSON pointer")]
    NotAPointer(String),

    /// Path addresses the whole document
    #[error("path addresses the document root")]
    Root,

    /// Empty segment in path
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// Unknown operation name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseOperationError {
    /// Name is not one of the six patch operations
    #[error("unknown operation '{0}'")]
    UnknownKind(String),
}

/// Failure to apply a conversion result
#[derive(Debug, thiserror::Error)]
pub enum ApplyError<E: std::error::Error + 'static> {
    /// Result carries operation errors; nothing was sent to the store
    #[error("conversion has {count} operation error(s) and cannot be applied")]
    Rejected {
        /// Number of operation errors
        count: usize,
    },

    /// Store rejected or failed the update
    #[error("update target failed: {0}")]
    Target(#[source] E),
}

impl<E: std::error::Error + 'static> ApplyError<E> {
    /// Whether the result was refused before any I/O
    #[inline]
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_supported_message() {
        let err = OperationError::not_supported(&Operation::test("/Name", json!("x")));
        assert_eq!(err.kind(), OperationErrorKind::NotSupported);
        assert_eq!(err.message(), "Operation 'test' is not supported.");
        assert_eq!(err.to_string(), "NotSupported: Operation 'test' is not supported.");
    }

    #[test]
    fn path_not_valid_keeps_operation() {
        let op = Operation::add("/Nope", json!(1));
        let err = OperationError::path_not_valid(&op);
        assert_eq!(err.kind(), OperationErrorKind::PathNotValid);
        assert_eq!(err.operation(), &op);
        assert!(err.message().contains("'/Nope'"));
    }

    #[test]
    fn coercion_location_nests_outward() {
        let err = CoercionError::new("expected f64, found string")
            .within("Rating")
            .within(0);
        assert_eq!(err.location(), "/0/Rating");
        assert_eq!(err.to_string(), "expected f64, found string at /0/Rating");
        assert_eq!(CoercionError::new("bad").to_string(), "bad");
    }

    #[test]
    fn type_error_includes_cause() {
        let op = Operation::replace("/Rating", json!("high"));
        let err = OperationError::type_error(&op, "Rating", &CoercionError::new("expected f64, found string"));
        assert_eq!(err.kind(), OperationErrorKind::TypeError);
        assert_eq!(
            err.message(),
            "Cannot convert value for property at Rating: expected f64, found string"
        );
    }

    #[test]
    fn apply_error_rejected() {
        let err: ApplyError<std::io::Error> = ApplyError::Rejected { count: 2 };
        assert!(err.is_rejected());
        assert!(err.to_string().contains("2 operation error"));
    }
}
