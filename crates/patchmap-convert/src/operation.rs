//! Patch operations
//!
//! Provides [`Operation`], the already-parsed form of one JSON Patch
//! (RFC 6902) instruction consumed by the converter.

use crate::error::ParseOperationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

static NULL: Value = Value::Null;

/// Kind of patch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Set a value, creating the last path segment if absent
    Add,
    /// Remove an existing value
    Remove,
    /// Overwrite an existing value
    Replace,
    /// Copy a value from `from` to `path`
    Copy,
    /// Move a value from `from` to `path`
    Move,
    /// Assert a value
    Test,
}

impl OperationKind {
    /// Wire name (`"add"`, `"remove"`, ...)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Copy => "copy",
            Self::Move => "move",
            Self::Test => "test",
        }
    }

    /// Whether the kind maps onto a single field-level mutation
    #[inline]
    #[must_use]
    pub fn is_translatable(&self) -> bool {
        matches!(self, Self::Add | Self::Remove | Self::Replace)
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            "copy" => Ok(Self::Copy),
            "move" => Ok(Self::Move),
            "test" => Ok(Self::Test),
            other => Err(ParseOperationError::UnknownKind(other.to_string())),
        }
    }
}

/// One patch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation kind
    pub op: OperationKind,
    /// JSON Pointer into the model
    pub path: String,
    /// Operand for add/replace/test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Source pointer for copy/move
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Operation {
    /// Create operation without operands
    #[inline]
    #[must_use]
    pub fn new(op: OperationKind, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            value: None,
            from: None,
        }
    }

    /// With value operand
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// With source pointer
    #[inline]
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// `add` at `path`
    #[inline]
    #[must_use]
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::new(OperationKind::Add, path).with_value(value)
    }

    /// `remove` at `path`
    #[inline]
    #[must_use]
    pub fn remove(path: impl Into<String>) -> Self {
        Self::new(OperationKind::Remove, path)
    }

    /// `replace` at `path`
    #[inline]
    #[must_use]
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::new(OperationKind::Replace, path).with_value(value)
    }

    /// `copy` from `from` to `path`
    #[inline]
    #[must_use]
    pub fn copy(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(OperationKind::Copy, path).with_from(from)
    }

    /// `move` from `from` to `path`
    #[inline]
    #[must_use]
    pub fn move_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(OperationKind::Move, path).with_from(from)
    }

    /// `test` at `path`
    #[inline]
    #[must_use]
    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self::new(OperationKind::Test, path).with_value(value)
    }

    /// Value operand, absent treated as `null`
    #[inline]
    #[must_use]
    pub fn value_or_null(&self) -> &Value {
        self.value.as_ref().unwrap_or(&NULL)
    }
}

impl From<&json_patch::PatchOperation> for Operation {
    fn from(operation: &json_patch::PatchOperation) -> Self {
        use json_patch::PatchOperation as P;

        match operation {
            P::Add(op) => Self::add(op.path.to_string(), op.value.clone()),
            P::Remove(op) => Self::remove(op.path.to_string()),
            P::Replace(op) => Self::replace(op.path.to_string(), op.value.clone()),
            P::Move(op) => Self::move_from(op.from.to_string(), op.path.to_string()),
            P::Copy(op) => Self::copy(op.from.to_string(), op.path.to_string()),
            P::Test(op) => Self::test(op.path.to_string(), op.value.clone()),
        }
    }
}

/// Operations of a document parsed by the `json-patch` crate, in order
#[must_use]
pub fn operations_from_patch(patch: &json_patch::Patch) -> Vec<Operation> {
    patch.0.iter().map(Operation::from).collect()
}
