//! patchmap patch conversion
//!
//! Translates JSON Patch operations written against one model into the
//! filter and update documents that apply the same edit to a stored
//! document of another model.
//!
//! # Core Concepts
//!
//! - [`JsonPatchConverter`]: Walks operations against intersected path schemas
//! - [`ConversionResult`]: Filters, updates and errors of one conversion
//! - [`Filter`] / [`Update`]: Typed fragments rendered to BSON on demand
//! - [`ValueCoercer`]: Converts raw patch values to declared field types
//! - [`UpdateTarget`]: The single store call made by [`ConversionResult::apply`]
//!
//! # Example
//!
//! ```rust
//! use bson::doc;
//! use patchmap_convert::{JsonPatchConverter, Operation};
//! use patchmap_schema::{Describe, Field, TypeDescriptor};
//! use serde_json::json;
//!
//! struct Dog;
//!
//! impl Describe for Dog {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::model::<Self>("Dog", || {
//!             vec![Field::of::<String>("Name"), Field::of::<i32>("Age")]
//!         })
//!     }
//! }
//!
//! let converter = JsonPatchConverter::new();
//! let result = converter
//!     .convert::<Dog, Dog>(&[Operation::replace("/Age", json!(4))])
//!     .unwrap();
//!
//! assert!(!result.has_errors());
//! assert_eq!(result.combined_filter(None), doc! { "Age": { "$exists": true } });
//! assert_eq!(result.combined_update(None), doc! { "$set": { "Age": 4 } });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod coerce;
mod config;
mod converter;
mod error;
mod fragment;
mod operation;
mod path;
mod result;
mod target;

// Re-exports
pub use coerce::{default_value, BsonCoercer, ValueCoercer};
pub use config::{CoercionConfig, MissingFieldPolicy, UnknownFieldPolicy};
pub use converter::JsonPatchConverter;
pub use error::{
    ApplyError, CoercionError, OperationError, OperationErrorKind, ParseOperationError, PathError,
};
pub use fragment::{Filter, Update};
pub use operation::{operations_from_patch, Operation, OperationKind};
pub use path::{has_reserved_chars, FieldPath, RESERVED_CHARS};
pub use result::ConversionResult;
pub use target::{UpdateTarget, UpdateTargetExt};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
