//! patchmap path schemas
//!
//! Derives, from a model's static field graph, the table of paths a patch
//! operation may address.
//!
//! # Core Concepts
//!
//! - [`Describe`]: Trait through which a model publishes its [`TypeDescriptor`]
//! - [`SchemaEntry`]: One addressable path pattern with its value type
//! - [`PathSchema`]: Ordered entries for one model (first match wins)
//! - [`PathSchemaBuilder`]: Depth-first derivation with cycle and depth guards
//! - [`SchemaRegistry`]: Concurrent per-type cache with lazy population
//!
//! # Example
//!
//! ```rust
//! use patchmap_schema::{Describe, Field, SchemaRegistry, SchemaSource, TypeDescriptor};
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
//! let registry = SchemaRegistry::new();
//! let schema = registry.schema::<Dog>().unwrap();
//! assert!(schema.find("/Age").is_some());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod builder;
mod config;
mod descriptor;
mod entry;
mod error;
mod registry;

// Re-exports
pub use builder::PathSchemaBuilder;
pub use config::{RegistryConfig, DEFAULT_MAX_DEPTH};
pub use descriptor::{Describe, Field, ModelRef, TypeDescriptor};
pub use entry::{PathPattern, PathSchema, SchemaEntry, INDEX_SEGMENT};
pub use error::{ConfigurationError, SchemaResult};
pub use registry::{SchemaRegistry, SchemaSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
