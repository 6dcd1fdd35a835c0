//! Concurrent schema registry
//!
//! Provides [`SchemaRegistry`], a per-type cache of path schemas backed by
//! [`DashMap`]. Schemas are built outside any shard lock and published as
//! whole [`Arc`]s, so readers never observe a partially built schema.

use crate::builder::PathSchemaBuilder;
use crate::config::RegistryConfig;
use crate::descriptor::{Describe, TypeDescriptor};
use crate::entry::PathSchema;
use crate::error::{ConfigurationError, SchemaResult};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

/// Source of path schemas for model types
///
/// The translator only depends on this seam, so callers may plug in a
/// pre-populated or read-only registry.
pub trait SchemaSource: Send + Sync {
    /// Schema for the type identified by `key`, described by `descriptor`
    ///
    /// # Errors
    /// Returns error if the schema is unavailable or cannot be built
    fn schema_of(&self, key: TypeId, descriptor: &TypeDescriptor) -> SchemaResult<Arc<PathSchema>>;

    /// Schema for `T`
    ///
    /// # Errors
    /// Returns error if the schema is unavailable or cannot be built
    fn schema<T: Describe>(&self) -> SchemaResult<Arc<PathSchema>>
    where
        Self: Sized,
    {
        self.schema_of(TypeId::of::<T>(), &T::describe())
    }
}

/// Per-type path schema cache
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: DashMap<TypeId, Arc<PathSchema>>,
    builder: PathSchemaBuilder,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create empty registry with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create empty registry with `config`
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: DashMap::new(),
            builder: PathSchemaBuilder::new(&config),
            config,
        }
    }

    /// Registry configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Build and publish the schema of `T`, replacing any cached one
    ///
    /// # Errors
    /// Returns error if the schema cannot be built; the cache is left untouched
    pub fn register<T: Describe>(&self) -> SchemaResult<Arc<PathSchema>> {
        self.register_descriptor(TypeId::of::<T>(), &T::describe())
    }

    /// Build and publish the schema for an explicit descriptor
    ///
    /// # Errors
    /// Returns error if the schema cannot be built; the cache is left untouched
    pub fn register_descriptor(
        &self,
        key: TypeId,
        descriptor: &TypeDescriptor,
    ) -> SchemaResult<Arc<PathSchema>> {
        let schema = Arc::new(self.builder.build(descriptor)?);
        self.schemas.insert(key, Arc::clone(&schema));
        tracing::debug!("Registered schema for {}", schema.model());
        Ok(schema)
    }

    /// Cached schema of `T`, without building
    #[inline]
    #[must_use]
    pub fn get<T: Describe>(&self) -> Option<Arc<PathSchema>> {
        self.schemas
            .get(&TypeId::of::<T>())
            .map(|schema| Arc::clone(schema.value()))
    }

    /// Whether `T` has a cached schema
    #[inline]
    #[must_use]
    pub fn contains<T: Describe>(&self) -> bool {
        self.schemas.contains_key(&TypeId::of::<T>())
    }

    /// Drop the cached schema of `T`
    #[inline]
    pub fn remove<T: Describe>(&self) -> Option<Arc<PathSchema>> {
        self.schemas.remove(&TypeId::of::<T>()).map(|(_, schema)| schema)
    }

    /// Drop all cached schemas
    #[inline]
    pub fn clear(&self) {
        self.schemas.clear();
    }

    /// Number of cached schemas
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the cache is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaSource for SchemaRegistry {
    fn schema_of(&self, key: TypeId, descriptor: &TypeDescriptor) -> SchemaResult<Arc<PathSchema>> {
        if let Some(schema) = self.schemas.get(&key) {
            return Ok(Arc::clone(schema.value()));
        }

        if !self.config.lazy_registration {
            return Err(ConfigurationError::Unregistered {
                model: descriptor.to_string(),
            });
        }

        // Concurrent misses for the same key may both build; the last insert wins
        self.register_descriptor(key, descriptor)
    }
}
