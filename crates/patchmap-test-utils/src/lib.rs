//! Testing utilities for patchmap workspace
//!
//! Shared fixture models, converters and in-memory update targets.

#![allow(missing_docs)]

use async_trait::async_trait;
use bson::Document;
use parking_lot::Mutex;
use patchmap_convert::{
    BsonCoercer, CoercionConfig, JsonPatchConverter, Operation, UpdateTarget,
};
use patchmap_schema::{Describe, Field, SchemaRegistry, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserEntity {
    pub id: Uuid,
    pub name: Option<String>,
    pub rating: f64,
    pub total_pets: i32,
    pub dogs: Option<Vec<Dog>>,
}

impl Describe for UserEntity {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::model::<Self>("UserEntity", || {
            vec![
                Field::of::<Uuid>("Id"),
                Field::of::<Option<String>>("Name"),
                Field::of::<f64>("Rating"),
                Field::of::<i32>("TotalPets"),
                Field::of::<Option<Vec<Dog>>>("Dogs"),
            ]
        })
    }
}

/// Request shape exposing a subset of [`UserEntity`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDto {
    pub name: Option<String>,
    pub rating: f64,
    pub nickname: Option<String>,
}

impl Describe for UserDto {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::model::<Self>("UserDto", || {
            vec![
                Field::of::<Option<String>>("Name"),
                Field::of::<f64>("Rating"),
                Field::of::<Option<String>>("Nickname"),
            ]
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dog {
    pub name: Option<String>,
    pub age: i32,
    pub favorite_food: Option<String>,
    pub legs: Option<Vec<Leg>>,
}

impl Describe for Dog {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::model::<Self>("Dog", || {
            vec![
                Field::of::<Option<String>>("Name"),
                Field::of::<i32>("Age"),
                Field::of::<Option<String>>("FavoriteFood"),
                Field::of::<Option<Vec<Leg>>>("Legs"),
            ]
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Leg {
    pub is_ok: bool,
}

impl Describe for Leg {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::model::<Self>("Leg", || vec![Field::of::<bool>("IsOk")])
    }
}

/// Shares only `/Name` with [`Dog`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cat {
    pub name: Option<String>,
    pub lives: i64,
}

impl Describe for Cat {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::model::<Self>("Cat", || {
            vec![Field::of::<Option<String>>("Name"), Field::of::<i64>("Lives")]
        })
    }
}

/// Shares nothing with [`Dog`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fruit {
    pub weight: f64,
    pub color: Option<String>,
}

impl Describe for Fruit {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::model::<Self>("Fruit", || {
            vec![Field::of::<f64>("Weight"), Field::of::<Option<String>>("Color")]
        })
    }
}

/// Self-referencing model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    pub label: String,
    pub children: Vec<Node>,
}

impl Describe for Node {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::model::<Self>("Node", || {
            vec![Field::of::<String>("Label"), Field::of::<Vec<Node>>("Children")]
        })
    }
}

/// Registry with every acyclic fixture registered up front
pub fn fixture_registry() -> Arc<SchemaRegistry> {
    let registry = SchemaRegistry::new();
    registry.register::<UserEntity>().unwrap();
    registry.register::<UserDto>().unwrap();
    registry.register::<Dog>().unwrap();
    registry.register::<Cat>().unwrap();
    registry.register::<Fruit>().unwrap();
    Arc::new(registry)
}

/// Converter over [`fixture_registry`] with default coercion
pub fn setup_converter() -> JsonPatchConverter {
    JsonPatchConverter::with_registry(fixture_registry())
}

/// Converter that rejects absent model fields
pub fn setup_strict_converter() -> JsonPatchConverter {
    setup_converter().with_coercer(BsonCoercer::new(CoercionConfig::strict()))
}

/// Parse an RFC 6902 JSON array into operations
pub fn operations(patch: serde_json::Value) -> Vec<Operation> {
    serde_json::from_value(patch).unwrap()
}

/// Single-operation patch with an explicit kind name
pub fn single(op: &str, path: &str, value: Option<serde_json::Value>) -> Vec<Operation> {
    let mut operation = Operation::new(op.parse().unwrap(), path);
    operation.value = value;
    vec![operation]
}

/// One recorded update-many call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub filter: Document,
    pub update: Document,
}

/// In-memory target that records every call
#[derive(Debug, Default)]
pub struct RecordingTarget {
    calls: Mutex<Vec<RecordedUpdate>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedUpdate> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl<D> UpdateTarget<D> for RecordingTarget {
    /// Number of calls recorded so far, including this one
    type Output = usize;
    type Error = TargetError;

    async fn update_many(&self, filter: Document, update: Document) -> Result<usize, TargetError> {
        let mut calls = self.calls.lock();
        calls.push(RecordedUpdate { filter, update });
        Ok(calls.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Target whose every call fails
#[derive(Debug, Default)]
pub struct FailingTarget {
    attempts: Mutex<usize>,
}

impl FailingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl<D> UpdateTarget<D> for FailingTarget {
    type Output = ();
    type Error = TargetError;

    async fn update_many(&self, _filter: Document, _update: Document) -> Result<(), TargetError> {
        *self.attempts.lock() += 1;
        Err(TargetError::Unavailable("connection refused".to_string()))
    }
}
