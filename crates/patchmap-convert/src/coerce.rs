//! Value coercion
//!
//! Converts raw patch values into BSON values of a field's declared type.

use crate::config::{CoercionConfig, MissingFieldPolicy, UnknownFieldPolicy};
use crate::error::CoercionError;
use bson::spec::BinarySubtype;
use bson::{Binary, Bson, Document};
use patchmap_schema::{ModelRef, TypeDescriptor};
use serde_json::{Map, Number, Value};

/// Converts raw patch values to typed store values
pub trait ValueCoercer: Send + Sync {
    /// Coerce `value` to `ty`
    ///
    /// # Errors
    /// Returns error if `value` cannot represent `ty`
    fn coerce(&self, value: &Value, ty: &TypeDescriptor) -> Result<Bson, CoercionError>;
}

/// Coercer producing BSON values, driven by [`CoercionConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BsonCoercer {
    config: CoercionConfig,
}

impl BsonCoercer {
    /// Create coercer with `config`
    #[inline]
    #[must_use]
    pub fn new(config: CoercionConfig) -> Self {
        Self { config }
    }

    /// Coercer configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CoercionConfig {
        &self.config
    }

    fn coerce_value(&self, value: &Value, ty: &TypeDescriptor) -> Result<Bson, CoercionError> {
        match (ty, value) {
            (TypeDescriptor::Optional(_) | TypeDescriptor::Document, Value::Null) => Ok(Bson::Null),
            (TypeDescriptor::Optional(inner), value) => self.coerce_value(value, inner),
            (TypeDescriptor::Bool, Value::Bool(b)) => Ok(Bson::Boolean(*b)),
            (TypeDescriptor::Int32, Value::Number(n)) => {
                let i = integer(n, ty)?;
                i32::try_from(i)
                    .map(Bson::Int32)
                    .map_err(|_| out_of_range(n, ty))
            }
            (TypeDescriptor::Int64, Value::Number(n)) => integer(n, ty).map(Bson::Int64),
            (TypeDescriptor::Double, Value::Number(n)) => n
                .as_f64()
                .map(Bson::Double)
                .ok_or_else(|| out_of_range(n, ty)),
            (TypeDescriptor::String, Value::String(s)) => Ok(Bson::String(s.clone())),
            (TypeDescriptor::Uuid, Value::String(s)) => uuid::Uuid::parse_str(s)
                .map(uuid_bson)
                .map_err(|e| CoercionError::new(format!("invalid UUID '{s}': {e}"))),
            (TypeDescriptor::DateTime, Value::String(s)) => chrono::DateTime::parse_from_rfc3339(s)
                .map(|dt| Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())))
                .map_err(|e| CoercionError::new(format!("invalid RFC 3339 timestamp '{s}': {e}"))),
            (TypeDescriptor::Document, value) => {
                bson::to_bson(value).map_err(|e| CoercionError::new(e.to_string()))
            }
            (TypeDescriptor::Array(element), Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    self.coerce_value(item, element)
                        .map_err(|e| e.within(index))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Bson::Array),
            (TypeDescriptor::Model(model), Value::Object(map)) => {
                self.coerce_model(model, map).map(Bson::Document)
            }
            (ty, value) => Err(mismatch(ty, value)),
        }
    }

    fn coerce_model(&self, model: &ModelRef, map: &Map<String, Value>) -> Result<Document, CoercionError> {
        let fields = model.fields();

        if self.config.unknown_fields == UnknownFieldPolicy::Reject {
            if let Some(key) = map
                .keys()
                .find(|key| !fields.iter().any(|field| field.name() == key.as_str()))
            {
                return Err(CoercionError::new(format!(
                    "unknown field '{key}' for {}",
                    model.name()
                )));
            }
        }

        let mut doc = Document::new();
        for field in &fields {
            let value = match map.get(field.name()) {
                Some(value) => self
                    .coerce_value(value, field.ty())
                    .map_err(|e| e.within(field.name()))?,
                None if matches!(field.ty(), TypeDescriptor::Optional(_)) => Bson::Null,
                None if self.config.missing_fields == MissingFieldPolicy::Default => {
                    default_value(field.ty())
                }
                None => {
                    return Err(CoercionError::new(format!(
                        "missing field '{}' for {}",
                        field.name(),
                        model.name()
                    )))
                }
            };
            doc.insert(field.name(), value);
        }
        Ok(doc)
    }
}

impl ValueCoercer for BsonCoercer {
    fn coerce(&self, value: &Value, ty: &TypeDescriptor) -> Result<Bson, CoercionError> {
        self.coerce_value(value, ty)
    }
}

/// Default store value of `ty`
#[must_use]
pub fn default_value(ty: &TypeDescriptor) -> Bson {
    match ty {
        TypeDescriptor::Bool => Bson::Boolean(false),
        TypeDescriptor::Int32 => Bson::Int32(0),
        TypeDescriptor::Int64 => Bson::Int64(0),
        TypeDescriptor::Double => Bson::Double(0.0),
        TypeDescriptor::String => Bson::String(String::new()),
        TypeDescriptor::Uuid => uuid_bson(uuid::Uuid::nil()),
        TypeDescriptor::DateTime => Bson::DateTime(bson::DateTime::from_millis(0)),
        TypeDescriptor::Document | TypeDescriptor::Optional(_) => Bson::Null,
        TypeDescriptor::Array(_) => Bson::Array(Vec::new()),
        TypeDescriptor::Model(model) => {
            let mut doc = Document::new();
            for field in model.fields() {
                doc.insert(field.name(), default_value(field.ty()));
            }
            Bson::Document(doc)
        }
    }
}

fn uuid_bson(uuid: uuid::Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Uuid,
        bytes: uuid.as_bytes().to_vec(),
    })
}

fn integer(n: &Number, ty: &TypeDescriptor) -> Result<i64, CoercionError> {
    if let Some(i) = n.as_i64() {
        Ok(i)
    } else if n.is_u64() {
        Err(out_of_range(n, ty))
    } else {
        Err(CoercionError::new(format!("expected {ty}, found fractional number {n}")))
    }
}

fn out_of_range(n: &Number, ty: &TypeDescriptor) -> CoercionError {
    CoercionError::new(format!("{n} is out of range for {ty}"))
}

fn mismatch(ty: &TypeDescriptor, value: &Value) -> CoercionError {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    CoercionError::new(format!("expected {ty}, found {found}"))
}
