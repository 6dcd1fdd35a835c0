//! Patch translation
//!
//! [`JsonPatchConverter`] walks patch operations against the intersected
//! path schemas of a source and destination model and produces one
//! filter/update pair or one error per operation.

use crate::coerce::{BsonCoercer, ValueCoercer};
use crate::error::OperationError;
use crate::fragment::{Filter, Update};
use crate::operation::{operations_from_patch, Operation, OperationKind};
use crate::path::{has_reserved_chars, FieldPath};
use crate::result::ConversionResult;
use patchmap_schema::{
    ConfigurationError, Describe, PathSchema, SchemaEntry, SchemaRegistry, SchemaResult, SchemaSource,
};
use std::sync::Arc;

type Translated = Result<(Option<Filter>, Update), OperationError>;

/// Translator from patch operations to store fragments
///
/// Translation is synchronous and free of I/O. One converter may serve
/// concurrent conversions; the only shared state is the schema registry.
#[derive(Debug, Clone)]
pub struct JsonPatchConverter<C = BsonCoercer> {
    registry: Arc<SchemaRegistry>,
    coercer: C,
}

impl JsonPatchConverter {
    /// Create converter with an empty registry and the default coercer
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Arc::new(SchemaRegistry::new()))
    }

    /// Create converter over a shared registry
    #[must_use]
    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            coercer: BsonCoercer::default(),
        }
    }
}

impl Default for JsonPatchConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ValueCoercer> JsonPatchConverter<C> {
    /// Replace the value coercer
    #[must_use]
    pub fn with_coercer<N: ValueCoercer>(self, coercer: N) -> JsonPatchConverter<N> {
        JsonPatchConverter {
            registry: self.registry,
            coercer,
        }
    }

    /// Schema registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Value coercer
    #[inline]
    #[must_use]
    pub fn coercer(&self) -> &C {
        &self.coercer
    }

    /// Translate `operations`, written against `Src`, into fragments for `Dst`
    ///
    /// Every operation is attempted; failures are collected in the result.
    ///
    /// # Errors
    /// Returns error if either schema is unavailable or the two schemas
    /// share no entry. No operation is inspected in that case.
    pub fn convert<Src: Describe, Dst: Describe>(
        &self,
        operations: &[Operation],
    ) -> SchemaResult<ConversionResult<Dst>> {
        let source = self.registry.schema::<Src>()?;
        let destination = self.registry.schema::<Dst>()?;
        let schema = destination.intersect(&source);
        if schema.is_empty() {
            return Err(ConfigurationError::no_common_fields(
                source.model(),
                destination.model(),
            ));
        }

        let mut result = ConversionResult::new();
        for operation in operations {
            match self.translate(&schema, operation) {
                Ok((filter, update)) => result.push(filter, update),
                Err(error) => {
                    tracing::debug!(
                        "Rejected {} at {}: {}",
                        operation.op,
                        operation.path,
                        error.message()
                    );
                    result.push_error(error);
                }
            }
        }

        tracing::debug!(
            "Converted {} operation(s) from {} to {}: {} filter(s), {} update(s), {} error(s)",
            operations.len(),
            source.model(),
            destination.model(),
            result.filters().len(),
            result.updates().len(),
            result.errors().len()
        );
        Ok(result)
    }

    /// Translate a document parsed by the `json-patch` crate
    ///
    /// # Errors
    /// See [`JsonPatchConverter::convert`]
    pub fn convert_patch<Src: Describe, Dst: Describe>(
        &self,
        patch: &json_patch::Patch,
    ) -> SchemaResult<ConversionResult<Dst>> {
        self.convert::<Src, Dst>(&operations_from_patch(patch))
    }

    fn translate(&self, schema: &PathSchema, operation: &Operation) -> Translated {
        if !operation.op.is_translatable() {
            return Err(OperationError::not_supported(operation));
        }
        if has_reserved_chars(&operation.path) {
            return Err(OperationError::path_not_valid(operation));
        }

        let entry = schema
            .find(&operation.path)
            .ok_or_else(|| OperationError::path_not_valid(operation))?;
        let path =
            FieldPath::from_pointer(&operation.path).map_err(|_| OperationError::path_not_valid(operation))?;

        match operation.op {
            OperationKind::Add => self.add(operation, entry, path),
            OperationKind::Replace => self.replace(operation, entry, path),
            OperationKind::Remove => Self::remove(operation, entry, path),
            OperationKind::Copy | OperationKind::Move | OperationKind::Test => {
                Err(OperationError::not_supported(operation))
            }
        }
    }

    /// Set at `path`; a nested target requires its parent to exist
    fn add(&self, operation: &Operation, entry: &SchemaEntry, path: FieldPath) -> Translated {
        let value = self.coerce(operation, entry, &path)?;
        let filter = path.parent().map(Filter::exists);
        Ok((filter, Update::set(path, value)))
    }

    fn replace(&self, operation: &Operation, entry: &SchemaEntry, path: FieldPath) -> Translated {
        let value = self.coerce(operation, entry, &path)?;
        Ok((Some(Filter::exists(path.clone())), Update::set(path, value)))
    }

    fn remove(operation: &Operation, entry: &SchemaEntry, path: FieldPath) -> Translated {
        if entry.is_array_element() {
            return Err(OperationError::indexed_removal(operation));
        }
        Ok((Some(Filter::exists(path.clone())), Update::unset(path)))
    }

    fn coerce(
        &self,
        operation: &Operation,
        entry: &SchemaEntry,
        path: &FieldPath,
    ) -> Result<bson::Bson, OperationError> {
        self.coercer
            .coerce(operation.value_or_null(), entry.value_type())
            .map_err(|cause| OperationError::type_error(operation, path, &cause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OperationErrorKind;
    use bson::{doc, Bson};
    use patchmap_schema::{Field, TypeDescriptor};
    use serde_json::json;

    struct Owner;
    struct Pet;
    struct Plant;

    impl Describe for Owner {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Owner", || {
                vec![
                    Field::of::<Option<String>>("Name"),
                    Field::of::<f64>("Rating"),
                    Field::of::<Option<Vec<Pet>>>("Pets"),
                ]
            })
        }
    }

    impl Describe for Pet {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Pet", || {
                vec![Field::of::<Option<String>>("Name"), Field::of::<i32>("Age")]
            })
        }
    }

    impl Describe for Plant {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Plant", || vec![Field::of::<bool>("Watered")])
        }
    }

    fn convert(operations: &[Operation]) -> ConversionResult<Owner> {
        JsonPatchConverter::new()
            .convert::<Owner, Owner>(operations)
            .unwrap()
    }

    fn only_error_kind(result: &ConversionResult<Owner>) -> OperationErrorKind {
        assert!(result.filters().is_empty());
        assert!(result.updates().is_empty());
        assert_eq!(result.errors().len(), 1);
        result.errors()[0].kind()
    }

    #[test]
    fn replace_emits_exists_and_set() {
        let result = convert(&[Operation::replace("/Rating", json!(4))]);
        assert!(!result.has_errors());
        assert_eq!(result.filters(), &[Filter::exists(FieldPath::single("Rating"))]);
        assert_eq!(
            result.updates(),
            &[Update::set(FieldPath::single("Rating"), Bson::Double(4.0))]
        );
    }

    #[test]
    fn root_add_has_no_filter() {
        let result = convert(&[Operation::add("/Name", json!("Ann"))]);
        assert!(result.filters().is_empty());
        assert_eq!(
            result.combined_update(None),
            doc! { "$set": { "Name": "Ann" } }
        );
    }

    #[test]
    fn nested_add_guards_parent() {
        let result = convert(&[Operation::add("/Pets/0/Age", json!(2))]);
        assert_eq!(
            result.combined_filter(None),
            doc! { "Pets.0": { "$exists": true } }
        );
        assert_eq!(result.combined_update(None), doc! { "$set": { "Pets.0.Age": 2 } });
    }

    #[test]
    fn add_type_error_leaves_no_filter() {
        let result = convert(&[Operation::add("/Pets/0/Age", json!("old"))]);
        assert_eq!(only_error_kind(&result), OperationErrorKind::TypeError);
        assert!(result.errors()[0]
            .message()
            .starts_with("Cannot convert value for property at Pets.0.Age"));
    }

    #[test]
    fn remove_element_not_supported() {
        let result = convert(&[Operation::remove("/Pets/1")]);
        assert_eq!(only_error_kind(&result), OperationErrorKind::NotSupported);
        assert_eq!(
            result.errors()[0].message(),
            "Remove array element by index is not supported"
        );
    }

    #[test]
    fn remove_field_emits_exists_and_unset() {
        let result = convert(&[Operation::remove("/Pets/1/Name")]);
        assert_eq!(
            result.combined_filter(None),
            doc! { "Pets.1.Name": { "$exists": true } }
        );
        assert_eq!(
            result.combined_update(None),
            doc! { "$unset": { "Pets.1.Name": 1 } }
        );
    }

    #[test]
    fn unsupported_kinds_win_over_path_checks() {
        for operation in [
            Operation::test("/Name", json!("Ann")),
            Operation::copy("/Name", "/Nope"),
            Operation::move_from("/Name", "/$bad"),
        ] {
            let result = convert(&[operation]);
            assert_eq!(only_error_kind(&result), OperationErrorKind::NotSupported);
        }
    }

    #[test]
    fn unknown_and_reserved_paths_rejected() {
        for path in ["/Nope", "/Name$", "/Pets/x", "Name"] {
            let result = convert(&[Operation::replace(path, json!("v"))]);
            assert_eq!(only_error_kind(&result), OperationErrorKind::PathNotValid, "{path}");
        }
    }

    #[test]
    fn errors_do_not_stop_processing() {
        let result = convert(&[
            Operation::replace("/Nope", json!(1)),
            Operation::replace("/Rating", json!(2)),
            Operation::test("/Rating", json!(2)),
            Operation::remove("/Name"),
        ]);
        assert_eq!(result.errors().len(), 2);
        assert_eq!(result.updates().len(), 2);
        assert_eq!(result.filters().len(), 2);
    }

    #[test]
    fn disjoint_models_fail_before_operations() {
        let converter = JsonPatchConverter::new();
        let err = converter
            .convert::<Owner, Plant>(&[Operation::test("/Name", json!(1))])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::no_common_fields("Owner", "Plant"));
    }

    #[test]
    fn string_model_rejected() {
        let converter = JsonPatchConverter::new();
        assert_eq!(
            converter.convert::<String, Owner>(&[]).unwrap_err(),
            ConfigurationError::StringRoot
        );
    }

    #[test]
    fn converts_json_patch_documents() {
        let patch: json_patch::Patch = serde_json::from_value(json!([
            { "op": "replace", "path": "/Name", "value": "Bo" }
        ]))
        .unwrap();
        let result = JsonPatchConverter::new()
            .convert_patch::<Owner, Owner>(&patch)
            .unwrap();
        assert_eq!(result.updates().len(), 1);
    }
}
