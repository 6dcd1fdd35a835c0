//! Conversion results
//!
//! A [`ConversionResult`] accumulates the fragments and errors of one
//! conversion. It keeps the fragments of successful operations even when
//! others failed, but refuses to be applied while any error is present.

use crate::error::{ApplyError, OperationError};
use crate::fragment::{Filter, Update};
use crate::target::UpdateTarget;
use bson::Document;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

/// Filters, updates and errors of one conversion, typed by destination model
pub struct ConversionResult<D> {
    filters: Vec<Filter>,
    updates: Vec<Update>,
    errors: Vec<OperationError>,
    _model: PhantomData<fn() -> D>,
}

impl<D> ConversionResult<D> {
    /// Create empty result
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            updates: Vec::new(),
            errors: Vec::new(),
            _model: PhantomData,
        }
    }

    pub(crate) fn push(&mut self, filter: Option<Filter>, update: Update) {
        if let Some(filter) = filter {
            self.filters.push(filter);
        }
        self.updates.push(update);
    }

    pub(crate) fn push_error(&mut self, error: OperationError) {
        self.errors.push(error);
    }

    /// Filters in operation order
    #[inline]
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Updates in operation order
    #[inline]
    #[must_use]
    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    /// Operation errors in operation order
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[OperationError] {
        &self.errors
    }

    /// Whether any operation failed
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether the result carries no fragments and no errors
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.updates.is_empty() && self.errors.is_empty()
    }

    /// Split into filters, updates and errors
    #[must_use]
    pub fn into_parts(self) -> (Vec<Filter>, Vec<Update>, Vec<OperationError>) {
        (self.filters, self.updates, self.errors)
    }

    /// Conjunction of all filters and `extra`, rendered
    #[must_use]
    pub fn combined_filter(&self, extra: Option<Document>) -> Document {
        Filter::and_all(self.filters.iter().cloned().chain(extra.map(Filter::Raw))).to_document()
    }

    /// All updates and `extra` merged into one update document
    #[must_use]
    pub fn combined_update(&self, extra: Option<Document>) -> Document {
        Update::combine(self.updates.iter().cloned().chain(extra.map(Update::Raw))).to_document()
    }

    /// Execute the conversion as one update-many call on `target`
    ///
    /// An empty result with no `extra_update` still issues the call with an
    /// empty update document. Stores that require update operators, such as
    /// MongoDB, fail that call; check [`ConversionResult::is_empty`] first or
    /// pass an `extra_update`.
    ///
    /// # Errors
    /// Returns [`ApplyError::Rejected`] without touching the store if any
    /// operation failed, or [`ApplyError::Target`] with the store's error
    pub async fn apply<T>(
        &self,
        target: &T,
        extra_filter: Option<Document>,
        extra_update: Option<Document>,
    ) -> Result<T::Output, ApplyError<T::Error>>
    where
        T: UpdateTarget<D> + ?Sized,
    {
        if self.has_errors() {
            tracing::warn!(
                "Refusing to apply conversion with {} operation error(s)",
                self.errors.len()
            );
            return Err(ApplyError::Rejected {
                count: self.errors.len(),
            });
        }

        let filter = self.combined_filter(extra_filter);
        let update = self.combined_update(extra_update);
        tracing::info!(
            "Applying {} filter(s) and {} update(s)",
            self.filters.len(),
            self.updates.len()
        );

        target
            .update_many(filter, update)
            .await
            .map_err(ApplyError::Target)
    }
}

impl<D> Default for ConversionResult<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for ConversionResult<D> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            updates: self.updates.clone(),
            errors: self.errors.clone(),
            _model: PhantomData,
        }
    }
}

impl<D> Debug for ConversionResult<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionResult")
            .field("filters", &self.filters)
            .field("updates", &self.updates)
            .field("errors", &self.errors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use crate::path::FieldPath;
    use bson::doc;
    use serde_json::json;

    struct Model;

    fn path(segment: &str) -> FieldPath {
        FieldPath::single(segment)
    }

    #[test]
    fn new_result_is_empty() {
        let result = ConversionResult::<Model>::new();
        assert!(result.is_empty());
        assert!(!result.has_errors());
        assert_eq!(result.combined_filter(None), doc! {});
        assert_eq!(result.combined_update(None), doc! {});
    }

    #[test]
    fn push_without_filter_adds_update_only() {
        let mut result = ConversionResult::<Model>::new();
        result.push(None, Update::set(path("Name"), "Rex"));
        assert!(result.filters().is_empty());
        assert_eq!(result.updates().len(), 1);
    }

    #[test]
    fn errors_keep_partial_fragments() {
        let mut result = ConversionResult::<Model>::new();
        result.push(Some(Filter::exists(path("Name"))), Update::unset(path("Name")));
        result.push_error(OperationError::not_supported(&Operation::test("/Name", json!(1))));
        assert!(result.has_errors());
        let (filters, updates, errors) = result.into_parts();
        assert_eq!((filters.len(), updates.len(), errors.len()), (1, 1, 1));
    }

    #[test]
    fn combined_fragments_fold_extras() {
        let mut result = ConversionResult::<Model>::new();
        result.push(Some(Filter::exists(path("Age"))), Update::set(path("Age"), 4));
        assert_eq!(
            result.combined_filter(Some(doc! { "_id": 7 })),
            doc! { "$and": [ { "Age": { "$exists": true } }, { "_id": 7 } ] }
        );
        assert_eq!(
            result.combined_update(Some(doc! { "$set": { "Touched": true } })),
            doc! { "$set": { "Age": 4, "Touched": true } }
        );
    }

    #[test]
    fn single_filter_renders_without_and() {
        let mut result = ConversionResult::<Model>::new();
        result.push(Some(Filter::exists(path("Age"))), Update::set(path("Age"), 4));
        assert_eq!(result.combined_filter(None), doc! { "Age": { "$exists": true } });
    }
}
