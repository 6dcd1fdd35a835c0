//! Store seam
//!
//! [`UpdateTarget`] is the single I/O boundary: one update-many call per
//! applied conversion.

use crate::error::ApplyError;
use crate::result::ConversionResult;
use async_trait::async_trait;
use bson::Document;

/// Store collection that can execute an update-many request
///
/// `D` is the document model stored in the collection.
#[async_trait]
pub trait UpdateTarget<D>: Send + Sync {
    /// Store-native result of an update
    type Output: Send;
    /// Store-native failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Update every document matching `filter` with `update`
    ///
    /// # Errors
    /// Returns the store's error unchanged
    async fn update_many(&self, filter: Document, update: Document) -> Result<Self::Output, Self::Error>;
}

/// MongoDB collections as update targets
///
/// The driver rejects an update document without `$` operators, so applying
/// an empty [`ConversionResult`] without an extra update returns
/// [`ApplyError::Target`].
#[cfg(feature = "mongodb")]
#[async_trait]
impl<D> UpdateTarget<D> for mongodb::Collection<D>
where
    D: Send + Sync,
{
    type Output = mongodb::results::UpdateResult;
    type Error = mongodb::error::Error;

    async fn update_many(&self, filter: Document, update: Document) -> Result<Self::Output, Self::Error> {
        tracing::debug!("Issuing update_many on {}", self.namespace());
        mongodb::Collection::update_many(self, filter, update).await
    }
}

/// Apply conversion results from the target side
#[async_trait]
pub trait UpdateTargetExt<D>: UpdateTarget<D>
where
    D: Send + Sync + 'static,
{
    /// Apply `result` with no extra filter or update
    ///
    /// # Errors
    /// See [`ConversionResult::apply`]
    async fn update_with(&self, result: &ConversionResult<D>) -> Result<Self::Output, ApplyError<Self::Error>> {
        result.apply(self, None, None).await
    }

    /// Apply `result`, folding in caller-supplied fragments
    ///
    /// # Errors
    /// See [`ConversionResult::apply`]
    async fn update_with_extra(
        &self,
        result: &ConversionResult<D>,
        extra_filter: Option<Document>,
        extra_update: Option<Document>,
    ) -> Result<Self::Output, ApplyError<Self::Error>> {
        result.apply(self, extra_filter, extra_update).await
    }
}

impl<D, T> UpdateTargetExt<D> for T
where
    D: Send + Sync + 'static,
    T: UpdateTarget<D> + ?Sized,
{
}
