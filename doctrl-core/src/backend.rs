//! Storage backend abstraction for a single document collection.
//!
//! This module defines the traits that abstract over concrete storage
//! implementations, allowing controllers to work with various backends
//! (in-memory, MongoDB, or anything else that can honor the contract).
//!
//! # Overview
//!
//! The [`CollectionBackend`] trait provides a unified async interface over one
//! collection of BSON documents: inserts, filtered reads, counts, distinct
//! values, updates, deletes, and index administration. Implementations are
//! required to be thread-safe (`Send + Sync`) and support concurrent access.
//!
//! # Traits
//!
//! - [`CollectionBackend`]: The core trait for collection backends
//! - [`CollectionBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use doctrl::backend::CollectionBackend;
//! use bson::doc;
//!
//! // Use a concrete backend implementation
//! let collection = MyBackendImpl::new();
//!
//! // Insert a document
//! let summary = collection
//!     .insert_one(doc! { "name": "Alice", "age": 30 })
//!     .await?;
//! println!("assigned id: {}", summary.inserted_id);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use crate::{
    error::ControllerResult,
    options::{CountOptions, FindOptions, IndexOptions, UpdateOptions},
};

/// Outcome of a single-document insert.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneSummary {
    /// The identifier under which the document was stored.
    pub inserted_id: Bson,
}

/// Outcome of a batch insert.
///
/// Identifiers are keyed by the position of the corresponding document in the
/// submitted batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertManySummary {
    /// The identifier assigned to each inserted document, by batch position.
    pub inserted_ids: HashMap<usize, Bson>,
}

/// Outcome of an update operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateSummary {
    /// Number of documents the filter matched.
    pub matched_count: u64,
    /// Number of documents the update actually changed.
    pub modified_count: u64,
    /// Identifier of the document inserted through an upsert, when one happened.
    pub upserted_id: Option<Bson>,
}

/// Outcome of a delete operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeleteSummary {
    /// Number of documents removed.
    pub deleted_count: u64,
}

/// Abstract interface over one collection of BSON documents.
///
/// Implementers of this trait provide the concrete storage strategy a
/// [`Controller`](crate::controller::Controller) drives. One instance is bound
/// to exactly one collection; multi-collection stores hand out one backend per
/// collection.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from
/// multiple async tasks. The exact concurrency model is implementation-specific
/// and should be documented by the implementer.
///
/// # Error Handling
///
/// Operations return [`ControllerResult<T>`](crate::error::ControllerResult).
/// Implementers should document which error variants each operation may
/// produce; callers can rely on storage failures arriving unchanged.
#[async_trait]
pub trait CollectionBackend: Send + Sync + Debug {
    /// Inserts a single document.
    ///
    /// Backends assign an identifier when the document carries none and report
    /// the effective identifier in the summary.
    async fn insert_one(&self, document: Document) -> ControllerResult<InsertOneSummary>;

    /// Inserts a batch of documents in one logical store call.
    ///
    /// The summary maps batch positions to assigned identifiers.
    async fn insert_many(&self, documents: Vec<Document>) -> ControllerResult<InsertManySummary>;

    /// Returns the documents matching `filter`, fully materialized.
    ///
    /// Result ordering follows the store's own ordering for the given options.
    ///
    /// # Arguments
    ///
    /// * `filter` - MongoDB-style filter document
    /// * `options` - Limit, skip, and sort to apply
    async fn find(&self, filter: Document, options: FindOptions) -> ControllerResult<Vec<Document>>;

    /// Counts the documents matching `filter`, after applying the option's
    /// skip and limit to the count.
    async fn count_documents(&self, filter: Document, options: CountOptions)
    -> ControllerResult<u64>;

    /// Returns the distinct values of `field` across documents matching
    /// `filter`. Array-valued fields contribute each element.
    async fn distinct(&self, field: &str, filter: Document) -> ControllerResult<Vec<Bson>>;

    /// Applies `update` to the first document matching `filter`.
    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary>;

    /// Applies `update` to every document matching `filter`.
    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary>;

    /// Physically removes the first document matching `filter`.
    async fn delete_one(&self, filter: Document) -> ControllerResult<DeleteSummary>;

    /// Physically removes every document matching `filter`.
    async fn delete_many(&self, filter: Document) -> ControllerResult<DeleteSummary>;

    /// Creates an index over `keys` and returns the name it was stored under.
    ///
    /// `keys` is a `{ field: marker }` document where the marker is a sort
    /// direction or an index kind such as `"text"`.
    async fn create_index(&self, keys: Document, options: IndexOptions)
    -> ControllerResult<String>;

    /// Removes the index stored under `name`.
    async fn drop_index(&self, name: &str) -> ControllerResult<()>;
}

#[async_trait]
impl<B> CollectionBackend for &B
where
    B: CollectionBackend,
{
    async fn insert_one(&self, document: Document) -> ControllerResult<InsertOneSummary> {
        (*self).insert_one(document).await
    }

    async fn insert_many(&self, documents: Vec<Document>) -> ControllerResult<InsertManySummary> {
        (*self).insert_many(documents).await
    }

    async fn find(&self, filter: Document, options: FindOptions) -> ControllerResult<Vec<Document>> {
        (*self).find(filter, options).await
    }

    async fn count_documents(
        &self,
        filter: Document,
        options: CountOptions,
    ) -> ControllerResult<u64> {
        (*self).count_documents(filter, options).await
    }

    async fn distinct(&self, field: &str, filter: Document) -> ControllerResult<Vec<Bson>> {
        (*self).distinct(field, filter).await
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary> {
        (*self)
            .update_one(filter, update, options)
            .await
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary> {
        (*self)
            .update_many(filter, update, options)
            .await
    }

    async fn delete_one(&self, filter: Document) -> ControllerResult<DeleteSummary> {
        (*self).delete_one(filter).await
    }

    async fn delete_many(&self, filter: Document) -> ControllerResult<DeleteSummary> {
        (*self).delete_many(filter).await
    }

    async fn create_index(
        &self,
        keys: Document,
        options: IndexOptions,
    ) -> ControllerResult<String> {
        (*self).create_index(keys, options).await
    }

    async fn drop_index(&self, name: &str) -> ControllerResult<()> {
        (*self).drop_index(name).await
    }
}

#[async_trait]
impl<B> CollectionBackend for Arc<B>
where
    B: CollectionBackend,
{
    async fn insert_one(&self, document: Document) -> ControllerResult<InsertOneSummary> {
        (**self).insert_one(document).await
    }

    async fn insert_many(&self, documents: Vec<Document>) -> ControllerResult<InsertManySummary> {
        (**self).insert_many(documents).await
    }

    async fn find(&self, filter: Document, options: FindOptions) -> ControllerResult<Vec<Document>> {
        (**self).find(filter, options).await
    }

    async fn count_documents(
        &self,
        filter: Document,
        options: CountOptions,
    ) -> ControllerResult<u64> {
        (**self).count_documents(filter, options).await
    }

    async fn distinct(&self, field: &str, filter: Document) -> ControllerResult<Vec<Bson>> {
        (**self).distinct(field, filter).await
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary> {
        (**self)
            .update_one(filter, update, options)
            .await
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary> {
        (**self)
            .update_many(filter, update, options)
            .await
    }

    async fn delete_one(&self, filter: Document) -> ControllerResult<DeleteSummary> {
        (**self).delete_one(filter).await
    }

    async fn delete_many(&self, filter: Document) -> ControllerResult<DeleteSummary> {
        (**self).delete_many(filter).await
    }

    async fn create_index(
        &self,
        keys: Document,
        options: IndexOptions,
    ) -> ControllerResult<String> {
        (**self).create_index(keys, options).await
    }

    async fn drop_index(&self, name: &str) -> ControllerResult<()> {
        (**self).drop_index(name).await
    }
}

/// Factory trait for constructing backend instances.
#[async_trait]
pub trait CollectionBackendBuilder {
    type Backend: CollectionBackend;

    async fn build(self) -> ControllerResult<Self::Backend>;
}
