//! The controller: CRUD operations over one collection with composed
//! cross-cutting behaviors.
//!
//! A [`Controller`] binds a [`CollectionBackend`] to a pair of feature flags
//! fixed at construction. Every operation then applies the soft-delete and
//! timestamp policies from [`crate::policy`] before delegating to the
//! backend: reads merge the visibility filter under the caller's query,
//! mutations stamp timestamps, and deletes turn into marker updates when soft
//! deletion is on.
//!
//! # Example
//!
//! ```ignore
//! use doctrl::controller::Controller;
//! use bson::doc;
//!
//! let users = Controller::builder(backend)
//!     .with_timestamps(true)
//!     .with_soft_delete(true)
//!     .build();
//!
//! let alice = users.create_one(doc! { "name": "Alice" }).await?;
//! users.delete_by_id(alice.get_object_id("_id")?, Default::default()).await?;
//! # Ok::<(), doctrl::error::ControllerError>(())
//! ```

use bson::{doc, Bson, DateTime, Document};

use crate::{
    backend::{CollectionBackend, DeleteSummary, UpdateSummary},
    config::{ControllerFlags, Visibility},
    error::ControllerResult,
    index::IndexSpec,
    options::{CountOptions, FindOptions, IndexOptions, UpdateOptions},
    policy::{compose_filter, SoftDeletePolicy, TimestampPolicy, ID_FIELD},
};

/// What a delete operation actually did to the collection.
///
/// With soft deletion enabled, deletes are marker updates and report an
/// [`UpdateSummary`]; otherwise they physically remove documents and report a
/// [`DeleteSummary`]. [`affected_count`](DeleteOutcome::affected_count) gives
/// a uniform view over both.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Documents were physically removed.
    Deleted(DeleteSummary),
    /// Documents were stamped with the deletion marker instead of removed.
    SoftDeleted(UpdateSummary),
}

impl DeleteOutcome {
    /// Number of documents the operation removed or stamped.
    pub fn affected_count(&self) -> u64 {
        match self {
            DeleteOutcome::Deleted(summary) => summary.deleted_count,
            DeleteOutcome::SoftDeleted(summary) => summary.modified_count,
        }
    }
}

/// A set of CRUD operations bound to one collection and one flag
/// configuration.
///
/// The collection handle and the resolved [`ControllerFlags`] are immutable
/// after construction; all operations take `&self`, so a controller can be
/// shared freely across concurrent callers. Two controllers over the same
/// collection may disagree on flags.
///
/// # Type Parameters
///
/// * `C` - The collection backend implementation
#[derive(Debug)]
pub struct Controller<C: CollectionBackend> {
    collection: C,
    flags: ControllerFlags,
}

impl<C: CollectionBackend> Controller<C> {
    /// Creates a controller with both behaviors disabled.
    pub fn new(collection: C) -> Self {
        Self {
            collection,
            flags: ControllerFlags::default(),
        }
    }

    /// Creates a controller with an explicit flag configuration.
    pub fn with_flags(collection: C, flags: ControllerFlags) -> Self {
        Self { collection, flags }
    }

    /// Creates a new builder for constructing a controller fluently.
    pub fn builder(collection: C) -> ControllerBuilder<C> {
        ControllerBuilder::new(collection)
    }

    /// Returns the flag configuration this controller was built with.
    pub fn flags(&self) -> ControllerFlags {
        self.flags
    }

    /// Returns the underlying collection backend.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Merges the visibility filter under a caller query.
    fn scoped_filter(&self, query: Document, visibility: Visibility) -> Document {
        compose_filter(
            SoftDeletePolicy::visibility_filter(self.flags.use_soft_delete, visibility),
            query,
        )
    }

    /// Stamps `updatedAt` into an update payload when timestamping is on.
    fn touched_update(&self, update: Document) -> Document {
        if self.flags.use_timestamps {
            TimestampPolicy::touch_update(update, DateTime::now())
        } else {
            update
        }
    }

    /// Counts the documents matching `query`.
    ///
    /// Soft-deleted documents are excluded unless `visibility` includes them
    /// or the caller's query overrides the injected `deletedAt` clause.
    pub async fn count_documents(
        &self,
        query: Document,
        options: CountOptions,
        visibility: Visibility,
    ) -> ControllerResult<u64> {
        let filter = self.scoped_filter(query, visibility);
        Ok(self
            .collection
            .count_documents(filter, options)
            .await?)
    }

    /// Returns the documents matching `query`.
    ///
    /// Result ordering follows the store's own ordering for the given
    /// options.
    pub async fn find(
        &self,
        query: Document,
        options: FindOptions,
        visibility: Visibility,
    ) -> ControllerResult<Vec<Document>> {
        let filter = self.scoped_filter(query, visibility);
        Ok(self.collection.find(filter, options).await?)
    }

    /// Returns the first document matching `query`, or `None`.
    ///
    /// The limit is forced to 1 regardless of what `options` carries; no
    /// match is not an error.
    pub async fn find_one(
        &self,
        query: Document,
        options: FindOptions,
        visibility: Visibility,
    ) -> ControllerResult<Option<Document>> {
        let mut options = options;
        options.limit = Some(1);
        Ok(self
            .find(query, options, visibility)
            .await?
            .into_iter()
            .next())
    }

    /// Returns the document with the given identifier, or `None`.
    ///
    /// The store query is identifier equality only; soft deletion is
    /// enforced by discarding a fetched document that carries the deletion
    /// marker, unless `visibility` includes deleted documents.
    pub async fn find_by_id(
        &self,
        id: impl Into<Bson> + Send,
        visibility: Visibility,
    ) -> ControllerResult<Option<Document>> {
        let filter = doc! { ID_FIELD: id.into() };
        let options = FindOptions::builder().with_limit(1).build();
        let entity = self
            .collection
            .find(filter, options)
            .await?
            .into_iter()
            .next();
        Ok(entity.filter(|entity| {
            !self.flags.use_soft_delete
                || visibility.include_deleted
                || !SoftDeletePolicy::is_deleted(entity)
        }))
    }

    /// Returns the documents with the given identifiers.
    ///
    /// An empty `ids` list short-circuits to an empty result without calling
    /// the store. The limit defaults to `ids.len()`; a caller-supplied limit
    /// overrides it. Soft-deleted documents are discarded after the fetch,
    /// like [`find_by_id`](Controller::find_by_id).
    pub async fn find_by_ids<I>(
        &self,
        ids: Vec<I>,
        options: FindOptions,
        visibility: Visibility,
    ) -> ControllerResult<Vec<Document>>
    where
        I: Into<Bson> + Send,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Bson> = ids.into_iter().map(Into::into).collect();
        let mut options = options;
        if options.limit.is_none() {
            options.limit = Some(ids.len() as u64);
        }
        let items = self
            .collection
            .find(doc! { ID_FIELD: { "$in": ids } }, options)
            .await?;
        if !self.flags.use_soft_delete || visibility.include_deleted {
            return Ok(items);
        }
        Ok(items
            .into_iter()
            .filter(|item| !SoftDeletePolicy::is_deleted(item))
            .collect())
    }

    /// Returns the distinct values of `key` across documents matching
    /// `query`.
    pub async fn distinct(
        &self,
        key: &str,
        query: Document,
        visibility: Visibility,
    ) -> ControllerResult<Vec<Bson>> {
        let filter = self.scoped_filter(query, visibility);
        Ok(self.collection.distinct(key, filter).await?)
    }

    /// Inserts a document and returns it with the store-assigned identifier
    /// attached.
    ///
    /// The result is the caller's original fields plus `_id`; the
    /// store-reported identifier always wins the `_id` slot.
    pub async fn insert_one(&self, document: Document) -> ControllerResult<Document> {
        let summary = self
            .collection
            .insert_one(document.clone())
            .await?;
        let mut document = document;
        document.insert(ID_FIELD, summary.inserted_id);
        Ok(document)
    }

    /// Inserts a batch of documents in one store call and returns them with
    /// their store-assigned identifiers attached, in batch order.
    pub async fn insert_many(&self, documents: Vec<Document>) -> ControllerResult<Vec<Document>> {
        let summary = self
            .collection
            .insert_many(documents.clone())
            .await?;
        let mut result = Vec::with_capacity(documents.len());
        for (index, document) in documents.into_iter().enumerate() {
            if let Some(id) = summary.inserted_ids.get(&index) {
                let mut document = document;
                document.insert(ID_FIELD, id.clone());
                result.push(document);
            }
        }
        Ok(result)
    }

    /// Inserts a document with creation timestamps applied.
    ///
    /// With timestamping enabled, `createdAt` and `updatedAt` default to the
    /// moment of the call; caller-supplied values are preserved unchanged.
    /// With timestamping disabled this is a plain insert.
    pub async fn create_one(&self, data: Document) -> ControllerResult<Document> {
        let document = if self.flags.use_timestamps {
            TimestampPolicy::creation_defaults(data, DateTime::now())
        } else {
            data
        };
        self.insert_one(document).await
    }

    /// Inserts a batch of documents with creation timestamps applied.
    ///
    /// The whole batch shares one timestamp.
    pub async fn create_many(&self, data: Vec<Document>) -> ControllerResult<Vec<Document>> {
        let documents = if self.flags.use_timestamps {
            let now = DateTime::now();
            data.into_iter()
                .map(|item| TimestampPolicy::creation_defaults(item, now))
                .collect()
        } else {
            data
        };
        self.insert_many(documents).await
    }

    /// Applies `update` to the first document matching `query`.
    ///
    /// The visibility filter is merged under the query, and `updatedAt` is
    /// stamped into the payload when timestamping is enabled.
    pub async fn update_one(
        &self,
        query: Document,
        update: Document,
        options: UpdateOptions,
        visibility: Visibility,
    ) -> ControllerResult<UpdateSummary> {
        let filter = self.scoped_filter(query, visibility);
        let update = self.touched_update(update);
        Ok(self
            .collection
            .update_one(filter, update, options)
            .await?)
    }

    /// Applies `update` to every document matching `query`.
    pub async fn update_many(
        &self,
        query: Document,
        update: Document,
        options: UpdateOptions,
        visibility: Visibility,
    ) -> ControllerResult<UpdateSummary> {
        let filter = self.scoped_filter(query, visibility);
        let update = self.touched_update(update);
        Ok(self
            .collection
            .update_many(filter, update, options)
            .await?)
    }

    /// Applies `update` to the document with the given identifier.
    ///
    /// Equivalent to [`update_one`](Controller::update_one) with an
    /// identifier-equality query.
    pub async fn update_by_id(
        &self,
        id: impl Into<Bson> + Send,
        update: Document,
        options: UpdateOptions,
        visibility: Visibility,
    ) -> ControllerResult<UpdateSummary> {
        self.update_one(doc! { ID_FIELD: id.into() }, update, options, visibility)
            .await
    }

    /// Deletes the first document matching `filter`.
    ///
    /// With soft deletion enabled this stamps the deletion marker through an
    /// update; `visibility` decides whether already-deleted documents are
    /// eligible targets. Without soft deletion the filter is passed to the
    /// store untouched and the document is physically removed.
    pub async fn delete_one(
        &self,
        filter: Document,
        visibility: Visibility,
    ) -> ControllerResult<DeleteOutcome> {
        if self.flags.use_soft_delete {
            let scoped = self.scoped_filter(filter, visibility);
            let summary = self
                .collection
                .update_one(
                    scoped,
                    SoftDeletePolicy::mark_deleted(DateTime::now()),
                    UpdateOptions::default(),
                )
                .await?;
            return Ok(DeleteOutcome::SoftDeleted(summary));
        }
        Ok(DeleteOutcome::Deleted(self.collection.delete_one(filter).await?))
    }

    /// Deletes every document matching `filter`.
    pub async fn delete_many(
        &self,
        filter: Document,
        visibility: Visibility,
    ) -> ControllerResult<DeleteOutcome> {
        if self.flags.use_soft_delete {
            let scoped = self.scoped_filter(filter, visibility);
            let summary = self
                .collection
                .update_many(
                    scoped,
                    SoftDeletePolicy::mark_deleted(DateTime::now()),
                    UpdateOptions::default(),
                )
                .await?;
            return Ok(DeleteOutcome::SoftDeleted(summary));
        }
        Ok(DeleteOutcome::Deleted(self.collection.delete_many(filter).await?))
    }

    /// Deletes the document with the given identifier.
    pub async fn delete_by_id(
        &self,
        id: impl Into<Bson> + Send,
        visibility: Visibility,
    ) -> ControllerResult<DeleteOutcome> {
        self.delete_one(doc! { ID_FIELD: id.into() }, visibility)
            .await
    }

    /// Deletes the documents with the given identifiers.
    ///
    /// Unlike lookups, an empty `ids` list still reaches the store as a
    /// membership filter matching nothing.
    pub async fn delete_by_ids<I>(
        &self,
        ids: Vec<I>,
        visibility: Visibility,
    ) -> ControllerResult<DeleteOutcome>
    where
        I: Into<Bson> + Send,
    {
        let ids: Vec<Bson> = ids.into_iter().map(Into::into).collect();
        self.delete_many(doc! { ID_FIELD: { "$in": ids } }, visibility)
            .await
    }

    /// Creates an index and returns the name it was stored under.
    ///
    /// An explicit `options.name` wins; otherwise the canonical name of the
    /// specification is used, so equivalent key documents always address the
    /// same index.
    pub async fn create_index(
        &self,
        spec: impl Into<IndexSpec> + Send,
        options: IndexOptions,
    ) -> ControllerResult<String> {
        let spec = spec.into();
        let mut options = options;
        if options.name.is_none() {
            options.name = Some(spec.canonical_name());
        }
        Ok(self
            .collection
            .create_index(spec.keys(), options)
            .await?)
    }

    /// Drops the index addressed by `spec`.
    ///
    /// A field name is treated as a literal index name; a key document is
    /// canonicalized, so create and drop addressing agree.
    pub async fn drop_index(&self, spec: impl Into<IndexSpec> + Send) -> ControllerResult<()> {
        let spec = spec.into();
        Ok(self
            .collection
            .drop_index(&spec.canonical_name())
            .await?)
    }
}

/// Builder for constructing [`Controller`] instances with a fluent API.
pub struct ControllerBuilder<C: CollectionBackend> {
    collection: C,
    flags: ControllerFlags,
}

impl<C: CollectionBackend> ControllerBuilder<C> {
    /// Creates a new builder around a collection backend, with both
    /// behaviors disabled.
    pub fn new(collection: C) -> Self {
        Self {
            collection,
            flags: ControllerFlags::default(),
        }
    }

    /// Enables or disables automatic timestamping.
    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.flags.use_timestamps = use_timestamps;
        self
    }

    /// Enables or disables soft deletion.
    pub fn with_soft_delete(mut self, use_soft_delete: bool) -> Self {
        self.flags.use_soft_delete = use_soft_delete;
        self
    }

    /// Builds and returns the final [`Controller`] instance.
    pub fn build(self) -> Controller<C> {
        Controller {
            collection: self.collection,
            flags: self.flags,
        }
    }
}
