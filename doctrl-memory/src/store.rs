//! In-memory collection implementation.
//!
//! This module provides a simple but capable memory-backed collection that
//! stores documents as BSON in insertion order behind an async-safe
//! read-write lock.

use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use mea::rwlock::RwLock;

use doctrl_core::{
    backend::{
        CollectionBackend, CollectionBackendBuilder, DeleteSummary, InsertManySummary,
        InsertOneSummary, UpdateSummary,
    },
    error::{ControllerError, ControllerResult},
    index::IndexSpec,
    options::{CountOptions, FindOptions, IndexOptions, UpdateOptions},
    policy::ID_FIELD,
};

use crate::{
    evaluator::{self, Comparable},
    update,
};

#[derive(Default, Debug)]
struct CollectionState {
    /// Stored documents in insertion order.
    documents: Vec<Document>,
    /// Registered index keys by name. Names are tracked so creation and
    /// removal behave like a real collection; no lookup structures are built.
    indexes: BTreeMap<String, Document>,
}

/// Thread-safe in-memory collection backend.
///
/// This struct implements the [`CollectionBackend`] trait to provide a fully
/// functional document collection that operates entirely in memory using
/// async-aware read-write locks. Documents are held in insertion order, which
/// is also the order unsorted reads return them in.
///
/// Documents inserted without an `_id` field are assigned a fresh
/// [`ObjectId`]. Inserting a document whose `_id` is already present in the
/// collection is rejected.
///
/// # Thread Safety
///
/// `MemoryCollection` is cloneable and uses an `Arc`-wrapped internal state,
/// allowing it to be safely shared across async tasks. Multiple clones of the
/// same instance share the same underlying data.
///
/// # Performance
///
/// Every operation scans the stored documents (registered indexes carry no
/// lookup structures). For small to medium datasets (< 100k documents), this
/// is typically acceptable. For larger datasets, consider a persistent
/// backend like MongoDB.
///
/// # Example
///
/// ```ignore
/// use doctrl::memory::MemoryCollection;
/// use doctrl::backend::CollectionBackend;
/// use doctrl::options::FindOptions;
/// use bson::doc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let collection = MemoryCollection::new();
///
///     collection.insert_one(doc! { "name": "Alice", "age": 30 }).await?;
///
///     let adults = collection
///         .find(doc! { "age": { "$gte": 18 } }, FindOptions::default())
///         .await?;
///     assert_eq!(adults.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct MemoryCollection {
    state: Arc<RwLock<CollectionState>>,
}

impl MemoryCollection {
    /// Creates a new empty in-memory collection.
    ///
    /// The returned collection is ready for use and contains no documents or
    /// indexes.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CollectionState::default())),
        }
    }

    /// Creates a builder for constructing a `MemoryCollection`.
    ///
    /// Currently, the builder simply creates a default collection, but it can
    /// be extended in future versions to support configuration options.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use doctrl::memory::MemoryCollection;
    ///
    /// let collection = MemoryCollection::builder().build().await.unwrap();
    /// ```
    pub fn builder() -> MemoryCollectionBuilder {
        MemoryCollectionBuilder
    }

    /// Returns the names of all registered indexes in lexicographic order.
    pub async fn index_names(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .indexes
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CollectionBackend for MemoryCollection {
    async fn insert_one(&self, document: Document) -> ControllerResult<InsertOneSummary> {
        let mut state = self.state.write().await;
        let (document, id) = identified(document);

        if contains_id(&state.documents, &id) {
            return Err(ControllerError::DuplicateId(id.to_string()));
        }

        state.documents.push(document);

        Ok(InsertOneSummary { inserted_id: id })
    }

    async fn insert_many(&self, documents: Vec<Document>) -> ControllerResult<InsertManySummary> {
        let mut state = self.state.write().await;
        let mut prepared = Vec::with_capacity(documents.len());
        let mut summary = InsertManySummary::default();

        // Validate the whole batch before committing any of it.
        for (index, document) in documents.into_iter().enumerate() {
            let (document, id) = identified(document);

            if contains_id(&state.documents, &id) || contains_id(&prepared, &id) {
                return Err(ControllerError::DuplicateId(id.to_string()));
            }

            summary.inserted_ids.insert(index, id);
            prepared.push(document);
        }

        state.documents.append(&mut prepared);

        Ok(summary)
    }

    async fn find(&self, filter: Document, options: FindOptions) -> ControllerResult<Vec<Document>> {
        let state = self.state.read().await;
        let mut matched = evaluator::filter_documents(&state.documents, &filter)?;

        if let Some(sort) = &options.sort {
            sort_documents(&mut matched, sort);
        }

        Ok(matched
            .into_iter()
            .skip(options.skip.unwrap_or(0) as usize)
            .take(options.limit.map(|limit| limit as usize).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_documents(&self, filter: Document, options: CountOptions)
        -> ControllerResult<u64> {
        let state = self.state.read().await;
        let mut count = 0_u64;

        for document in &state.documents {
            if evaluator::matches(document, &filter)? {
                count += 1;
            }
        }

        let count = count.saturating_sub(options.skip.unwrap_or(0));

        Ok(match options.limit {
            Some(limit) => count.min(limit),
            None => count,
        })
    }

    async fn distinct(&self, field: &str, filter: Document) -> ControllerResult<Vec<Bson>> {
        let state = self.state.read().await;
        let mut values: Vec<Bson> = Vec::new();

        for document in &state.documents {
            if !evaluator::matches(document, &filter)? {
                continue;
            }

            // Array values contribute their elements, as on a real server.
            match document.get(field) {
                Some(Bson::Array(items)) => {
                    for item in items {
                        push_distinct(&mut values, item);
                    }
                }
                Some(value) => push_distinct(&mut values, value),
                None => {}
            }
        }

        Ok(values)
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary> {
        let mut state = self.state.write().await;

        match position_of(&state.documents, &filter)? {
            Some(position) => {
                let modified = update::apply_update(&mut state.documents[position], &update)?;

                Ok(UpdateSummary {
                    matched_count: 1,
                    modified_count: modified as u64,
                    upserted_id: None,
                })
            }
            None if options.upsert => {
                let id = upsert(&mut state, &filter, &update)?;

                Ok(UpdateSummary {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: Some(id),
                })
            }
            None => Ok(UpdateSummary::default()),
        }
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary> {
        let mut state = self.state.write().await;
        let mut positions = Vec::new();

        for (position, document) in state.documents.iter().enumerate() {
            if evaluator::matches(document, &filter)? {
                positions.push(position);
            }
        }

        if positions.is_empty() && options.upsert {
            let id = upsert(&mut state, &filter, &update)?;

            return Ok(UpdateSummary {
                matched_count: 0,
                modified_count: 0,
                upserted_id: Some(id),
            });
        }

        let mut summary = UpdateSummary {
            matched_count: positions.len() as u64,
            ..UpdateSummary::default()
        };

        for position in positions {
            if update::apply_update(&mut state.documents[position], &update)? {
                summary.modified_count += 1;
            }
        }

        Ok(summary)
    }

    async fn delete_one(&self, filter: Document) -> ControllerResult<DeleteSummary> {
        let mut state = self.state.write().await;

        match position_of(&state.documents, &filter)? {
            Some(position) => {
                state.documents.remove(position);

                Ok(DeleteSummary { deleted_count: 1 })
            }
            None => Ok(DeleteSummary::default()),
        }
    }

    async fn delete_many(&self, filter: Document) -> ControllerResult<DeleteSummary> {
        let mut state = self.state.write().await;

        // Evaluate up front so a malformed filter fails before any removal.
        let mut matched = Vec::with_capacity(state.documents.len());

        for document in &state.documents {
            matched.push(evaluator::matches(document, &filter)?);
        }

        let before = state.documents.len();
        let mut matched = matched.into_iter();
        state.documents.retain(|_| !matched.next().unwrap_or(false));

        Ok(DeleteSummary {
            deleted_count: (before - state.documents.len()) as u64,
        })
    }

    async fn create_index(&self, keys: Document, options: IndexOptions)
        -> ControllerResult<String> {
        let mut state = self.state.write().await;
        let name = options
            .name
            .unwrap_or_else(|| IndexSpec::from(keys.clone()).canonical_name());

        state.indexes.insert(name.clone(), keys);

        Ok(name)
    }

    async fn drop_index(&self, name: &str) -> ControllerResult<()> {
        let mut state = self.state.write().await;

        if state.indexes.remove(name).is_none() {
            return Err(ControllerError::IndexNotFound(name.to_string()));
        }

        Ok(())
    }
}

/// Builder for constructing [`MemoryCollection`] instances.
///
/// Currently a no-op builder, but it can be extended in future versions to
/// support configuration options like capacity hints.
///
/// # Example
///
/// ```ignore
/// use doctrl::memory::MemoryCollection;
/// use doctrl::backend::CollectionBackendBuilder;
///
/// #[tokio::main]
/// async fn main() {
///     let collection = MemoryCollection::builder().build().await.unwrap();
/// }
/// ```
#[derive(Default)]
pub struct MemoryCollectionBuilder;

#[async_trait]
impl CollectionBackendBuilder for MemoryCollectionBuilder {
    type Backend = MemoryCollection;

    /// Builds and returns a new [`MemoryCollection`] instance.
    ///
    /// This always succeeds and returns a freshly initialized collection.
    async fn build(self) -> ControllerResult<Self::Backend> {
        Ok(MemoryCollection::new())
    }
}

/// Returns the document with an `_id` guaranteed, along with that id.
fn identified(mut document: Document) -> (Document, Bson) {
    let id = match document.get(ID_FIELD) {
        Some(id) => id.clone(),
        None => {
            let id = Bson::ObjectId(ObjectId::new());
            document.insert(ID_FIELD, id.clone());
            id
        }
    };

    (document, id)
}

fn contains_id(documents: &[Document], id: &Bson) -> bool {
    documents.iter().any(|document| {
        document
            .get(ID_FIELD)
            .map(Comparable::from)
            .is_some_and(|existing| existing == Comparable::from(id))
    })
}

fn position_of(documents: &[Document], filter: &Document) -> ControllerResult<Option<usize>> {
    for (position, document) in documents.iter().enumerate() {
        if evaluator::matches(document, filter)? {
            return Ok(Some(position));
        }
    }

    Ok(None)
}

fn upsert(state: &mut CollectionState, filter: &Document, update: &Document)
    -> ControllerResult<Bson> {
    let (document, id) = identified(update::upsert_seed(filter, update)?);

    if contains_id(&state.documents, &id) {
        return Err(ControllerError::DuplicateId(id.to_string()));
    }

    state.documents.push(document);

    Ok(id)
}

fn push_distinct(values: &mut Vec<Bson>, value: &Bson) {
    let seen = values
        .iter()
        .any(|existing| Comparable::from(existing) == Comparable::from(value));

    if !seen {
        values.push(value.clone());
    }
}

fn sort_documents(documents: &mut [Document], sort: &Document) {
    documents.sort_by(|a, b| {
        for (field, direction) in sort {
            let left = a
                .get(field.as_str())
                .map(Comparable::from)
                .unwrap_or(Comparable::Null);
            let right = b
                .get(field.as_str())
                .map(Comparable::from)
                .unwrap_or(Comparable::Null);

            let ordering = match left.partial_cmp(&right) {
                Some(ordering) if descending(direction) => ordering.reverse(),
                Some(ordering) => ordering,
                None => continue,
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    });
}

fn descending(direction: &Bson) -> bool {
    match direction {
        Bson::Int32(value) => *value < 0,
        Bson::Int64(value) => *value < 0,
        Bson::Double(value) => *value < 0.0,
        _ => false,
    }
}
