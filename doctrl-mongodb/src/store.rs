use async_trait::async_trait;
use bson::{Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, IndexModel,
    options::{
        ClientOptions, CountOptions as MongoCountOptions, FindOptions as MongoFindOptions,
        IndexOptions as MongoIndexOptions,
    },
};

use doctrl_core::{
    backend::{
        CollectionBackend, CollectionBackendBuilder, DeleteSummary, InsertManySummary,
        InsertOneSummary, UpdateSummary,
    },
    error::{ControllerError, ControllerResult},
    options::{CountOptions, FindOptions, IndexOptions, UpdateOptions},
};

/// A [`CollectionBackend`] over one collection of a MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoCollection {
    collection: Collection<Document>,
}

impl MongoCollection {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    pub fn builder(dsn: &str, database: &str, collection: &str) -> MongoCollectionBuilder {
        MongoCollectionBuilder::new(dsn, database, collection)
    }
}

fn find_options(options: FindOptions) -> MongoFindOptions {
    let mut mapped = MongoFindOptions::default();

    if let Some(limit) = options.limit {
        mapped.limit = Some(limit as i64);
    }
    if let Some(skip) = options.skip {
        mapped.skip = Some(skip);
    }
    if let Some(sort) = options.sort {
        mapped.sort = Some(sort);
    }

    mapped
}

fn count_options(options: CountOptions) -> MongoCountOptions {
    let mut mapped = MongoCountOptions::default();

    if let Some(limit) = options.limit {
        mapped.limit = Some(limit);
    }
    if let Some(skip) = options.skip {
        mapped.skip = Some(skip);
    }

    mapped
}

#[async_trait]
impl CollectionBackend for MongoCollection {
    async fn insert_one(&self, document: Document) -> ControllerResult<InsertOneSummary> {
        let result = self
            .collection
            .insert_one(document)
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?;

        Ok(InsertOneSummary {
            inserted_id: result.inserted_id,
        })
    }

    async fn insert_many(&self, documents: Vec<Document>) -> ControllerResult<InsertManySummary> {
        let result = self
            .collection
            .insert_many(documents)
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?;

        Ok(InsertManySummary {
            inserted_ids: result.inserted_ids,
        })
    }

    async fn find(&self, filter: Document, options: FindOptions) -> ControllerResult<Vec<Document>> {
        Ok(self
            .collection
            .find(filter)
            .with_options(find_options(options))
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?)
    }

    async fn count_documents(&self, filter: Document, options: CountOptions)
        -> ControllerResult<u64> {
        Ok(self
            .collection
            .count_documents(filter)
            .with_options(count_options(options))
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?)
    }

    async fn distinct(&self, field: &str, filter: Document) -> ControllerResult<Vec<Bson>> {
        Ok(self
            .collection
            .distinct(field, filter)
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?)
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary> {
        let result = self
            .collection
            .update_one(filter, update)
            .upsert(options.upsert)
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?;

        Ok(UpdateSummary {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ControllerResult<UpdateSummary> {
        let result = self
            .collection
            .update_many(filter, update)
            .upsert(options.upsert)
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?;

        Ok(UpdateSummary {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(&self, filter: Document) -> ControllerResult<DeleteSummary> {
        let result = self
            .collection
            .delete_one(filter)
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?;

        Ok(DeleteSummary {
            deleted_count: result.deleted_count,
        })
    }

    async fn delete_many(&self, filter: Document) -> ControllerResult<DeleteSummary> {
        let result = self
            .collection
            .delete_many(filter)
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?;

        Ok(DeleteSummary {
            deleted_count: result.deleted_count,
        })
    }

    async fn create_index(&self, keys: Document, options: IndexOptions)
        -> ControllerResult<String> {
        let result = self
            .collection
            .create_index(
                IndexModel::builder()
                    .keys(keys)
                    .options(
                        MongoIndexOptions::builder()
                            .name(options.name)
                            .unique(options.unique)
                            .build(),
                    )
                    .build(),
            )
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?;

        Ok(result.index_name)
    }

    async fn drop_index(&self, name: &str) -> ControllerResult<()> {
        self.collection
            .drop_index(name)
            .await
            .map_err(|e| ControllerError::Backend(e.to_string()))?;

        Ok(())
    }
}

/// Builder connecting to a deployment and binding one collection.
pub struct MongoCollectionBuilder {
    dsn: String,
    database: String,
    collection: String,
}

impl MongoCollectionBuilder {
    pub fn new(dsn: &str, database: &str, collection: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
        }
    }
}

#[async_trait]
impl CollectionBackendBuilder for MongoCollectionBuilder {
    type Backend = MongoCollection;

    async fn build(self) -> ControllerResult<Self::Backend> {
        Ok(MongoCollection::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| ControllerError::Initialization(e.to_string()))?,
            )
            .map_err(|e| ControllerError::Initialization(e.to_string()))?
            .database(&self.database)
            .collection(&self.collection),
        ))
    }
}
