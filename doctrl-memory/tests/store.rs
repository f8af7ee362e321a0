use bson::{Bson, doc};

use doctrl_core::{
    backend::CollectionBackend,
    error::ControllerError,
    options::{CountOptions, FindOptions, FindOptionsBuilder, IndexOptions, UpdateOptions},
};
use doctrl_memory::MemoryCollection;

async fn all_documents(collection: &MemoryCollection) -> Vec<bson::Document> {
    collection
        .find(doc! {}, FindOptions::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn insert_one_assigns_an_object_id() {
    let collection = MemoryCollection::new();

    let summary = collection.insert_one(doc! { "name": "a" }).await.unwrap();

    assert!(matches!(summary.inserted_id, Bson::ObjectId(_)));

    let stored = all_documents(&collection).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get("_id"), Some(&summary.inserted_id));
}

#[tokio::test]
async fn insert_one_keeps_caller_supplied_ids() {
    let collection = MemoryCollection::new();

    let summary = collection
        .insert_one(doc! { "_id": "user-1", "name": "a" })
        .await
        .unwrap();

    assert_eq!(summary.inserted_id, Bson::String("user-1".to_string()));
}

#[tokio::test]
async fn insert_one_rejects_duplicate_ids() {
    let collection = MemoryCollection::new();

    collection
        .insert_one(doc! { "_id": 1, "name": "a" })
        .await
        .unwrap();

    let error = collection
        .insert_one(doc! { "_id": 1, "name": "b" })
        .await
        .unwrap_err();

    assert!(matches!(error, ControllerError::DuplicateId(_)));
    assert_eq!(all_documents(&collection).await.len(), 1);
}

#[tokio::test]
async fn insert_many_assigns_ids_by_position() {
    let collection = MemoryCollection::new();

    let summary = collection
        .insert_many(vec![doc! { "n": 0 }, doc! { "n": 1 }, doc! { "n": 2 }])
        .await
        .unwrap();

    assert_eq!(summary.inserted_ids.len(), 3);

    let stored = all_documents(&collection).await;
    for (position, document) in stored.iter().enumerate() {
        assert_eq!(document.get("n"), Some(&Bson::Int32(position as i32)));
        assert_eq!(document.get("_id"), summary.inserted_ids.get(&position));
    }
}

#[tokio::test]
async fn insert_many_commits_nothing_on_duplicates() {
    let collection = MemoryCollection::new();

    collection.insert_one(doc! { "_id": 1 }).await.unwrap();

    let error = collection
        .insert_many(vec![doc! { "_id": 2 }, doc! { "_id": 1 }])
        .await
        .unwrap_err();

    assert!(matches!(error, ControllerError::DuplicateId(_)));
    assert_eq!(all_documents(&collection).await.len(), 1);

    let error = collection
        .insert_many(vec![doc! { "_id": 3 }, doc! { "_id": 3 }])
        .await
        .unwrap_err();

    assert!(matches!(error, ControllerError::DuplicateId(_)));
    assert_eq!(all_documents(&collection).await.len(), 1);
}

#[tokio::test]
async fn find_applies_sort_skip_and_limit() {
    let collection = MemoryCollection::new();

    collection
        .insert_many(vec![
            doc! { "_id": "a", "age": 30 },
            doc! { "_id": "b", "age": 10 },
            doc! { "_id": "c", "age": 20 },
        ])
        .await
        .unwrap();

    let options = FindOptionsBuilder::new()
        .with_sort(doc! { "age": 1 })
        .build();
    let ascending = collection.find(doc! {}, options).await.unwrap();
    let ages: Vec<_> = ascending
        .iter()
        .map(|document| document.get_i32("age").unwrap())
        .collect();
    assert_eq!(ages, vec![10, 20, 30]);

    let options = FindOptionsBuilder::new()
        .with_sort(doc! { "age": -1 })
        .with_skip(1)
        .with_limit(1)
        .build();
    let window = collection.find(doc! {}, options).await.unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].get_i32("age").unwrap(), 20);
}

#[tokio::test]
async fn find_sorts_by_multiple_keys() {
    let collection = MemoryCollection::new();

    collection
        .insert_many(vec![
            doc! { "_id": 1, "role": "admin", "age": 1 },
            doc! { "_id": 2, "role": "user", "age": 1 },
            doc! { "_id": 3, "role": "admin", "age": 2 },
        ])
        .await
        .unwrap();

    let options = FindOptionsBuilder::new()
        .with_sort(doc! { "role": 1, "age": -1 })
        .build();
    let sorted = collection.find(doc! {}, options).await.unwrap();
    let ids: Vec<_> = sorted
        .iter()
        .map(|document| document.get_i32("_id").unwrap())
        .collect();

    assert_eq!(ids, vec![3, 1, 2]);
}

#[tokio::test]
async fn unsorted_reads_preserve_insertion_order() {
    let collection = MemoryCollection::new();

    collection
        .insert_many(vec![doc! { "_id": "z" }, doc! { "_id": "a" }, doc! { "_id": "m" }])
        .await
        .unwrap();

    let stored = all_documents(&collection).await;
    let ids: Vec<_> = stored
        .iter()
        .map(|document| document.get_str("_id").unwrap())
        .collect();

    assert_eq!(ids, vec!["z", "a", "m"]);
}

#[tokio::test]
async fn count_applies_skip_and_limit_arithmetic() {
    let collection = MemoryCollection::new();

    for n in 0..5 {
        collection.insert_one(doc! { "n": n }).await.unwrap();
    }

    let total = collection
        .count_documents(doc! {}, CountOptions::default())
        .await
        .unwrap();
    assert_eq!(total, 5);

    let skipped = collection
        .count_documents(
            doc! {},
            CountOptions {
                skip: Some(2),
                ..CountOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(skipped, 3);

    let window = collection
        .count_documents(
            doc! { "n": { "$gte": 1 } },
            CountOptions {
                skip: Some(1),
                limit: Some(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(window, 2);

    let over_skipped = collection
        .count_documents(
            doc! {},
            CountOptions {
                skip: Some(10),
                ..CountOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(over_skipped, 0);
}

#[tokio::test]
async fn distinct_deduplicates_and_flattens_arrays() {
    let collection = MemoryCollection::new();

    collection
        .insert_many(vec![
            doc! { "tags": ["a", "b"] },
            doc! { "tags": ["b", "c"] },
            doc! { "tags": "d" },
            doc! { "name": "untagged" },
        ])
        .await
        .unwrap();

    let values = collection.distinct("tags", doc! {}).await.unwrap();

    assert_eq!(
        values,
        vec![
            Bson::String("a".to_string()),
            Bson::String("b".to_string()),
            Bson::String("c".to_string()),
            Bson::String("d".to_string()),
        ]
    );
}

#[tokio::test]
async fn update_one_updates_the_first_match_only() {
    let collection = MemoryCollection::new();

    collection
        .insert_many(vec![
            doc! { "_id": 1, "role": "user" },
            doc! { "_id": 2, "role": "user" },
        ])
        .await
        .unwrap();

    let summary = collection
        .update_one(
            doc! { "role": "user" },
            doc! { "$set": { "role": "admin" } },
            UpdateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(summary.matched_count, 1);
    assert_eq!(summary.modified_count, 1);
    assert_eq!(summary.upserted_id, None);

    let stored = all_documents(&collection).await;
    assert_eq!(stored[0].get_str("role").unwrap(), "admin");
    assert_eq!(stored[1].get_str("role").unwrap(), "user");
}

#[tokio::test]
async fn update_one_reports_unmodified_matches() {
    let collection = MemoryCollection::new();

    collection
        .insert_one(doc! { "_id": 1, "role": "user" })
        .await
        .unwrap();

    let summary = collection
        .update_one(
            doc! { "_id": 1 },
            doc! { "$set": { "role": "user" } },
            UpdateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(summary.matched_count, 1);
    assert_eq!(summary.modified_count, 0);
}

#[tokio::test]
async fn update_many_updates_every_match() {
    let collection = MemoryCollection::new();

    collection
        .insert_many(vec![
            doc! { "_id": 1, "role": "user" },
            doc! { "_id": 2, "role": "admin" },
            doc! { "_id": 3, "role": "user" },
        ])
        .await
        .unwrap();

    let summary = collection
        .update_many(
            doc! { "role": "user" },
            doc! { "$inc": { "logins": 1 } },
            UpdateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(summary.matched_count, 2);
    assert_eq!(summary.modified_count, 2);

    let stored = all_documents(&collection).await;
    assert_eq!(stored[0].get_i32("logins").unwrap(), 1);
    assert!(stored[1].get("logins").is_none());
    assert_eq!(stored[2].get_i32("logins").unwrap(), 1);
}

#[tokio::test]
async fn update_one_upserts_when_nothing_matches() {
    let collection = MemoryCollection::new();

    let summary = collection
        .update_one(
            doc! { "name": "ghost" },
            doc! { "$set": { "age": 1 } },
            UpdateOptions::upsert(),
        )
        .await
        .unwrap();

    assert_eq!(summary.matched_count, 0);
    assert_eq!(summary.modified_count, 0);
    assert!(summary.upserted_id.is_some());

    let stored = all_documents(&collection).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get_str("name").unwrap(), "ghost");
    assert_eq!(stored[0].get_i32("age").unwrap(), 1);
    assert_eq!(stored[0].get("_id"), summary.upserted_id.as_ref());
}

#[tokio::test]
async fn updates_without_upsert_do_not_insert() {
    let collection = MemoryCollection::new();

    let summary = collection
        .update_one(
            doc! { "name": "ghost" },
            doc! { "$set": { "age": 1 } },
            UpdateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(summary.matched_count, 0);
    assert_eq!(summary.upserted_id, None);
    assert!(all_documents(&collection).await.is_empty());
}

#[tokio::test]
async fn delete_one_removes_the_first_match_only() {
    let collection = MemoryCollection::new();

    collection
        .insert_many(vec![
            doc! { "_id": 1, "role": "user" },
            doc! { "_id": 2, "role": "user" },
        ])
        .await
        .unwrap();

    let summary = collection.delete_one(doc! { "role": "user" }).await.unwrap();

    assert_eq!(summary.deleted_count, 1);

    let stored = all_documents(&collection).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get_i32("_id").unwrap(), 2);
}

#[tokio::test]
async fn delete_many_removes_every_match() {
    let collection = MemoryCollection::new();

    collection
        .insert_many(vec![
            doc! { "_id": 1, "role": "user" },
            doc! { "_id": 2, "role": "admin" },
            doc! { "_id": 3, "role": "user" },
        ])
        .await
        .unwrap();

    let summary = collection
        .delete_many(doc! { "role": "user" })
        .await
        .unwrap();

    assert_eq!(summary.deleted_count, 2);

    let stored = all_documents(&collection).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get_i32("_id").unwrap(), 2);
}

#[tokio::test]
async fn create_index_registers_the_resolved_name() {
    let collection = MemoryCollection::new();

    let named = collection
        .create_index(doc! { "email": 1 }, IndexOptions::named("by_email"))
        .await
        .unwrap();
    assert_eq!(named, "by_email");

    let derived = collection
        .create_index(doc! { "b": 1, "a": -1 }, IndexOptions::default())
        .await
        .unwrap();
    assert_eq!(derived, "a:-1,b:1");

    assert_eq!(
        collection.index_names().await,
        vec!["a:-1,b:1".to_string(), "by_email".to_string()]
    );
}

#[tokio::test]
async fn drop_index_removes_registrations() {
    let collection = MemoryCollection::new();

    collection
        .create_index(doc! { "email": 1 }, IndexOptions::named("by_email"))
        .await
        .unwrap();

    collection.drop_index("by_email").await.unwrap();

    let error = collection.drop_index("by_email").await.unwrap_err();
    assert!(matches!(error, ControllerError::IndexNotFound(_)));
}

#[tokio::test]
async fn malformed_filters_surface_errors() {
    let collection = MemoryCollection::new();

    collection.insert_one(doc! { "name": "a" }).await.unwrap();

    let error = collection
        .find(doc! { "name": { "$near": 1 } }, FindOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(error, ControllerError::UnsupportedOperator(_)));

    let error = collection
        .delete_many(doc! { "$nor": [ { "name": "a" } ] })
        .await
        .unwrap_err();
    assert!(matches!(error, ControllerError::UnsupportedOperator(_)));
    assert_eq!(all_documents(&collection).await.len(), 1);
}
