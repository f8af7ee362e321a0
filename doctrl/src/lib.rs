//! Main doctrl crate providing CRUD controllers for document collections.
//!
//! This crate is the primary entry point for users of the doctrl framework.
//! It re-exports the core types and functionality from various sub-crates and
//! provides convenient access to different collection backends.
//!
//! # Features
//!
//! - **Schemaless CRUD** - Work with BSON documents directly, no schema definitions required
//! - **Automatic timestamps** - `createdAt` and `updatedAt` maintained on writes when enabled
//! - **Soft deletion** - Deletes become recoverable markers hidden from ordinary reads
//! - **Multiple backends** - In-memory and MongoDB backends behind one extensible trait
//!
//! # Quick Start
//!
//! ```ignore
//! use doctrl::{prelude::*, memory::MemoryCollection};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Build a controller with both behaviors enabled
//!     let users = Controller::builder(MemoryCollection::new())
//!         .with_timestamps(true)
//!         .with_soft_delete(true)
//!         .build();
//!
//!     // Create a document; createdAt and updatedAt are stamped automatically
//!     let alice = users
//!         .create_one(doc! { "name": "Alice", "age": 30 })
//!         .await
//!         .unwrap();
//!
//!     // Deleting stamps a marker instead of removing the document
//!     users
//!         .delete_one(doc! { "name": "Alice" }, Visibility::live())
//!         .await
//!         .unwrap();
//!
//!     // Ordinary reads no longer see it
//!     let found = users
//!         .find_one(doc! { "name": "Alice" }, FindOptions::default(), Visibility::live())
//!         .await
//!         .unwrap();
//!     assert!(found.is_none());
//!
//!     // But it stays reachable on request
//!     let trashed = users
//!         .find_by_id(alice.get("_id").cloned().unwrap(), Visibility::with_deleted())
//!         .await
//!         .unwrap();
//!     assert!(trashed.is_some());
//! }
//! ```
//!
//! # Index Management
//!
//! Index specifications are canonicalized into deterministic names, so the
//! same keys always address the same index no matter how the specification is
//! spelled:
//!
//! ```ignore
//! use doctrl::{prelude::*, memory::MemoryCollection};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = Controller::new(MemoryCollection::new());
//!
//!     // A bare field name indexes that field ascending
//!     let name = users.create_index("email", IndexOptions::default()).await.unwrap();
//!     assert_eq!(name, "email");
//!
//!     // Compound keys get a canonical, order-independent name
//!     let name = users
//!         .create_index(doc! { "age": -1, "name": 1 }, IndexOptions::default())
//!         .await
//!         .unwrap();
//!     assert_eq!(name, "age:-1,name:1");
//!
//!     users.drop_index(doc! { "age": -1, "name": 1 }).await.unwrap();
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory collections for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use doctrl_core::{backend, config, controller, error, index, options, policy};

// Re-export BSON types for convenience
pub use bson;

/// In-memory collection backend implementations.
pub mod memory {
    pub use doctrl_memory::{MemoryCollection, MemoryCollectionBuilder};
}

/// MongoDB collection backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use doctrl_mongodb::{MongoCollection, MongoCollectionBuilder};
}
