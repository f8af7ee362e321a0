//! In-memory collection backend for doctrl.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `CollectionBackend` trait. It uses async-aware read-write locks for
//! concurrent access and is ideal for development, testing, and small-scale
//! deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Schemaless storage** - Stores documents as BSON in insertion order
//! - **Query support** - Filtering with MongoDB-style operators, sorting, and pagination
//! - **Update operators** - `$set`, `$unset` and `$inc` plus whole-document replacement
//!
//! # Quick Start
//!
//! ```ignore
//! use doctrl::{prelude::*, memory::MemoryCollection};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = Controller::new(MemoryCollection::new());
//!
//!     let user = controller.create_one(doc! { "name": "Alice" }).await?;
//!     let found = controller
//!         .find_by_id(user.get("_id").cloned().unwrap(), Visibility::live())
//!         .await?;
//!     assert!(found.is_some());
//!
//!     Ok(())
//! }
//! ```

pub mod evaluator;
pub mod store;
pub mod update;

pub use store::{MemoryCollection, MemoryCollectionBuilder};
