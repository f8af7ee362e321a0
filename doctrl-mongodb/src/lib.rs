//! MongoDB backend implementation for doctrl.
//!
//! This crate provides a MongoDB-based implementation of the
//! `CollectionBackend` trait, delegating filters, update payloads, and index
//! management directly to MongoDB's own engine.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! doctrl = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Full query support** - Filters and update operators run on the server unchanged
//! - **Async/await** - Fully asynchronous API built on MongoDB's async driver
//! - **Indexing** - Support for creating and dropping MongoDB indexes
//!
//! # Connection
//!
//! To use this backend, you need a MongoDB connection string. This can be
//! provided through the builder pattern.
//!
//! # Example
//!
//! ```ignore
//! use doctrl::{backend::CollectionBackendBuilder, mongodb::MongoCollection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collection = MongoCollection::builder("mongodb://localhost:27017", "my_database", "users")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod store;

pub use store::{MongoCollection, MongoCollectionBuilder};
