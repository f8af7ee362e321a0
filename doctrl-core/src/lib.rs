//! A CRUD controller layer over document collections, with automatic
//! timestamps and soft deletion composed onto every operation.
//!
//! This crate is the core of the doctrl project and provides:
//!
//! - **Backend abstraction** ([`backend`]) - The async contract a storage
//!   engine implements for one collection
//! - **Controller** ([`controller`]) - The bound set of CRUD operations with
//!   the cross-cutting behaviors applied
//! - **Configuration** ([`config`]) - Construction-time flags and the
//!   per-call visibility knob
//! - **Policies** ([`policy`]) - The pure composition rules for filters,
//!   deletion markers, and timestamps
//! - **Index specifications** ([`index`]) - Canonical index naming from
//!   field or key-document specs
//! - **Operation options** ([`options`]) - Find, count, update, and index
//!   option carriers
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use doctrl_core::{config::Visibility, controller::Controller};
//! use bson::doc;
//!
//! let posts = Controller::builder(backend)
//!     .with_timestamps(true)
//!     .with_soft_delete(true)
//!     .build();
//!
//! let post = posts.create_one(doc! { "title": "hello" }).await?;
//! posts.delete_by_id(post.get_object_id("_id")?, Visibility::live()).await?;
//!
//! // Soft-deleted documents stay out of reads unless asked for.
//! assert!(posts.find_one(doc! {}, Default::default(), Visibility::live()).await?.is_none());
//! ```

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod index;
pub mod options;
pub mod policy;
