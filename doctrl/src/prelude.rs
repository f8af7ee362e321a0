//! Convenient re-exports of commonly used types from doctrl.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use doctrl::prelude::*;
//! ```
//!
//! This provides access to:
//! - The controller, its builder, and delete outcomes
//! - Backend traits and operation summaries
//! - Flag, visibility, and per-call option types
//! - Index specifications and the managed field names
//! - Error types

pub use doctrl_core::{
    backend::{
        CollectionBackend, CollectionBackendBuilder, DeleteSummary, InsertManySummary,
        InsertOneSummary, UpdateSummary,
    },
    config::{ControllerFlags, Visibility},
    controller::{Controller, ControllerBuilder, DeleteOutcome},
    error::{ControllerError, ControllerResult},
    index::IndexSpec,
    options::{CountOptions, FindOptions, FindOptionsBuilder, IndexOptions, UpdateOptions},
    policy::{
        CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, SoftDeletePolicy, TimestampPolicy,
        UPDATED_AT_FIELD, compose_filter,
    },
};
