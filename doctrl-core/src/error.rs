//! Error types and result types for controller operations.
//!
//! This module provides error handling for the controller and its storage
//! collaborators. Use [`ControllerResult<T>`] as the return type for fallible
//! operations.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Represents all possible errors that can surface through a controller.
///
/// The controller itself introduces no failure modes of its own; every variant
/// here either originates in a storage collaborator or in converting caller
/// data into BSON documents.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Serialization/deserialization error when converting caller data into BSON documents.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during backend initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given identifier already exists in the collection.
    #[error("Duplicate document identifier: {0}")]
    DuplicateId(String),
    /// The named index does not exist in the collection.
    #[error("Index not found: {0}")]
    IndexNotFound(String),
    /// The filter or update payload uses an operator the backend does not support.
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// The document or payload has an invalid structure.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for controller operations.
///
/// This type alias is used throughout the crate to indicate operations that may
/// fail with a [`ControllerError`].
pub type ControllerResult<T> = Result<T, ControllerError>;

impl From<BsonError> for ControllerError {
    fn from(err: BsonError) -> Self {
        ControllerError::Serialization(err.to_string())
    }
}
