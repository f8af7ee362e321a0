//! Option types for controller and backend operations.
//!
//! These structs carry the per-call knobs every backend understands. Driver
//! specific tuning (collations, write concerns, timeouts) is not represented
//! here; adapters expose those at construction time instead.

use bson::Document;
use serde::{Deserialize, Serialize};

/// Options for find operations.
///
/// # Example
///
/// ```ignore
/// use doctrl::options::FindOptions;
///
/// let options = FindOptions::builder()
///     .with_limit(20)
///     .with_skip(40)
///     .with_sort(bson::doc! { "createdAt": -1 })
///     .build();
///
/// assert_eq!(options.limit, Some(20));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FindOptions {
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
    /// Number of matching documents to skip before collecting results.
    pub skip: Option<u64>,
    /// Sort specification as a `{ field: direction }` document, where a
    /// positive direction sorts ascending and a negative one descending.
    pub sort: Option<Document>,
}

impl FindOptions {
    /// Creates a new builder for constructing find options.
    pub fn builder() -> FindOptionsBuilder {
        FindOptionsBuilder::new()
    }
}

/// Builder for constructing [`FindOptions`] instances with a fluent API.
pub struct FindOptionsBuilder {
    limit: Option<u64>,
    skip: Option<u64>,
    sort: Option<Document>,
}

impl FindOptionsBuilder {
    /// Creates a new builder with no options set.
    pub fn new() -> Self {
        Self {
            limit: None,
            skip: None,
            sort: None,
        }
    }

    /// Sets the maximum number of documents to return.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of matching documents to skip.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the sort specification.
    pub fn with_sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Builds and returns the final [`FindOptions`] instance.
    pub fn build(self) -> FindOptions {
        FindOptions {
            limit: self.limit,
            skip: self.skip,
            sort: self.sort,
        }
    }
}

impl Default for FindOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for count operations.
///
/// `limit` and `skip` are applied to the count itself, mirroring how document
/// stores bound counting work.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CountOptions {
    /// Maximum count to report.
    pub limit: Option<u64>,
    /// Number of matching documents to exclude from the count.
    pub skip: Option<u64>,
}

/// Options for update operations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UpdateOptions {
    /// Insert a new document when no document matches the filter.
    pub upsert: bool,
}

impl UpdateOptions {
    /// Returns options with `upsert` enabled.
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

/// Options for index creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct IndexOptions {
    /// Explicit index name. When absent, the controller derives the
    /// canonical name from the index specification.
    pub name: Option<String>,
    /// Reject documents that duplicate an indexed value.
    pub unique: bool,
}

impl IndexOptions {
    /// Returns options carrying an explicit index name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            unique: false,
        }
    }
}
