//! Controller configuration types.
//!
//! [`ControllerFlags`] selects the cross-cutting behaviors a controller
//! applies; [`Visibility`] is the per-call knob for seeing through soft
//! deletion.

use serde::{Deserialize, Serialize};

/// Feature flags bound to a controller at construction time.
///
/// Both flags default to off. Once a controller is built the flags are
/// immutable; two controllers over the same collection may disagree on them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerFlags {
    /// Maintain `createdAt`/`updatedAt` automatically.
    #[serde(default)]
    pub use_timestamps: bool,
    /// Delete by marking `deletedAt` instead of removing documents, and hide
    /// marked documents from reads by default.
    #[serde(default)]
    pub use_soft_delete: bool,
}

impl ControllerFlags {
    /// Returns flags with both behaviors enabled.
    pub fn all() -> Self {
        Self {
            use_timestamps: true,
            use_soft_delete: true,
        }
    }
}

/// Per-call visibility of soft-deleted documents.
///
/// The default hides soft-deleted documents. Passing
/// [`Visibility::with_deleted()`] makes them visible to the one call it is
/// handed to. The value is inert when the controller has soft deletion
/// disabled.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visibility {
    /// Include documents carrying a `deletedAt` marker.
    #[serde(default)]
    pub include_deleted: bool,
}

impl Visibility {
    /// Visibility excluding soft-deleted documents. Same as the default.
    pub fn live() -> Self {
        Self {
            include_deleted: false,
        }
    }

    /// Visibility including soft-deleted documents.
    pub fn with_deleted() -> Self {
        Self {
            include_deleted: true,
        }
    }
}
