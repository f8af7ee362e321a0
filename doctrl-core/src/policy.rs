//! Composition rules for the controller's cross-cutting behaviors.
//!
//! Everything here is a pure function from documents to documents: the
//! visibility filter and deletion marker for soft deletion, the creation
//! defaults and update touch for timestamping, and the filter merge that
//! gives caller queries precedence over injected fragments. The controller
//! decides *when* to apply these; this module only decides *what* they
//! produce.

use bson::{doc, Bson, DateTime, Document};

use crate::config::Visibility;

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "_id";
/// Field stamped when a document is created.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Field advanced on every mutation when timestamping is enabled.
pub const UPDATED_AT_FIELD: &str = "updatedAt";
/// Field whose presence marks a document as soft-deleted.
pub const DELETED_AT_FIELD: &str = "deletedAt";

/// Merges an injected filter fragment with a caller query.
///
/// Fragment entries come first; caller entries replace them on key collision,
/// so injected clauses always have the lowest precedence.
pub fn compose_filter(fragment: Document, query: Document) -> Document {
    let mut filter = fragment;
    for (key, value) in query {
        filter.insert(key, value);
    }
    filter
}

/// Filter and mutation fragments implementing soft deletion.
///
/// Deletion state is encoded solely by the presence of the
/// [`DELETED_AT_FIELD`] marker; no boolean flag exists anywhere.
pub struct SoftDeletePolicy;

impl SoftDeletePolicy {
    /// Returns the filter fragment hiding soft-deleted documents.
    ///
    /// Empty when soft deletion is disabled or the caller asked to include
    /// deleted documents, so merging it is always safe.
    pub fn visibility_filter(enabled: bool, visibility: Visibility) -> Document {
        if enabled && !visibility.include_deleted {
            doc! { DELETED_AT_FIELD: { "$exists": false } }
        } else {
            Document::new()
        }
    }

    /// Returns the mutation that marks a document as deleted at `deleted_at`.
    ///
    /// The marker mutation does not advance `updatedAt`.
    pub fn mark_deleted(deleted_at: DateTime) -> Document {
        doc! { "$set": { DELETED_AT_FIELD: deleted_at } }
    }

    /// Whether a fetched document carries the deletion marker.
    pub fn is_deleted(document: &Document) -> bool {
        document.contains_key(DELETED_AT_FIELD)
    }
}

/// Mutation fragments implementing automatic timestamps.
pub struct TimestampPolicy;

impl TimestampPolicy {
    /// Fills `createdAt` and `updatedAt` with `now` where the caller did not
    /// supply them. Caller-supplied values are preserved unchanged, and the
    /// same `now` must be reused across a whole batch.
    pub fn creation_defaults(data: Document, now: DateTime) -> Document {
        let mut document = doc! {
            CREATED_AT_FIELD: now,
            UPDATED_AT_FIELD: now,
        };
        for (key, value) in data {
            document.insert(key, value);
        }
        document
    }

    /// Advances `updatedAt` to `now` inside an update payload.
    ///
    /// Operator-style payloads get the touch inside `$set`; replacement-style
    /// payloads get it as a top-level field. A caller-supplied `updatedAt`
    /// wins over the injected value. Non-document `$set` payloads are left
    /// for the backend to reject.
    pub fn touch_update(update: Document, now: DateTime) -> Document {
        let mut update = update;
        if update.keys().any(|key| key.starts_with('$')) {
            let touched = match update.get("$set") {
                None => Some(doc! { UPDATED_AT_FIELD: now }),
                Some(Bson::Document(set)) if !set.contains_key(UPDATED_AT_FIELD) => {
                    let mut set = set.clone();
                    set.insert(UPDATED_AT_FIELD, now);
                    Some(set)
                }
                Some(_) => None,
            };
            if let Some(set) = touched {
                update.insert("$set", set);
            }
        } else if !update.contains_key(UPDATED_AT_FIELD) {
            update.insert(UPDATED_AT_FIELD, now);
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime {
        DateTime::from_millis(1_700_000_000_000)
    }

    #[test]
    fn visibility_filter_hides_deleted_only_when_enabled() {
        assert!(SoftDeletePolicy::visibility_filter(false, Visibility::live()).is_empty());
        assert!(SoftDeletePolicy::visibility_filter(true, Visibility::with_deleted()).is_empty());
        assert_eq!(
            SoftDeletePolicy::visibility_filter(true, Visibility::live()),
            doc! { "deletedAt": { "$exists": false } },
        );
    }

    #[test]
    fn compose_filter_lets_the_caller_override_injected_clauses() {
        let fragment = SoftDeletePolicy::visibility_filter(true, Visibility::live());
        let filter = compose_filter(
            fragment,
            doc! { "deletedAt": { "$exists": true }, "status": "archived" },
        );

        assert_eq!(
            filter.get_document("deletedAt").unwrap(),
            &doc! { "$exists": true },
        );
        assert_eq!(filter.get_str("status").unwrap(), "archived");
    }

    #[test]
    fn compose_filter_keeps_the_fragment_when_keys_are_disjoint() {
        let filter = compose_filter(
            doc! { "deletedAt": { "$exists": false } },
            doc! { "status": "active" },
        );

        assert_eq!(
            filter,
            doc! { "deletedAt": { "$exists": false }, "status": "active" },
        );
    }

    #[test]
    fn creation_defaults_fill_missing_timestamps() {
        let now = fixed_now();
        let document = TimestampPolicy::creation_defaults(doc! { "name": "alice" }, now);

        assert_eq!(document.get_datetime("createdAt").unwrap(), &now);
        assert_eq!(document.get_datetime("updatedAt").unwrap(), &now);
        assert_eq!(document.get_str("name").unwrap(), "alice");
    }

    #[test]
    fn creation_defaults_preserve_caller_timestamps() {
        let now = fixed_now();
        let earlier = DateTime::from_millis(1_600_000_000_000);
        let document =
            TimestampPolicy::creation_defaults(doc! { "createdAt": earlier, "n": 1 }, now);

        assert_eq!(document.get_datetime("createdAt").unwrap(), &earlier);
        assert_eq!(document.get_datetime("updatedAt").unwrap(), &now);
    }

    #[test]
    fn touch_update_adds_a_set_stage_to_operator_payloads() {
        let now = fixed_now();
        let update = TimestampPolicy::touch_update(doc! { "$inc": { "n": 1 } }, now);

        assert_eq!(update.get_document("$inc").unwrap(), &doc! { "n": 1 });
        assert_eq!(
            update.get_document("$set").unwrap(),
            &doc! { "updatedAt": now },
        );
    }

    #[test]
    fn touch_update_extends_an_existing_set_stage() {
        let now = fixed_now();
        let update = TimestampPolicy::touch_update(doc! { "$set": { "name": "bob" } }, now);

        assert_eq!(
            update.get_document("$set").unwrap(),
            &doc! { "name": "bob", "updatedAt": now },
        );
    }

    #[test]
    fn touch_update_respects_an_explicit_updated_at() {
        let now = fixed_now();
        let earlier = DateTime::from_millis(1_600_000_000_000);
        let update =
            TimestampPolicy::touch_update(doc! { "$set": { "updatedAt": earlier } }, now);

        assert_eq!(
            update.get_document("$set").unwrap(),
            &doc! { "updatedAt": earlier },
        );
    }

    #[test]
    fn touch_update_handles_replacement_payloads() {
        let now = fixed_now();
        let update = TimestampPolicy::touch_update(doc! { "name": "bob" }, now);

        assert_eq!(update, doc! { "name": "bob", "updatedAt": now });
    }

    #[test]
    fn mark_deleted_sets_only_the_marker() {
        let now = fixed_now();
        assert_eq!(
            SoftDeletePolicy::mark_deleted(now),
            doc! { "$set": { "deletedAt": now } },
        );
    }

    #[test]
    fn is_deleted_checks_marker_presence() {
        assert!(SoftDeletePolicy::is_deleted(&doc! { "deletedAt": fixed_now() }));
        assert!(SoftDeletePolicy::is_deleted(&doc! { "deletedAt": Bson::Null }));
        assert!(!SoftDeletePolicy::is_deleted(&doc! { "name": "alice" }));
    }
}
