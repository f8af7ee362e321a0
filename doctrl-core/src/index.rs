//! Index specifications and canonical index naming.
//!
//! An index can be addressed either by a single field name or by a full
//! `{ field: marker }` key document. Both creation and removal resolve the
//! specification to the same canonical name, so an index created from a key
//! document can later be dropped from an equivalent one regardless of key
//! order.

use bson::{doc, Bson, Document};

/// Specification of an index over a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexSpec {
    /// A single field, indexed ascending.
    Field(String),
    /// A `{ field: marker }` key document, where the marker is a sort
    /// direction (`1`, `-1`) or an index kind such as `"text"`.
    Keys(Document),
}

impl IndexSpec {
    /// The canonical name of this specification.
    ///
    /// A [`Field`](IndexSpec::Field) name is returned unchanged. Key
    /// documents are rendered as `field:marker` pairs joined by commas, with
    /// the entries sorted by field name, so the name is invariant under key
    /// order permutation.
    pub fn canonical_name(&self) -> String {
        match self {
            IndexSpec::Field(field) => field.clone(),
            IndexSpec::Keys(keys) => {
                let mut entries: Vec<(&String, &Bson)> = keys.iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                entries
                    .into_iter()
                    .map(|(field, marker)| format!("{}:{}", field, render_marker(marker)))
                    .collect::<Vec<_>>()
                    .join(",")
            }
        }
    }

    /// The key document this specification describes.
    ///
    /// A single field becomes an ascending `{ field: 1 }` document.
    pub fn keys(&self) -> Document {
        match self {
            IndexSpec::Field(field) => doc! { field: 1 },
            IndexSpec::Keys(keys) => keys.clone(),
        }
    }
}

impl From<&str> for IndexSpec {
    fn from(field: &str) -> Self {
        IndexSpec::Field(field.to_string())
    }
}

impl From<String> for IndexSpec {
    fn from(field: String) -> Self {
        IndexSpec::Field(field)
    }
}

impl From<Document> for IndexSpec {
    fn from(keys: Document) -> Self {
        IndexSpec::Keys(keys)
    }
}

/// Renders an index marker the way it is written in key documents: integral
/// numbers without a fractional part, strings verbatim.
fn render_marker(marker: &Bson) -> String {
    match marker {
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) if n.fract() == 0.0 => (*n as i64).to_string(),
        Bson::String(kind) => kind.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_field_names_are_unchanged() {
        assert_eq!(IndexSpec::from("email").canonical_name(), "email");
    }

    #[test]
    fn single_fields_index_ascending() {
        assert_eq!(IndexSpec::from("email").keys(), doc! { "email": 1 });
    }

    #[test]
    fn key_documents_join_sorted_field_marker_pairs() {
        let spec = IndexSpec::from(doc! { "b": 1, "a": -1 });
        assert_eq!(spec.canonical_name(), "a:-1,b:1");
    }

    #[test]
    fn canonical_names_are_permutation_invariant() {
        let forward = IndexSpec::from(doc! { "a": -1, "b": 1, "c": "text" });
        let backward = IndexSpec::from(doc! { "c": "text", "b": 1, "a": -1 });
        assert_eq!(forward.canonical_name(), backward.canonical_name());
        assert_eq!(forward.canonical_name(), "a:-1,b:1,c:text");
    }

    #[test]
    fn markers_render_like_key_document_values() {
        let spec = IndexSpec::from(doc! { "a": 1.0, "b": Bson::Int64(-1), "c": "2dsphere" });
        assert_eq!(spec.canonical_name(), "a:1,b:-1,c:2dsphere");
    }
}
