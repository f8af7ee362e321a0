//! Update payload application for the in-memory collection.
//!
//! Supports the `$set`, `$unset` and `$inc` operators plus whole-document
//! replacement, mirroring how a MongoDB server interprets the same payloads.

use bson::{Bson, Document};

use doctrl_core::{
    error::{ControllerError, ControllerResult},
    policy::ID_FIELD,
};

/// Applies an update payload to a document in place.
///
/// A payload whose keys start with `$` is treated as a set of update
/// operators; any other payload replaces the document wholesale while
/// keeping its identifier. Returns whether the document actually changed.
pub(crate) fn apply_update(document: &mut Document, update: &Document) -> ControllerResult<bool> {
    let before = document.clone();

    if update.keys().any(|key| key.starts_with('$')) {
        for (operator, operand) in update {
            let operand = operand_document(operator, operand)?;

            match operator.as_str() {
                "$set" => set_fields(document, operand)?,
                "$unset" => {
                    for field in operand.keys() {
                        if field != ID_FIELD {
                            document.remove(field);
                        }
                    }
                }
                "$inc" => {
                    for (field, delta) in operand {
                        increment(document, field, delta)?;
                    }
                }
                other => {
                    return Err(ControllerError::UnsupportedOperator(other.to_string()));
                }
            }
        }
    } else {
        *document = replacement(document, update)?;
    }

    Ok(*document != before)
}

/// Builds the document an upsert inserts when no existing document matched.
///
/// Plain equality conditions from the filter seed the new document, then the
/// update payload is applied on top, matching server-side upsert behavior.
pub(crate) fn upsert_seed(filter: &Document, update: &Document) -> ControllerResult<Document> {
    let mut seed = Document::new();

    for (field, condition) in filter {
        if field.starts_with('$') {
            continue;
        }

        match condition {
            Bson::Document(spec) if spec.keys().any(|key| key.starts_with('$')) => {
                if let Some(value) = spec.get("$eq") {
                    seed.insert(field.as_str(), value.clone());
                }
            }
            value => {
                seed.insert(field.as_str(), value.clone());
            }
        }
    }

    apply_update(&mut seed, update)?;

    Ok(seed)
}

fn operand_document<'a>(operator: &str, operand: &'a Bson) -> ControllerResult<&'a Document> {
    match operand {
        Bson::Document(operand) => Ok(operand),
        other => Err(ControllerError::InvalidDocument(format!(
            "{operator} requires a document operand, got {other}"
        ))),
    }
}

fn set_fields(document: &mut Document, operand: &Document) -> ControllerResult<()> {
    for (field, value) in operand {
        if field == ID_FIELD && document.get(ID_FIELD).is_some_and(|id| id != value) {
            return Err(ControllerError::InvalidDocument(
                "the _id field is immutable".to_string(),
            ));
        }

        document.insert(field.as_str(), value.clone());
    }

    Ok(())
}

fn increment(document: &mut Document, field: &str, delta: &Bson) -> ControllerResult<()> {
    let updated = match (document.get(field), delta) {
        (None, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => delta.clone(),
        (Some(Bson::Int32(a)), Bson::Int32(b)) => Bson::Int32(a + b),
        (Some(Bson::Int32(a)), Bson::Int64(b)) => Bson::Int64(i64::from(*a) + b),
        (Some(Bson::Int64(a)), Bson::Int32(b)) => Bson::Int64(a + i64::from(*b)),
        (Some(Bson::Int64(a)), Bson::Int64(b)) => Bson::Int64(a + b),
        (Some(current), delta) => match (as_f64(current), as_f64(delta)) {
            (Some(a), Some(b)) => Bson::Double(a + b),
            _ => {
                return Err(ControllerError::InvalidDocument(format!(
                    "$inc requires numeric values for field {field}"
                )));
            }
        },
        (None, _) => {
            return Err(ControllerError::InvalidDocument(format!(
                "$inc requires numeric values for field {field}"
            )));
        }
    };

    document.insert(field, updated);

    Ok(())
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(value) => Some(f64::from(*value)),
        Bson::Int64(value) => Some(*value as f64),
        Bson::Double(value) => Some(*value),
        _ => None,
    }
}

fn replacement(document: &Document, update: &Document) -> ControllerResult<Document> {
    let id = document.get(ID_FIELD);

    if let Some(new_id) = update.get(ID_FIELD)
        && id.is_some_and(|id| id != new_id)
    {
        return Err(ControllerError::InvalidDocument(
            "the _id field is immutable".to_string(),
        ));
    }

    let mut replaced = Document::new();

    if let Some(id) = id {
        replaced.insert(ID_FIELD, id.clone());
    }

    for (field, value) in update {
        if field != ID_FIELD {
            replaced.insert(field.as_str(), value.clone());
        }
    }

    Ok(replaced)
}
