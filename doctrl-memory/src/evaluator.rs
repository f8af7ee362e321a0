//! Filter evaluation for in-memory document matching.
//!
//! This module implements the query operator subset understood by the memory
//! backend: implicit top-level AND, `$and`/`$or` clause lists, and per-field
//! comparison operators evaluated against BSON documents.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use doctrl_core::error::{ControllerError, ControllerResult};

/// Type-erased, comparable representation of BSON values.
///
/// This enum wraps BSON values and provides comparison operations for
/// filtering and sorting. It normalizes numeric types to f64 for easy
/// comparison.
///
/// # Note
///
/// This is a private implementation detail used for filter evaluation.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// Object id value
    ObjectId(ObjectId),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.bytes().partial_cmp(&b.bytes()),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates a filter against a single document.
///
/// Top-level entries are combined with AND. A field condition is either a
/// plain value (matched by equality) or an operator document such as
/// `{ "$gte": 18 }`. Unknown operators are rejected rather than silently
/// matching nothing.
pub(crate) fn matches(document: &Document, filter: &Document) -> ControllerResult<bool> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => all_match(document, clauses(key, condition)?)?,
            "$or" => any_match(document, clauses(key, condition)?)?,
            key if key.starts_with('$') => {
                return Err(ControllerError::UnsupportedOperator(key.to_string()));
            }
            key => field_matches(document.get(key), condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Clones every document in `documents` that satisfies `filter`, preserving
/// the input order.
pub(crate) fn filter_documents<'a>(
    documents: impl IntoIterator<Item = &'a Document>,
    filter: &Document,
) -> ControllerResult<Vec<Document>> {
    let mut matched = Vec::new();

    for document in documents {
        if matches(document, filter)? {
            matched.push(document.clone());
        }
    }

    Ok(matched)
}

fn clauses<'a>(operator: &str, condition: &'a Bson) -> ControllerResult<Vec<&'a Document>> {
    let items = match condition {
        Bson::Array(items) if !items.is_empty() => items,
        _ => {
            return Err(ControllerError::InvalidDocument(format!(
                "{operator} requires a non-empty array of clauses"
            )));
        }
    };

    items
        .iter()
        .map(|item| match item {
            Bson::Document(clause) => Ok(clause),
            other => Err(ControllerError::InvalidDocument(format!(
                "{operator} clauses must be documents, got {other}"
            ))),
        })
        .collect()
}

fn all_match(document: &Document, clauses: Vec<&Document>) -> ControllerResult<bool> {
    for clause in clauses {
        if !matches(document, clause)? {
            return Ok(false);
        }
    }

    Ok(true)
}

fn any_match(document: &Document, clauses: Vec<&Document>) -> ControllerResult<bool> {
    for clause in clauses {
        if matches(document, clause)? {
            return Ok(true);
        }
    }

    Ok(false)
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> ControllerResult<bool> {
    match condition {
        Bson::Document(spec) if spec.keys().any(|key| key.starts_with('$')) => {
            operator_matches(value, spec)
        }
        expected => Ok(equals(value, expected)),
    }
}

fn operator_matches(value: Option<&Bson>, spec: &Document) -> ControllerResult<bool> {
    for (operator, operand) in spec {
        let matched = match operator.as_str() {
            "$eq" => equals(value, operand),
            "$ne" => !equals(value, operand),
            "$gt" => compare(value, operand, |ordering| ordering == Ordering::Greater),
            "$gte" => compare(value, operand, |ordering| ordering != Ordering::Less),
            "$lt" => compare(value, operand, |ordering| ordering == Ordering::Less),
            "$lte" => compare(value, operand, |ordering| ordering != Ordering::Greater),
            "$in" => listed(value, operator, operand)?,
            "$nin" => !listed(value, operator, operand)?,
            "$exists" => exists(value, operator, operand)?,
            other if other.starts_with('$') => {
                return Err(ControllerError::UnsupportedOperator(other.to_string()));
            }
            other => {
                return Err(ControllerError::InvalidDocument(format!(
                    "cannot mix operators and field names in one condition: {other}"
                )));
            }
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Equality with MongoDB semantics: a missing field equals null, and a
/// scalar expectation matches an array field containing an equal element.
fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    let Some(value) = value else {
        return matches!(expected, Bson::Null);
    };

    if Comparable::from(value) == Comparable::from(expected) {
        return true;
    }

    match value {
        Bson::Array(items) if !matches!(expected, Bson::Array(_)) => items
            .iter()
            .any(|item| Comparable::from(item) == Comparable::from(expected)),
        _ => false,
    }
}

fn compare(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let Some(value) = value else {
        return false;
    };

    Comparable::from(value)
        .partial_cmp(&Comparable::from(operand))
        .map(accept)
        .unwrap_or(false)
}

fn listed(value: Option<&Bson>, operator: &str, operand: &Bson) -> ControllerResult<bool> {
    let Bson::Array(candidates) = operand else {
        return Err(ControllerError::InvalidDocument(format!(
            "{operator} requires an array operand"
        )));
    };

    Ok(candidates.iter().any(|candidate| equals(value, candidate)))
}

fn exists(value: Option<&Bson>, operator: &str, operand: &Bson) -> ControllerResult<bool> {
    match operand.as_bool() {
        Some(should_exist) => Ok(value.is_some() == should_exist),
        None => Err(ControllerError::InvalidDocument(format!(
            "{operator} requires a boolean operand"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn plain_equality_unifies_numeric_types() {
        let document = doc! { "count": 3_i32 };

        assert!(matches(&document, &doc! { "count": 3_i64 }).unwrap());
        assert!(matches(&document, &doc! { "count": 3.0 }).unwrap());
        assert!(!matches(&document, &doc! { "count": 4_i32 }).unwrap());
    }

    #[test]
    fn scalar_equality_matches_array_elements() {
        let document = doc! { "tags": ["red", "blue"] };

        assert!(matches(&document, &doc! { "tags": "red" }).unwrap());
        assert!(!matches(&document, &doc! { "tags": "green" }).unwrap());
        assert!(matches(&document, &doc! { "tags": ["red", "blue"] }).unwrap());
    }

    #[test]
    fn missing_field_equals_null() {
        let document = doc! { "name": "a" };

        assert!(matches(&document, &doc! { "archived": Bson::Null }).unwrap());
        assert!(!matches(&document, &doc! { "archived": true }).unwrap());
    }

    #[test]
    fn exists_checks_field_presence() {
        let document = doc! { "deletedAt": Bson::Null };

        assert!(matches(&document, &doc! { "deletedAt": { "$exists": true } }).unwrap());
        assert!(!matches(&document, &doc! { "deletedAt": { "$exists": false } }).unwrap());
        assert!(matches(&document, &doc! { "missing": { "$exists": false } }).unwrap());
    }

    #[test]
    fn ne_matches_missing_fields() {
        let document = doc! { "name": "a" };

        assert!(matches(&document, &doc! { "role": { "$ne": "admin" } }).unwrap());
        assert!(!matches(&document, &doc! { "name": { "$ne": "a" } }).unwrap());
        assert!(!matches(&document, &doc! { "role": { "$ne": Bson::Null } }).unwrap());
    }

    #[test]
    fn range_operators_compare_datetimes() {
        let earlier = bson::DateTime::from_millis(1_000);
        let later = bson::DateTime::from_millis(2_000);
        let document = doc! { "createdAt": later };

        assert!(matches(&document, &doc! { "createdAt": { "$gt": earlier } }).unwrap());
        assert!(!matches(&document, &doc! { "createdAt": { "$lte": earlier } }).unwrap());
        assert!(matches(&document, &doc! { "createdAt": { "$gte": later } }).unwrap());
    }

    #[test]
    fn range_operators_never_match_missing_fields() {
        let document = doc! { "name": "a" };

        assert!(!matches(&document, &doc! { "age": { "$gt": 0 } }).unwrap());
        assert!(!matches(&document, &doc! { "age": { "$lte": 100 } }).unwrap());
    }

    #[test]
    fn in_and_nin_check_membership() {
        let document = doc! { "status": "active" };

        assert!(matches(&document, &doc! { "status": { "$in": ["active", "idle"] } }).unwrap());
        assert!(!matches(&document, &doc! { "status": { "$nin": ["active"] } }).unwrap());
        assert!(matches(&document, &doc! { "missing": { "$nin": ["active"] } }).unwrap());
    }

    #[test]
    fn or_matches_any_clause() {
        let document = doc! { "age": 30 };
        let filter = doc! { "$or": [ { "age": { "$lt": 10 } }, { "age": { "$gt": 20 } } ] };

        assert!(matches(&document, &filter).unwrap());
    }

    #[test]
    fn and_requires_every_clause() {
        let document = doc! { "age": 30, "name": "a" };
        let filter = doc! { "$and": [ { "age": { "$gt": 20 } }, { "name": "b" } ] };

        assert!(!matches(&document, &filter).unwrap());
    }

    #[test]
    fn unknown_operators_are_rejected() {
        let document = doc! { "name": "a" };

        let error = matches(&document, &doc! { "name": { "$regex": "^a" } }).unwrap_err();
        assert!(matches!(error, ControllerError::UnsupportedOperator(_)));

        let error = matches(&document, &doc! { "$nor": [ { "name": "a" } ] }).unwrap_err();
        assert!(matches!(error, ControllerError::UnsupportedOperator(_)));
    }

    #[test]
    fn malformed_operands_are_rejected() {
        let document = doc! { "name": "a" };

        let error = matches(&document, &doc! { "name": { "$in": "a" } }).unwrap_err();
        assert!(matches!(error, ControllerError::InvalidDocument(_)));

        let error = matches(&document, &doc! { "$or": [] }).unwrap_err();
        assert!(matches!(error, ControllerError::InvalidDocument(_)));
    }
}
