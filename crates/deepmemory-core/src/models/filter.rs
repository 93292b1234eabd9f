//! Metadata filter predicates.
//!
//! The wire form follows the common vector-database operator syntax:
//!
//! ```
//! use deepmemory_core::models::MetadataFilter;
//! use serde_json::json;
//!
//! let filter = MetadataFilter::from_json(&json!({
//!     "source": "chatgpt",
//!     "year": { "$gte": 2023 }
//! }))
//! .unwrap();
//! assert_eq!(
//!     filter,
//!     MetadataFilter::And(vec![
//!         MetadataFilter::Eq("source".into(), json!("chatgpt")),
//!         MetadataFilter::Gte("year".into(), 2023.0),
//!     ])
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::Metadata;
use crate::errors::SearchError;

/// A predicate over a metadata map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum MetadataFilter {
    Eq(String, Value),
    Ne(String, Value),
    In(String, Vec<Value>),
    Nin(String, Vec<Value>),
    Gt(String, f64),
    Gte(String, f64),
    Lt(String, f64),
    Lte(String, f64),
    And(Vec<MetadataFilter>),
    Or(Vec<MetadataFilter>),
}

impl MetadataFilter {
    /// Evaluate the predicate. A missing field fails every positive operator
    /// and passes `$ne` / `$nin`.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Self::Eq(field, expected) => metadata
                .get(field)
                .is_some_and(|actual| values_equal(actual, expected)),
            Self::Ne(field, expected) => !metadata
                .get(field)
                .is_some_and(|actual| values_equal(actual, expected)),
            Self::In(field, options) => metadata
                .get(field)
                .is_some_and(|actual| options.iter().any(|o| values_equal(actual, o))),
            Self::Nin(field, options) => !metadata
                .get(field)
                .is_some_and(|actual| options.iter().any(|o| values_equal(actual, o))),
            Self::Gt(field, bound) => number(metadata, field).is_some_and(|n| n > *bound),
            Self::Gte(field, bound) => number(metadata, field).is_some_and(|n| n >= *bound),
            Self::Lt(field, bound) => number(metadata, field).is_some_and(|n| n < *bound),
            Self::Lte(field, bound) => number(metadata, field).is_some_and(|n| n <= *bound),
            Self::And(clauses) => clauses.iter().all(|c| c.matches(metadata)),
            Self::Or(clauses) => clauses.iter().any(|c| c.matches(metadata)),
        }
    }

    /// Parse the operator syntax. Multiple top-level keys are an implicit `$and`.
    pub fn from_json(value: &Value) -> Result<Self, SearchError> {
        let object = value.as_object().ok_or_else(|| invalid("filter must be an object"))?;
        let mut clauses = Vec::with_capacity(object.len());

        for (key, body) in object {
            match key.as_str() {
                "$and" => clauses.push(Self::And(parse_clause_list(key, body)?)),
                "$or" => clauses.push(Self::Or(parse_clause_list(key, body)?)),
                op if op.starts_with('$') => {
                    return Err(invalid(format!("unsupported top-level operator {op}")));
                }
                field => clauses.extend(parse_field(field, body)?),
            }
        }

        match clauses.len() {
            0 => Err(invalid("filter must contain at least one condition")),
            1 => Ok(clauses.remove(0)),
            _ => Ok(Self::And(clauses)),
        }
    }

    /// Render back to the operator syntax.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Eq(f, v) => field_op(f, "$eq", v.clone()),
            Self::Ne(f, v) => field_op(f, "$ne", v.clone()),
            Self::In(f, v) => field_op(f, "$in", Value::Array(v.clone())),
            Self::Nin(f, v) => field_op(f, "$nin", Value::Array(v.clone())),
            Self::Gt(f, n) => field_op(f, "$gt", json!(n)),
            Self::Gte(f, n) => field_op(f, "$gte", json!(n)),
            Self::Lt(f, n) => field_op(f, "$lt", json!(n)),
            Self::Lte(f, n) => field_op(f, "$lte", json!(n)),
            Self::And(c) => json!({ "$and": c.iter().map(Self::to_json).collect::<Vec<_>>() }),
            Self::Or(c) => json!({ "$or": c.iter().map(Self::to_json).collect::<Vec<_>>() }),
        }
    }
}

impl TryFrom<Value> for MetadataFilter {
    type Error = SearchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<MetadataFilter> for Value {
    fn from(filter: MetadataFilter) -> Self {
        filter.to_json()
    }
}

fn parse_clause_list(op: &str, body: &Value) -> Result<Vec<MetadataFilter>, SearchError> {
    let items = body
        .as_array()
        .ok_or_else(|| invalid(format!("{op} expects an array")))?;
    if items.is_empty() {
        return Err(invalid(format!("{op} expects at least one clause")));
    }
    items.iter().map(MetadataFilter::from_json).collect()
}

fn parse_field(field: &str, body: &Value) -> Result<Vec<MetadataFilter>, SearchError> {
    let ops = match body {
        Value::Object(ops) if ops.keys().all(|k| k.starts_with('$')) => ops,
        // Bare value means equality.
        other => return Ok(vec![MetadataFilter::Eq(field.to_string(), other.clone())]),
    };
    ops.iter().map(|(op, arg)| parse_operator(field, op, arg)).collect()
}

fn parse_operator(field: &str, op: &str, arg: &Value) -> Result<MetadataFilter, SearchError> {
    let field = field.to_string();
    let filter = match op {
        "$eq" => MetadataFilter::Eq(field, arg.clone()),
        "$ne" => MetadataFilter::Ne(field, arg.clone()),
        "$in" => MetadataFilter::In(field, array_arg(op, arg)?),
        "$nin" => MetadataFilter::Nin(field, array_arg(op, arg)?),
        "$gt" => MetadataFilter::Gt(field, number_arg(op, arg)?),
        "$gte" => MetadataFilter::Gte(field, number_arg(op, arg)?),
        "$lt" => MetadataFilter::Lt(field, number_arg(op, arg)?),
        "$lte" => MetadataFilter::Lte(field, number_arg(op, arg)?),
        other => return Err(invalid(format!("unsupported operator {other} on {field}"))),
    };
    Ok(filter)
}

fn array_arg(op: &str, arg: &Value) -> Result<Vec<Value>, SearchError> {
    arg.as_array()
        .cloned()
        .ok_or_else(|| invalid(format!("{op} expects an array")))
}

fn number_arg(op: &str, arg: &Value) -> Result<f64, SearchError> {
    arg.as_f64()
        .ok_or_else(|| invalid(format!("{op} expects a number")))
}

fn number(metadata: &Metadata, field: &str) -> Option<f64> {
    metadata.get(field).and_then(Value::as_f64)
}

/// JSON equality that treats `1` and `1.0` as the same number.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn invalid(reason: impl Into<String>) -> SearchError {
    SearchError::InvalidFilter {
        reason: reason.into(),
    }
}

fn field_op(field: &str, op: &str, arg: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(op.to_string(), arg);
    let mut outer = Map::new();
    outer.insert(field.to_string(), Value::Object(inner));
    Value::Object(outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(value: Value) -> Metadata {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn bare_value_is_equality() {
        let f = MetadataFilter::from_json(&json!({ "role": "user" })).unwrap();
        assert!(f.matches(&meta(json!({ "role": "user" }))));
        assert!(!f.matches(&meta(json!({ "role": "assistant" }))));
    }

    #[test]
    fn numeric_equality_ignores_representation() {
        let f = MetadataFilter::Eq("n".into(), json!(1));
        assert!(f.matches(&meta(json!({ "n": 1.0 }))));
    }

    #[test]
    fn missing_field_passes_negative_operators_only() {
        let empty = Metadata::new();
        assert!(MetadataFilter::Ne("x".into(), json!(1)).matches(&empty));
        assert!(MetadataFilter::Nin("x".into(), vec![json!(1)]).matches(&empty));
        assert!(!MetadataFilter::Gt("x".into(), 0.0).matches(&empty));
        assert!(!MetadataFilter::In("x".into(), vec![json!(1)]).matches(&empty));
    }

    #[test]
    fn nested_or_and() {
        let f = MetadataFilter::from_json(&json!({
            "$or": [
                { "source": { "$in": ["gemini", "grok"] } },
                { "score": { "$gt": 0.5, "$lte": 1.0 } }
            ]
        }))
        .unwrap();
        assert!(f.matches(&meta(json!({ "source": "grok" }))));
        assert!(f.matches(&meta(json!({ "score": 0.75 }))));
        assert!(!f.matches(&meta(json!({ "source": "chatgpt", "score": 0.2 }))));
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = MetadataFilter::from_json(&json!({ "a": { "$regex": "x" } })).unwrap_err();
        assert!(err.to_string().contains("$regex"));
    }

    #[test]
    fn rejects_empty_filter() {
        assert!(MetadataFilter::from_json(&json!({})).is_err());
    }

    #[test]
    fn serde_uses_operator_syntax() {
        let f = MetadataFilter::Gte("year".into(), 2024.0);
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v, json!({ "year": { "$gte": 2024.0 } }));
        let back: MetadataFilter = serde_json::from_value(v).unwrap();
        assert_eq!(back, f);
    }
}
