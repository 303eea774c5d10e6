//! Filter matching, update application, and ordering for in-memory documents.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use hookstore_core::error::AppError;
use hookstore_core::result::AppResult;
use hookstore_core::types::document::Document;

/// An equality filter over (possibly dotted) field paths.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Vec<(String, Value)>,
}

impl Filter {
    /// Parses a filter document. `null` and `{}` match everything.
    pub fn parse(filter: &Document) -> AppResult<Self> {
        match filter {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => {
                if let Some(op) = map.keys().find(|k| k.starts_with('$')) {
                    return Err(AppError::validation(format!(
                        "Unsupported filter operator '{op}'"
                    )));
                }
                Ok(Self {
                    fields: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                })
            }
            other => Err(AppError::validation(format!(
                "Filter must be an object, got {}",
                type_name(other)
            ))),
        }
    }

    /// Returns whether `document` has every filtered field with an equal value.
    pub fn matches(&self, document: &Document) -> bool {
        self.fields
            .iter()
            .all(|(path, expected)| field(document, path) == Some(expected))
    }

    /// Builds the seed document for an upsert from the plain filter fields.
    pub fn to_seed(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(path, _)| !path.contains('.'))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// A parsed update: the fields to assign.
#[derive(Debug, Clone)]
pub struct Update {
    set: Map<String, Value>,
}

impl Update {
    /// Parses `{"$set": {...}}` or a plain object treated as `$set`.
    pub fn parse(update: &Document) -> AppResult<Self> {
        let Value::Object(map) = update else {
            return Err(AppError::validation(format!(
                "Update must be an object, got {}",
                type_name(update)
            )));
        };

        if let Some(set) = map.get("$set") {
            if map.len() > 1 {
                return Err(AppError::validation(
                    "Only the '$set' update operator is supported",
                ));
            }
            return match set {
                Value::Object(fields) => Ok(Self { set: fields.clone() }),
                other => Err(AppError::validation(format!(
                    "'$set' must be an object, got {}",
                    type_name(other)
                ))),
            };
        }

        if let Some(op) = map.keys().find(|k| k.starts_with('$')) {
            return Err(AppError::validation(format!(
                "Unsupported update operator '{op}'"
            )));
        }

        Ok(Self { set: map.clone() })
    }

    /// Applies the update in place. Returns whether anything changed.
    pub fn apply(&self, document: &mut Document) -> bool {
        let Value::Object(target) = document else {
            return false;
        };

        let mut changed = false;
        for (key, value) in &self.set {
            if key == "_id" {
                continue;
            }
            if target.get(key) != Some(value) {
                target.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }
}

/// Resolves a dotted path like `"profile.name"` inside a document.
pub fn field<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

/// Total order used for sorting documents by one field.
///
/// Missing and `null` values sort first, then booleans, numbers, strings,
/// arrays, and objects.
pub fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
