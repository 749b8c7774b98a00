//! Term-filter construction.
//!
//! A filter is a flat set of field matches combined conjunctively:
//!
//! ```json
//! {
//!     "filter": {
//!         "bool": {
//!             "must": [
//!                 { "term": { "name": "test" } },
//!                 { "terms": { "tag": ["a", "b"] } }
//!             ]
//!         }
//!     }
//! }
//! ```
//!
//! Matches are typed ([`FieldMatch`]); untyped JSON input goes through the
//! fallible [`FieldMatch::from_json`] / [`FilterBuilder::from_json`] entry
//! points, which reject anything that is not a string or an array of strings
//! before a request body is ever produced.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::{ClientError, ClientResult};

/// How a single field must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatch {
    /// The field must equal this value exactly (a `term` clause).
    Exact(String),
    /// The field must equal one of these values (a `terms` clause).
    AnyOf(Vec<String>),
}

impl FieldMatch {
    /// Converts an untyped JSON value into a match, rejecting any shape other
    /// than a string or an array of strings.
    pub fn from_json(field: &str, value: &Value) -> ClientResult<Self> {
        match value {
            Value::String(s) => Ok(FieldMatch::Exact(s.clone())),
            Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(s) => values.push(s.to_string()),
                        None => {
                            return Err(ClientError::InvalidFilterValue {
                                field: field.to_string(),
                            });
                        }
                    }
                }
                Ok(FieldMatch::AnyOf(values))
            }
            _ => Err(ClientError::InvalidFilterValue {
                field: field.to_string(),
            }),
        }
    }

    /// Renders the match as a `term`/`terms` clause for the given field.
    fn clause(&self, field: &str) -> Value {
        let mut inner = Map::new();
        match self {
            FieldMatch::Exact(value) => {
                inner.insert(field.to_string(), Value::String(value.clone()));
                json!({ "term": inner })
            }
            FieldMatch::AnyOf(values) => {
                inner.insert(field.to_string(), json!(values));
                json!({ "terms": inner })
            }
        }
    }
}

impl From<&str> for FieldMatch {
    fn from(value: &str) -> Self {
        FieldMatch::Exact(value.to_string())
    }
}

impl From<String> for FieldMatch {
    fn from(value: String) -> Self {
        FieldMatch::Exact(value)
    }
}

impl From<Vec<String>> for FieldMatch {
    fn from(values: Vec<String>) -> Self {
        FieldMatch::AnyOf(values)
    }
}

impl From<&[&str]> for FieldMatch {
    fn from(values: &[&str]) -> Self {
        FieldMatch::AnyOf(values.iter().map(|s| s.to_string()).collect())
    }
}

/// Builds a boolean must-filter from field matches.
///
/// Fields combine conjunctively, so ordering is semantically irrelevant; they
/// are kept sorted by name so the emitted JSON is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterBuilder {
    fields: BTreeMap<String, FieldMatch>,
}

impl FilterBuilder {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a match for a field. A second match for the same field replaces
    /// the first.
    pub fn field(mut self, name: impl Into<String>, matcher: impl Into<FieldMatch>) -> Self {
        self.fields.insert(name.into(), matcher.into());
        self
    }

    /// Builds a filter from an untyped JSON object, one match per key.
    ///
    /// Fails with [`ClientError::InvalidFilterValue`] before any network call
    /// when a value is neither a string nor an array of strings.
    pub fn from_json(object: &Map<String, Value>) -> ClientResult<Self> {
        let mut builder = Self::new();
        for (field, value) in object {
            let matcher = FieldMatch::from_json(field, value)?;
            builder.fields.insert(field.clone(), matcher);
        }
        Ok(builder)
    }

    /// Whether the filter has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The number of fields in the filter.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Renders the filter expression: `{"filter":{"bool":{"must":[...]}}}`.
    pub fn build(&self) -> Value {
        let must: Vec<Value> = self
            .fields
            .iter()
            .map(|(field, matcher)| matcher.clause(field))
            .collect();
        json!({ "filter": { "bool": { "must": must } } })
    }

    /// Renders a complete search body with the filter nested under a
    /// `filtered` query.
    pub fn to_query(&self) -> Value {
        json!({ "query": { "filtered": self.build() } })
    }
}
