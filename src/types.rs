//! Host-platform data shapes consumed by the builders.
//!
//! Both types are read-only inputs: no builder mutates them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Licence used when a resource does not name one.
pub const DEFAULT_LICENCE: &str = "cc-by";

/// Imaging configuration attached to a data resource.
///
/// Field names accept CKAN's underscore-prefixed resource keys as aliases so
/// resource dicts exported from the platform can be dropped in unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Stable resource identifier.
    pub id: String,
    /// Record field supplying the manifest label.
    #[serde(default, alias = "_title_field", skip_serializing_if = "Option::is_none")]
    pub title_field: Option<String>,
    /// Record field holding image reference(s).
    #[serde(default, alias = "_image_field", skip_serializing_if = "Option::is_none")]
    pub image_field: Option<String>,
    /// Separator for image fields that hold a delimited string.
    #[serde(default, alias = "_image_delimiter", skip_serializing_if = "Option::is_none")]
    pub image_delimiter: Option<String>,
    /// Licence register key for the images.
    #[serde(default, alias = "_image_licence", skip_serializing_if = "Option::is_none")]
    pub image_licence: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl ResourceConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn title_field(&self) -> Option<&str> {
        non_empty(&self.title_field)
    }

    pub fn image_field(&self) -> Option<&str> {
        non_empty(&self.image_field)
    }

    pub fn image_delimiter(&self) -> Option<&str> {
        non_empty(&self.image_delimiter)
    }

    /// Licence key for the resource, falling back to [`DEFAULT_LICENCE`] when
    /// unset or empty.
    pub fn licence_id(&self) -> &str {
        non_empty(&self.image_licence).unwrap_or(DEFAULT_LICENCE)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("record data has no _id field")]
    MissingId,
    #[error("record _id must be a string or number, got {0}")]
    InvalidId(&'static str),
}

/// Field data for a single record.
///
/// Field order is the order the fields were inserted (or appeared in the
/// source JSON). The `_id` field is always present and is a string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct RecordData {
    fields: Map<String, Value>,
}

pub const RECORD_ID_FIELD: &str = "_id";

impl TryFrom<Map<String, Value>> for RecordData {
    type Error = RecordError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        match fields.get(RECORD_ID_FIELD) {
            None => Err(RecordError::MissingId),
            Some(Value::String(_) | Value::Number(_)) => Ok(Self { fields }),
            Some(other) => Err(RecordError::InvalidId(value_kind(other))),
        }
    }
}

impl From<RecordData> for Map<String, Value> {
    fn from(record: RecordData) -> Self {
        record.fields
    }
}

impl RecordData {
    /// Build a record from a JSON value, which must be an object with `_id`.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(map) => map.try_into(),
            _ => Err(RecordError::MissingId),
        }
    }

    /// The record id in string form (`5` and `"5"` both give `"5"`).
    pub fn id(&self) -> String {
        match &self.fields[RECORD_ID_FIELD] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Short name of a JSON value's kind, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// String form of a scalar or nested value.
///
/// Strings are returned verbatim. Everything else uses its compact JSON
/// rendering; nested objects and arrays are not flattened any further.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
