//! Image reference extraction.
//!
//! A resource names the record field that carries its images. That field can
//! take several shapes, and every shape resolves to the same ordered list of
//! reference strings:
//!
//! | Field value | Result |
//! |-------------|--------|
//! | absent, or no image field configured | `[]` |
//! | `"a.jpg"` | `["a.jpg"]` |
//! | `"a.jpg,b.jpg"` with delimiter `,` | `["a.jpg", "b.jpg"]` |
//! | `["a.jpg", "b.jpg"]` | verbatim; the delimiter is never applied to a list |
//! | `[{"identifier": "a.jpg", ...}, ...]` | each element's `identifier` |
//!
//! Whether a list holds objects is decided by its first element; mixed lists
//! are not supported.

use crate::types::{ResourceConfig, RecordData, stringify, value_kind};
use serde_json::Value;
use thiserror::Error;

/// Key holding the image reference in structured image entries.
pub const IDENTIFIER_KEY: &str = "identifier";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImageError {
    #[error("image entry {index} has no string identifier")]
    MissingIdentifier { index: usize },
    #[error("image field holds an unsupported {0} value")]
    UnsupportedValue(&'static str),
}

/// Resolve the record's image field into ordered image references.
pub fn extract_images(
    resource: &ResourceConfig,
    record: &RecordData,
) -> Result<Vec<String>, ImageError> {
    let Some(value) = resource.image_field().and_then(|field| record.get(field)) else {
        return Ok(Vec::new());
    };

    match value {
        Value::Array(items) => match items.first() {
            None => Ok(Vec::new()),
            Some(Value::Object(_)) => identifiers(items),
            Some(_) => Ok(items.iter().map(stringify).collect()),
        },
        Value::String(s) => Ok(match resource.image_delimiter() {
            Some(delimiter) => s.split(delimiter).map(String::from).collect(),
            None => vec![s.clone()],
        }),
        Value::Null => Ok(Vec::new()),
        Value::Object(_) => Err(ImageError::UnsupportedValue(value_kind(value))),
        scalar => Ok(vec![stringify(scalar)]),
    }
}

fn identifiers(items: &[Value]) -> Result<Vec<String>, ImageError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.get(IDENTIFIER_KEY)
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or(ImageError::MissingIdentifier { index })
        })
        .collect()
}
