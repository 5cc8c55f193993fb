//! IIIF resource builders.
//!
//! A builder recognises one class of identifiers and produces the IIIF
//! resource they name. Every builder offers the same two operations through
//! [`IiifBuilder`]:
//!
//! - [`match_and_build`](IiifBuilder::match_and_build): `Ok(None)` when the
//!   identifier isn't in the builder's grammar, `Ok(Some(doc))` on success, or
//!   an error once the identifier matched but the build could not finish.
//! - [`build_identifier`](IiifBuilder::build_identifier): the inverse, from
//!   named parameters to the identifier string.
//!
//! Builders don't log. They return typed errors and leave reporting to the
//! registry's dispatch loop.
//!
//! The only builder shipped is [`record::RecordManifestBuilder`].

pub mod record;

use crate::store::LookupError;
use crate::types::value_kind;
use serde_json::{Map, Value};
use thiserror::Error;

/// A built IIIF document (manifest, canvas, collection, ...).
pub type IiifResource = Value;

/// Named parameters for [`IiifBuilder::build_identifier`].
pub type Params = Map<String, Value>;

/// A builder matched an identifier but could not produce the resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to build {identifier} due to {reason}")]
pub struct BuildError {
    pub identifier: String,
    pub reason: String,
}

impl BuildError {
    pub fn new(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum BuilderError {
    /// Expected failure; dispatch reports it and stops.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The backing store failed for a reason other than a missing entry.
    #[error("Lookup failed: {0}")]
    Lookup(LookupError),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Wrong or missing named parameters passed to `build_identifier`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("missing required parameter: {0}")]
    Missing(String),
    #[error("unexpected parameter: {0}")]
    Unexpected(String),
    #[error("parameter {name} must be a string or number, got {kind}")]
    InvalidType { name: String, kind: &'static str },
}

pub trait IiifBuilder: Send + Sync {
    fn match_and_build(&self, identifier: &str) -> Result<Option<IiifResource>, BuilderError>;

    fn build_identifier(&self, params: &Params) -> Result<String, InvalidArgument>;
}

/// Reject any parameter not in `accepted`.
pub fn check_params(params: &Params, accepted: &[&str]) -> Result<(), InvalidArgument> {
    match params.keys().find(|k| !accepted.contains(&k.as_str())) {
        Some(unexpected) => Err(InvalidArgument::Unexpected(unexpected.clone())),
        None => Ok(()),
    }
}

/// A required string-or-number parameter, as a string.
pub fn param_string(params: &Params, name: &str) -> Result<String, InvalidArgument> {
    match params.get(name) {
        None => Err(InvalidArgument::Missing(name.to_string())),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(InvalidArgument::InvalidType {
            name: name.to_string(),
            kind: value_kind(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        }
    }

    #[test]
    fn build_error_message() {
        let err = BuildError::new("resource/beans/record/4", "Resource beans not found");
        assert_eq!(
            err.to_string(),
            "Failed to build resource/beans/record/4 due to Resource beans not found"
        );
    }

    #[test]
    fn check_params_rejects_unknown_keys() {
        let p = params(json!({"c": 6, "resource_id": "x"}));
        assert_eq!(
            check_params(&p, &["resource_id", "record_id"]),
            Err(InvalidArgument::Unexpected("c".into()))
        );
        assert_eq!(check_params(&p, &["c", "resource_id"]), Ok(()));
    }

    #[test]
    fn param_string_accepts_strings_and_numbers() {
        let p = params(json!({"a": "xyz", "b": 5, "c": [1], "d": null}));
        assert_eq!(param_string(&p, "a"), Ok("xyz".into()));
        assert_eq!(param_string(&p, "b"), Ok("5".into()));
        assert_eq!(
            param_string(&p, "c"),
            Err(InvalidArgument::InvalidType {
                name: "c".into(),
                kind: "array"
            })
        );
        assert_eq!(
            param_string(&p, "d"),
            Err(InvalidArgument::InvalidType {
                name: "d".into(),
                kind: "null"
            })
        );
        assert_eq!(param_string(&p, "e"), Err(InvalidArgument::Missing("e".into())));
    }
}
