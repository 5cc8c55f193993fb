//! Shared test utilities.
//!
//! Fixture constructors for resources, records and build settings, plus a
//! [`StubBuilder`] whose outcome is fixed up front and which records every
//! identifier it is asked to build.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let builder = StubBuilder::no_match();
//! let registry = registry_of(&[("mock", builder.clone())]);
//! assert!(registry.build_resource("test").unwrap().is_none());
//! assert_eq!(builder.calls(), vec!["test"]);
//! ```

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::builders::record::BuildContext;
use crate::builders::{
    BuildError, BuilderError, IiifBuilder, IiifResource, InvalidArgument, Params,
};
use crate::licences::LicenceRegister;
use crate::matcher::NamedParams;
use crate::registry::{BuilderRegistry, RegistryBuilder};
use crate::site::SiteUrls;
use crate::store::{LookupError, MemoryStore};
use crate::types::{RecordData, ResourceConfig};

// =========================================================================
// Fixtures
// =========================================================================

pub fn resource(value: Value) -> ResourceConfig {
    serde_json::from_value(value).unwrap()
}

pub fn record(value: Value) -> RecordData {
    RecordData::from_value(value).unwrap()
}

pub fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        other => panic!("params must be a JSON object, got {other}"),
    }
}

pub fn named(pairs: &[(&str, &str)]) -> NamedParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn test_site() -> SiteUrls {
    SiteUrls::new("http://localhost:5000", "/base/images/ckan-logo.png")
}

pub fn test_context() -> BuildContext {
    BuildContext {
        urls: test_site(),
        licences: LicenceRegister::default(),
    }
}

/// Resource `abc` with record `5`: a titled record holding one image.
pub fn sample_store() -> MemoryStore {
    MemoryStore::new()
        .with_resource(resource(json!({
            "id": "abc",
            "title_field": "title",
            "image_field": "images",
        })))
        .with_record(
            "abc",
            record(json!({"_id": 5, "title": "Cat", "images": ["http://x/img1.jpg"]})),
        )
}

// =========================================================================
// Stub builder
// =========================================================================

#[derive(Debug, Clone)]
pub enum StubOutcome {
    NoMatch,
    Build(Value),
    Fail,
    Unexpected,
}

/// Builder with a fixed outcome. Clones share the call log.
#[derive(Debug, Clone)]
pub struct StubBuilder {
    outcome: StubOutcome,
    identifier: Result<String, InvalidArgument>,
    calls: Arc<Mutex<Vec<String>>>,
    identifier_calls: Arc<Mutex<Vec<Params>>>,
}

impl StubBuilder {
    pub fn new(outcome: StubOutcome) -> Self {
        Self {
            outcome,
            identifier: Ok("stub-identifier".into()),
            calls: Arc::default(),
            identifier_calls: Arc::default(),
        }
    }

    pub fn no_match() -> Self {
        Self::new(StubOutcome::NoMatch)
    }

    pub fn returning(doc: Value) -> Self {
        Self::new(StubOutcome::Build(doc))
    }

    pub fn failing() -> Self {
        Self::new(StubOutcome::Fail)
    }

    pub fn broken() -> Self {
        Self::new(StubOutcome::Unexpected)
    }

    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = Ok(identifier.into());
        self
    }

    /// Identifiers passed to `match_and_build`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Params passed to `build_identifier`, in call order.
    pub fn identifier_calls(&self) -> Vec<Params> {
        self.identifier_calls.lock().unwrap().clone()
    }
}

impl IiifBuilder for StubBuilder {
    fn match_and_build(&self, identifier: &str) -> Result<Option<IiifResource>, BuilderError> {
        self.calls.lock().unwrap().push(identifier.to_string());
        match &self.outcome {
            StubOutcome::NoMatch => Ok(None),
            StubOutcome::Build(doc) => Ok(Some(doc.clone())),
            StubOutcome::Fail => Err(BuildError::new(identifier, "oh no!").into()),
            StubOutcome::Unexpected => Err(BuilderError::Lookup(LookupError::Io(
                std::io::Error::other("oh no!"),
            ))),
        }
    }

    fn build_identifier(&self, params: &Params) -> Result<String, InvalidArgument> {
        self.identifier_calls.lock().unwrap().push(params.clone());
        self.identifier.clone()
    }
}

/// A frozen registry holding the given builders in order.
pub fn registry_of(builders: &[(&str, StubBuilder)]) -> BuilderRegistry {
    let mut registry = RegistryBuilder::new();
    for (key, builder) in builders {
        registry.register(key, Arc::new(builder.clone())).unwrap();
    }
    registry.freeze()
}
