//! Ordered builder registry and dispatch.
//!
//! # Lifecycle
//!
//! ```text
//! RegistryBuilder::with_defaults(..)   "record" first
//!     .install(&plugin) ...            contributed builders, in order
//!     .freeze()                        → BuilderRegistry (immutable, shared via Arc)
//! ```
//!
//! Keys are unique: registering a key that is already present is refused and
//! the first registrant keeps its slot.
//!
//! # Dispatch
//!
//! [`BuilderRegistry::build_resource`] tries builders in registration order:
//!
//! - a built document is returned at once; later builders are not tried
//! - no match moves on to the next builder
//! - a [`BuildError`](crate::builders::BuildError) is logged and ends the
//!   whole dispatch with no result. A matched-but-failed build must not fall
//!   through to some unrelated builder.
//! - any other error is returned to the caller untouched

use crate::builders::record::{self, BuildContext, RecordManifestBuilder};
use crate::builders::{BuilderError, IiifBuilder, IiifResource, InvalidArgument, Params};
use crate::store::DataStore;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate IIIF builder: {0}")]
    Duplicate(String),
}

type Entry = (String, Arc<dyn IiifBuilder>);

/// A source of builders applied while the registry is being populated.
pub trait BuilderPlugin {
    fn builders(&self) -> Vec<(String, Arc<dyn IiifBuilder>)>;
}

/// Registry under construction.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the record manifest builder.
    pub fn with_defaults(store: Arc<dyn DataStore>, context: BuildContext) -> Self {
        let mut registry = Self::new();
        registry.entries.push((
            record::BUILDER_ID.to_string(),
            Arc::new(RecordManifestBuilder::new(store, context)),
        ));
        registry
    }

    pub fn register(
        &mut self,
        key: &str,
        builder: Arc<dyn IiifBuilder>,
    ) -> Result<(), RegistryError> {
        if self.contains(key) {
            return Err(RegistryError::Duplicate(key.to_string()));
        }
        self.entries.push((key.to_string(), builder));
        Ok(())
    }

    /// Register every builder a plugin contributes. Duplicates are skipped
    /// with a warning.
    pub fn install(&mut self, plugin: &dyn BuilderPlugin) -> &mut Self {
        for (key, builder) in plugin.builders() {
            if let Err(e) = self.register(&key, builder) {
                warn!(builder = %key, "{e}, keeping the first registration");
            }
        }
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn freeze(self) -> BuilderRegistry {
        BuilderRegistry {
            entries: self.entries,
        }
    }
}

/// Populated, read-only registry.
pub struct BuilderRegistry {
    entries: Vec<Entry>,
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BuilderRegistry {
    /// Builder keys in dispatch order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&dyn IiifBuilder> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, b)| b.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the resource for `identifier` with the first builder that
    /// produces one. `Ok(None)` covers both "nothing matched" and "a build
    /// failed"; only unexpected failures are errors.
    pub fn build_resource(&self, identifier: &str) -> Result<Option<IiifResource>, BuilderError> {
        for (key, builder) in &self.entries {
            match builder.match_and_build(identifier) {
                Ok(Some(resource)) => {
                    debug!(builder = %key, identifier, "built IIIF resource");
                    return Ok(Some(resource));
                }
                Ok(None) => continue,
                Err(BuilderError::Build(e)) => {
                    error!(builder = %key, identifier, error = %e, "IIIF build failed");
                    return Ok(None);
                }
                Err(other) => return Err(other),
            }
        }
        debug!(identifier, "no IIIF builder matched");
        Ok(None)
    }

    /// Construct an identifier with the named builder. `Ok(None)` when no
    /// builder is registered under `builder_id`.
    pub fn build_identifier(
        &self,
        builder_id: &str,
        params: &Params,
    ) -> Result<Option<String>, InvalidArgument> {
        self.get(builder_id)
            .map(|builder| builder.build_identifier(params))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use serde_json::json;

    // =========================================================================
    // build_resource
    // =========================================================================

    #[test]
    fn no_builders() {
        let registry = registry_of(&[]);
        assert!(registry.is_empty());
        assert!(registry.build_resource("test").unwrap().is_none());
    }

    #[test]
    fn single_match() {
        let registry = registry_of(&[("mock", StubBuilder::returning(json!({"beans": 3})))]);
        assert_eq!(registry.build_resource("test").unwrap(), Some(json!({"beans": 3})));
    }

    #[test]
    fn single_no_match() {
        let builder = StubBuilder::no_match();
        let registry = registry_of(&[("mock", builder.clone())]);
        assert!(registry.build_resource("test").unwrap().is_none());
        assert_eq!(builder.calls(), vec!["test"]);
    }

    #[test]
    fn build_error_is_no_result() {
        let registry = registry_of(&[("mock", StubBuilder::failing())]);
        assert!(registry.build_resource("test").unwrap().is_none());
    }

    #[test]
    fn unexpected_error_propagates() {
        let registry = registry_of(&[("mock", StubBuilder::broken())]);
        let err = registry.build_resource("test").unwrap_err();
        assert!(err.to_string().contains("oh no!"));
    }

    #[test]
    fn later_builder_matches() {
        let first = StubBuilder::no_match();
        let second = StubBuilder::no_match();
        let registry = registry_of(&[
            ("mock1", first.clone()),
            ("mock2", second.clone()),
            ("mock3", StubBuilder::returning(json!({"legs": 489}))),
        ]);
        assert_eq!(registry.build_resource("test").unwrap(), Some(json!({"legs": 489})));
        assert_eq!(first.calls(), vec!["test"]);
        assert_eq!(second.calls(), vec!["test"]);
    }

    #[test]
    fn first_match_wins() {
        let second = StubBuilder::returning(json!({"arms": 5}));
        let registry = registry_of(&[
            ("mock1", StubBuilder::returning(json!({"beans": 3}))),
            ("mock2", second.clone()),
        ]);
        assert_eq!(registry.build_resource("test").unwrap(), Some(json!({"beans": 3})));
        assert!(second.calls().is_empty());
    }

    #[test]
    fn build_error_halts_dispatch() {
        let first = StubBuilder::no_match();
        let third = StubBuilder::returning(json!({"legs": 489}));
        let registry = registry_of(&[
            ("mock1", first.clone()),
            ("mock2", StubBuilder::failing()),
            ("mock3", third.clone()),
        ]);
        assert!(registry.build_resource("test").unwrap().is_none());
        assert_eq!(first.calls(), vec!["test"]);
        assert!(third.calls().is_empty());
    }

    // =========================================================================
    // build_identifier
    // =========================================================================

    #[test]
    fn identifier_without_builders() {
        let registry = registry_of(&[]);
        assert_eq!(registry.build_identifier("test", &params(json!({}))), Ok(None));
    }

    #[test]
    fn identifier_unknown_builder() {
        let registry = registry_of(&[("mock", StubBuilder::no_match())]);
        assert_eq!(registry.build_identifier("not mock", &params(json!({}))), Ok(None));
    }

    #[test]
    fn identifier_delegates_params() {
        let builder = StubBuilder::no_match().with_identifier("hello!");
        let registry = registry_of(&[("mock", builder.clone())]);
        let p = params(json!({"c": 6, "x": 7}));

        assert_eq!(
            registry.build_identifier("mock", &p),
            Ok(Some("hello!".to_string()))
        );
        assert_eq!(builder.identifier_calls(), vec![p]);
    }

    #[test]
    fn identifier_wrong_args_for_record_builder() {
        let registry =
            RegistryBuilder::with_defaults(Arc::new(sample_store()), test_context()).freeze();
        assert_eq!(
            registry.build_identifier(record::BUILDER_ID, &params(json!({"c": 6, "x": 7}))),
            Err(InvalidArgument::Unexpected("c".into()))
        );
    }

    // =========================================================================
    // Registration
    // =========================================================================

    struct Plugin(Vec<(&'static str, StubBuilder)>);

    impl BuilderPlugin for Plugin {
        fn builders(&self) -> Vec<(String, Arc<dyn IiifBuilder>)> {
            self.0
                .iter()
                .map(|(k, b)| (k.to_string(), Arc::new(b.clone()) as Arc<dyn IiifBuilder>))
                .collect()
        }
    }

    #[test]
    fn defaults_register_record_builder_first() {
        let mut registry = RegistryBuilder::with_defaults(Arc::new(sample_store()), test_context());
        registry.install(&Plugin(vec![("extra", StubBuilder::no_match())]));
        let registry = registry.freeze();
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["record", "extra"]);
    }

    #[test]
    fn duplicate_key_is_refused() {
        let mut registry = RegistryBuilder::new();
        registry
            .register("mock", Arc::new(StubBuilder::no_match()))
            .unwrap();
        assert_eq!(
            registry.register("mock", Arc::new(StubBuilder::no_match())),
            Err(RegistryError::Duplicate("mock".into()))
        );
    }

    #[test]
    fn install_keeps_first_registrant() {
        let original = StubBuilder::returning(json!({"first": true}));
        let mut registry = RegistryBuilder::new();
        registry.register("mock", Arc::new(original.clone())).unwrap();
        registry.install(&Plugin(vec![
            ("mock", StubBuilder::returning(json!({"second": true}))),
            ("other", StubBuilder::no_match()),
        ]));
        let registry = registry.freeze();

        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["mock", "other"]);
        assert_eq!(registry.build_resource("x").unwrap(), Some(json!({"first": true})));
    }

    #[test]
    fn record_builder_end_to_end() {
        let registry =
            RegistryBuilder::with_defaults(Arc::new(sample_store()), test_context()).freeze();
        let doc = registry
            .build_resource("resource/abc/record/5")
            .unwrap()
            .unwrap();
        assert_eq!(doc["label"], json!({"none": ["Cat"]}));
        assert!(registry.build_resource("resource/abc/record/6").unwrap().is_none());
        assert!(registry.build_resource("nothing").unwrap().is_none());
    }
}
