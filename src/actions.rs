//! Named actions for in-process and API callers.
//!
//! | Action | Input | Result |
//! |--------|-------|--------|
//! | `build_iiif_resource` | `identifier` | the IIIF document, or `null` |
//! | `build_iiif_identifier` | `builder_id` + the builder's named params | the identifier, or `null` |
//!
//! Both actions are open to every caller, anonymous included.

use crate::builders::{BuilderError, IiifResource, InvalidArgument, Params};
use crate::registry::BuilderRegistry;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    #[error(transparent)]
    Builder(#[from] BuilderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    BuildIiifResource,
    BuildIiifIdentifier,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::BuildIiifResource, Action::BuildIiifIdentifier];

    pub fn name(self) -> &'static str {
        match self {
            Action::BuildIiifResource => "build_iiif_resource",
            Action::BuildIiifIdentifier => "build_iiif_identifier",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// Access policy for actions: everything is allowed.
pub fn check_access(_action: Action) -> bool {
    true
}

/// A required non-empty string field of an action's input.
fn required_str<'a>(data: &'a Params, field: &str) -> Result<&'a str, ActionError> {
    match data.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err(ActionError::Validation(format!("{field}: Missing value")))
        }
        Some(_) => Err(ActionError::Validation(format!("{field}: Must be a string"))),
    }
}

#[derive(Debug, Clone)]
pub struct Actions {
    registry: Arc<BuilderRegistry>,
}

impl Actions {
    pub fn new(registry: Arc<BuilderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BuilderRegistry {
        &self.registry
    }

    /// Build the IIIF resource for `identifier` using the first builder that
    /// produces one.
    pub fn build_iiif_resource(
        &self,
        identifier: &str,
    ) -> Result<Option<IiifResource>, ActionError> {
        if identifier.is_empty() {
            return Err(ActionError::Validation("identifier: Missing value".into()));
        }
        Ok(self.registry.build_resource(identifier)?)
    }

    /// Construct an identifier for `builder_id` from its named parameters.
    pub fn build_iiif_identifier(
        &self,
        builder_id: &str,
        params: &Params,
    ) -> Result<Option<String>, ActionError> {
        Ok(self.registry.build_identifier(builder_id, params)?)
    }

    /// Run an action from a data dict, returning its JSON result.
    pub fn call(&self, action: Action, data: &Params) -> Result<Value, ActionError> {
        match action {
            Action::BuildIiifResource => {
                let identifier = required_str(data, "identifier")?;
                Ok(self.build_iiif_resource(identifier)?.unwrap_or(Value::Null))
            }
            Action::BuildIiifIdentifier => {
                let builder_id = required_str(data, "builder_id")?;
                let mut params = data.clone();
                params.remove("builder_id");
                Ok(self
                    .build_iiif_identifier(builder_id, &params)?
                    .map_or(Value::Null, Value::String))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use crate::test_helpers::*;
    use serde_json::json;

    fn stub_actions(builders: &[(&str, StubBuilder)]) -> Actions {
        Actions::new(Arc::new(registry_of(builders)))
    }

    fn record_actions() -> Actions {
        Actions::new(Arc::new(
            RegistryBuilder::with_defaults(Arc::new(sample_store()), test_context()).freeze(),
        ))
    }

    #[test]
    fn action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("resource_show"), None);
    }

    #[test]
    fn access_is_always_allowed() {
        assert!(Action::ALL.into_iter().all(check_access));
    }

    #[test]
    fn resource_match() {
        let actions = stub_actions(&[("mock", StubBuilder::returning(json!({"beans": 3})))]);
        let result = actions
            .call(Action::BuildIiifResource, &params(json!({"identifier": "test"})))
            .unwrap();
        assert_eq!(result, json!({"beans": 3}));
    }

    #[test]
    fn resource_no_match_is_null() {
        let actions = stub_actions(&[("mock", StubBuilder::no_match())]);
        let result = actions
            .call(Action::BuildIiifResource, &params(json!({"identifier": "test"})))
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn resource_requires_identifier() {
        let actions = stub_actions(&[]);
        for data in [json!({}), json!({"identifier": ""}), json!({"identifier": 4})] {
            let err = actions
                .call(Action::BuildIiifResource, &params(data))
                .unwrap_err();
            assert!(matches!(err, ActionError::Validation(_)));
        }
        assert!(matches!(
            actions.build_iiif_resource(""),
            Err(ActionError::Validation(_))
        ));
    }

    #[test]
    fn identifier_no_builders() {
        let actions = stub_actions(&[]);
        let result = actions
            .call(Action::BuildIiifIdentifier, &params(json!({"builder_id": "test"})))
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn identifier_passes_remaining_params() {
        let builder = StubBuilder::no_match().with_identifier("hello!");
        let actions = stub_actions(&[("mock", builder.clone())]);
        let result = actions
            .call(
                Action::BuildIiifIdentifier,
                &params(json!({"builder_id": "mock", "c": 6, "x": 7})),
            )
            .unwrap();
        assert_eq!(result, json!("hello!"));
        assert_eq!(builder.identifier_calls(), vec![params(json!({"c": 6, "x": 7}))]);
    }

    #[test]
    fn identifier_wrong_args() {
        let err = record_actions()
            .call(
                Action::BuildIiifIdentifier,
                &params(json!({"builder_id": "record", "bananas": 63})),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::InvalidArgument(InvalidArgument::Unexpected(_))
        ));
    }

    #[test]
    fn identifier_record_builder() {
        let result = record_actions()
            .call(
                Action::BuildIiifIdentifier,
                &params(json!({"builder_id": "record", "resource_id": "xyz", "record_id": 5})),
            )
            .unwrap();
        assert_eq!(result, json!("resource/xyz/record/5"));
    }

    #[test]
    fn record_manifest_through_action() {
        let doc = record_actions()
            .build_iiif_resource("resource/abc/record/5")
            .unwrap()
            .unwrap();
        assert_eq!(doc["type"], "Manifest");
    }
}
