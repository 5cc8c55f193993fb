//! Record-level manifests.
//!
//! Identifiers of the form `resource/<resource_id>/record/<record_id>` name
//! one record of one resource. The manifest for it has:
//!
//! - **label**: the record's title field (per the resource config), falling
//!   back to the record `_id`
//! - **metadata**: every record field, in record order
//! - **rights**: the URL of the resource's image licence (default `cc-by`)
//! - **items**: one canvas per image reference found in the image field
//! - **logo**: the site logo
//!
//! A record with no images has no manifest: building it is a [`BuildError`].

use super::{
    BuildError, BuilderError, IiifBuilder, IiifResource, InvalidArgument, Params, check_params,
    param_string,
};
use crate::images::extract_images;
use crate::licences::LicenceRegister;
use crate::manifest::{
    Canvas, LanguageMap, Logo, Manifest, MetadataEntry, PRESENTATION_CONTEXT, ResourceType,
};
use crate::matcher::IdentifierPattern;
use crate::site::SiteUrls;
use crate::store::{DataStore, LookupError};
use crate::types::{RECORD_ID_FIELD, RecordData, ResourceConfig, stringify};
use serde_json::Value;
use std::sync::{Arc, LazyLock};

pub const BUILDER_ID: &str = "record";

const RESOURCE_ID_PARAM: &str = "resource_id";
const RECORD_ID_PARAM: &str = "record_id";

static RECORD_PATTERN: LazyLock<IdentifierPattern> = LazyLock::new(|| {
    IdentifierPattern::new(r"resource/(?P<resource_id>.+?)/record/(?P<record_id>.+)")
        .expect("record identifier pattern must compile")
});

/// The identifier of a record's manifest.
pub fn record_manifest_id(resource_id: &str, record_id: &str) -> String {
    format!("resource/{resource_id}/record/{record_id}")
}

/// Split a record manifest identifier into `(resource_id, record_id)`.
pub fn parse_record_identifier(identifier: &str) -> Option<(String, String)> {
    let mut params = RECORD_PATTERN.match_identifier(identifier)?;
    Some((
        params.remove(RESOURCE_ID_PARAM)?,
        params.remove(RECORD_ID_PARAM)?,
    ))
}

/// Everything besides the resource and record that goes into a manifest.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub urls: SiteUrls,
    pub licences: LicenceRegister,
}

pub struct RecordManifestBuilder {
    store: Arc<dyn DataStore>,
    context: BuildContext,
}

impl RecordManifestBuilder {
    pub fn new(store: Arc<dyn DataStore>, context: BuildContext) -> Self {
        Self { store, context }
    }
}

/// Map a lookup failure: a missing entry is an expected build failure,
/// anything else is a store fault.
fn lookup_failure(identifier: &str, error: LookupError) -> BuilderError {
    match error {
        LookupError::NotFound(what) => {
            BuildError::new(identifier, format!("{what} not found")).into()
        }
        other => BuilderError::Lookup(other),
    }
}

impl IiifBuilder for RecordManifestBuilder {
    fn match_and_build(&self, identifier: &str) -> Result<Option<IiifResource>, BuilderError> {
        let Some((resource_id, record_id)) = parse_record_identifier(identifier) else {
            return Ok(None);
        };

        let resource = self
            .store
            .resource_show(&resource_id)
            .map_err(|e| lookup_failure(identifier, e))?;
        let record = self
            .store
            .record_show(&resource_id, &record_id)
            .map_err(|e| lookup_failure(identifier, e))?;

        let manifest = build_record_manifest(&resource, &record, &self.context)?;
        Ok(Some(serde_json::to_value(manifest)?))
    }

    fn build_identifier(&self, params: &Params) -> Result<String, InvalidArgument> {
        check_params(params, &[RESOURCE_ID_PARAM, RECORD_ID_PARAM])?;
        let resource_id = param_string(params, RESOURCE_ID_PARAM)?;
        let record_id = param_string(params, RECORD_ID_PARAM)?;
        Ok(record_manifest_id(&resource_id, &record_id))
    }
}

/// Build the manifest for the images held in `record`.
pub fn build_record_manifest(
    resource: &ResourceConfig,
    record: &RecordData,
    context: &BuildContext,
) -> Result<Manifest, BuildError> {
    let manifest_id = record_manifest_id(&resource.id, &record.id());
    let fail = |reason: String| BuildError::new(manifest_id.as_str(), reason);

    let images = extract_images(resource, record).map_err(|e| fail(e.to_string()))?;
    if images.is_empty() {
        return Err(fail("No images found".into()));
    }

    let label = build_label(resource, record).ok_or_else(|| {
        fail(format!(
            "Title field {} not found",
            resource.title_field().unwrap_or(RECORD_ID_FIELD)
        ))
    })?;
    let rights = build_rights(resource, &context.licences)
        .ok_or_else(|| fail(format!("Licence {} not found", resource.licence_id())))?;

    Ok(Manifest {
        context: PRESENTATION_CONTEXT.to_string(),
        id: context.urls.resource_url(&manifest_id),
        kind: ResourceType::Manifest,
        label,
        metadata: build_metadata(record),
        rights,
        items: images
            .iter()
            .enumerate()
            .map(|(n, image)| build_canvas(&manifest_id, n, image, &context.urls))
            .collect(),
        logo: vec![Logo::site(context.urls.logo_url())],
    })
}

/// The title field's value when the resource names one, else the record id.
/// The label is always one string; list titles are stringified whole.
/// `None` when the named title field isn't in the record.
pub fn build_label(resource: &ResourceConfig, record: &RecordData) -> Option<LanguageMap> {
    match resource.title_field() {
        Some(field) => record.get(field).map(|v| LanguageMap::single(stringify(v))),
        None => Some(LanguageMap::single(record.id())),
    }
}

/// The licence URL for the resource's images.
pub fn build_rights(resource: &ResourceConfig, licences: &LicenceRegister) -> Option<String> {
    licences.url(resource.licence_id()).map(String::from)
}

/// One label/value entry per record field, in record order.
pub fn build_metadata(record: &RecordData) -> Vec<MetadataEntry> {
    // Nested objects and arrays-of-arrays are stringified whole.
    record
        .fields()
        .map(|(field, value)| MetadataEntry {
            label: LanguageMap::single(field.as_str()),
            value: wrap_value(value),
        })
        .collect()
}

/// Canvas `n` of the manifest, painted with `image`.
pub fn build_canvas(manifest_id: &str, n: usize, image: &str, urls: &SiteUrls) -> Canvas {
    Canvas::painted(urls.resource_url(&format!("{manifest_id}/canvas/{n}")), image)
}

/// Language-wrap a field value. Lists keep their elements as separate values.
fn wrap_value(value: &Value) -> LanguageMap {
    match value {
        Value::Array(items) => LanguageMap::many(items.iter().map(stringify).collect()),
        other => LanguageMap::single(stringify(other)),
    }
}
