//! IIIF Presentation API v3 document types.
//!
//! Only the subset of the Presentation model the record builder emits is
//! modelled here: a [`Manifest`] holding one [`Canvas`] per image, each canvas
//! painted by a single [`Annotation`] inside a single [`AnnotationPage`].
//!
//! Serialization order of struct fields matches the key order viewers commonly
//! show in the JSON (`@context`, `id`, `type`, `label`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PRESENTATION_CONTEXT: &str = "http://iiif.io/api/presentation/3/context.json";

/// Language key used for values with no known language.
pub const NO_LANGUAGE: &str = "none";

/// No image dimensions are available when building, so every canvas uses this
/// fixed size.
pub const CANVAS_WIDTH: u32 = 1000;
pub const CANVAS_HEIGHT: u32 = 1000;

pub const LOGO_FORMAT: &str = "image/png";
pub const LOGO_WIDTH: u32 = 120;
pub const LOGO_HEIGHT: u32 = 56;

/// IIIF language map: language code → values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageMap(pub BTreeMap<String, Vec<String>>);

impl LanguageMap {
    /// Wrap values under the given language.
    pub fn in_language(language: &str, values: Vec<String>) -> Self {
        Self(BTreeMap::from([(language.to_string(), values)]))
    }

    /// Wrap a single value under [`NO_LANGUAGE`].
    pub fn single(value: impl Into<String>) -> Self {
        Self::in_language(NO_LANGUAGE, vec![value.into()])
    }

    /// Wrap several values under [`NO_LANGUAGE`].
    pub fn many(values: Vec<String>) -> Self {
        Self::in_language(NO_LANGUAGE, values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Manifest,
    Canvas,
    AnnotationPage,
    Annotation,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motivation {
    Painting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "@context")]
    pub context: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub label: LanguageMap,
    pub metadata: Vec<MetadataEntry>,
    pub rights: String,
    pub items: Vec<Canvas>,
    pub logo: Vec<Logo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub label: LanguageMap,
    pub value: LanguageMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub width: u32,
    pub height: u32,
    pub label: LanguageMap,
    pub items: Vec<AnnotationPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub items: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub motivation: Motivation,
    pub body: ImageBody,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBody {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub format: String,
    pub width: u32,
    pub height: u32,
}

impl Logo {
    /// The site logo at its fixed display size.
    pub fn site(url: impl Into<String>) -> Self {
        Self {
            id: url.into(),
            kind: ResourceType::Image,
            format: LOGO_FORMAT.to_string(),
            width: LOGO_WIDTH,
            height: LOGO_HEIGHT,
        }
    }
}

impl Canvas {
    /// A fixed-size canvas painted with a single image.
    ///
    /// The annotation page is `{canvas_id}/0` and its only annotation is
    /// `{canvas_id}/0/0`.
    pub fn painted(canvas_id: String, image: &str) -> Self {
        let page_id = format!("{canvas_id}/0");
        let annotation_id = format!("{page_id}/0");
        Self {
            id: canvas_id.clone(),
            kind: ResourceType::Canvas,
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            label: LanguageMap::single(image),
            items: vec![AnnotationPage {
                id: page_id,
                kind: ResourceType::AnnotationPage,
                items: vec![Annotation {
                    id: annotation_id,
                    kind: ResourceType::Annotation,
                    motivation: Motivation::Painting,
                    body: ImageBody {
                        id: image.to_string(),
                        kind: ResourceType::Image,
                    },
                    target: canvas_id,
                }],
            }],
        }
    }
}
