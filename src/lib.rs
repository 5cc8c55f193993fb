//! # IIIF Records
//!
//! Serves IIIF Presentation v3 manifests for dataset records that hold images.
//! Each record of a resource whose configuration names an image field becomes
//! one manifest: the record's fields become metadata and every image reference
//! becomes a canvas.
//!
//! # Architecture: Identifier In, Document Out
//!
//! ```text
//! "resource/abc/record/5"
//!     → BuilderRegistry       tries builders in registration order
//!     → RecordManifestBuilder pattern match, store lookup, manifest build
//!     → serde_json::Value     served at /iiif/<identifier>
//! ```
//!
//! Builders also run in reverse: given named parameters, a builder produces the
//! identifier it would answer to, so links can be generated without knowing
//! the identifier grammar.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`matcher`] | Anchored regex patterns with named captures for identifier grammars |
//! | [`types`] | Resource configuration and record data as read from the store |
//! | [`images`] | Extracts image references from a record's image field |
//! | [`manifest`] | Serialisable IIIF Presentation v3 document types |
//! | [`licences`] | Licence id to URL register used for `rights` |
//! | [`site`] | Public URLs for resources and static assets |
//! | [`store`] | The `DataStore` seam plus in-memory and directory implementations |
//! | [`builders`] | The `IiifBuilder` trait, its errors, and the record manifest builder |
//! | [`registry`] | Ordered builder registry and first-match dispatch |
//! | [`actions`] | Named actions wrapping dispatch for API callers |
//! | [`server`] | Axum routes for `/iiif/*` and `/api/action/*` |
//! | [`config`] | `iiif.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failed Builds Stop Dispatch
//!
//! Once a builder has matched an identifier, any expected failure (missing
//! record, no images, unknown licence) ends dispatch with no result. Letting
//! the next builder try would risk answering an identifier with a document
//! of the wrong kind. Only unexpected failures (store I/O) surface as errors.
//!
//! ## Typed Documents, Untyped Dispatch
//!
//! The record builder assembles a typed [`manifest::Manifest`] and hands the
//! registry a `serde_json::Value`, so builders for other IIIF document kinds
//! can share the same trait.

pub mod actions;
pub mod builders;
pub mod config;
pub mod images;
pub mod licences;
pub mod manifest;
pub mod matcher;
pub mod output;
pub mod registry;
pub mod server;
pub mod site;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
