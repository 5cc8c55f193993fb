//! Service configuration module.
//!
//! Handles loading, validating, and merging `iiif.toml`. The file is optional:
//! stock defaults are the base layer and the user's file only overrides the
//! keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! url = "http://localhost:5000"          # Base for manifest and canvas ids
//! logo = "/base/images/ckan-logo.png"    # Site-relative path or absolute URL
//!
//! [server]
//! bind = "127.0.0.1:5000"                # Address for `serve`
//!
//! [store]
//! path = "data"                          # Directory store root
//!
//! [licences]                             # Extra or overriding licence id -> URL
//! # my-licence = "https://example.org/licence"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::builders::record::BuildContext;
use crate::licences::LicenceRegister;
use crate::site::SiteUrls;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "iiif.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration loaded from `iiif.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Public site addresses used inside built documents.
    pub site: SiteConfig,
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Where resources and records are read from.
    pub store: StoreConfig,
    /// Licence ids added to (or replacing) the built-in register.
    pub licences: BTreeMap<String, String>,
}

impl ServiceConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.site.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "site.url must start with http:// or https://, got {url:?}"
            )));
        }
        if self.site.logo.trim().is_empty() {
            return Err(ConfigError::Validation("site.logo must not be empty".into()));
        }
        self.bind_addr()?;
        if let Some((id, _)) = self.licences.iter().find(|(_, url)| url.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "licences.{id} must not be empty"
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "server.bind must be a socket address, got {:?}",
                self.server.bind
            ))
        })
    }

    pub fn site_urls(&self) -> SiteUrls {
        SiteUrls::new(&self.site.url, &self.site.logo)
    }

    pub fn licence_register(&self) -> LicenceRegister {
        LicenceRegister::with_extra(&self.licences)
    }

    /// Everything the record builder needs from configuration.
    pub fn build_context(&self) -> BuildContext {
        BuildContext {
            urls: self.site_urls(),
            licences: self.licence_register(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute base URL; a trailing `/` is ignored.
    pub url: String,
    /// Logo shown on every manifest.
    pub logo: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            logo: "/base/images/ckan-logo.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Root of the directory store, relative to the working directory.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ServiceConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ServiceConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ServiceConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to stock defaults when it
/// doesn't exist.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `iiif.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# IIIF Records Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

[site]
# Absolute base URL. Manifest ids are <url>/iiif/<identifier>.
url = "http://localhost:5000"
# Logo shown on every manifest. An absolute URL (http://, https:// or //) is
# used as given; anything else is a path served from the site.
logo = "/base/images/ckan-logo.png"

[server]
# Listen address for `iiif-records serve`.
bind = "127.0.0.1:5000"

[store]
# Directory store root:
#   <path>/<resource_id>/resource.toml
#   <path>/<resource_id>/records/<record_id>.json
path = "data"

[licences]
# Extra licences, or replacements for the built-in ones, as id = "URL".
# my-licence = "https://example.org/licence"
"##
}
