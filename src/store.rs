//! Resource and record lookups.
//!
//! Builders never read data themselves: they go through a [`DataStore`],
//! which stands in for the platform's `resource_show` / `record_show` actions.
//! A missing resource or record is [`LookupError::NotFound`]; every other
//! failure is a genuine fault in the backing store.
//!
//! Two stores are provided:
//!
//! - [`MemoryStore`] keeps everything in maps; used by tests and embedders.
//! - [`DirectoryStore`] reads a directory tree on every lookup:
//!
//! ```text
//! data/
//! └── abc/                    # resource id
//!     ├── resource.toml       # ResourceConfig (id defaults to the dir name)
//!     └── records/
//!         ├── 5.json          # RecordData for record 5
//!         └── 6.json
//! ```

use crate::types::{RecordData, ResourceConfig};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Read-only access to resources and their records.
pub trait DataStore: Send + Sync {
    fn resource_show(&self, resource_id: &str) -> Result<ResourceConfig, LookupError>;

    /// Only the record's field data is returned.
    fn record_show(&self, resource_id: &str, record_id: &str) -> Result<RecordData, LookupError>;
}

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    resources: BTreeMap<String, ResourceConfig>,
    records: BTreeMap<(String, String), RecordData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_resource(&mut self, resource: ResourceConfig) {
        self.resources.insert(resource.id.clone(), resource);
    }

    /// Store a record under its own `_id`.
    pub fn insert_record(&mut self, resource_id: &str, record: RecordData) {
        self.records
            .insert((resource_id.to_string(), record.id()), record);
    }

    pub fn with_resource(mut self, resource: ResourceConfig) -> Self {
        self.insert_resource(resource);
        self
    }

    pub fn with_record(mut self, resource_id: &str, record: RecordData) -> Self {
        self.insert_record(resource_id, record);
        self
    }
}

impl DataStore for MemoryStore {
    fn resource_show(&self, resource_id: &str) -> Result<ResourceConfig, LookupError> {
        self.resources
            .get(resource_id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(format!("Resource {resource_id}")))
    }

    fn record_show(&self, resource_id: &str, record_id: &str) -> Result<RecordData, LookupError> {
        self.records
            .get(&(resource_id.to_string(), record_id.to_string()))
            .cloned()
            .ok_or_else(|| LookupError::NotFound(format!("Record {record_id}")))
    }
}

// =============================================================================
// Directory-backed store
// =============================================================================

const RESOURCE_FILENAME: &str = "resource.toml";
const RECORDS_DIR: &str = "records";

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// An id usable as a single path component. Anything else can't name a
/// stored entry, so it is reported as not found.
fn is_plain_component(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

fn read_entry(path: &Path, what: impl FnOnce() -> String) -> Result<String, LookupError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LookupError::NotFound(what()),
        _ => LookupError::Io(e),
    })
}

impl DataStore for DirectoryStore {
    fn resource_show(&self, resource_id: &str) -> Result<ResourceConfig, LookupError> {
        let what = || format!("Resource {resource_id}");
        if !is_plain_component(resource_id) {
            return Err(LookupError::NotFound(what()));
        }
        let path = self.root.join(resource_id).join(RESOURCE_FILENAME);
        let content = read_entry(&path, what)?;
        let parse_error = |message: String| LookupError::Parse {
            path: path.clone(),
            message,
        };

        let mut value: toml::Table =
            toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
        let id = value
            .entry("id")
            .or_insert(toml::Value::String(resource_id.to_string()));
        if id.as_str() != Some(resource_id) {
            return Err(parse_error(format!(
                "id {id} does not match directory {resource_id}"
            )));
        }
        toml::Value::Table(value)
            .try_into()
            .map_err(|e: toml::de::Error| parse_error(e.to_string()))
    }

    fn record_show(&self, resource_id: &str, record_id: &str) -> Result<RecordData, LookupError> {
        let what = || format!("Record {record_id}");
        if !is_plain_component(resource_id) || !is_plain_component(record_id) {
            return Err(LookupError::NotFound(what()));
        }
        let path = self
            .root
            .join(resource_id)
            .join(RECORDS_DIR)
            .join(format!("{record_id}.json"));
        let content = read_entry(&path, what)?;
        serde_json::from_str(&content).map_err(|e| LookupError::Parse {
            path,
            message: e.to_string(),
        })
    }
}
