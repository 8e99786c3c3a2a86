//! Engine configuration, loaded from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Namespace prefixes stripped from schema system ids to find a local file.
pub const DEFAULT_SCHEMA_PREFIXES: &[&str] = &[
    "http://java.sun.com/xml/ns/j2ee/",
    "http://java.sun.com/xml/ns/javaee/",
    "http://xmlns.jcp.org/xml/ns/javaee/",
    "https://jakarta.ee/xml/ns/jakartaee/",
    "http://www.w3.org/2001/",
];

/// Settings for parse and write sessions.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Abort on unregistered elements, failed dispatch and invalid values.
    /// When false these are logged, recorded as warnings and skipped.
    pub strict: bool,

    /// Directory of DTD files, indexed by the file names registered for public ids.
    pub dtd_dir: PathBuf,

    /// Directory of schema files, indexed by file name.
    pub schema_dir: PathBuf,

    pub schema_prefixes: Vec<String>,

    /// Whether `xsi:schemaLocation` on the root element is resolved like a DOCTYPE.
    pub resolve_schema_locations: bool,

    pub writer: WriterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub indent: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict: true,
            dtd_dir: PathBuf::from("dtds"),
            schema_dir: PathBuf::from("schemas"),
            schema_prefixes: DEFAULT_SCHEMA_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            resolve_schema_locations: true,
            writer: WriterConfig::default(),
        }
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl EngineConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a config file. Relative resource directories are taken relative
    /// to the file's own directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&content)?;
        if let Some(base) = path.parent() {
            config.dtd_dir = base.join(&config.dtd_dir);
            config.schema_dir = base.join(&config.schema_dir);
        }
        Ok(config)
    }

    pub fn with_resource_dirs(
        mut self,
        dtd_dir: impl Into<PathBuf>,
        schema_dir: impl Into<PathBuf>,
    ) -> Self {
        self.dtd_dir = dtd_dir.into();
        self.schema_dir = schema_dir.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
