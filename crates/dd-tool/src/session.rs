//! Registry and configuration shared by every command.

use std::path::Path;

use anyhow::{Context, Result};
use dd_binding::{DiagnosticMessage, EngineConfig, Registry};
use tempfile::TempDir;
use tracing::debug;

pub struct Session {
    pub registry: Registry,
    pub config: EngineConfig,
    /// Bundled DTDs and schemas, removed when the session ends.
    _resources: Option<TempDir>,
}

impl Session {
    /// Without a config file, the bundled resources are extracted to a
    /// temporary directory and resolved from there.
    pub fn new(config_path: Option<&Path>, lenient: bool) -> Result<Self> {
        let registry = Registry::new();
        let added = dd_bundles::register_all(&registry);
        debug!(added, "Registered bundle kinds");

        let (config, resources) = match config_path {
            Some(path) => {
                let config = EngineConfig::load(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?;
                (config, None)
            }
            None => {
                let dir = TempDir::new().context("Failed to create resource directory")?;
                dd_bundles::extract_resources(dir.path())
                    .context("Failed to extract bundled resources")?;
                (dd_bundles::config_for(dir.path()), Some(dir))
            }
        };
        let config = if lenient {
            config.with_strict(false)
        } else {
            config
        };

        Ok(Self {
            registry,
            config,
            _resources: resources,
        })
    }
}

/// Print diagnostics to stderr, with snippets from `source`.
pub fn report(diagnostics: &[DiagnosticMessage], source: &str) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic.to_text(Some(source)));
    }
}
