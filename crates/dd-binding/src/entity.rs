//! Resolution of DTD and schema references to local files.
//!
//! References are resolved by public id first, through the registry's
//! public-id table and the DTD directory, then by stripping a known namespace
//! prefix from the system id and looking in the schema directory. Anything
//! else is an error: remote resources are never fetched.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// A reference that was resolved to a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub public_id: Option<String>,
    pub system_id: String,
    pub path: PathBuf,
    pub content: Vec<u8>,
}

pub struct EntityResolver<'r> {
    registry: &'r Registry,
    dtd_dir: PathBuf,
    schema_dir: PathBuf,
    prefixes: Vec<String>,
}

impl<'r> EntityResolver<'r> {
    pub fn new(registry: &'r Registry, config: &EngineConfig) -> Self {
        Self {
            registry,
            dtd_dir: config.dtd_dir.clone(),
            schema_dir: config.schema_dir.clone(),
            prefixes: config.schema_prefixes.clone(),
        }
    }

    pub fn resolve(&self, public_id: Option<&str>, system_id: &str) -> Result<ResolvedEntity> {
        let fail = |reason: String| Error::EntityResolution {
            public_id: public_id.map(str::to_string),
            system_id: system_id.to_string(),
            reason,
            location: None,
        };

        let path = if let Some(resource) =
            public_id.and_then(|id| self.registry.public_id_resource(id))
        {
            local_path(&self.dtd_dir, &resource)
                .ok_or_else(|| fail(format!("resource name '{}' is not a plain file name", resource)))?
        } else {
            let file_name = self
                .prefixes
                .iter()
                .find_map(|prefix| system_id.strip_prefix(prefix.as_str()))
                .ok_or_else(|| match public_id {
                    Some(id) => fail(format!(
                        "public id '{}' is not registered and the system id has no known namespace prefix",
                        id
                    )),
                    None => fail("the system id has no known namespace prefix".to_string()),
                })?;
            local_path(&self.schema_dir, file_name)
                .ok_or_else(|| fail(format!("'{}' is not a local file name", file_name)))?
        };

        let content = fs::read(&path)
            .map_err(|e| fail(format!("cannot read {}: {}", path.display(), e)))?;

        debug!(
            public_id = public_id.unwrap_or(""),
            system_id,
            path = %path.display(),
            "Resolved entity locally"
        );

        Ok(ResolvedEntity {
            public_id: public_id.map(str::to_string),
            system_id: system_id.to_string(),
            path,
            content,
        })
    }
}

/// Join `name` to `dir` if it names a file inside `dir`.
fn local_path(dir: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let plain = !name.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    plain.then(|| dir.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_rejects_escapes() {
        let dir = Path::new("/res/schemas");
        assert_eq!(
            local_path(dir, "ejb-jar_3_2.xsd"),
            Some(PathBuf::from("/res/schemas/ejb-jar_3_2.xsd"))
        );
        assert_eq!(local_path(dir, "../secret"), None);
        assert_eq!(local_path(dir, "/etc/passwd"), None);
        assert_eq!(local_path(dir, ""), None);
    }

    #[test]
    fn test_unknown_remote_reference_fails() {
        let registry = Registry::new();
        let config = EngineConfig::default();
        let resolver = EntityResolver::new(&registry, &config);

        let err = resolver
            .resolve(None, "http://evil.example.org/payload.xsd")
            .unwrap_err();
        assert!(matches!(err, Error::EntityResolution { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_unregistered_public_id_fails() {
        let registry = Registry::new();
        let config = EngineConfig::default();
        let resolver = EntityResolver::new(&registry, &config);

        let err = resolver
            .resolve(Some("-//Nobody//DTD X//EN"), "http://example.org/x.dtd")
            .unwrap_err();
        assert!(err.to_string().contains("-//Nobody//DTD X//EN"));
    }

    #[test]
    fn test_known_prefix_missing_file_fails() {
        let registry = Registry::new();
        let config = EngineConfig::default().with_resource_dirs("/nonexistent", "/nonexistent");
        let resolver = EntityResolver::new(&registry, &config);

        let err = resolver
            .resolve(None, "http://xmlns.jcp.org/xml/ns/javaee/ejb-jar_3_2.xsd")
            .unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
