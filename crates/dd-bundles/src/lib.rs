//! Concrete document kinds for the binding engine.
//!
//! - [`ejb`]: `sun-ejb-jar`, declared by DTD, with an older DTD version
//!   upgraded on read.
//! - [`resources`]: `resources`, declared by XML schema, with legacy JDBC
//!   pool elements upgraded on read.
//!
//! The DTD and schema files the kinds refer to are embedded in the crate.
//! [`extract_resources`] writes them to a directory that an
//! [`EngineConfig`] can point its entity resolver at.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dd_binding::{EngineConfig, Registry, RootKind};
use include_dir::{Dir, include_dir};
use tracing::debug;

pub mod ejb;
pub mod resources;

static RESOURCES: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/resources");

/// Every document kind of this crate.
pub fn root_kinds() -> Vec<RootKind> {
    vec![ejb::root_kind(), resources::root_kind()]
}

/// Register every kind not yet in `registry`. Returns how many were added.
pub fn register_all(registry: &Registry) -> usize {
    root_kinds()
        .into_iter()
        .map(|kind| {
            let tag = kind.tag().to_string();
            let added = registry.register_if_absent(kind);
            debug!(root = %tag, added, "Bundle kind");
            added
        })
        .filter(|added| *added)
        .count()
}

/// The resource directory in the crate's source tree.
pub fn resource_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")
}

/// Contents of an embedded resource, e.g. `dtds/sun-ejb-jar_3_0-0.dtd`.
pub fn resource(path: &str) -> Option<&'static [u8]> {
    RESOURCES.get_file(path).map(|file| file.contents())
}

/// Write the embedded `dtds/` and `schemas/` directories under `target`.
pub fn extract_resources(target: &Path) -> io::Result<()> {
    fs::create_dir_all(target)?;
    RESOURCES.extract(target)?;
    debug!(target = %target.display(), "Extracted bundle resources");
    Ok(())
}

/// A default config resolving against resources laid out under `root`.
pub fn config_for(root: &Path) -> EngineConfig {
    EngineConfig::default().with_resource_dirs(root.join("dtds"), root.join("schemas"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_resources() {
        let dtd = resource("dtds/sun-ejb-jar_3_0-0.dtd").unwrap();
        assert!(String::from_utf8_lossy(dtd).contains("<!ELEMENT sun-ejb-jar"));
        assert!(resource("dtds/sun-ejb-jar_2_1-1.dtd").is_some());
        assert!(resource("schemas/resources_1_0.xsd").is_some());
        assert!(resource("schemas/missing.xsd").is_none());
    }

    #[test]
    fn test_every_registered_dtd_is_embedded() {
        for kind in root_kinds() {
            for (_, file) in kind.public_ids() {
                assert!(
                    resource(&format!("dtds/{}", file)).is_some(),
                    "{} is not embedded",
                    file
                );
            }
        }
    }
}
