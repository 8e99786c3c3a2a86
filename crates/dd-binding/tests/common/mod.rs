//! A small document kind shared by the integration tests.
//!
//! ```xml
//! <root version="1">
//!   <description>...</description>
//!   <script>  kept verbatim  </script>
//!   <marker/>
//!   <settings><timeout>30</timeout></settings>
//!   <ejb>...</ejb>
//!   <jdbc-connection-pool name="...">...</jdbc-connection-pool>
//!   <env-entry-name>a</env-entry-name><env-entry-value>1</env-entry-value>
//! </root>
//! ```

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use dd_binding::{
    Captures, DocumentType, EngineConfig, NodeKind, Registry, RootKind, VersionUpgradeRule,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TestRoot {
    pub version: Option<String>,
    pub description: Option<String>,
    pub script: Option<String>,
    pub marker: Option<String>,
    pub timeout: Option<u32>,
    pub ejbs: Vec<Ejb>,
    pub pools: Vec<Pool>,
    pub env_entries: Vec<EnvEntry>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ejb {
    pub ejb_name: Option<String>,
    pub description: Option<String>,
    pub steady_pool_size: Option<u32>,
    pub pass_by_reference: Option<bool>,
    pub method_names: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pool {
    pub name: Option<String>,
    pub data_source_jndi_name: Option<String>,
    /// Legacy field; set only when the upgrade rule rejects a value.
    pub data_source_name: Option<String>,
    pub description: Option<String>,
    pub init_sql: Option<String>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Property {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnvEntry {
    pub name: Option<String>,
    pub value: Option<String>,
}

pub const ROOT_PUBLIC_ID: &str = "-//Test//DTD Root 1.0//EN";
pub const ROOT_SYSTEM_ID: &str = "http://example.org/dtds/root_1_0.dtd";

fn jndi_name(captures: &Captures<'_>) -> Result<String, String> {
    match captures.last() {
        Some(value) if !value.is_empty() && !value.contains(char::is_whitespace) => {
            Ok(value.to_string())
        }
        Some(value) => Err(format!("'{}' is not a JNDI name", value)),
        None => Err("no value captured".to_string()),
    }
}

pub fn ejb_kind() -> Arc<NodeKind<Ejb>> {
    Arc::new(
        NodeKind::<Ejb>::new("ejb")
            .text("ejb-name", |e, v| e.ejb_name = Some(v), |e| e.ejb_name.clone())
            .text(
                "description",
                |e, v| e.description = Some(v),
                |e| e.description.clone(),
            )
            .preserve_whitespace()
            .value(
                "bean-pool/steady-pool-size",
                |e, v| e.steady_pool_size = Some(v),
                |e| e.steady_pool_size,
            )
            .flag(
                "pass-by-reference",
                |e, v| e.pass_by_reference = Some(v),
                |e| e.pass_by_reference,
            )
            .texts(
                "method-name",
                |e, v| e.method_names.push(v),
                |e| e.method_names.clone(),
            ),
    )
}

pub fn pool_kind() -> Arc<NodeKind<Pool>> {
    let property = Arc::new(
        NodeKind::<Property>::new("property")
            .attribute("name", |p, v| p.name = Some(v), |p| p.name.clone())
            .attribute("value", |p, v| p.value = Some(v), |p| p.value.clone()),
    );

    Arc::new(
        NodeKind::<Pool>::new("jdbc-connection-pool")
            .attribute("name", |p, v| p.name = Some(v), |p| p.name.clone())
            .text(
                "description",
                |p, v| p.description = Some(v),
                |p| p.description.clone(),
            )
            .text(
                "data-source-jndi-name",
                |p, v| p.data_source_jndi_name = Some(v),
                |p| p.data_source_jndi_name.clone(),
            )
            .text(
                "data-source-name",
                |p, v| p.data_source_name = Some(v),
                |p| p.data_source_name.clone(),
            )
            .text("init-sql", |p, v| p.init_sql = Some(v), |p| p.init_sql.clone())
            .allow_empty()
            .child(
                "property",
                property,
                |p, c| p.properties.push(c),
                |p| p.properties.iter().collect(),
            ),
    )
}

pub fn env_entry_kind() -> Arc<NodeKind<EnvEntry>> {
    Arc::new(
        NodeKind::<EnvEntry>::new("env-entry-name")
            .text("env-entry-name", |e, v| e.name = Some(v), |e| e.name.clone())
            .text("env-entry-value", |e, v| e.value = Some(v), |e| e.value.clone())
            .completes_on("env-entry-value"),
    )
}

pub fn root_kind() -> Arc<NodeKind<TestRoot>> {
    Arc::new(
        NodeKind::<TestRoot>::new("root")
            .attribute("version", |r, v| r.version = Some(v), |r| r.version.clone())
            .text(
                "description",
                |r, v| r.description = Some(v),
                |r| r.description.clone(),
            )
            .text("script", |r, v| r.script = Some(v), |r| r.script.clone())
            .text("marker", |r, v| r.marker = Some(v), |r| r.marker.clone())
            .value("settings/timeout", |r, v| r.timeout = Some(v), |r| r.timeout)
            .child(
                "ejb",
                ejb_kind(),
                |r, c| r.ejbs.push(c),
                |r| r.ejbs.iter().collect(),
            )
            .child(
                "jdbc-connection-pool",
                pool_kind(),
                |r, c| r.pools.push(c),
                |r| r.pools.iter().collect(),
            )
            .child(
                "env-entry-name",
                env_entry_kind(),
                |r, c| r.env_entries.push(c),
                |r| r.env_entries.iter().collect(),
            ),
    )
}

pub fn root_rules() -> Vec<VersionUpgradeRule> {
    vec![
        VersionUpgradeRule::remove(
            "start-mdbs-with-application",
            "root/ejb/start-mdbs-with-application",
        ),
        VersionUpgradeRule::replace(
            "data-source-name",
            "root/jdbc-connection-pool/data-source-name",
            "data-source-jndi-name",
        )
        .with_value(jndi_name),
    ]
}

pub fn test_root(document_type: DocumentType) -> RootKind {
    root_rules().into_iter().fold(
        RootKind::new(root_kind(), document_type)
            .with_whitespace_preserving(&["script"])
            .with_empty_permitting(&["marker"]),
        RootKind::with_upgrade_rule,
    )
}

pub fn registry() -> Registry {
    let registry = Registry::new();
    registry.register_if_absent(test_root(DocumentType::None));
    registry
}

/// A registry where `root` declares a DTD with a local copy.
pub fn dtd_registry() -> Registry {
    let registry = Registry::new();
    registry.register_if_absent(test_root(DocumentType::Dtd {
        public_id: ROOT_PUBLIC_ID.to_string(),
        system_id: ROOT_SYSTEM_ID.to_string(),
        resource: "root_1_0.dtd".to_string(),
    }));
    registry
}

pub fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn config() -> EngineConfig {
    EngineConfig::default().with_resource_dirs(fixtures().join("dtds"), fixtures().join("schemas"))
}

pub fn lenient() -> EngineConfig {
    config().with_strict(false)
}
