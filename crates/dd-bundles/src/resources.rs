//! `resources`: schema-based JDBC resource definitions.
//!
//! ```xml
//! <resources xmlns="http://xmlns.jcp.org/xml/ns/javaee" version="1.0">
//!   <jdbc-connection-pool name="OrdersPool">
//!     <data-source-jndi-name>jdbc/OrdersDS</data-source-jndi-name>
//!     <property name="user" value="app"/>
//!   </jdbc-connection-pool>
//!   <jdbc-resource jndi-name="jdbc/Orders" pool-name="OrdersPool"/>
//! </resources>
//! ```

use std::sync::Arc;

use dd_binding::{Captures, DocumentType, NodeKind, RootKind, VersionUpgradeRule};

pub const ROOT_TAG: &str = "resources";
pub const NAMESPACE: &str = "http://xmlns.jcp.org/xml/ns/javaee";
pub const SCHEMA_LOCATION: &str = "http://xmlns.jcp.org/xml/ns/javaee/resources_1_0.xsd";
pub const VERSION: &str = "1.0";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Resources {
    pub version: Option<String>,
    pub connection_pools: Vec<JdbcConnectionPool>,
    pub jdbc_resources: Vec<JdbcResource>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct JdbcConnectionPool {
    pub name: Option<String>,
    pub description: Option<String>,
    pub datasource_classname: Option<String>,
    pub res_type: Option<String>,
    pub data_source_jndi_name: Option<String>,
    /// Only set when a legacy `data-source-name` could not be upgraded.
    pub data_source_name: Option<String>,
    pub steady_pool_size: Option<u32>,
    pub max_pool_size: Option<u32>,
    pub max_wait_time_in_millis: Option<u64>,
    pub is_connection_validation_required: Option<bool>,
    pub validation_table_name: Option<String>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct JdbcResource {
    pub jndi_name: Option<String>,
    pub pool_name: Option<String>,
    pub enabled: Option<bool>,
    pub description: Option<String>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Property {
    pub name: Option<String>,
    pub value: Option<String>,
}

fn property_kind() -> Arc<NodeKind<Property>> {
    Arc::new(
        NodeKind::<Property>::new("property")
            .attribute("name", |p, v| p.name = Some(v), |p| p.name.clone())
            .attribute("value", |p, v| p.value = Some(v), |p| p.value.clone()),
    )
}

fn connection_pool_kind(property: Arc<NodeKind<Property>>) -> Arc<NodeKind<JdbcConnectionPool>> {
    Arc::new(
        NodeKind::<JdbcConnectionPool>::new("jdbc-connection-pool")
            .attribute("name", |p, v| p.name = Some(v), |p| p.name.clone())
            .text(
                "description",
                |p, v| p.description = Some(v),
                |p| p.description.clone(),
            )
            .text(
                "datasource-classname",
                |p, v| p.datasource_classname = Some(v),
                |p| p.datasource_classname.clone(),
            )
            .text("res-type", |p, v| p.res_type = Some(v), |p| p.res_type.clone())
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
            .value(
                "steady-pool-size",
                |p, v| p.steady_pool_size = Some(v),
                |p| p.steady_pool_size,
            )
            .value(
                "max-pool-size",
                |p, v| p.max_pool_size = Some(v),
                |p| p.max_pool_size,
            )
            .value(
                "max-wait-time-in-millis",
                |p, v| p.max_wait_time_in_millis = Some(v),
                |p| p.max_wait_time_in_millis,
            )
            .flag(
                "is-connection-validation-required",
                |p, v| p.is_connection_validation_required = Some(v),
                |p| p.is_connection_validation_required,
            )
            .text(
                "validation-table-name",
                |p, v| p.validation_table_name = Some(v),
                |p| p.validation_table_name.clone(),
            )
            .child(
                "property",
                property,
                |p, c| p.properties.push(c),
                |p| p.properties.iter().collect(),
            ),
    )
}

fn jdbc_resource_kind(property: Arc<NodeKind<Property>>) -> Arc<NodeKind<JdbcResource>> {
    Arc::new(
        NodeKind::<JdbcResource>::new("jdbc-resource")
            .attribute("jndi-name", |r, v| r.jndi_name = Some(v), |r| r.jndi_name.clone())
            .attribute("pool-name", |r, v| r.pool_name = Some(v), |r| r.pool_name.clone())
            .flag_attribute("enabled", |r, v| r.enabled = Some(v), |r| r.enabled)
            .text(
                "description",
                |r, v| r.description = Some(v),
                |r| r.description.clone(),
            )
            .child(
                "property",
                property,
                |r, c| r.properties.push(c),
                |r| r.properties.iter().collect(),
            ),
    )
}

pub fn node_kind() -> Arc<NodeKind<Resources>> {
    let property = property_kind();
    Arc::new(
        NodeKind::<Resources>::new(ROOT_TAG)
            .attribute("version", |r, v| r.version = Some(v), |r| r.version.clone())
            .child(
                "jdbc-connection-pool",
                connection_pool_kind(Arc::clone(&property)),
                |r, c| r.connection_pools.push(c),
                |r| r.connection_pools.iter().collect(),
            )
            .child(
                "jdbc-resource",
                jdbc_resource_kind(property),
                |r, c| r.jdbc_resources.push(c),
                |r| r.jdbc_resources.iter().collect(),
            ),
    )
}

/// A JNDI name has no whitespace and no leading or trailing `/`.
fn jndi_name(captures: &Captures<'_>) -> Result<String, String> {
    let value = captures.last().unwrap_or_default();
    if value.is_empty() {
        return Err("the JNDI name is empty".to_string());
    }
    if value.contains(char::is_whitespace) {
        return Err(format!("'{}' contains whitespace", value));
    }
    if value.starts_with('/') || value.ends_with('/') {
        return Err(format!("'{}' starts or ends with '/'", value));
    }
    Ok(value.to_string())
}

fn seconds_to_millis(captures: &Captures<'_>) -> Result<String, String> {
    let value = captures.last().unwrap_or_default();
    let seconds: u64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    seconds
        .checked_mul(1000)
        .map(|millis| millis.to_string())
        .ok_or_else(|| format!("{} seconds is out of range", seconds))
}

pub fn upgrade_rules() -> Vec<VersionUpgradeRule> {
    vec![
        VersionUpgradeRule::replace(
            "data-source-name",
            "resources/jdbc-connection-pool/data-source-name",
            "data-source-jndi-name",
        )
        .with_value(jndi_name),
        VersionUpgradeRule::replace(
            "max-wait-time",
            "resources/jdbc-connection-pool/max-wait-time",
            "max-wait-time-in-millis",
        )
        .with_value(seconds_to_millis),
    ]
}

pub fn root_kind() -> RootKind {
    upgrade_rules().into_iter().fold(
        RootKind::new(
            node_kind(),
            DocumentType::Schema {
                namespace: NAMESPACE.to_string(),
                location: SCHEMA_LOCATION.to_string(),
                version: Some(VERSION.to_string()),
            },
        )
        .with_whitespace_preserving(&["description"])
        .with_empty_permitting(&["description"]),
        RootKind::with_upgrade_rule,
    )
}
