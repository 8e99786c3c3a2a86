//! `sun-ejb-jar`: the DTD-based runtime descriptor of an EJB module.
//!
//! Documents declaring the 2.1 DTD are read with the 3.0 model. Elements the
//! 3.0 grammar dropped are removed by upgrade rules while parsing.

use std::sync::Arc;

use dd_binding::{DocumentType, NodeKind, RootKind, VersionUpgradeRule};

pub const ROOT_TAG: &str = "sun-ejb-jar";

pub const PUBLIC_ID: &str = "-//Sun Microsystems, Inc.//DTD Application Server 9.0 EJB 3.0//EN";
pub const SYSTEM_ID: &str = "http://www.sun.com/software/appserver/dtds/sun-ejb-jar_3_0-0.dtd";
pub const DTD: &str = "sun-ejb-jar_3_0-0.dtd";

pub const LEGACY_PUBLIC_ID: &str =
    "-//Sun Microsystems, Inc.//DTD Application Server 8.1 EJB 2.1//EN";
pub const LEGACY_DTD: &str = "sun-ejb-jar_2_1-1.dtd";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SunEjbJar {
    pub security_role_mappings: Vec<SecurityRoleMapping>,
    /// `enterprise-beans/name`
    pub name: Option<String>,
    /// `enterprise-beans/unique-id`
    pub unique_id: Option<u64>,
    pub ejbs: Vec<Ejb>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SecurityRoleMapping {
    pub role_name: Option<String>,
    pub principal_names: Vec<String>,
    pub group_names: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ejb {
    pub availability_enabled: Option<bool>,
    pub ejb_name: Option<String>,
    pub jndi_name: Option<String>,
    pub ejb_refs: Vec<EjbRef>,
    pub resource_refs: Vec<ResourceRef>,
    pub pass_by_reference: Option<bool>,
    pub is_read_only_bean: Option<bool>,
    pub refresh_period_in_seconds: Option<u32>,
    pub bean_pool: BeanPool,
    pub bean_cache: BeanCache,
    pub mdb_connection_factory: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BeanPool {
    pub steady_pool_size: Option<u32>,
    pub resize_quantity: Option<u32>,
    pub max_pool_size: Option<u32>,
    pub pool_idle_timeout_in_seconds: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BeanCache {
    pub max_cache_size: Option<u32>,
    pub cache_idle_timeout_in_seconds: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EjbRef {
    pub ejb_ref_name: Option<String>,
    pub jndi_name: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResourceRef {
    pub res_ref_name: Option<String>,
    pub jndi_name: Option<String>,
    pub principal_name: Option<String>,
    pub principal_password: Option<String>,
}

fn security_role_mapping_kind() -> Arc<NodeKind<SecurityRoleMapping>> {
    Arc::new(
        NodeKind::<SecurityRoleMapping>::new("security-role-mapping")
            .text("role-name", |m, v| m.role_name = Some(v), |m| m.role_name.clone())
            .texts(
                "principal-name",
                |m, v| m.principal_names.push(v),
                |m| m.principal_names.clone(),
            )
            .texts(
                "group-name",
                |m, v| m.group_names.push(v),
                |m| m.group_names.clone(),
            ),
    )
}

fn ejb_ref_kind() -> Arc<NodeKind<EjbRef>> {
    Arc::new(
        NodeKind::<EjbRef>::new("ejb-ref")
            .text(
                "ejb-ref-name",
                |r, v| r.ejb_ref_name = Some(v),
                |r| r.ejb_ref_name.clone(),
            )
            .text("jndi-name", |r, v| r.jndi_name = Some(v), |r| r.jndi_name.clone()),
    )
}

fn resource_ref_kind() -> Arc<NodeKind<ResourceRef>> {
    Arc::new(
        NodeKind::<ResourceRef>::new("resource-ref")
            .text(
                "res-ref-name",
                |r, v| r.res_ref_name = Some(v),
                |r| r.res_ref_name.clone(),
            )
            .text("jndi-name", |r, v| r.jndi_name = Some(v), |r| r.jndi_name.clone())
            .text(
                "default-resource-principal/name",
                |r, v| r.principal_name = Some(v),
                |r| r.principal_name.clone(),
            )
            .text(
                "default-resource-principal/password",
                |r, v| r.principal_password = Some(v),
                |r| r.principal_password.clone(),
            )
            .preserve_whitespace(),
    )
}

fn ejb_kind() -> Arc<NodeKind<Ejb>> {
    Arc::new(
        NodeKind::<Ejb>::new("ejb")
            .flag_attribute(
                "availability-enabled",
                |e, v| e.availability_enabled = Some(v),
                |e| e.availability_enabled,
            )
            .text("ejb-name", |e, v| e.ejb_name = Some(v), |e| e.ejb_name.clone())
            .text("jndi-name", |e, v| e.jndi_name = Some(v), |e| e.jndi_name.clone())
            .child(
                "ejb-ref",
                ejb_ref_kind(),
                |e, c| e.ejb_refs.push(c),
                |e| e.ejb_refs.iter().collect(),
            )
            .child(
                "resource-ref",
                resource_ref_kind(),
                |e, c| e.resource_refs.push(c),
                |e| e.resource_refs.iter().collect(),
            )
            .flag(
                "pass-by-reference",
                |e, v| e.pass_by_reference = Some(v),
                |e| e.pass_by_reference,
            )
            .flag(
                "is-read-only-bean",
                |e, v| e.is_read_only_bean = Some(v),
                |e| e.is_read_only_bean,
            )
            .value(
                "refresh-period-in-seconds",
                |e, v| e.refresh_period_in_seconds = Some(v),
                |e| e.refresh_period_in_seconds,
            )
            .value(
                "bean-pool/steady-pool-size",
                |e, v| e.bean_pool.steady_pool_size = Some(v),
                |e| e.bean_pool.steady_pool_size,
            )
            .value(
                "bean-pool/resize-quantity",
                |e, v| e.bean_pool.resize_quantity = Some(v),
                |e| e.bean_pool.resize_quantity,
            )
            .value(
                "bean-pool/max-pool-size",
                |e, v| e.bean_pool.max_pool_size = Some(v),
                |e| e.bean_pool.max_pool_size,
            )
            .value(
                "bean-pool/pool-idle-timeout-in-seconds",
                |e, v| e.bean_pool.pool_idle_timeout_in_seconds = Some(v),
                |e| e.bean_pool.pool_idle_timeout_in_seconds,
            )
            .value(
                "bean-cache/max-cache-size",
                |e, v| e.bean_cache.max_cache_size = Some(v),
                |e| e.bean_cache.max_cache_size,
            )
            .value(
                "bean-cache/cache-idle-timeout-in-seconds",
                |e, v| e.bean_cache.cache_idle_timeout_in_seconds = Some(v),
                |e| e.bean_cache.cache_idle_timeout_in_seconds,
            )
            // Longer than the bean's own `jndi-name`, so it wins for this path.
            .text(
                "mdb-connection-factory/jndi-name",
                |e, v| e.mdb_connection_factory = Some(v),
                |e| e.mdb_connection_factory.clone(),
            ),
    )
}

pub fn node_kind() -> Arc<NodeKind<SunEjbJar>> {
    Arc::new(
        NodeKind::<SunEjbJar>::new(ROOT_TAG)
            .child(
                "security-role-mapping",
                security_role_mapping_kind(),
                |j, c| j.security_role_mappings.push(c),
                |j| j.security_role_mappings.iter().collect(),
            )
            .text("enterprise-beans/name", |j, v| j.name = Some(v), |j| j.name.clone())
            .value(
                "enterprise-beans/unique-id",
                |j, v| j.unique_id = Some(v),
                |j| j.unique_id,
            )
            .child(
                "enterprise-beans/ejb",
                ejb_kind(),
                |j, c| j.ejbs.push(c),
                |j| j.ejbs.iter().collect(),
            ),
    )
}

/// Rules reading 2.1 documents into the 3.0 model.
pub fn upgrade_rules() -> Vec<VersionUpgradeRule> {
    vec![
        VersionUpgradeRule::remove(
            "start-mdbs-with-application",
            "sun-ejb-jar/enterprise-beans/ejb/start-mdbs-with-application",
        ),
        VersionUpgradeRule::remove(
            "is-cache-overflow-allowed",
            "sun-ejb-jar/enterprise-beans/ejb/bean-cache/is-cache-overflow-allowed",
        ),
    ]
}

pub fn root_kind() -> RootKind {
    upgrade_rules().into_iter().fold(
        RootKind::new(
            node_kind(),
            DocumentType::Dtd {
                public_id: PUBLIC_ID.to_string(),
                system_id: SYSTEM_ID.to_string(),
                resource: DTD.to_string(),
            },
        )
        .with_public_id(LEGACY_PUBLIC_ID, LEGACY_DTD),
        RootKind::with_upgrade_rule,
    )
}
