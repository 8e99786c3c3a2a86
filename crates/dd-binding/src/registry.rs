//! Process-wide tables of registered document kinds.
//!
//! A [`Registry`] maps root element names to [`RootKind`]s and DTD public ids
//! to local resource names, and holds the element sets that decide text
//! handling for every document. Kinds are added with
//! [`Registry::register_if_absent`], which is safe to call concurrently; after
//! that the tables are only read.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use dd_xml::XmlElement;
use tracing::debug;

use crate::kind::NodeKind;
use crate::node::Node;
use crate::upgrade::{UpgradeSet, VersionUpgradeRule};

/// How a document kind declares its grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentType {
    None,
    /// A DOCTYPE with public and system identifiers. `resource` is the file
    /// name of the local copy in the DTD directory.
    Dtd {
        public_id: String,
        system_id: String,
        resource: String,
    },
    /// A default namespace with an `xsi:schemaLocation` hint.
    Schema {
        namespace: String,
        location: String,
        version: Option<String>,
    },
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::None => f.write_str("none"),
            DocumentType::Dtd { public_id, .. } => write!(f, "DTD \"{}\"", public_id),
            DocumentType::Schema {
                namespace, version, ..
            } => match version {
                Some(version) => write!(f, "schema {} (version {})", namespace, version),
                None => write!(f, "schema {}", namespace),
            },
        }
    }
}

type NodeFactory = Box<dyn Fn() -> Box<dyn Node> + Send + Sync>;
type RootWriter = Box<dyn Fn(&dyn Any) -> Option<XmlElement> + Send + Sync>;
type RootDebug = Box<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;

/// A registered document kind: a root element and everything needed to
/// parse, upgrade and write documents of that kind.
pub struct RootKind {
    tag: String,
    document_type: DocumentType,
    public_ids: Vec<(String, String)>,
    whitespace_preserving: Vec<String>,
    empty_permitting: Vec<String>,
    upgrade_rules: Vec<VersionUpgradeRule>,
    factory: NodeFactory,
    writer: RootWriter,
    debug: RootDebug,
}

impl Debug for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootKind")
            .field("tag", &self.tag)
            .field("document_type", &self.document_type)
            .field("public_ids", &self.public_ids)
            .field("upgrade_rules", &self.upgrade_rules.len())
            .finish_non_exhaustive()
    }
}

impl RootKind {
    pub fn new<D: Debug + 'static>(kind: Arc<NodeKind<D>>, document_type: DocumentType) -> Self {
        let mut public_ids = Vec::new();
        if let DocumentType::Dtd {
            public_id,
            resource,
            ..
        } = &document_type
        {
            public_ids.push((public_id.clone(), resource.clone()));
        }

        let factory_kind = Arc::clone(&kind);
        let writer_kind = Arc::clone(&kind);
        Self {
            tag: kind.tag().to_string(),
            document_type,
            public_ids,
            whitespace_preserving: Vec::new(),
            empty_permitting: Vec::new(),
            upgrade_rules: Vec::new(),
            factory: Box::new(move || factory_kind.new_node()),
            writer: Box::new(move |descriptor: &dyn Any| {
                let descriptor = descriptor.downcast_ref::<D>()?;
                writer_kind.write(descriptor).into_iter().next()
            }),
            debug: Box::new(|descriptor: &dyn Any| {
                descriptor
                    .downcast_ref::<D>()
                    .map(|d| format!("{:#?}", d))
            }),
        }
    }

    /// Also resolve `public_id` (typically an older version of the same
    /// grammar) to the local file `resource`.
    pub fn with_public_id(mut self, public_id: &str, resource: &str) -> Self {
        self.public_ids
            .push((public_id.to_string(), resource.to_string()));
        self
    }

    /// Keep the text of these elements untrimmed in every document.
    pub fn with_whitespace_preserving(mut self, tags: &[&str]) -> Self {
        self.whitespace_preserving
            .extend(tags.iter().map(|t| t.to_string()));
        self
    }

    /// Deliver empty values of these elements to their setters in every document.
    pub fn with_empty_permitting(mut self, tags: &[&str]) -> Self {
        self.empty_permitting
            .extend(tags.iter().map(|t| t.to_string()));
        self
    }

    /// Add a rule; rules are evaluated in the order they were added.
    pub fn with_upgrade_rule(mut self, rule: VersionUpgradeRule) -> Self {
        self.upgrade_rules.push(rule);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn document_type(&self) -> &DocumentType {
        &self.document_type
    }

    pub fn public_ids(&self) -> &[(String, String)] {
        &self.public_ids
    }

    pub fn upgrade_rules(&self) -> &[VersionUpgradeRule] {
        &self.upgrade_rules
    }

    /// A fresh, reset copy of this kind's upgrade rules.
    pub fn upgrade_set(&self) -> UpgradeSet {
        UpgradeSet::new(self.upgrade_rules.clone())
    }

    pub fn new_node(&self) -> Box<dyn Node> {
        (self.factory)()
    }

    /// Render a root descriptor. `None` if it is not this kind's type.
    pub fn write(&self, descriptor: &dyn Any) -> Option<XmlElement> {
        (self.writer)(descriptor)
    }

    /// Pretty `Debug` output of a root descriptor of this kind.
    pub fn debug_descriptor(&self, descriptor: &dyn Any) -> Option<String> {
        (self.debug)(descriptor)
    }
}

#[derive(Default)]
struct Tables {
    kinds: HashMap<String, Arc<RootKind>>,
    public_ids: HashMap<String, String>,
    whitespace_preserving: HashSet<String>,
    empty_permitting: HashSet<String>,
}

/// The registry of document kinds shared by every parse and write session.
#[derive(Default)]
pub struct Registry {
    tables: RwLock<Tables>,
}

impl Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("root_tags", &self.root_tags())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `kind` unless its root tag is already registered.
    ///
    /// Returns `true` if this call registered it. The check and the insert
    /// happen under one write lock, so concurrent callers registering the
    /// same tag see exactly one `true`. Public ids already mapped keep their
    /// first resource.
    pub fn register_if_absent(&self, kind: RootKind) -> bool {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if tables.kinds.contains_key(&kind.tag) {
            debug!(root = %kind.tag, "Document kind already registered");
            return false;
        }

        for (public_id, resource) in &kind.public_ids {
            tables
                .public_ids
                .entry(public_id.clone())
                .or_insert_with(|| resource.clone());
        }
        tables
            .whitespace_preserving
            .extend(kind.whitespace_preserving.iter().cloned());
        tables
            .empty_permitting
            .extend(kind.empty_permitting.iter().cloned());

        debug!(root = %kind.tag, document_type = %kind.document_type, "Registered document kind");
        tables.kinds.insert(kind.tag.clone(), Arc::new(kind));
        true
    }

    pub fn contains(&self, root_tag: &str) -> bool {
        self.read().kinds.contains_key(root_tag)
    }

    pub fn root_kind(&self, root_tag: &str) -> Option<Arc<RootKind>> {
        self.read().kinds.get(root_tag).cloned()
    }

    /// Registered root tags, sorted.
    pub fn root_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.read().kinds.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Local DTD file name for a public id.
    pub fn public_id_resource(&self, public_id: &str) -> Option<String> {
        self.read().public_ids.get(public_id).cloned()
    }

    pub fn preserves_whitespace(&self, tag: &str) -> bool {
        self.read().whitespace_preserving.contains(tag)
    }

    pub fn allows_empty(&self, tag: &str) -> bool {
        self.read().empty_permitting.contains(tag)
    }
}
