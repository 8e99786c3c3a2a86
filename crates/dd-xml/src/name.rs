//! Qualified names and namespace scoping.

use std::hash::{Hash, Hasher};

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XML Schema instance namespace (`xsi:schemaLocation`).
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The name of a markup tag.
///
/// The namespace URI is resolved once, when the name is built against the
/// scope that is active for its element, and never changes afterwards.
/// Equality and hashing use the local name only.
#[derive(Debug, Clone)]
pub struct QName {
    local_name: String,
    prefix: Option<String>,
    namespace: Option<String>,
}

impl QName {
    /// An unprefixed name with no namespace.
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            prefix: None,
            namespace: None,
        }
    }

    /// Split a raw tag (`prefix:local` or `local`) into its parts.
    ///
    /// ```
    /// use dd_xml::QName;
    ///
    /// assert_eq!(QName::split("xsi:schemaLocation"), (Some("xsi"), "schemaLocation"));
    /// assert_eq!(QName::split("ejb"), (None, "ejb"));
    /// ```
    pub fn split(raw: &str) -> (Option<&str>, &str) {
        match raw.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() => (Some(prefix), local),
            _ => (None, raw),
        }
    }

    /// Build the name of an element from its raw tag. Unprefixed element names
    /// take the default namespace.
    pub fn element(raw: &str, scopes: &NamespaceStack) -> Self {
        let (prefix, local) = Self::split(raw);
        Self {
            local_name: local.to_string(),
            prefix: prefix.map(str::to_string),
            namespace: scopes.resolve(prefix).map(str::to_string),
        }
    }

    /// Build the name of an attribute. Unprefixed attributes have no namespace.
    pub fn attribute(raw: &str, scopes: &NamespaceStack) -> Self {
        let (prefix, local) = Self::split(raw);
        Self {
            local_name: local.to_string(),
            prefix: prefix.map(str::to_string),
            namespace: prefix.and_then(|p| scopes.resolve(Some(p))).map(str::to_string),
        }
    }

    /// Rename, keeping prefix and namespace.
    pub fn with_local_name(&self, local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            prefix: self.prefix.clone(),
            namespace: self.namespace.clone(),
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.local_name == other.local_name
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.local_name.hash(state);
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// One scope of prefix bindings. `None` is the default namespace.
type Scope = Vec<(Option<String>, String)>;

/// Stack of namespace scopes, one per open element.
///
/// A scope is pushed for every element, including elements that declare no
/// prefixes, so that pushes and pops stay paired with start and end tags.
#[derive(Debug, Clone, Default)]
pub struct NamespaceStack {
    scopes: Vec<Scope>,
    pushes: usize,
    pops: usize,
}

impl NamespaceStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bindings: Vec<(Option<String>, String)>) {
        self.scopes.push(bindings);
        self.pushes += 1;
    }

    /// Pop the innermost scope. Returns false if the stack was already empty.
    pub fn pop(&mut self) -> bool {
        if self.scopes.pop().is_some() {
            self.pops += 1;
            true
        } else {
            false
        }
    }

    /// Resolve a prefix, innermost scope first.
    ///
    /// ```
    /// use dd_xml::NamespaceStack;
    ///
    /// let mut scopes = NamespaceStack::new();
    /// scopes.push(vec![(Some("j".into()), "urn:outer".into())]);
    /// scopes.push(vec![(Some("j".into()), "urn:inner".into())]);
    /// assert_eq!(scopes.resolve(Some("j")), Some("urn:inner"));
    /// scopes.pop();
    /// assert_eq!(scopes.resolve(Some("j")), Some("urn:outer"));
    /// ```
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Total number of scopes pushed over the stack's lifetime.
    pub fn push_count(&self) -> usize {
        self.pushes
    }

    /// Total number of scopes popped over the stack's lifetime.
    pub fn pop_count(&self) -> usize {
        self.pops
    }
}
