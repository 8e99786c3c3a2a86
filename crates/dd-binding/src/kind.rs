//! Declarative node kinds.
//!
//! A [`NodeKind`] describes one descriptor type: which element paths set
//! which fields, which attributes of its own element it reads, which child
//! elements are delegated to other kinds, and on which element it completes.
//! The registration order of fields and children is also the order the
//! writer emits them in.
//!
//! ```
//! use std::sync::Arc;
//! use dd_binding::kind::NodeKind;
//!
//! #[derive(Debug, Default)]
//! struct Property {
//!     name: Option<String>,
//!     value: Option<String>,
//! }
//!
//! #[derive(Debug, Default)]
//! struct Pool {
//!     name: Option<String>,
//!     steady_pool_size: Option<u32>,
//!     properties: Vec<Property>,
//! }
//!
//! let property = Arc::new(
//!     NodeKind::<Property>::new("property")
//!         .attribute("name", |p, v| p.name = Some(v), |p| p.name.clone())
//!         .attribute("value", |p, v| p.value = Some(v), |p| p.value.clone()),
//! );
//!
//! let pool = NodeKind::<Pool>::new("jdbc-connection-pool")
//!     .attribute("name", |p, v| p.name = Some(v), |p| p.name.clone())
//!     .value("steady-pool-size", |p, v| p.steady_pool_size = Some(v), |p| p.steady_pool_size)
//!     .child(
//!         "property",
//!         property,
//!         |p, c| p.properties.push(c),
//!         |p| p.properties.iter().collect(),
//!     );
//!
//! assert_eq!(pool.tag(), "jdbc-connection-pool");
//! assert_eq!(pool.completion_tag(), "jdbc-connection-pool");
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use dd_xml::{QName, XSI_NAMESPACE, XmlChildren, XmlElement};
use tracing::debug;

use crate::dispatch::DispatchTable;
use crate::node::{BoundAttribute, Descriptor, Node, NodeError};

type Setter<D> = Box<dyn Fn(&mut D, &str) -> Result<(), String> + Send + Sync>;
type Getter<D> = Box<dyn Fn(&D) -> Vec<String> + Send + Sync>;
type AttributeGetter<D> = Box<dyn Fn(&D) -> Option<String> + Send + Sync>;

struct Field<D> {
    key: String,
    set: Setter<D>,
    get: Getter<D>,
    preserve_whitespace: bool,
    allow_empty: bool,
}

struct Attribute<D> {
    name: String,
    set: Setter<D>,
    get: AttributeGetter<D>,
}

enum Entry<D> {
    Field(Field<D>),
    Child(Box<dyn ChildBinding<D>>),
}

/// A delegated child structure, with the child's descriptor type erased.
trait ChildBinding<D>: Send + Sync {
    fn key(&self) -> &str;
    fn tag(&self) -> &str;
    fn new_node(&self) -> Box<dyn Node>;
    fn add(&self, parent: &mut D, child: Descriptor) -> Result<(), NodeError>;
    fn write(&self, parent: &D) -> Vec<XmlElement>;
}

type ChildAdder<D, C> = Box<dyn Fn(&mut D, C) + Send + Sync>;
type ChildGetter<D, C> = Box<dyn for<'a> Fn(&'a D) -> Vec<&'a C> + Send + Sync>;

struct Delegate<D, C> {
    key: String,
    kind: Arc<NodeKind<C>>,
    add: ChildAdder<D, C>,
    get: ChildGetter<D, C>,
}

impl<D: 'static, C: 'static> ChildBinding<D> for Delegate<D, C> {
    fn key(&self) -> &str {
        &self.key
    }

    fn tag(&self) -> &str {
        &self.kind.tag
    }

    fn new_node(&self) -> Box<dyn Node> {
        self.kind.new_node()
    }

    fn add(&self, parent: &mut D, child: Descriptor) -> Result<(), NodeError> {
        let child = child.downcast::<C>().map_err(|_| NodeError::UnexpectedChild {
            tag: self.kind.tag.clone(),
        })?;
        (self.add)(parent, *child);
        Ok(())
    }

    fn write(&self, parent: &D) -> Vec<XmlElement> {
        (self.get)(parent)
            .into_iter()
            .flat_map(|child| self.kind.write(child))
            .collect()
    }
}

/// Parse a boolean field value. Accepts `true`/`false`, `yes`/`no`,
/// `on`/`off` and `1`/`0`, in any case.
pub fn parse_flag(text: &str) -> Result<bool, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("'{}' is not a boolean", other)),
    }
}

fn parse_value<T>(text: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    text.trim().parse::<T>().map_err(|e| e.to_string())
}

fn last_segment(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// The declaration of one descriptor type `D`.
pub struct NodeKind<D> {
    tag: String,
    entries: Vec<Entry<D>>,
    fields: DispatchTable<usize>,
    delegates: HashMap<String, usize>,
    attributes: Vec<Attribute<D>>,
    completes_on: Option<String>,
    factory: Box<dyn Fn() -> D + Send + Sync>,
}

impl<D: Default + 'static> NodeKind<D> {
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_factory(tag, D::default)
    }
}

impl<D: 'static> NodeKind<D> {
    pub fn with_factory(tag: impl Into<String>, factory: impl Fn() -> D + Send + Sync + 'static) -> Self {
        Self {
            tag: tag.into(),
            entries: Vec::new(),
            fields: DispatchTable::new(),
            delegates: HashMap::new(),
            attributes: Vec::new(),
            completes_on: None,
            factory: Box::new(factory),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The element whose end completes a node of this kind.
    pub fn completion_tag(&self) -> &str {
        self.completes_on.as_deref().unwrap_or(&self.tag)
    }

    /// Whether nodes of this kind stay open past their own element.
    pub fn spans_siblings(&self) -> bool {
        self.completion_tag() != self.tag
    }

    fn push_field(mut self, key: &str, set: Setter<D>, get: Getter<D>) -> Self {
        self.fields.insert(key, self.entries.len());
        self.entries.push(Entry::Field(Field {
            key: key.to_string(),
            set,
            get,
            preserve_whitespace: false,
            allow_empty: false,
        }));
        self
    }

    fn last_field(&mut self) -> Option<&mut Field<D>> {
        match self.entries.last_mut() {
            Some(Entry::Field(field)) => Some(field),
            _ => None,
        }
    }

    /// A string field set from the text of the element at `key`.
    pub fn text(
        self,
        key: &str,
        set: impl Fn(&mut D, String) + Send + Sync + 'static,
        get: impl Fn(&D) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.push_field(
            key,
            Box::new(move |d: &mut D, v: &str| {
                set(d, v.to_string());
                Ok(())
            }),
            Box::new(move |d: &D| get(d).into_iter().collect()),
        )
    }

    /// A repeated string field; every occurrence of `key` appends.
    pub fn texts(
        self,
        key: &str,
        add: impl Fn(&mut D, String) + Send + Sync + 'static,
        get: impl Fn(&D) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.push_field(
            key,
            Box::new(move |d: &mut D, v: &str| {
                add(d, v.to_string());
                Ok(())
            }),
            Box::new(get),
        )
    }

    /// A field parsed with [`FromStr`] from the trimmed text.
    pub fn value<T>(
        self,
        key: &str,
        set: impl Fn(&mut D, T) + Send + Sync + 'static,
        get: impl Fn(&D) -> Option<T> + Send + Sync + 'static,
    ) -> Self
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        self.push_field(
            key,
            Box::new(move |d: &mut D, v: &str| {
                set(d, parse_value(v)?);
                Ok(())
            }),
            Box::new(move |d: &D| get(d).map(|v| v.to_string()).into_iter().collect()),
        )
    }

    /// A boolean field, see [`parse_flag`].
    pub fn flag(
        self,
        key: &str,
        set: impl Fn(&mut D, bool) + Send + Sync + 'static,
        get: impl Fn(&D) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        self.push_field(
            key,
            Box::new(move |d: &mut D, v: &str| {
                set(d, parse_flag(v)?);
                Ok(())
            }),
            Box::new(move |d: &D| get(d).map(|v| v.to_string()).into_iter().collect()),
        )
    }

    /// Keep the text of the last registered field untrimmed.
    pub fn preserve_whitespace(mut self) -> Self {
        if let Some(field) = self.last_field() {
            field.preserve_whitespace = true;
        }
        self
    }

    /// Let an empty value of the last registered field reach its setter.
    pub fn allow_empty(mut self) -> Self {
        if let Some(field) = self.last_field() {
            field.allow_empty = true;
        }
        self
    }

    /// A string attribute of this kind's own element.
    pub fn attribute(
        mut self,
        name: &str,
        set: impl Fn(&mut D, String) + Send + Sync + 'static,
        get: impl Fn(&D) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.attributes.push(Attribute {
            name: name.to_string(),
            set: Box::new(move |d: &mut D, v: &str| {
                set(d, v.to_string());
                Ok(())
            }),
            get: Box::new(get),
        });
        self
    }

    /// A boolean attribute of this kind's own element.
    pub fn flag_attribute(
        mut self,
        name: &str,
        set: impl Fn(&mut D, bool) + Send + Sync + 'static,
        get: impl Fn(&D) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        self.attributes.push(Attribute {
            name: name.to_string(),
            set: Box::new(move |d: &mut D, v: &str| {
                set(d, parse_flag(v)?);
                Ok(())
            }),
            get: Box::new(move |d: &D| get(d).map(|v| v.to_string())),
        });
        self
    }

    /// Delegate the element at `key` to `kind`. The last segment of `key`
    /// is the child's tag; leading segments are wrapper elements.
    pub fn child<C: 'static>(
        mut self,
        key: &str,
        kind: Arc<NodeKind<C>>,
        add: impl Fn(&mut D, C) + Send + Sync + 'static,
        get: impl for<'a> Fn(&'a D) -> Vec<&'a C> + Send + Sync + 'static,
    ) -> Self {
        self.delegates.insert(kind.tag.clone(), self.entries.len());
        self.entries.push(Entry::Child(Box::new(Delegate {
            key: key.to_string(),
            kind,
            add: Box::new(add),
            get: Box::new(get),
        })));
        self
    }

    /// Complete on the end of `tag` instead of this kind's own element.
    pub fn completes_on(mut self, tag: impl Into<String>) -> Self {
        self.completes_on = Some(tag.into());
        self
    }

    fn field(&self, path: &str) -> Option<&Field<D>> {
        match self.fields.resolve(path).map(|&i| &self.entries[i]) {
            Some(Entry::Field(field)) => Some(field),
            _ => None,
        }
    }

    fn delegate(&self, tag: &str) -> Option<&dyn ChildBinding<D>> {
        match self.delegates.get(tag).map(|&i| &self.entries[i]) {
            Some(Entry::Child(child)) => Some(child.as_ref()),
            _ => None,
        }
    }

    /// Render `descriptor` as output elements, in registration order.
    ///
    /// Returns one element, or for a kind that spans siblings, its own
    /// element followed by the sibling elements it consumed.
    pub fn write(&self, descriptor: &D) -> Vec<XmlElement> {
        let mut own = XmlElement::new(&self.tag);
        for attribute in &self.attributes {
            if let Some(value) = (attribute.get)(descriptor) {
                own.push_attribute(&attribute.name, value);
            }
        }

        let mut content = XmlElement::new(&self.tag);
        for entry in &self.entries {
            match entry {
                Entry::Field(field) if field.key == self.tag => {
                    if let Some(text) = (field.get)(descriptor).into_iter().next()
                        && !text.is_empty()
                    {
                        own.children = XmlChildren::Text(text);
                    }
                }
                Entry::Field(field) => {
                    for value in (field.get)(descriptor) {
                        place(
                            &mut content,
                            &field.key,
                            XmlElement::with_text(last_segment(&field.key), value),
                        );
                    }
                }
                Entry::Child(child) => {
                    for element in child.write(descriptor) {
                        place(&mut content, child.key(), element);
                    }
                }
            }
        }

        match content.children {
            XmlChildren::Elements(elements) if self.spans_siblings() => {
                let mut out = vec![own];
                out.extend(elements);
                out
            }
            XmlChildren::Elements(elements) => {
                own.children = XmlChildren::Elements(elements);
                vec![own]
            }
            _ => vec![own],
        }
    }
}

impl<D: 'static> NodeKind<D> {
    /// A fresh node with a new descriptor from this kind's factory.
    pub fn new_node(self: &Arc<Self>) -> Box<dyn Node> {
        Box::new(DescriptorNode {
            descriptor: (self.factory)(),
            kind: Arc::clone(self),
        })
    }
}

/// Append `leaf` under the wrapper elements named by all but the last
/// segment of `key`, reusing a wrapper that is the current last child.
fn place(parent: &mut XmlElement, key: &str, leaf: XmlElement) {
    let wrappers: Vec<&str> = key.split('/').collect();
    place_under(parent, &wrappers[..wrappers.len() - 1], leaf);
}

fn place_under(parent: &mut XmlElement, wrappers: &[&str], leaf: XmlElement) {
    let Some((first, rest)) = wrappers.split_first() else {
        parent.push_child(leaf);
        return;
    };
    if parent.last_child_named_mut(first).is_none() {
        parent.push_child(XmlElement::new(*first));
    }
    if let Some(wrapper) = parent.last_child_named_mut(first) {
        place_under(wrapper, rest, leaf);
    }
}

/// The live node for a descriptor of kind `D`.
pub struct DescriptorNode<D> {
    kind: Arc<NodeKind<D>>,
    descriptor: D,
}

impl<D: 'static> Node for DescriptorNode<D> {
    fn tag(&self) -> &str {
        &self.kind.tag
    }

    fn handles_element(&self, name: &QName) -> bool {
        !self.kind.delegates.contains_key(name.local_name())
    }

    fn child_node(&self, name: &QName) -> Option<Box<dyn Node>> {
        self.kind
            .delegate(name.local_name())
            .map(|child| child.new_node())
    }

    fn start(&mut self, attributes: &[BoundAttribute]) -> Result<(), NodeError> {
        for attribute in attributes {
            let local = attribute.name.local_name();
            let binding = self.kind.attributes.iter().find(|a| a.name == local);
            match binding {
                Some(binding) => (binding.set)(&mut self.descriptor, &attribute.value).map_err(
                    |reason| NodeError::InvalidValue {
                        path: format!("{}@{}", self.kind.tag, local),
                        value: attribute.value.clone(),
                        reason,
                    },
                )?,
                None if attribute.name.namespace() == Some(XSI_NAMESPACE) => {}
                None => debug!(
                    node = %self.kind.tag,
                    attribute = %attribute.name,
                    "Ignoring unregistered attribute"
                ),
            }
        }
        Ok(())
    }

    fn start_element(
        &mut self,
        path: &str,
        _name: &QName,
        attributes: &[BoundAttribute],
    ) -> Result<(), NodeError> {
        if !attributes.is_empty() {
            debug!(
                node = %self.kind.tag,
                path,
                count = attributes.len(),
                "Ignoring attributes on a field element"
            );
        }
        Ok(())
    }

    fn preserves_whitespace(&self, path: &str) -> bool {
        self.kind.field(path).is_some_and(|f| f.preserve_whitespace)
    }

    fn accepts_empty(&self, path: &str) -> bool {
        self.kind.field(path).is_some_and(|f| f.allow_empty)
    }

    fn set_element_value(
        &mut self,
        path: &str,
        _name: &QName,
        value: String,
    ) -> Result<(), NodeError> {
        let Some(field) = self.kind.field(path) else {
            return Err(NodeError::UnknownElement {
                path: path.to_string(),
            });
        };
        (field.set)(&mut self.descriptor, &value).map_err(|reason| NodeError::InvalidValue {
            path: path.to_string(),
            value,
            reason,
        })
    }

    fn end_element(&mut self, name: &QName) -> bool {
        name.local_name() == self.kind.completion_tag()
    }

    fn add_child(&mut self, tag: &str, child: Descriptor) -> Result<(), NodeError> {
        match self.kind.delegate(tag) {
            Some(binding) => binding.add(&mut self.descriptor, child),
            None => Err(NodeError::UnexpectedChild {
                tag: tag.to_string(),
            }),
        }
    }

    fn into_descriptor(self: Box<Self>) -> Descriptor {
        Box::new(self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Pool {
        name: Option<String>,
        description: Option<String>,
        steady: Option<u32>,
        validate: Option<bool>,
        init_sql: Option<String>,
        properties: Vec<Property>,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Property {
        name: Option<String>,
        value: Option<String>,
    }

    fn property_kind() -> Arc<NodeKind<Property>> {
        Arc::new(
            NodeKind::<Property>::new("property")
                .attribute("name", |p, v| p.name = Some(v), |p| p.name.clone())
                .attribute("value", |p, v| p.value = Some(v), |p| p.value.clone()),
        )
    }

    fn pool_kind() -> Arc<NodeKind<Pool>> {
        Arc::new(
            NodeKind::<Pool>::new("pool")
                .attribute("name", |p, v| p.name = Some(v), |p| p.name.clone())
                .text("description", |p, v| p.description = Some(v), |p| p.description.clone())
                .preserve_whitespace()
                .value("settings/steady", |p, v| p.steady = Some(v), |p| p.steady)
                .flag("settings/validate", |p, v| p.validate = Some(v), |p| p.validate)
                .text("init-sql", |p, v| p.init_sql = Some(v), |p| p.init_sql.clone())
                .allow_empty()
                .child(
                    "property",
                    property_kind(),
                    |p, c| p.properties.push(c),
                    |p| p.properties.iter().collect(),
                ),
        )
    }

    fn q(name: &str) -> QName {
        QName::new(name)
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" Yes "), Ok(true));
        assert_eq!(parse_flag("0"), Ok(false));
        assert_eq!(parse_flag("OFF"), Ok(false));
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_handles_fields_not_delegates() {
        let node = pool_kind().new_node();
        assert!(node.handles_element(&q("description")));
        assert!(!node.handles_element(&q("property")));
        assert!(node.child_node(&q("property")).is_some());
        assert!(node.child_node(&q("description")).is_none());
    }

    #[test]
    fn test_typed_setters_and_policies() {
        let mut node = pool_kind().new_node();
        node.set_element_value("settings/steady", &q("steady"), " 8 ".into())
            .unwrap();
        node.set_element_value("settings/validate", &q("validate"), "on".into())
            .unwrap();
        assert!(node.preserves_whitespace("description"));
        assert!(!node.preserves_whitespace("settings/steady"));
        assert!(node.accepts_empty("init-sql"));
        assert!(!node.accepts_empty("description"));

        let pool = node.into_descriptor().downcast::<Pool>().unwrap();
        assert_eq!(pool.steady, Some(8));
        assert_eq!(pool.validate, Some(true));
    }

    #[test]
    fn test_invalid_value() {
        let mut node = pool_kind().new_node();
        let err = node
            .set_element_value("settings/steady", &q("steady"), "eight".into())
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidValue { ref path, .. } if path == "settings/steady"));
    }

    #[test]
    fn test_unknown_path() {
        let mut node = pool_kind().new_node();
        let err = node
            .set_element_value("bogus", &q("bogus"), "x".into())
            .unwrap_err();
        assert_eq!(
            err,
            NodeError::UnknownElement {
                path: "bogus".into()
            }
        );
    }

    #[test]
    fn test_attributes_and_child() {
        let kind = pool_kind();
        let mut node = kind.new_node();
        node.start(&[BoundAttribute {
            name: q("name"),
            value: "FooPool".into(),
        }])
        .unwrap();

        let mut child = node.child_node(&q("property")).unwrap();
        child
            .start(&[
                BoundAttribute {
                    name: q("name"),
                    value: "user".into(),
                },
                BoundAttribute {
                    name: q("bogus"),
                    value: "x".into(),
                },
            ])
            .unwrap();
        assert!(child.end_element(&q("property")));
        node.add_child("property", child.into_descriptor()).unwrap();

        let pool = node.into_descriptor().downcast::<Pool>().unwrap();
        assert_eq!(pool.name.as_deref(), Some("FooPool"));
        assert_eq!(pool.properties[0].name.as_deref(), Some("user"));
    }

    #[test]
    fn test_add_child_type_mismatch() {
        let mut node = pool_kind().new_node();
        let err = node.add_child("property", Box::new(42u8)).unwrap_err();
        assert_eq!(
            err,
            NodeError::UnexpectedChild {
                tag: "property".into()
            }
        );
    }

    #[test]
    fn test_write_order_and_wrappers() {
        let pool = Pool {
            name: Some("FooPool".into()),
            description: Some(" d ".into()),
            steady: Some(8),
            validate: Some(false),
            init_sql: Some(String::new()),
            properties: vec![Property {
                name: Some("user".into()),
                value: Some("app".into()),
            }],
        };
        let elements = pool_kind().write(&pool);
        assert_eq!(elements.len(), 1);
        let root = &elements[0];
        assert_eq!(root.get_attribute("name"), Some("FooPool"));

        let names: Vec<&str> = root.elements().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["description", "settings", "init-sql", "property"]);

        let settings = &root.elements()[1];
        assert_eq!(settings.elements().len(), 2);
        assert_eq!(settings.elements()[0].text(), Some("8"));
        assert_eq!(settings.elements()[1].text(), Some("false"));
        assert!(root.elements()[2].is_empty());
    }

    #[derive(Debug, Default, PartialEq)]
    struct EnvEntry {
        name: Option<String>,
        value: Option<String>,
    }

    #[test]
    fn test_spanning_kind_writes_siblings() {
        let kind = Arc::new(
            NodeKind::<EnvEntry>::new("entry-name")
                .text("entry-name", |e, v| e.name = Some(v), |e| e.name.clone())
                .text("entry-value", |e, v| e.value = Some(v), |e| e.value.clone())
                .completes_on("entry-value"),
        );
        assert!(kind.spans_siblings());

        let mut node = kind.new_node();
        assert!(!node.end_element(&q("entry-name")));
        assert!(node.end_element(&q("entry-value")));

        let elements = kind.write(&EnvEntry {
            name: Some("a".into()),
            value: Some("1".into()),
        });
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["entry-name", "entry-value"]);
        assert_eq!(elements[0].text(), Some("a"));
    }
}
