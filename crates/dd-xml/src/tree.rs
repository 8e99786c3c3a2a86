//! Element tree built by the document writer and serialized by [`crate::write_document`].

use crate::doctype::DocTypeDecl;
use crate::events::XmlAttribute;

/// A document ready to be serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Written as `<!DOCTYPE ...>` after the XML declaration when present.
    pub doctype: Option<DocTypeDecl>,
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self {
            doctype: None,
            root,
        }
    }

    pub fn with_doctype(mut self, doctype: DocTypeDecl) -> Self {
        self.doctype = Some(doctype);
        self
    }
}

/// An element in the output tree.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: XmlChildren,
}

/// Children of an output element.
///
/// Descriptor documents never need mixed content, so an element holds either
/// text or child elements.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlChildren {
    /// Written as `<name/>`.
    Empty,
    Text(String),
    Elements(Vec<XmlElement>),
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: XmlChildren::Empty,
        }
    }

    /// An element whose content is `text`; empty text gives an empty element.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let children = if text.is_empty() {
            XmlChildren::Empty
        } else {
            XmlChildren::Text(text)
        };
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children,
        }
    }

    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push(XmlAttribute::new(name, value));
    }

    /// Append a child element. Any text content is replaced.
    pub fn push_child(&mut self, child: XmlElement) {
        match &mut self.children {
            XmlChildren::Elements(children) => children.push(child),
            _ => self.children = XmlChildren::Elements(vec![child]),
        }
    }

    /// The last child element, if it is named `name`.
    pub fn last_child_named_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        match &mut self.children {
            XmlChildren::Elements(children) => children.last_mut().filter(|c| c.name == name),
            _ => None,
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        match &self.children {
            XmlChildren::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn elements(&self) -> &[XmlElement] {
        match &self.children {
            XmlChildren::Elements(children) => children,
            _ => &[],
        }
    }

    /// Child elements named `name`.
    pub fn get_children(&self, name: &str) -> Vec<&XmlElement> {
        self.elements().iter().filter(|e| e.name == name).collect()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.children, XmlChildren::Empty)
    }
}
