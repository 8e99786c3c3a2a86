//! The contract between the parse engine and per-descriptor handlers.
//!
//! The engine never looks inside a descriptor. It creates nodes, forwards
//! element events and finalized text to them, and hands completed child
//! descriptors to their parents. Everything it learns about a document kind
//! comes through [`Node`].

use std::any::Any;

use dd_xml::QName;

/// A descriptor under construction or completed, with its type erased.
pub type Descriptor = Box<dyn Any>;

/// An attribute of a started element, with its name resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundAttribute {
    pub name: QName,
    pub value: String,
}

/// Failures a node reports to the engine. The engine adds the location.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NodeError {
    #[error("no field is registered for '{path}'")]
    UnknownElement { path: String },

    #[error("invalid value '{value}' for '{path}': {reason}")]
    InvalidValue {
        path: String,
        value: String,
        reason: String,
    },

    #[error("<{tag}> is not a child structure of this node")]
    UnexpectedChild { tag: String },
}

/// A handler for one descriptor kind, live while its element is open.
pub trait Node {
    /// Local name of the element that created this node.
    fn tag(&self) -> &str;

    /// Whether `name` is a field of this node's descriptor rather than a
    /// structure delegated to a child node.
    fn handles_element(&self, name: &QName) -> bool;

    /// A fresh node for a delegated child element, if one is registered.
    fn child_node(&self, name: &QName) -> Option<Box<dyn Node>>;

    /// Called once with the attributes of the element that created the node.
    fn start(&mut self, attributes: &[BoundAttribute]) -> Result<(), NodeError>;

    /// Called when a handled element starts. `path` is relative to the
    /// node's element.
    fn start_element(
        &mut self,
        path: &str,
        name: &QName,
        attributes: &[BoundAttribute],
    ) -> Result<(), NodeError>;

    /// Whether the text of `path` is kept untrimmed.
    fn preserves_whitespace(&self, path: &str) -> bool;

    /// Whether an empty value for `path` still reaches the setter.
    fn accepts_empty(&self, path: &str) -> bool;

    /// Assign the finalized text of a handled element.
    fn set_element_value(&mut self, path: &str, name: &QName, value: String)
    -> Result<(), NodeError>;

    /// Called when the node's own element, or a sibling of it, ends. Returns
    /// true when the node is complete and should be popped.
    fn end_element(&mut self, name: &QName) -> bool;

    /// Receive the descriptor of a completed child node.
    fn add_child(&mut self, tag: &str, child: Descriptor) -> Result<(), NodeError>;

    fn into_descriptor(self: Box<Self>) -> Descriptor;
}
