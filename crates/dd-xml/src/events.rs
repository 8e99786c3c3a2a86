//! Events pushed by [`crate::XmlReader`].

use crate::Location;
use crate::error::Error;

/// An attribute as written in the document (raw qualified name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    /// The value after unescaping entity references.
    pub value: String,
}

impl XmlAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A reader event.
///
/// For a well-formed document the sequence is `StartDocument`, then for each
/// element any `StartPrefixMapping`s it declares, any `ResolveEntity` requests,
/// its `StartElement`, content, and `EndElement`, then `EndDocument`.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    StartDocument,

    /// A namespace declaration on the element about to start.
    /// `prefix` is `None` for the default namespace.
    StartPrefixMapping { prefix: Option<String>, uri: String },

    /// `name` is the raw tag, e.g. `xsi:type` or `ejb`. `xmlns` declarations
    /// are not included in `attributes`.
    StartElement {
        name: String,
        attributes: Vec<XmlAttribute>,
    },

    Characters(String),

    EndElement { name: String },

    /// A DOCTYPE external identifier or a schema location the document refers to.
    ResolveEntity {
        public_id: Option<String>,
        system_id: String,
    },

    /// A recoverable problem; the reader continues.
    Error(Error),

    /// An unrecoverable problem; the reader stops after delivering it.
    FatalError(Error),

    EndDocument,
}

/// Receiver of reader events.
pub trait EventSink {
    type Error: From<Error>;

    /// Handle one event. Returning an error stops the reader.
    fn handle_event(&mut self, event: XmlEvent, location: &Location) -> Result<(), Self::Error>;
}
