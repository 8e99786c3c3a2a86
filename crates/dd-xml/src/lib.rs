//! XML plumbing for deployment descriptor binding.
//!
//! This crate wraps [`quick-xml`] in two directions:
//!
//! - [`XmlReader`] walks a document and pushes a flat sequence of
//!   [`XmlEvent`]s (document start/end, prefix mappings, element start/end,
//!   character data, entity-resolution requests, errors) into an
//!   [`EventSink`], each with the [`Location`] it came from.
//! - [`write_document`] serializes an [`XmlDocument`] tree as UTF-8 with an
//!   XML declaration, an optional DOCTYPE, and indentation.
//!
//! It also provides the name handling both directions share: [`QName`] and
//! the per-element [`NamespaceStack`].
//!
//! # Example
//!
//! ```rust
//! use dd_xml::{EventSink, Location, XmlEvent, XmlReader};
//!
//! struct Names(Vec<String>);
//!
//! impl EventSink for Names {
//!     type Error = dd_xml::Error;
//!
//!     fn handle_event(&mut self, event: XmlEvent, _location: &Location) -> dd_xml::Result<()> {
//!         if let XmlEvent::StartElement { name, .. } = event {
//!             self.0.push(name);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut names = Names(Vec::new());
//! XmlReader::new("doc.xml", "<ejb><ejb-name>Foo</ejb-name></ejb>")
//!     .read(&mut names)
//!     .unwrap();
//! assert_eq!(names.0, vec!["ejb", "ejb-name"]);
//! ```

pub mod doctype;
pub mod error;
pub mod events;
pub mod name;
pub mod reader;
pub mod tree;
pub mod writer;

pub use dd_diagnostics::Location;
pub use doctype::{DocTypeDecl, parse_doctype, parse_schema_location};
pub use error::{Error, Result};
pub use events::{EventSink, XmlAttribute, XmlEvent};
pub use name::{NamespaceStack, QName, XSI_NAMESPACE};
pub use reader::{ReaderOptions, XmlReader};
pub use tree::{XmlChildren, XmlDocument, XmlElement};
pub use writer::{WriteOptions, write_document, write_to_string};
