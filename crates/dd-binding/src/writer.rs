//! Writing descriptor graphs back out as documents.

use std::any::Any;
use std::io::Write;

use dd_xml::{DocTypeDecl, WriteOptions, XSI_NAMESPACE, XmlAttribute, XmlDocument};
use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::ParsedDocument;
use crate::error::{Error, Result};
use crate::registry::{DocumentType, Registry};

/// Renders root descriptors of registered kinds.
///
/// Formatting comes only from the config the writer was built with, so
/// writers with different settings can be used side by side.
pub struct DocumentWriter<'r> {
    registry: &'r Registry,
    options: WriteOptions,
}

impl<'r> DocumentWriter<'r> {
    pub fn new(registry: &'r Registry, config: &EngineConfig) -> Self {
        Self {
            registry,
            options: WriteOptions {
                indent: config.writer.indent,
            },
        }
    }

    /// Build the output tree for `descriptor`, the root descriptor of a
    /// document whose root element is `root_tag`.
    pub fn to_document(&self, root_tag: &str, descriptor: &dyn Any) -> Result<XmlDocument> {
        let kind = self
            .registry
            .root_kind(root_tag)
            .ok_or_else(|| Error::UnknownKind(root_tag.to_string()))?;
        let mut root = kind.write(descriptor).ok_or_else(|| {
            Error::Write(format!(
                "descriptor is not the type registered for <{}>",
                root_tag
            ))
        })?;

        let document = match kind.document_type() {
            DocumentType::None => XmlDocument::new(root),
            DocumentType::Dtd {
                public_id,
                system_id,
                ..
            } => XmlDocument::new(root).with_doctype(DocTypeDecl::public(
                root_tag, public_id, system_id,
            )),
            DocumentType::Schema {
                namespace,
                location,
                version,
            } => {
                let mut attributes = vec![
                    XmlAttribute::new("xmlns", namespace),
                    XmlAttribute::new("xmlns:xsi", XSI_NAMESPACE),
                    XmlAttribute::new(
                        "xsi:schemaLocation",
                        format!("{} {}", namespace, location),
                    ),
                ];
                if let Some(version) = version
                    && root.get_attribute("version").is_none()
                {
                    attributes.push(XmlAttribute::new("version", version));
                }
                attributes.append(&mut root.attributes);
                root.attributes = attributes;
                XmlDocument::new(root)
            }
        };
        Ok(document)
    }

    pub fn write_to<W: Write>(&self, root_tag: &str, descriptor: &dyn Any, sink: W) -> Result<()> {
        let document = self.to_document(root_tag, descriptor)?;
        dd_xml::write_document(&document, sink, &self.options)?;
        debug!(root = %root_tag, "Wrote document");
        Ok(())
    }

    pub fn write_to_string(&self, root_tag: &str, descriptor: &dyn Any) -> Result<String> {
        let document = self.to_document(root_tag, descriptor)?;
        Ok(dd_xml::write_to_string(&document, &self.options)?)
    }

    /// Write the descriptor of a parsed document.
    pub fn write_parsed<W: Write>(&self, parsed: &ParsedDocument, sink: W) -> Result<()> {
        self.write_to(&parsed.root_tag, parsed.descriptor_any(), sink)
    }
}
