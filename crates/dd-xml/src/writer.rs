//! Serialization of [`XmlDocument`] trees.

use crate::error::{Error, Result};
use crate::tree::{XmlChildren, XmlDocument, XmlElement};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// Output formatting.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Serialize `document` to `sink` as UTF-8.
///
/// Writes the XML declaration, the DOCTYPE if the document has one, and the
/// element tree. Elements without content are written as `<name/>`.
pub fn write_document<W: Write>(
    document: &XmlDocument,
    sink: W,
    options: &WriteOptions,
) -> Result<()> {
    let mut writer = if options.indent > 0 {
        Writer::new_with_indent(sink, b' ', options.indent)
    } else {
        Writer::new(sink)
    };

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    if let Some(doctype) = &document.doctype {
        emit(
            &mut writer,
            Event::DocType(BytesText::from_escaped(doctype.to_declaration())),
        )?;
    }

    write_element(&mut writer, &document.root)?;

    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

/// Serialize `document` into a `String`.
pub fn write_to_string(document: &XmlDocument, options: &WriteOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_document(document, &mut buffer, options)?;
    String::from_utf8(buffer).map_err(|e| Error::Write {
        message: e.to_string(),
    })
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    match &element.children {
        XmlChildren::Empty => emit(writer, Event::Empty(start)),
        XmlChildren::Text(text) => {
            emit(writer, Event::Start(start))?;
            emit(writer, Event::Text(BytesText::new(text)))?;
            emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
        }
        XmlChildren::Elements(children) => {
            emit(writer, Event::Start(start))?;
            for child in children {
                write_element(writer, child)?;
            }
            emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
        }
    }
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(|e| Error::Write {
        message: e.to_string(),
    })
}
