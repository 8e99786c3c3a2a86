//! Push-style reader that turns a document into [`XmlEvent`]s.

use crate::doctype::{parse_doctype, parse_schema_location};
use crate::error::Error;
use crate::events::{EventSink, XmlAttribute, XmlEvent};
use dd_diagnostics::{LineIndex, Location};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Reader behaviour switches.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Emit [`XmlEvent::ResolveEntity`] for each `xsi:schemaLocation`
    /// (and `xsi:noNamespaceSchemaLocation`) reference on the root element.
    pub resolve_schema_locations: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            resolve_schema_locations: true,
        }
    }
}

/// Reads one document and pushes its events into an [`EventSink`].
pub struct XmlReader<'a> {
    reader: Reader<&'a [u8]>,
    index: LineIndex,
    options: ReaderOptions,
    /// Number of currently open elements.
    depth: usize,
    saw_root: bool,
}

impl<'a> XmlReader<'a> {
    /// Create a reader over `source`; `document` names it in locations.
    pub fn new(document: &str, source: &'a str) -> Self {
        Self::with_options(document, source, ReaderOptions::default())
    }

    pub fn with_options(document: &str, source: &'a str, options: ReaderOptions) -> Self {
        let mut reader = Reader::from_str(source);
        let config = reader.config_mut();
        config.trim_text_start = false;
        config.trim_text_end = false;
        config.expand_empty_elements = true;

        Self {
            reader,
            index: LineIndex::new(document, source),
            options,
            depth: 0,
            saw_root: false,
        }
    }

    /// Read the whole document, pushing every event into `sink`.
    ///
    /// Stops at the first error returned by the sink. A fatal reader error is
    /// delivered to the sink as [`XmlEvent::FatalError`] and then returned.
    pub fn read<S: EventSink>(mut self, sink: &mut S) -> Result<(), S::Error> {
        sink.handle_event(XmlEvent::StartDocument, &self.index.locate(0))?;

        loop {
            let event_start = self.reader.buffer_position() as usize;
            let location = self.index.locate(event_start);

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    self.handle_start(&e, &location, sink)?;
                }
                Ok(Event::Empty(e)) => {
                    // Only reachable if empty-element expansion is disabled.
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.handle_start(&e, &location, sink)?;
                    self.depth -= 1;
                    sink.handle_event(XmlEvent::EndElement { name }, &location)?;
                }
                Ok(Event::End(e)) => {
                    self.depth = self.depth.saturating_sub(1);
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    sink.handle_event(XmlEvent::EndElement { name }, &location)?;
                }
                Ok(Event::Text(e)) => {
                    if self.depth == 0 {
                        continue;
                    }
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            let error = Error::InvalidText {
                                message: err.to_string(),
                                location: Some(location.clone()),
                            };
                            sink.handle_event(XmlEvent::Error(error), &location)?;
                            String::from_utf8_lossy(&e).into_owned()
                        }
                    };
                    sink.handle_event(XmlEvent::Characters(text), &location)?;
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    sink.handle_event(XmlEvent::Characters(text), &location)?;
                }
                Ok(Event::DocType(e)) => {
                    let body = String::from_utf8_lossy(&e).into_owned();
                    if let Some(decl) = parse_doctype(&body)
                        && let Some(system_id) = decl.system_id
                    {
                        sink.handle_event(
                            XmlEvent::ResolveEntity {
                                public_id: decl.public_id,
                                system_id,
                            },
                            &location,
                        )?;
                    }
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    let error_location = self.index.locate(self.reader.error_position() as usize);
                    let error = Error::XmlSyntax {
                        message: e.to_string(),
                        location: Some(error_location.clone()),
                    };
                    return Self::fatal(sink, error, &error_location);
                }
            }
        }

        let end = self.index.locate(usize::MAX);
        if self.depth > 0 {
            let error = Error::UnexpectedEof {
                expected: format!("{} more closing tag(s)", self.depth),
                location: Some(end.clone()),
            };
            return Self::fatal(sink, error, &end);
        }
        if !self.saw_root {
            let error = Error::EmptyDocument {
                document: self.index.document().to_string(),
            };
            return Self::fatal(sink, error, &end);
        }

        sink.handle_event(XmlEvent::EndDocument, &end)
    }

    fn fatal<S: EventSink>(sink: &mut S, error: Error, location: &Location) -> Result<(), S::Error> {
        sink.handle_event(XmlEvent::FatalError(error.clone()), location)?;
        Err(error.into())
    }

    fn handle_start<S: EventSink>(
        &mut self,
        e: &BytesStart<'_>,
        location: &Location,
        sink: &mut S,
    ) -> Result<(), S::Error> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let is_root = self.depth == 0;

        let mut attributes = Vec::new();
        let mut schema_locations = Vec::new();

        for attr_result in e.attributes() {
            let attr = match attr_result {
                Ok(attr) => attr,
                Err(err) => {
                    let mut error = Error::from(err);
                    if let Error::XmlSyntax { location: loc, .. } = &mut error {
                        *loc = Some(location.clone());
                    }
                    return Self::fatal(sink, error, location);
                }
            };

            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(err) => {
                    let error = Error::InvalidText {
                        message: format!("attribute '{}': {}", key, err),
                        location: Some(location.clone()),
                    };
                    sink.handle_event(XmlEvent::Error(error), location)?;
                    String::from_utf8_lossy(&attr.value).into_owned()
                }
            };

            if key == "xmlns" {
                sink.handle_event(
                    XmlEvent::StartPrefixMapping {
                        prefix: None,
                        uri: value,
                    },
                    location,
                )?;
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                sink.handle_event(
                    XmlEvent::StartPrefixMapping {
                        prefix: Some(prefix.to_string()),
                        uri: value,
                    },
                    location,
                )?;
            } else {
                if is_root && self.options.resolve_schema_locations {
                    if key.ends_with(":schemaLocation") {
                        schema_locations.extend(
                            parse_schema_location(&value)
                                .into_iter()
                                .map(|(_, location)| location),
                        );
                    } else if key.ends_with(":noNamespaceSchemaLocation") {
                        schema_locations.push(value.trim().to_string());
                    }
                }
                attributes.push(XmlAttribute { name: key, value });
            }
        }

        for system_id in schema_locations {
            sink.handle_event(
                XmlEvent::ResolveEntity {
                    public_id: None,
                    system_id,
                },
                location,
            )?;
        }

        self.depth += 1;
        self.saw_root = true;
        sink.handle_event(XmlEvent::StartElement { name, attributes }, location)
    }
}
