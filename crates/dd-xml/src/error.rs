//! Error types for XML reading and writing.

use dd_diagnostics::{DiagnosticMessage, DiagnosticMessageBuilder, Location};
use std::fmt;

/// Result type alias for dd-xml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing XML.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// XML syntax error from quick-xml.
    XmlSyntax {
        message: String,
        location: Option<Location>,
    },

    /// The document ended with elements still open.
    UnexpectedEof {
        /// What was expected when EOF was encountered.
        expected: String,
        location: Option<Location>,
    },

    /// Character data or an attribute value could not be unescaped.
    InvalidText {
        message: String,
        location: Option<Location>,
    },

    /// Empty document (no root element).
    EmptyDocument { document: String },

    /// Serialization failed.
    Write { message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::XmlSyntax { message, location } => {
                write!(f, "XML syntax error: {}", message)?;
                if let Some(loc) = location {
                    write!(f, " at {}", loc)?;
                }
                Ok(())
            }
            Error::UnexpectedEof { expected, .. } => {
                write!(f, "Unexpected end of input, expected {}", expected)
            }
            Error::InvalidText { message, .. } => {
                write!(f, "Invalid text content: {}", message)
            }
            Error::EmptyDocument { document } => {
                write!(f, "Empty XML document '{}': no root element found", document)
            }
            Error::Write { message } => write!(f, "Failed to write XML: {}", message),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// The location this error refers to, if known.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::XmlSyntax { location, .. }
            | Error::UnexpectedEof { location, .. }
            | Error::InvalidText { location, .. } => location.as_ref(),
            Error::EmptyDocument { .. } | Error::Write { .. } => None,
        }
    }

    /// Convert this error to a DiagnosticMessage with the appropriate DD-1-* code.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            Error::XmlSyntax { message, location } => {
                DiagnosticMessageBuilder::error("XML Syntax Error")
                    .with_code("DD-1-1")
                    .problem(message.clone())
                    .with_optional_location(location.clone())
                    .build()
            }

            Error::UnexpectedEof { expected, location } => {
                DiagnosticMessageBuilder::error("Unexpected End of XML Input")
                    .with_code("DD-1-2")
                    .problem(format!(
                        "The XML document ended unexpectedly; expected {}",
                        expected
                    ))
                    .with_optional_location(location.clone())
                    .build()
            }

            Error::InvalidText { message, location } => {
                DiagnosticMessageBuilder::warning("Invalid Text Content")
                    .with_code("DD-1-3")
                    .problem(message.clone())
                    .add_info("The raw, unescaped text was used instead")
                    .with_optional_location(location.clone())
                    .build()
            }

            Error::EmptyDocument { document } => {
                DiagnosticMessageBuilder::error("Empty XML Document")
                    .with_code("DD-1-4")
                    .problem(format!("`{}` contains no root element", document))
                    .add_hint("Add a root element to the document?")
                    .build()
            }

            Error::Write { message } => DiagnosticMessageBuilder::error("Write Failure")
                .with_code("DD-5-1")
                .problem(message.clone())
                .build(),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlSyntax {
            message: err.to_string(),
            location: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlSyntax {
            message: format!("Attribute error: {}", err),
            location: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Write {
            message: err.to_string(),
        }
    }
}
