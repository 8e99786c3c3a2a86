//! Error types for dd-binding

use std::path::PathBuf;

use dd_diagnostics::{DiagnosticKind, DiagnosticMessage, DiagnosticMessageBuilder, Location};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{location}: no node is registered for element <{element}>")]
    UnregisteredElement { element: String, location: Location },

    #[error("{location}: no dispatch entry matches '{path}' in node <{node}>")]
    FailedDispatch {
        node: String,
        path: String,
        location: Location,
    },

    #[error("{location}: invalid value '{value}' for '{path}': {reason}")]
    InvalidValue {
        path: String,
        value: String,
        reason: String,
        location: Location,
    },

    #[error("{location}: upgrade rule '{rule}' rejected the captured values for '{path}': {reason}")]
    InvalidVersionUpgrade {
        rule: String,
        path: String,
        reason: String,
        location: Location,
    },

    #[error(
        "{}schema or DTD not found locally (public id {}, system id '{}'): {}",
        location_prefix(.location),
        .public_id.as_deref().unwrap_or("<none>"),
        .system_id,
        .reason
    )]
    EntityResolution {
        public_id: Option<String>,
        system_id: String,
        reason: String,
        location: Option<Location>,
    },

    #[error("{}{}", location_prefix(.location), .message)]
    StructuralImbalance {
        message: String,
        location: Option<Location>,
    },

    #[error(transparent)]
    Xml(#[from] dd_xml::Error),

    #[error("{document}: the document produced no root descriptor")]
    NoDescriptor { document: String },

    #[error("No document kind is registered for root element <{0}>")]
    UnknownKind(String),

    #[error("Failed to write document: {0}")]
    Write(String),

    #[error("Failed to parse engine config: {0}")]
    Config(String),

    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

fn location_prefix(location: &Option<Location>) -> String {
    location
        .as_ref()
        .map(|l| format!("{}: ", l))
        .unwrap_or_default()
}

impl Error {
    /// Where in the input the error was detected, if anywhere.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::UnregisteredElement { location, .. }
            | Error::FailedDispatch { location, .. }
            | Error::InvalidValue { location, .. }
            | Error::InvalidVersionUpgrade { location, .. } => Some(location),
            Error::EntityResolution { location, .. }
            | Error::StructuralImbalance { location, .. } => location.as_ref(),
            Error::Xml(err) => err.location(),
            Error::NoDescriptor { .. }
            | Error::UnknownKind(_)
            | Error::Write(_)
            | Error::Config(_)
            | Error::Io { .. } => None,
        }
    }

    /// Errors that lenient mode may log and skip.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnregisteredElement { .. }
                | Error::FailedDispatch { .. }
                | Error::InvalidValue { .. }
        )
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            Error::UnregisteredElement { element, location } => {
                DiagnosticMessageBuilder::error("Unregistered Element")
                    .with_code("DD-2-1")
                    .problem(format!("No node is registered for element `<{}>`", element))
                    .add_hint("Is the document kind registered, and is the tag spelled correctly?")
                    .with_location(location.clone())
                    .build()
            }

            Error::FailedDispatch {
                node,
                path,
                location,
            } => DiagnosticMessageBuilder::error("Failed Dispatch")
                .with_code("DD-2-2")
                .problem(format!(
                    "Node `<{}>` has no field for element path `{}`",
                    node, path
                ))
                .add_detail(format!(
                    "Tried: {}",
                    crate::dispatch::widen(path)
                        .map(|p| format!("`{}`", p))
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
                .with_location(location.clone())
                .build(),

            Error::InvalidValue {
                path,
                value,
                reason,
                location,
            } => DiagnosticMessageBuilder::error("Invalid Value")
                .with_code("DD-2-3")
                .problem(format!("`{}` cannot hold the value `{}`", path, value))
                .add_detail(reason.clone())
                .with_location(location.clone())
                .build(),

            Error::InvalidVersionUpgrade {
                rule,
                path,
                reason,
                location,
            } => DiagnosticMessageBuilder::warning("Invalid Version Upgrade")
                .with_code("DD-4-1")
                .problem(format!(
                    "Upgrade rule `{}` matched `{}` but rejected the captured values",
                    rule, path
                ))
                .add_detail(reason.clone())
                .add_info("The element was kept in its legacy form")
                .with_location(location.clone())
                .build(),

            Error::EntityResolution {
                public_id,
                system_id,
                reason,
                location,
            } => {
                let mut builder = DiagnosticMessageBuilder::error("Schema Not Found Locally")
                    .with_code("DD-3-1")
                    .problem(format!("`{}` is not available from local resources", system_id));
                if let Some(public_id) = public_id {
                    builder = builder.add_info(format!("Public id: `{}`", public_id));
                }
                builder
                    .add_detail(reason.clone())
                    .add_hint("Remote schemas are never fetched; install the file locally?")
                    .with_optional_location(location.clone())
                    .build()
            }

            Error::StructuralImbalance { message, location } => {
                DiagnosticMessageBuilder::error("Structural Imbalance")
                    .with_code("DD-2-4")
                    .problem(message.clone())
                    .with_optional_location(location.clone())
                    .build()
            }

            Error::Xml(err) => err.to_diagnostic(),

            Error::NoDescriptor { document } => DiagnosticMessageBuilder::error("No Descriptor")
                .with_code("DD-2-5")
                .problem(format!("`{}` produced no root descriptor", document))
                .add_hint("The root element may have been skipped in lenient mode")
                .build(),

            Error::UnknownKind(tag) => DiagnosticMessageBuilder::error("Unknown Document Kind")
                .with_code("DD-5-2")
                .problem(format!("No root kind is registered for `<{}>`", tag))
                .build(),

            Error::Write(message) => DiagnosticMessageBuilder::error("Write Failure")
                .with_code("DD-5-1")
                .problem(message.clone())
                .build(),

            Error::Config(message) => DiagnosticMessageBuilder::error("Invalid Configuration")
                .with_code("DD-6-1")
                .problem(message.clone())
                .build(),

            Error::Io { path, source } => DiagnosticMessageBuilder::error("I/O Error")
                .with_code("DD-6-2")
                .problem(format!("`{}`: {}", path.display(), source))
                .build(),
        }
    }

    /// The diagnostic recorded when lenient mode continues past this error.
    pub fn to_warning(&self) -> DiagnosticMessage {
        let mut diagnostic = self.to_diagnostic();
        diagnostic.kind = DiagnosticKind::Warning;
        diagnostic
    }
}
