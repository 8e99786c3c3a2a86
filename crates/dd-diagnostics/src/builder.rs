//! Builder for [`DiagnosticMessage`].

use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
use crate::location::Location;

/// Builder for diagnostic messages.
///
/// ```
/// use dd_diagnostics::DiagnosticMessageBuilder;
///
/// let diag = DiagnosticMessageBuilder::error("Failed Dispatch")
///     .with_code("DD-2-2")
///     .problem("No field matches `ejb/bogus`")
///     .add_detail("Tried `ejb/bogus`, then `bogus`")
///     .add_hint("Check the element spelling?")
///     .build();
///
/// assert_eq!(diag.code.as_deref(), Some("DD-2-2"));
/// assert_eq!(diag.details.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    /// Set the problem statement.
    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    /// Add an error detail (✖).
    pub fn add_detail(mut self, detail: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Error,
            content: detail.into(),
        });
        self
    }

    /// Add an info detail (ℹ).
    pub fn add_info(mut self, info: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Info,
            content: info.into(),
        });
        self
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.message.location = Some(location);
        self
    }

    /// Set the location if one is known.
    pub fn with_optional_location(mut self, location: Option<Location>) -> Self {
        self.message.location = location;
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }
}
