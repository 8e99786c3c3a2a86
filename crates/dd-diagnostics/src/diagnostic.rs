//! Core diagnostic message types.

use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A problem that was recovered from
    Warning,
    Info,
}

/// How a detail item is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// Rendered with a ✖ bullet
    Error,
    /// Rendered with an ℹ bullet
    Info,
}

/// A bulleted detail in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    pub kind: DetailKind,
    pub content: String,
}

/// A diagnostic message.
///
/// Structure:
/// 1. **Code**: optional error code (e.g., "DD-2-1"), see [`crate::catalog`]
/// 2. **Title**: brief error message
/// 3. **Kind**: error, warning, info
/// 4. **Problem**: what went wrong
/// 5. **Details**: specific information (element names, values, paths)
/// 6. **Hints**: optional guidance for fixing
/// 7. **Location**: where in which document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub title: String,

    pub kind: DiagnosticKind,

    pub problem: Option<String>,

    pub details: Vec<DetailItem>,

    pub hints: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Prefer [`crate::DiagnosticMessageBuilder`] for anything with details.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The subsystem this diagnostic's code belongs to, per the catalog.
    pub fn subsystem(&self) -> Option<&str> {
        self.code
            .as_deref()
            .and_then(crate::catalog::get_subsystem)
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    /// Render as text.
    ///
    /// When `source` holds the text of the document the location points into,
    /// a source snippet is rendered with ariadne; otherwise the location is
    /// printed as `document:line:column`.
    ///
    /// ```text
    /// Error [DD-2-1]: Unregistered Element
    /// No node is registered for `<ejb-jar>`
    /// ✖ Element path: ejb-jar
    /// ? Register the bundle before parsing?
    ///   at ejb.xml:1:1
    /// ```
    pub fn to_text(&self, source: Option<&str>) -> String {
        let mut result = String::new();

        let snippet = match (&self.location, source) {
            (Some(location), Some(source)) => self.render_source_snippet(location, source),
            _ => None,
        };

        let drew_snippet = snippet.is_some();
        if let Some(snippet) = snippet {
            result.push_str(&snippet);
        } else {
            let kind_str = match self.kind {
                DiagnosticKind::Error => "Error",
                DiagnosticKind::Warning => "Warning",
                DiagnosticKind::Info => "Info",
            };
            match &self.code {
                Some(code) => writeln!(result, "{} [{}]: {}", kind_str, code, self.title),
                None => writeln!(result, "{}: {}", kind_str, self.title),
            }
            .ok();

            if let Some(problem) = &self.problem {
                writeln!(result, "{}", problem).ok();
            }
        }

        for detail in &self.details {
            let bullet = match detail.kind {
                DetailKind::Error => "✖",
                DetailKind::Info => "ℹ",
            };
            writeln!(result, "{} {}", bullet, detail.content).ok();
        }

        for hint in &self.hints {
            writeln!(result, "? {}", hint).ok();
        }

        if !drew_snippet && let Some(location) = &self.location {
            writeln!(result, "  at {}", location).ok();
        }

        result.trim_end().to_string()
    }

    /// Render as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let kind_str = match self.kind {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Info => "info",
        };

        let mut obj = json!({
            "kind": kind_str,
            "title": self.title,
        });

        if let Some(code) = &self.code {
            obj["code"] = json!(code);
        }
        if let Some(problem) = &self.problem {
            obj["problem"] = json!(problem);
        }
        if !self.details.is_empty() {
            let details: Vec<_> = self
                .details
                .iter()
                .map(|d| {
                    let kind = match d.kind {
                        DetailKind::Error => "error",
                        DetailKind::Info => "info",
                    };
                    json!({ "kind": kind, "content": d.content })
                })
                .collect();
            obj["details"] = json!(details);
        }
        if !self.hints.is_empty() {
            obj["hints"] = json!(self.hints);
        }
        if let Some(location) = &self.location {
            obj["location"] = json!(location);
        }

        obj
    }

    fn render_source_snippet(&self, location: &Location, source: &str) -> Option<String> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        let (report_kind, color) = match self.kind {
            DiagnosticKind::Error => (ReportKind::Error, Color::Red),
            DiagnosticKind::Warning => (ReportKind::Warning, Color::Yellow),
            DiagnosticKind::Info => (ReportKind::Advice, Color::Cyan),
        };

        let start = location.offset.min(source.len());
        let end = source[start..]
            .find(['>', '\n'])
            .map(|rel| start + rel + 1)
            .unwrap_or(source.len())
            .max(start);

        let id = location.document.clone();
        let title = match &self.code {
            Some(code) => format!("[{}] {}", code, self.title),
            None => self.title.clone(),
        };
        let label_message = self.problem.as_deref().unwrap_or(&self.title);

        let report = Report::build(report_kind, id.clone(), start)
            .with_config(Config::default().with_color(false))
            .with_message(title)
            .with_label(
                Label::new((id.clone(), start..end))
                    .with_message(label_message)
                    .with_color(color),
            )
            .finish();

        let mut output = Vec::new();
        report.write((id, Source::from(source)), &mut output).ok()?;
        String::from_utf8(output).ok()
    }
}
