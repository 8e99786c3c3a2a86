//! Command implementations for ddtool.
//!
//! Commands write their results to the given writer and diagnostics to stderr.

pub mod config;
pub mod kinds;
pub mod parse;
pub mod upgrade;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use dd_binding::ParsedDocument;

use crate::session::{Session, report};

/// Read and parse `path`, reporting diagnostics either way.
pub(crate) fn load(session: &Session, path: &Path) -> Result<ParsedDocument> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document = path.display().to_string();

    match dd_binding::parse_str(&session.registry, &session.config, &document, &source) {
        Ok(parsed) => {
            report(&parsed.diagnostics, &source);
            Ok(parsed)
        }
        Err(err) => {
            report(&[err.to_diagnostic()], &source);
            Err(anyhow!("Failed to parse {}", document))
        }
    }
}
