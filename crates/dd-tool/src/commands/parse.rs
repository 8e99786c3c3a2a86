//! Parse a descriptor and print the bound descriptor graph.

use std::io::Write;
use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::info;

use crate::session::Session;

pub fn execute(session: &Session, path: &Path, json: bool, out: &mut impl Write) -> Result<()> {
    let parsed = super::load(session, path)?;
    info!(
        root = %parsed.root_tag,
        upgrades = parsed.applied_upgrades,
        warnings = parsed.diagnostics.len(),
        "Parsed {}",
        path.display()
    );

    if json {
        let summary = serde_json::json!({
            "document": parsed.document,
            "root": parsed.root_tag,
            "applied_upgrades": parsed.applied_upgrades,
            "resolved_entities": parsed
                .resolved_entities
                .iter()
                .map(|entity| entity.path.display().to_string())
                .collect::<Vec<_>>(),
            "diagnostics": parsed
                .diagnostics
                .iter()
                .map(|d| d.to_json())
                .collect::<Vec<_>>(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }

    let kind = session
        .registry
        .root_kind(&parsed.root_tag)
        .ok_or_else(|| anyhow!("No kind registered for <{}>", parsed.root_tag))?;
    let descriptor = kind
        .debug_descriptor(parsed.descriptor_any())
        .ok_or_else(|| anyhow!("Descriptor of <{}> has an unexpected type", parsed.root_tag))?;
    writeln!(out, "{}", descriptor)?;
    Ok(())
}
