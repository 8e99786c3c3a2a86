//! List the registered document kinds.

use std::io::Write;

use anyhow::Result;

use crate::session::Session;

pub fn execute(session: &Session, out: &mut impl Write) -> Result<()> {
    for tag in session.registry.root_tags() {
        let Some(kind) = session.registry.root_kind(&tag) else {
            continue;
        };
        writeln!(out, "{}\t{}", tag, kind.document_type())?;
        for (public_id, resource) in kind.public_ids() {
            writeln!(out, "  {} -> {}", public_id, resource)?;
        }
        for rule in kind.upgrade_rules() {
            writeln!(out, "  upgrade {} ({:?})", rule.name(), rule.kind())?;
        }
    }
    Ok(())
}
