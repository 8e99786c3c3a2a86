//! Rewrite a descriptor in the current version of its kind.
//!
//! Parsing applies the kind's upgrade rules; writing the result back out
//! yields a document declaring the current DTD or schema.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use dd_binding::DocumentWriter;
use tracing::info;

use crate::session::Session;

pub fn execute(session: &Session, path: &Path, output: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let parsed = super::load(session, path)?;
    let writer = DocumentWriter::new(&session.registry, &session.config);

    match output {
        Some(target) => {
            let file = File::create(target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
            let mut sink = BufWriter::new(file);
            writer.write_parsed(&parsed, &mut sink)?;
            sink.flush()?;
            info!(
                upgrades = parsed.applied_upgrades,
                "Wrote {}",
                target.display()
            );
        }
        None => writer.write_parsed(&parsed, out)?,
    }
    Ok(())
}
