//! Print the effective engine configuration as JSON.

use std::io::Write;

use anyhow::Result;

use crate::session::Session;

pub fn execute(session: &Session, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", session.config.to_json_string()?)?;
    Ok(())
}
