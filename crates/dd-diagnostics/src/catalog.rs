//! Error code catalog.
//!
//! Maps codes such as `DD-2-1` to their subsystem, title and message template.
//! Subsystem numbers: 1 = xml reader, 2 = binding, 3 = entity resolution,
//! 4 = version upgrade, 5 = writer, 6 = configuration.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "xml", "binding", "entity")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message template
    pub message_template: String,
}

/// Global error catalog, embedded at compile time.
///
/// # Panics
///
/// Panics on first access if the embedded JSON is invalid.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON")
});

/// Look up error code information.
///
/// ```
/// use dd_diagnostics::get_error_info;
///
/// let info = get_error_info("DD-3-1").unwrap();
/// assert_eq!(info.subsystem, "entity");
/// ```
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Get the subsystem name for an error code.
pub fn get_subsystem(code: &str) -> Option<&str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}
