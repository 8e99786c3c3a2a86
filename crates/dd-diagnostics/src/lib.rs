//! Structured diagnostics for deployment descriptor processing.
//!
//! Every error raised while reading, binding, or writing a descriptor document
//! can be turned into a [`DiagnosticMessage`]: a short title, an optional
//! problem statement, bulleted details and hints, a stable error code, and the
//! [`Location`] in the source document where the problem was found.
//!
//! ```
//! use dd_diagnostics::{DiagnosticMessageBuilder, Location};
//!
//! let diag = DiagnosticMessageBuilder::error("Unregistered Element")
//!     .with_code("DD-2-1")
//!     .problem("No node is registered for `<ejb-jar>`")
//!     .with_location(Location::new("ejb.xml", 3, 5, 42))
//!     .add_hint("Register the bundle before parsing?")
//!     .build();
//!
//! assert!(diag.to_text(None).contains("[DD-2-1]"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;
pub mod location;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_error_info, get_subsystem};
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
pub use location::{LineIndex, Location};
