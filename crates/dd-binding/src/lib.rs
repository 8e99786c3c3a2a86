//! Binding of deployment descriptor documents to typed descriptor graphs.
//!
//! Document kinds are declared once with [`NodeKind`] builders and registered
//! as [`RootKind`]s in a [`Registry`]. Parsing is a single pass: the
//! [`ParseEngine`] consumes reader events, routes element text to field
//! setters through path dispatch, delegates child structures to child nodes,
//! resolves DTD and schema references to local files only, and applies the
//! root kind's [`VersionUpgradeRule`]s on the fly. The [`DocumentWriter`]
//! walks the same declarations in the other direction.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dd_binding::{DocumentType, EngineConfig, NodeKind, Registry, RootKind};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Resources {
//!     names: Vec<String>,
//! }
//!
//! let kind = Arc::new(NodeKind::<Resources>::new("resources").texts(
//!     "jndi-name",
//!     |r, v| r.names.push(v),
//!     |r| r.names.clone(),
//! ));
//! let registry = Registry::new();
//! registry.register_if_absent(RootKind::new(kind, DocumentType::None));
//!
//! let parsed = dd_binding::parse_str(
//!     &registry,
//!     &EngineConfig::default(),
//!     "resources.xml",
//!     "<resources><jndi-name> jdbc/Foo </jndi-name></resources>",
//! )
//! .unwrap();
//!
//! let resources = parsed.descriptor::<Resources>().unwrap();
//! assert_eq!(resources.names, vec!["jdbc/Foo"]);
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod entity;
pub mod error;
pub mod kind;
pub mod node;
pub mod registry;
pub mod upgrade;
pub mod writer;

pub use config::{EngineConfig, WriterConfig};
pub use dispatch::DispatchTable;
pub use engine::{ParseEngine, ParseState, ParsedDocument, parse_file, parse_str};
pub use entity::{EntityResolver, ResolvedEntity};
pub use error::{Error, Result};
pub use kind::{NodeKind, parse_flag};
pub use node::{BoundAttribute, Descriptor, Node, NodeError};
pub use registry::{DocumentType, Registry, RootKind};
pub use upgrade::{Captures, UpgradeKind, UpgradeOutcome, UpgradeSet, VersionUpgradeRule};
pub use writer::DocumentWriter;

pub use dd_diagnostics::{DiagnosticMessage, Location};
