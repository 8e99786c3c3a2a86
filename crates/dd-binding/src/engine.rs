//! The parse engine: a state machine driven by reader events.
//!
//! The engine keeps a stack of frames, one per open element that has its own
//! node, plus the stack of open element names and one namespace scope per
//! open element. Elements a node handles directly do not get a frame; their
//! text accumulates in the top frame and is dispatched when they end.
//!
//! Per element end the engine:
//!
//! 1. finalizes the text (trimmed unless a whitespace policy applies),
//! 2. runs the root kind's version upgrade rules on the absolute path,
//! 3. calls the node's setter unless the value was removed, or is empty and
//!    no empty-value policy applies,
//! 4. pops the frame if the element is at the node's own depth and the node
//!    reports completion, then hands the descriptor to the parent frame.
//!    A node whose own element was removed by an upgrade rule is dropped.

use std::any::Any;
use std::collections::HashMap;
use std::fs;
use std::mem;
use std::path::Path;

use dd_diagnostics::{DiagnosticMessage, Location};
use dd_xml::{
    EventSink, NamespaceStack, QName, ReaderOptions, XmlAttribute, XmlEvent, XmlReader,
};
use tracing::{debug, error, warn};

use crate::config::EngineConfig;
use crate::entity::{EntityResolver, ResolvedEntity};
use crate::error::{Error, Result};
use crate::node::{BoundAttribute, Descriptor, Node, NodeError};
use crate::registry::Registry;
use crate::upgrade::{UpgradeOutcome, UpgradeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    InDocument,
    Done,
}

struct Frame {
    node: Box<dyn Node>,
    /// Index in the element stack of the element that created the node.
    anchor: usize,
    /// False once the creating element has ended but the node stays open.
    own_open: bool,
    /// Set when a Remove rule matched the creating element. The descriptor
    /// is dropped instead of handed to the parent.
    removed: bool,
    text: String,
}

/// The result of a successful parse.
#[derive(Debug)]
pub struct ParsedDocument {
    pub document: String,
    pub root_tag: String,
    descriptor: Descriptor,
    /// Problems skipped in lenient mode and rejected upgrades.
    pub diagnostics: Vec<DiagnosticMessage>,
    pub resolved_entities: Vec<ResolvedEntity>,
    pub applied_upgrades: usize,
}

impl ParsedDocument {
    pub fn descriptor<D: 'static>(&self) -> Option<&D> {
        self.descriptor.downcast_ref::<D>()
    }

    pub fn descriptor_any(&self) -> &dyn Any {
        self.descriptor.as_ref()
    }

    /// Take the root descriptor. Returns `self` unchanged if it is not a `D`.
    pub fn into_descriptor<D: 'static>(self) -> std::result::Result<D, Self> {
        let ParsedDocument {
            document,
            root_tag,
            descriptor,
            diagnostics,
            resolved_entities,
            applied_upgrades,
        } = self;
        match descriptor.downcast::<D>() {
            Ok(descriptor) => Ok(*descriptor),
            Err(descriptor) => Err(ParsedDocument {
                document,
                root_tag,
                descriptor,
                diagnostics,
                resolved_entities,
                applied_upgrades,
            }),
        }
    }
}

/// One parse session. Not reusable across documents.
pub struct ParseEngine<'r> {
    registry: &'r Registry,
    resolver: EntityResolver<'r>,
    strict: bool,
    document: String,
    state: ParseState,
    frames: Vec<Frame>,
    elements: Vec<QName>,
    namespaces: NamespaceStack,
    pending_prefixes: Vec<(Option<String>, String)>,
    /// Depth inside a subtree skipped in lenient mode; 0 when not skipping.
    skip_depth: usize,
    upgrades: HashMap<String, UpgradeSet>,
    active_root: Option<String>,
    root_tag: Option<String>,
    root_descriptor: Option<Descriptor>,
    diagnostics: Vec<DiagnosticMessage>,
    resolved_entities: Vec<ResolvedEntity>,
    applied_upgrades: usize,
}

impl<'r> ParseEngine<'r> {
    pub fn new(registry: &'r Registry, config: &EngineConfig, document: &str) -> Self {
        Self {
            registry,
            resolver: EntityResolver::new(registry, config),
            strict: config.strict,
            document: document.to_string(),
            state: ParseState::Idle,
            frames: Vec::new(),
            elements: Vec::new(),
            namespaces: NamespaceStack::new(),
            pending_prefixes: Vec::new(),
            skip_depth: 0,
            upgrades: HashMap::new(),
            active_root: None,
            root_tag: None,
            root_descriptor: None,
            diagnostics: Vec::new(),
            resolved_entities: Vec::new(),
            applied_upgrades: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Number of frames on the parse stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn namespaces(&self) -> &NamespaceStack {
        &self.namespaces
    }

    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        &self.diagnostics
    }

    /// Consume the finished session.
    pub fn finish(self) -> Result<ParsedDocument> {
        if self.state != ParseState::Done {
            return Err(Error::StructuralImbalance {
                message: format!("`{}` was not parsed to its end", self.document),
                location: None,
            });
        }
        match (self.root_tag, self.root_descriptor) {
            (Some(root_tag), Some(descriptor)) => Ok(ParsedDocument {
                document: self.document,
                root_tag,
                descriptor,
                diagnostics: self.diagnostics,
                resolved_entities: self.resolved_entities,
                applied_upgrades: self.applied_upgrades,
            }),
            _ => Err(Error::NoDescriptor {
                document: self.document,
            }),
        }
    }

    /// Abort in strict mode; otherwise log, record a warning and continue.
    fn recover(&mut self, err: Error) -> Result<()> {
        if self.strict || !err.is_recoverable() {
            error!(error = %err, "Parse failed");
            return Err(err);
        }
        warn!(error = %err, "Skipping after recoverable error");
        self.diagnostics.push(err.to_warning());
        Ok(())
    }

    fn node_error(err: NodeError, node: &str, location: &Location) -> Error {
        match err {
            NodeError::UnknownElement { path } => Error::FailedDispatch {
                node: node.to_string(),
                path,
                location: location.clone(),
            },
            NodeError::InvalidValue {
                path,
                value,
                reason,
            } => Error::InvalidValue {
                path,
                value,
                reason,
                location: location.clone(),
            },
            NodeError::UnexpectedChild { tag } => Error::StructuralImbalance {
                message: format!("node <{}> cannot take a <{}> child", node, tag),
                location: Some(location.clone()),
            },
        }
    }

    fn imbalance(message: String, location: &Location) -> Error {
        Error::StructuralImbalance {
            message,
            location: Some(location.clone()),
        }
    }

    /// The dispatch path of the current element for frame `index`: the open
    /// elements below its anchor, or the node's own tag for the anchor itself.
    fn dispatch_path(&self, index: usize) -> String {
        let frame = &self.frames[index];
        let start = if frame.own_open {
            frame.anchor + 1
        } else {
            frame.anchor
        };
        let segments = &self.elements[start.min(self.elements.len())..];
        if segments.is_empty() {
            frame.node.tag().to_string()
        } else {
            join(segments)
        }
    }

    fn start_document(&mut self) {
        self.frames.clear();
        self.elements.clear();
        self.namespaces = NamespaceStack::new();
        self.pending_prefixes.clear();
        self.skip_depth = 0;
        self.state = ParseState::InDocument;
        debug!(document = %self.document, "Start of document");
    }

    fn start_element(
        &mut self,
        name: &str,
        attributes: Vec<XmlAttribute>,
        location: &Location,
    ) -> Result<()> {
        self.namespaces.push(mem::take(&mut self.pending_prefixes));
        let qname = QName::element(name, &self.namespaces);
        self.elements.push(qname.clone());

        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return Ok(());
        }

        let attributes: Vec<BoundAttribute> = attributes
            .into_iter()
            .map(|a| BoundAttribute {
                name: QName::attribute(&a.name, &self.namespaces),
                value: a.value,
            })
            .collect();

        if self.frames.is_empty() {
            return self.start_root(qname, &attributes, location);
        }

        let top = self.frames.len() - 1;
        if self.frames[top].node.handles_element(&qname) {
            let path = self.dispatch_path(top);
            let frame = &mut self.frames[top];
            frame.text.clear();
            let result = frame.node.start_element(&path, &qname, &attributes);
            if let Err(err) = result {
                let tag = frame.node.tag().to_string();
                let err = Self::node_error(err, &tag, location);
                self.recover(err)?;
            }
            return Ok(());
        }

        match self.frames[top].node.child_node(&qname) {
            Some(node) => {
                debug!(
                    parent = %self.frames[top].node.tag(),
                    child = %qname,
                    "Delegating to child node"
                );
                self.push_frame(node, &attributes, location)
            }
            None => {
                self.recover(Error::UnregisteredElement {
                    element: qname.to_string(),
                    location: location.clone(),
                })?;
                self.skip_depth = 1;
                Ok(())
            }
        }
    }

    fn start_root(
        &mut self,
        qname: QName,
        attributes: &[BoundAttribute],
        location: &Location,
    ) -> Result<()> {
        if self.root_tag.is_some() {
            return Err(Self::imbalance(
                format!("element <{}> follows the completed root node", qname),
                location,
            ));
        }

        let Some(kind) = self.registry.root_kind(qname.local_name()) else {
            self.recover(Error::UnregisteredElement {
                element: qname.to_string(),
                location: location.clone(),
            })?;
            self.skip_depth = 1;
            return Ok(());
        };

        let tag = kind.tag().to_string();
        self.upgrades
            .entry(tag.clone())
            .or_insert_with(|| kind.upgrade_set())
            .reset();
        debug!(root = %tag, document_type = %kind.document_type(), "Root element");
        self.active_root = Some(tag.clone());
        self.root_tag = Some(tag);
        self.push_frame(kind.new_node(), attributes, location)
    }

    fn push_frame(
        &mut self,
        mut node: Box<dyn Node>,
        attributes: &[BoundAttribute],
        location: &Location,
    ) -> Result<()> {
        if let Err(err) = node.start(attributes) {
            let tag = node.tag().to_string();
            let err = Self::node_error(err, &tag, location);
            self.recover(err)?;
        }
        self.frames.push(Frame {
            node,
            anchor: self.elements.len() - 1,
            own_open: true,
            removed: false,
            text: String::new(),
        });
        Ok(())
    }

    fn characters(&mut self, text: &str) {
        if self.skip_depth > 0 {
            return;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.text.push_str(text);
        }
    }

    fn end_element(&mut self, location: &Location) -> Result<()> {
        let Some(qname) = self.elements.last().cloned() else {
            return Err(Self::imbalance(
                "end tag with no open element".to_string(),
                location,
            ));
        };

        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return self.close_element(location);
        }

        let Some(top) = self.frames.len().checked_sub(1) else {
            return Err(Self::imbalance(
                format!("end tag </{}> has no active node", qname),
                location,
            ));
        };
        if self.frames[top].anchor >= self.elements.len() {
            return Err(Self::imbalance(
                format!(
                    "</{}> closes while node <{}> is still open",
                    qname,
                    self.frames[top].node.tag()
                ),
                location,
            ));
        }

        let removed = self.dispatch_value(top, &qname, location)?;

        // Completion only counts at the node's own depth: its element, or a
        // sibling of it. Same-named fields nested deeper are plain values.
        let at_anchor = self.frames[top].anchor == self.elements.len() - 1;
        let frame = &mut self.frames[top];
        if frame.own_open && at_anchor {
            frame.own_open = false;
            frame.removed = removed && top > 0;
        }
        if at_anchor && frame.node.end_element(&qname) {
            self.complete_frame(location)?;
        }
        self.close_element(location)
    }

    /// Finalize the text of the ending element and deliver it to frame `top`.
    /// Returns true when a Remove rule dropped the element.
    fn dispatch_value(&mut self, top: usize, qname: &QName, location: &Location) -> Result<bool> {
        let mut path = self.dispatch_path(top);
        let raw = mem::take(&mut self.frames[top].text);
        let node = &self.frames[top].node;

        let preserve = self.registry.preserves_whitespace(qname.local_name())
            || node.preserves_whitespace(&path);
        let mut value = if preserve {
            raw
        } else {
            raw.trim().to_string()
        };
        let mut name = qname.clone();

        let absolute = join(&self.elements);
        let outcome = match self
            .active_root
            .as_ref()
            .and_then(|root| self.upgrades.get_mut(root))
        {
            Some(rules) => rules.evaluate(&absolute, &value),
            None => UpgradeOutcome::Unchanged,
        };
        match outcome {
            UpgradeOutcome::Unchanged => {}
            UpgradeOutcome::Remove { rule } => {
                debug!(rule = %rule, path = %absolute, "Removed legacy element");
                self.applied_upgrades += 1;
                return Ok(true);
            }
            UpgradeOutcome::Replace {
                rule,
                tag,
                value: replacement,
            } => {
                debug!(rule = %rule, path = %absolute, replacement = %tag, "Replaced legacy element");
                path = replace_last_segment(&path, &tag);
                name = qname.with_local_name(tag);
                value = replacement;
                self.applied_upgrades += 1;
            }
            UpgradeOutcome::Invalid { rule, reason } => {
                let err = Error::InvalidVersionUpgrade {
                    rule,
                    path: absolute,
                    reason,
                    location: location.clone(),
                };
                error!(error = %err, "Version upgrade rejected, keeping legacy element");
                self.diagnostics.push(err.to_diagnostic());
            }
        }

        let node = &mut self.frames[top].node;
        if value.is_empty()
            && !self.registry.allows_empty(name.local_name())
            && !node.accepts_empty(&path)
        {
            return Ok(false);
        }

        if let Err(err) = node.set_element_value(&path, &name, value) {
            let tag = node.tag().to_string();
            let err = Self::node_error(err, &tag, location);
            self.recover(err)?;
        }
        Ok(false)
    }

    fn complete_frame(&mut self, location: &Location) -> Result<()> {
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        let tag = frame.node.tag().to_string();
        if frame.removed {
            debug!(node = %tag, "Dropped removed child node");
            return Ok(());
        }
        let descriptor = frame.node.into_descriptor();

        match self.frames.last_mut() {
            Some(parent) => {
                debug!(parent = %parent.node.tag(), child = %tag, "Child node complete");
                if let Err(err) = parent.node.add_child(&tag, descriptor) {
                    let parent_tag = parent.node.tag().to_string();
                    return Err(Self::node_error(err, &parent_tag, location));
                }
            }
            None => {
                debug!(root = %tag, "Root node complete");
                self.root_descriptor = Some(descriptor);
                self.active_root = None;
            }
        }
        Ok(())
    }

    fn close_element(&mut self, location: &Location) -> Result<()> {
        self.elements.pop();
        if !self.namespaces.pop() {
            return Err(Self::imbalance(
                "namespace scope stack underflow".to_string(),
                location,
            ));
        }
        Ok(())
    }

    fn end_document(&mut self, location: &Location) -> Result<()> {
        if let Some(frame) = self.frames.last() {
            return Err(Self::imbalance(
                format!(
                    "document ended with {} node(s) still open, innermost <{}>",
                    self.frames.len(),
                    frame.node.tag()
                ),
                location,
            ));
        }
        if !self.elements.is_empty() || self.namespaces.depth() != 0 {
            return Err(Self::imbalance(
                format!(
                    "document ended with {} element(s) and {} namespace scope(s) open",
                    self.elements.len(),
                    self.namespaces.depth()
                ),
                location,
            ));
        }
        self.state = ParseState::Done;
        debug!(document = %self.document, upgrades = self.applied_upgrades, "End of document");
        Ok(())
    }
}

impl EventSink for ParseEngine<'_> {
    type Error = Error;

    fn handle_event(&mut self, event: XmlEvent, location: &Location) -> Result<()> {
        match (self.state, event) {
            (ParseState::Idle, XmlEvent::StartDocument) => {
                self.start_document();
                Ok(())
            }
            (ParseState::InDocument, XmlEvent::StartPrefixMapping { prefix, uri }) => {
                self.pending_prefixes.push((prefix, uri));
                Ok(())
            }
            (ParseState::InDocument, XmlEvent::StartElement { name, attributes }) => {
                self.start_element(&name, attributes, location)
            }
            (ParseState::InDocument, XmlEvent::Characters(text)) => {
                self.characters(&text);
                Ok(())
            }
            (ParseState::InDocument, XmlEvent::EndElement { .. }) => self.end_element(location),
            (
                ParseState::InDocument,
                XmlEvent::ResolveEntity {
                    public_id,
                    system_id,
                },
            ) => match self.resolver.resolve(public_id.as_deref(), &system_id) {
                Ok(entity) => {
                    self.resolved_entities.push(entity);
                    Ok(())
                }
                Err(mut err) => {
                    if let Error::EntityResolution { location: slot, .. } = &mut err {
                        *slot = Some(location.clone());
                    }
                    error!(error = %err, "Entity resolution failed");
                    Err(err)
                }
            },
            (ParseState::InDocument, XmlEvent::Error(err)) => {
                let err = Error::Xml(err);
                if self.strict {
                    error!(error = %err, "Reader error");
                    return Err(err);
                }
                warn!(error = %err, "Reader error, continuing");
                self.diagnostics.push(err.to_warning());
                Ok(())
            }
            (_, XmlEvent::FatalError(err)) => {
                let err = Error::Xml(err);
                error!(error = %err, document = %self.document, "Fatal reader error");
                if self.strict {
                    return Err(err);
                }
                self.diagnostics.push(err.to_diagnostic());
                Ok(())
            }
            (ParseState::InDocument, XmlEvent::EndDocument) => self.end_document(location),
            (state, event) => Err(Self::imbalance(
                format!("unexpected {} in state {:?}", event_name(&event), state),
                location,
            )),
        }
    }
}

fn event_name(event: &XmlEvent) -> &'static str {
    match event {
        XmlEvent::StartDocument => "start of document",
        XmlEvent::StartPrefixMapping { .. } => "prefix mapping",
        XmlEvent::StartElement { .. } => "start tag",
        XmlEvent::Characters(_) => "character data",
        XmlEvent::EndElement { .. } => "end tag",
        XmlEvent::ResolveEntity { .. } => "entity reference",
        XmlEvent::Error(_) => "reader error",
        XmlEvent::FatalError(_) => "fatal reader error",
        XmlEvent::EndDocument => "end of document",
    }
}

fn join(names: &[QName]) -> String {
    names
        .iter()
        .map(QName::local_name)
        .collect::<Vec<_>>()
        .join("/")
}

fn replace_last_segment(path: &str, tag: &str) -> String {
    match path.rsplit_once('/') {
        Some((parent, _)) => format!("{}/{}", parent, tag),
        None => tag.to_string(),
    }
}

/// Parse `text`, identified as `document` in locations and diagnostics.
pub fn parse_str(
    registry: &Registry,
    config: &EngineConfig,
    document: &str,
    text: &str,
) -> Result<ParsedDocument> {
    let mut engine = ParseEngine::new(registry, config, document);
    let options = ReaderOptions {
        resolve_schema_locations: config.resolve_schema_locations,
    };
    XmlReader::with_options(document, text, options).read(&mut engine)?;
    engine.finish()
}

pub fn parse_file(registry: &Registry, config: &EngineConfig, path: &Path) -> Result<ParsedDocument> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(registry, config, &path.display().to_string(), &text)
}
