//! YAML document loading
//!
//! The rule parser needs the shape of the document (which nodes are mappings,
//! which are scalars) and the raw text of every scalar. This module drives the
//! `yaml-rust2` event parser and collects the first document of the stream into
//! a flat node arena, much like a loader that keeps a node table and refers to
//! children by index.
//!
//! Tags are ignored. Anchored nodes are recorded and aliases refer back to the
//! same node, so an aliased mapping is shared rather than copied.

use crate::error::{ConfigError, parse_error};
use hashbrown::HashMap;
use yaml_rust2::parser::{Event, EventReceiver, Parser};
use yaml_rust2::scanner::TScalarStyle;

/// Index of a node in [`Document::nodes`].
pub(crate) type NodeId = usize;

/// A single YAML node.
#[derive(Debug)]
pub(crate) enum Node {
    /// Raw scalar bytes. A missing value is stored empty.
    Scalar(Box<[u8]>),
    Sequence(Vec<NodeId>),
    Mapping(Vec<(NodeId, NodeId)>),
}

/// The first document of a YAML stream.
#[derive(Debug)]
pub(crate) struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    /// Parses `text` and keeps its first document.
    ///
    /// A stream with no document yields a `Document` without a root.
    pub(crate) fn load(text: &str) -> Result<Self, ConfigError> {
        let mut builder = DocumentBuilder::default();
        let mut parser = Parser::new_from_str(text);
        parser
            .load(&mut builder, false)
            .map_err(|err| parse_error(format!("{err}")))?;
        if let Some(err) = builder.error {
            return Err(err);
        }
        Ok(Document {
            nodes: builder.nodes,
            root: builder.root,
        })
    }

    #[inline]
    pub(crate) fn root(&self) -> Option<&Node> {
        self.root.map(|id| &self.nodes[id])
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

#[derive(Default)]
struct DocumentBuilder {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    /// Open sequences and mappings, innermost last, each with the key that
    /// is waiting for its value when the frame is a mapping.
    stack: Vec<(NodeId, Option<NodeId>)>,
    anchors: HashMap<usize, NodeId>,
    error: Option<ConfigError>,
}

impl DocumentBuilder {
    fn push(&mut self, node: Node, anchor: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        if anchor != 0 {
            self.anchors.insert(anchor, id);
        }
        id
    }

    /// Hangs a finished node under the innermost open container.
    fn attach(&mut self, child: NodeId) {
        let Some((parent, pending_key)) = self.stack.last_mut() else {
            if self.root.is_none() {
                self.root = Some(child);
            }
            return;
        };
        match &mut self.nodes[*parent] {
            Node::Sequence(items) => items.push(child),
            Node::Mapping(pairs) => match pending_key.take() {
                Some(key) => pairs.push((key, child)),
                None => *pending_key = Some(child),
            },
            Node::Scalar(_) => unreachable!("scalars are never pushed on the stack"),
        }
    }

    fn open(&mut self, node: Node, anchor: usize) {
        let id = self.push(node, anchor);
        self.stack.push((id, None));
    }

    fn close(&mut self) {
        if let Some((id, _)) = self.stack.pop() {
            self.attach(id);
        }
    }
}

impl EventReceiver for DocumentBuilder {
    fn on_event(&mut self, ev: Event) {
        if self.error.is_some() {
            return;
        }
        match ev {
            Event::Scalar(value, style, anchor, ..) => {
                let bytes = if style == TScalarStyle::Plain && is_missing(&value) {
                    Box::default()
                } else {
                    value.into_bytes().into_boxed_slice()
                };
                let id = self.push(Node::Scalar(bytes), anchor);
                self.attach(id);
            }
            Event::SequenceStart(anchor, ..) => self.open(Node::Sequence(Vec::new()), anchor),
            Event::MappingStart(anchor, ..) => self.open(Node::Mapping(Vec::new()), anchor),
            Event::SequenceEnd | Event::MappingEnd => self.close(),
            Event::Alias(anchor) => match self.anchors.get(&anchor).copied() {
                Some(id) => self.attach(id),
                None => self.error = Some(parse_error("alias refers to an unknown anchor")),
            },
            _ => {}
        }
    }
}

/// Whether a plain scalar stands for a missing value.
///
/// The parser reports an omitted value as a plain `~`, so a literal `~` reads
/// the same way. Words such as `null` are kept as text.
fn is_missing(value: &str) -> bool {
    matches!(value, "" | "~")
}
