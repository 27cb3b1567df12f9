use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Slot index plus the slot's generation at allocation. A relation, never
/// ownership: once the node is released the id goes stale and every lookup
/// through it misses, even after the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    MouseOver,
    MouseMove,
    MouseLeave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String },
    Text(String),
}

/// Width/height in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) node: Option<Node>,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) classes: BTreeSet<String>,
    pub(crate) style: BTreeMap<String, String>,
    pub(crate) layout: Size,
}

impl Node {
    pub(crate) fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        })
    }

    pub(crate) fn text(text: &str) -> Self {
        Self::with_kind(NodeKind::Text(text.to_string()))
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: BTreeSet::new(),
            style: BTreeMap::new(),
            layout: Size::default(),
        }
    }
}
