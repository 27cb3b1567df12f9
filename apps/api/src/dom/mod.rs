//! Host document model: the boundary the accessibility core runs against.
//!
//! An arena of element and text nodes with the handful of browser capabilities
//! the overlay engine touches: class lists, attributes, inline style, rendered
//! text, containment checks, a listener registry, a viewport and a per-node
//! layout box. Nodes are addressed by `NodeId`: holding one never keeps a node
//! alive or attached. Subtrees dropped by `replace_children` or `remove` are
//! released and their slots reused; lookups through a released id behave as
//! for an empty, detached node.

pub mod node;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

pub use node::{ListenerId, ListenerKind, NodeId, NodeKind, Size};

use node::{Node, Slot};

/// Tags whose rendered text is separated from its siblings by a line break.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "div", "footer", "form", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "html", "li", "main", "nav", "ol", "p", "section", "ul",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    /// The insertion would make a node its own ancestor, or put children
    /// under a text node.
    #[error("Hierarchy request error: cannot insert {child:?} under {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {0:?} has been released")]
    Released(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListenerRecord {
    id: ListenerId,
    target: NodeId,
    kind: ListenerKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    body: NodeId,
    listeners: Vec<ListenerRecord>,
    next_listener: u64,
    viewport: Size,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0))
    }
}

impl Document {
    /// Creates `<html><body></body></html>` with the given viewport.
    pub fn new(viewport: Size) -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            body: NodeId {
                index: 0,
                generation: 0,
            },
            listeners: Vec::new(),
            next_listener: 1,
            viewport,
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_child(doc.root, "body");
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Live nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    // ── Construction ────────────────────────────────────────────────────────

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(Node::element(tag))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.allocate(Node::text(text))
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Creates `<tag>` as the last child of `parent`. A fresh node can never
    /// be an ancestor, so this cannot fail.
    pub fn create_child(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let el = self.create_element(tag);
        self.link(parent, el);
        el
    }

    /// Appends `child` to `parent`, detaching it from any previous parent first.
    /// Rejects insertions that would create a cycle, like the browser's
    /// `HierarchyRequestError`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.link(parent, child);
        Ok(())
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let Some(parent_node) = self.node(parent) else {
            return Err(DomError::Released(parent));
        };
        if !self.is_live(child) {
            return Err(DomError::Released(child));
        }
        if matches!(parent_node.kind, NodeKind::Text(_)) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_live(parent) || !self.is_live(child) {
            return;
        }
        self.detach(child);
        if let Some(n) = self.node_mut(child) {
            n.parent = Some(parent);
        }
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child);
        }
    }

    /// Convenience for building fixtures: `<tag>text</tag>` under `parent`.
    pub fn append_element_with_text(&mut self, parent: NodeId, tag: &str, text: &str) -> NodeId {
        let el = self.create_child(parent, tag);
        let t = self.create_text(text);
        self.link(el, t);
        el
    }

    /// Removes `node` from its parent's child list. The subtree stays live so
    /// it can be re-inserted.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != node);
        }
    }

    /// Detaches `node` and releases its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
        self.release(node);
    }

    fn release(&mut self, node: NodeId) {
        let freed: BTreeSet<NodeId> = self.descendants(node).into_iter().collect();
        for id in &freed {
            let slot = &mut self.slots[id.index];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        self.listeners.retain(|l| !freed.contains(&l.target));
    }

    /// Replaces every child of `parent` with `children` in a single step.
    /// Previous children not in `children` are released. On error nothing
    /// changes.
    pub fn replace_children(
        &mut self,
        parent: NodeId,
        children: Vec<NodeId>,
    ) -> Result<(), DomError> {
        for child in &children {
            self.check_insert(parent, *child)?;
        }
        let old = self
            .node_mut(parent)
            .map(|p| std::mem::take(&mut p.children))
            .unwrap_or_default();
        for child in &old {
            if let Some(n) = self.node_mut(*child) {
                n.parent = None;
            }
        }
        // Link first so a new child taken from inside an old subtree is
        // detached before that subtree is released.
        for child in &children {
            self.link(parent, *child);
        }
        for child in old {
            if !children.contains(&child) {
                self.release(child);
            }
        }
        Ok(())
    }

    pub fn clear_children(&mut self, parent: NodeId) {
        // An empty list always passes the insertion checks.
        let _ = self.replace_children(parent, Vec::new());
    }

    /// Replaces the node's children with a single text node. No-op on text
    /// nodes and released ids.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        if !self.is_element(node) {
            return;
        }
        self.clear_children(node);
        let t = self.create_text(text);
        self.link(node, t);
    }

    // ── Tree queries ────────────────────────────────────────────────────────

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.node(node).map(|n| &n.kind)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Element { .. }))
    }

    /// Lowercase tag name, `None` for text nodes.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Element { tag } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// True when `other` is `node` or one of its descendants.
    pub fn contains(&self, node: NodeId, other: NodeId) -> bool {
        let mut cursor = Some(other);
        while let Some(current) = cursor {
            if current == node {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// True when the node is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attribute(*n, "id") == Some(id))
    }

    /// All connected elements carrying `class`.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// Pre-order traversal of the subtree rooted at `node`, `node` included.
    /// Empty for a released id.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_live(node) {
            return out;
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.children(current).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Approximates `innerText`: concatenated text of the subtree, block-level
    /// children separated by newlines, subtrees styled `display: none` skipped.
    pub fn inner_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.node(node) else {
            return;
        };
        match &n.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { tag } => {
                if n.style.get("display").map(String::as_str) == Some("none") {
                    return;
                }
                let block = BLOCK_TAGS.contains(&tag.as_str());
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for child in &n.children {
                    self.collect_text(*child, out);
                }
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }

    // ── Attributes, classes, style ──────────────────────────────────────────

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.node_mut(node) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attributes(&self, node: NodeId) -> BTreeMap<String, String> {
        self.node(node)
            .map(|n| n.attributes.clone())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node).is_some_and(|n| n.classes.contains(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.classes.remove(class);
        }
    }

    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node)?.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.node_mut(node) {
            n.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(n) = self.node_mut(node) {
            n.style.remove(property);
        }
    }

    // ── Layout ──────────────────────────────────────────────────────────────

    /// The node's border box as last laid out; zero until something sets it.
    pub fn bounding_size(&self, node: NodeId) -> Size {
        self.node(node).map(|n| n.layout).unwrap_or_default()
    }

    pub fn set_layout_size(&mut self, node: NodeId, size: Size) {
        if let Some(n) = self.node_mut(node) {
            n.layout = size;
        }
    }

    // ── Listeners ───────────────────────────────────────────────────────────

    pub fn add_event_listener(&mut self, target: NodeId, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(ListenerRecord { id, target, kind });
        id
    }

    /// Returns false when the listener was not attached.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners_on(&self, target: NodeId) -> Vec<ListenerKind> {
        self.listeners
            .iter()
            .filter(|l| l.target == target)
            .map(|l| l.kind)
            .collect()
    }
}
