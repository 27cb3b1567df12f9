//! Readable-Node Locator: nearest readable ancestor of a pointer target.

use crate::dom::{Document, NodeId};

/// Tags whose content counts as user-facing text.
pub const READABLE_TAGS: &[&str] = &[
    "p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "a", "button", "label", "span", "div",
];

/// Minimum trimmed text length (in characters) for an element to qualify.
pub const MIN_READABLE_CHARS: usize = 3;

/// Decides whether a single element is worth reading aloud or fingerspelling.
///
/// Kept separate from the walk so the heuristic can be swapped or tested
/// without a real rendering engine.
pub trait ReadablePredicate: Send + Sync {
    fn is_readable(&self, doc: &Document, node: NodeId) -> bool;
}

/// Default heuristic: recognised tag AND at least three characters of text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagTextPredicate;

impl ReadablePredicate for TagTextPredicate {
    fn is_readable(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if !READABLE_TAGS.contains(&tag) {
            return false;
        }
        doc.inner_text(node).trim().chars().count() >= MIN_READABLE_CHARS
    }
}

/// Walks up from `start` and returns the nearest ancestor accepted by
/// `predicate`, or `None` once the walk leaves `boundary`.
///
/// `boundary` itself is examined; its parent, `<body>` and the document root
/// are not.
pub fn locate(
    doc: &Document,
    start: NodeId,
    boundary: NodeId,
    predicate: &dyn ReadablePredicate,
) -> Option<NodeId> {
    let stop = doc.parent(boundary);
    let mut cursor = Some(start);

    while let Some(node) = cursor {
        if Some(node) == stop || node == doc.body() || node == doc.root() {
            return None;
        }
        if doc.is_element(node) && predicate.is_readable(doc, node) {
            return Some(node);
        }
        if node == boundary {
            return None;
        }
        cursor = doc.parent(node);
    }
    None
}
