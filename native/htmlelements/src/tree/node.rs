//! Tree node representation
//!
//! Uses NodeId (u32) for compact references into the tree arena. Parents
//! own their children through the child list; the parent link is a plain
//! index.

use crate::core::span::Span;
use crate::elements::{Element, ElementKind};

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// The synthetic root is always the first node
pub const ROOT: NodeId = 0;

/// How tag names compare in paths and close-tag matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameCase {
    Sensitive,
    /// ASCII case-insensitive, the HTML rule
    #[default]
    Insensitive,
}

impl NameCase {
    #[inline]
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            NameCase::Sensitive => a == b,
            NameCase::Insensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub element: Element,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Logical content range of open tags and the root; `None` for leaves
    pub semantic: Option<Span>,
    /// Close tag that ended this open tag
    pub matching_close: Option<Element>,
    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl TreeNode {
    pub(crate) fn new(element: Element, parent: Option<NodeId>, depth: u32) -> Self {
        TreeNode {
            element,
            parent,
            children: Vec::new(),
            semantic: None,
            matching_close: None,
            depth,
        }
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    #[inline]
    pub fn is_open_tag(&self) -> bool {
        self.kind() == ElementKind::OpenTag
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.element.name()
    }

    /// Physical range of the element itself
    #[inline]
    pub fn span(&self) -> Option<Span> {
        self.element.span()
    }

    /// Range of the node's logical content: open tag start to semantic end
    /// for nodes with content, the physical range for leaves
    #[inline]
    pub fn semantic_span(&self) -> Option<Span> {
        self.semantic.or_else(|| self.element.span())
    }

    /// End of the logical content range
    #[inline]
    pub fn semantic_end(&self) -> Option<usize> {
        self.semantic_span().map(|s| s.end)
    }
}
