//! Element tree arena
//!
//! Built once per parse by the tree builder and immutable afterwards.

use super::builder::TreeProblem;
use super::node::{NameCase, NodeId, TreeNode, ROOT};
use crate::elements::Element;
use std::sync::Arc;

/// Rooted, ordered tree of elements
#[derive(Debug, Clone)]
pub struct ElementTree {
    source: Arc<str>,
    nodes: Vec<TreeNode>,
    name_case: NameCase,
    problems: Vec<TreeProblem>,
}

impl ElementTree {
    /// Tree holding only the root
    pub(crate) fn new(source: Arc<str>, name_case: NameCase) -> Self {
        let mut root = TreeNode::new(Element::root(source.len()), None, 0);
        root.semantic = root.element.span();
        ElementTree {
            source,
            nodes: vec![root],
            name_case,
            problems: Vec::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of nodes, root included
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    #[inline]
    pub fn name_case(&self) -> NameCase {
        self.name_case
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id as usize)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id as usize)
    }

    #[inline]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).map(|n| &n.element)
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    #[inline]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.name()
    }

    /// Image of the node's element
    #[inline]
    pub fn image(&self, id: NodeId) -> &str {
        self.element(id).map_or("", |e| e.image(&self.source))
    }

    #[inline]
    pub fn semantic_end(&self, id: NodeId) -> Option<usize> {
        self.node(id)?.semantic_end()
    }

    #[inline]
    pub fn matching_close(&self, id: NodeId) -> Option<&Element> {
        self.node(id)?.matching_close.as_ref()
    }

    /// Problems recorded while building
    #[inline]
    pub fn problems(&self) -> &[TreeProblem] {
        &self.problems
    }

    /// Compare two names with the tree's case rule
    #[inline]
    pub fn names_equal(&self, a: &str, b: &str) -> bool {
        self.name_case.eq(a, b)
    }

    /// All nodes below `id` in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        result
    }

    /// Add a node as the last child of its parent
    pub(crate) fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let depth = self.node(parent).map_or(0, |p| p.depth.saturating_add(1));
        let id = self.nodes.len() as NodeId;
        self.nodes.push(TreeNode::new(element, Some(parent), depth));
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub(crate) fn add_problem(&mut self, problem: TreeProblem) {
        self.problems.push(problem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::span::Span;
    use crate::elements::ElementKind;

    #[test]
    fn test_append_links_parent_and_children() {
        let mut tree = ElementTree::new("<a>x".into(), NameCase::Insensitive);
        let a = tree.append(ROOT, Element::open_tag(Span::new(0, 3), "a", vec![], false));
        let x = tree.append(a, Element::leaf(ElementKind::Text, Span::new(3, 4)));

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.parent(x), Some(a));
        assert_eq!(tree.parent(a), Some(ROOT));
        assert_eq!(tree.parent(ROOT), None);
        assert_eq!(tree.children(a), &[x]);
        assert_eq!(tree.node(x).unwrap().depth, 2);
        assert_eq!(tree.image(x), "x");
        assert_eq!(tree.descendants(ROOT), vec![a, x]);
        assert_eq!(tree.semantic_end(ROOT), Some(4));
    }

    #[test]
    fn test_missing_nodes() {
        let tree = ElementTree::new("".into(), NameCase::Sensitive);
        assert!(tree.is_empty());
        assert!(tree.node(7).is_none());
        assert!(tree.children(7).is_empty());
        assert_eq!(tree.image(7), "");
    }
}
