//! Tree Builder
//!
//! Assembles an element sequence into an `ElementTree`. Open tags become
//! internal nodes; everything else becomes a leaf of the innermost open tag.
//!
//! Building never fails. Structural trouble is resolved with the tag model
//! where it can be (optional end tags close implicitly) and recorded as a
//! `TreeProblem` otherwise.

use super::document::ElementTree;
use super::model::{allows, TagModel};
use super::node::{NameCase, NodeId, ROOT};
use crate::cache::ElementsCache;
use crate::core::span::Span;
use crate::elements::{Element, ElementKind};
use std::sync::Arc;

/// Limit on virtual tags stacked in front of one element
const MAX_IMPLIED_DEPTH: usize = 4;

/// Tree builder options
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilderConfig {
    pub name_case: NameCase,
    /// Insert virtual open tags the model says may be omitted
    pub implied_open_tags: bool,
}

impl TreeBuilderConfig {
    pub fn with_name_case(mut self, name_case: NameCase) -> Self {
        self.name_case = name_case;
        self
    }

    pub fn with_implied_open_tags(mut self, enabled: bool) -> Self {
        self.implied_open_tags = enabled;
        self
    }
}

/// Structural issue found while building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeProblem {
    /// Close tag with no open tag it could close; kept as a leaf
    UnmatchedCloseTag(NodeId),
    /// Open tag with a required end tag still open at end of input
    UnclosedTag(NodeId),
}

impl TreeProblem {
    #[inline]
    pub fn node(&self) -> NodeId {
        match *self {
            TreeProblem::UnmatchedCloseTag(id) | TreeProblem::UnclosedTag(id) => id,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TreeProblem::UnmatchedCloseTag(_) => "close tag without matching open tag",
            TreeProblem::UnclosedTag(_) => "open tag is never closed",
        }
    }
}

/// Incremental tree builder
pub struct TreeBuilder<'m, M: TagModel + ?Sized> {
    tree: ElementTree,
    model: &'m M,
    config: TreeBuilderConfig,
    /// Open nodes, root at the bottom
    stack: Vec<NodeId>,
}

impl<'m, M: TagModel + ?Sized> TreeBuilder<'m, M> {
    pub fn new(source: Arc<str>, model: &'m M, config: TreeBuilderConfig) -> Self {
        TreeBuilder {
            tree: ElementTree::new(source, config.name_case),
            model,
            config,
            stack: vec![ROOT],
        }
    }

    /// Add the next element of the sequence
    pub fn push(&mut self, element: Element) {
        match element.kind() {
            ElementKind::OpenTag => self.open_tag(element),
            ElementKind::CloseTag => self.close_tag(element),
            ElementKind::Root => {
                log::trace!(target: "htmlelements::tree", "ignoring nested root element");
            }
            _ => {
                self.leaf(element);
            }
        }
    }

    /// Close what is still open and return the tree
    pub fn finish(mut self) -> ElementTree {
        while self.stack.len() > 1 {
            let Some(id) = self.stack.pop() else { break };
            let end = self.physical_end(id);
            self.set_semantic_end(id, end);

            if !self.closes_implicitly(id) {
                self.tree.add_problem(TreeProblem::UnclosedTag(id));
            }
        }

        log::debug!(
            target: "htmlelements::tree",
            "built tree with {} nodes, {} problems",
            self.tree.len(),
            self.tree.problems().len()
        );
        self.tree
    }

    #[inline]
    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(ROOT)
    }

    fn leaf(&mut self, element: Element) -> NodeId {
        let parent = self.current();
        self.tree.append(parent, element)
    }

    fn open_tag(&mut self, element: Element) {
        let name: Box<str> = element.name().unwrap_or_default().into();
        let start = element.from().unwrap_or(0);

        self.close_implied_by(&name, start);
        if self.config.implied_open_tags {
            self.open_implied_for(&name, start);
        }

        let span = element.span();
        let childless = element.is_self_closing() || self.model.is_empty(&name);
        let id = self.leaf(element);
        // Open nodes start at their own range; the end moves when they close.
        if let Some(node) = self.tree.node_mut(id) {
            node.semantic = span;
        }
        if !childless {
            self.stack.push(id);
        }
    }

    fn close_tag(&mut self, element: Element) {
        let name = element.name().unwrap_or_default();
        let position = self.stack[1..]
            .iter()
            .rposition(|&id| self.tree.name(id).is_some_and(|n| self.tree.names_equal(n, name)))
            .map(|p| p + 1);

        let target = position.filter(|&p| self.stack[p + 1..].iter().all(|&id| self.closes_implicitly(id)));
        let Some(p) = target else {
            log::trace!(target: "htmlelements::tree", "orphan close tag {name}");
            let id = self.leaf(element);
            self.tree.add_problem(TreeProblem::UnmatchedCloseTag(id));
            return;
        };

        let at = element.from().unwrap_or(0);
        while self.stack.len() > p + 1 {
            if let Some(id) = self.stack.pop() {
                self.set_semantic_end(id, at);
            }
        }
        let id = self.stack[p];
        self.stack.truncate(p);
        let end = element.to().unwrap_or(at);
        self.set_semantic_end(id, end);
        if let Some(node) = self.tree.node_mut(id) {
            node.matching_close = Some(element);
        }
    }

    /// Close open tags whose end tag may be omitted and that cannot hold `name`
    fn close_implied_by(&mut self, name: &str, at: usize) {
        let model = self.model;
        while self.stack.len() > 1 {
            let top = self.current();
            let Some(top_name) = self.tree.name(top) else { break };
            if !model.has_optional_end_tag(top_name) {
                break;
            }
            match model.children(top_name) {
                Some(children) if !allows(children, name) => {
                    log::trace!(target: "htmlelements::tree", "{name} closes {top_name}");
                    self.stack.pop();
                    self.set_semantic_end(top, at);
                }
                _ => break,
            }
        }
    }

    /// Open virtual tags between the current node and `name` where the model
    /// allows the open tag to be omitted
    fn open_implied_for(&mut self, name: &str, at: usize) {
        let model = self.model;
        for _ in 0..MAX_IMPLIED_DEPTH {
            let top = self.current();
            let children = if top == ROOT {
                model.root_children()
            } else {
                self.tree.name(top).and_then(|n| model.children(n))
            };
            let Some(children) = children else { return };
            if allows(children, name) {
                return;
            }
            let implied = children.iter().find(|c| {
                model.has_optional_open_tag(c)
                    && model.children(c).is_some_and(|inner| allows(inner, name))
            });
            let Some(implied) = implied else { return };

            log::trace!(target: "htmlelements::tree", "implied <{implied}> before {name}");
            let id = self.tree.append(top, Element::virtual_open_tag(implied));
            if let Some(node) = self.tree.node_mut(id) {
                node.semantic = Some(Span::new(at, at));
            }
            self.stack.push(id);
        }
    }

    fn closes_implicitly(&self, id: NodeId) -> bool {
        self.tree.node(id).is_some_and(|n| {
            n.element.is_virtual() || n.name().is_some_and(|name| self.model.has_optional_end_tag(name))
        })
    }

    fn set_semantic_end(&mut self, id: NodeId, end: usize) {
        if let Some(node) = self.tree.node_mut(id) {
            let start = node.semantic.map_or(end, |s| s.start);
            node.semantic = Some(Span::new(start, end.max(start)));
        }
    }

    /// End of the last physical element in the subtree of `id`.
    ///
    /// Open children are popped before their parent, so the last child's
    /// range already covers its own subtree.
    fn physical_end(&self, id: NodeId) -> usize {
        let range_end = |id: NodeId| {
            self.tree
                .node(id)
                .and_then(|n| n.semantic.or(n.element.span()))
                .map_or(0, |s| s.end)
        };
        let own = range_end(id);
        self.tree
            .children(id)
            .last()
            .map_or(own, |&last| own.max(range_end(last)))
    }
}

/// Build a tree from a complete element sequence
pub fn build_tree<I, M>(source: Arc<str>, elements: I, model: &M, config: TreeBuilderConfig) -> ElementTree
where
    I: IntoIterator<Item = Element>,
    M: TagModel + ?Sized,
{
    let mut builder = TreeBuilder::new(source, model, config);
    for element in elements {
        builder.push(element);
    }
    builder.finish()
}

/// Build a tree by draining a fresh iterator of `cache`
pub fn build_from_cache<M: TagModel + ?Sized>(
    cache: &ElementsCache,
    model: &M,
    config: TreeBuilderConfig,
) -> ElementTree {
    build_tree(
        cache.input().shared_source(),
        cache.create_elements_iterator(),
        model,
        config,
    )
}
