//! Tree queries
//!
//! Navigation, offset lookup and completion helpers over a built
//! `ElementTree`.

use super::document::ElementTree;
use super::model::TagModel;
use super::node::{NodeId, TreeNode, ROOT};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Ancestors of `node` accepted by `predicate`, nearest first
pub fn ancestors<P>(tree: &ElementTree, node: NodeId, mut predicate: P) -> Vec<NodeId>
where
    P: FnMut(&TreeNode) -> bool,
{
    let mut result = Vec::new();
    let mut current = tree.parent(node);
    while let Some(id) = current {
        if let Some(n) = tree.node(id) {
            if predicate(n) {
                result.push(id);
            }
        }
        current = tree.parent(id);
    }
    result
}

/// Children of `node` accepted by `predicate`, in document order.
///
/// With `recursive`, every descendant is tested; rejected nodes are still
/// descended into.
pub fn children_filtered<P>(tree: &ElementTree, node: NodeId, mut predicate: P, recursive: bool) -> Vec<NodeId>
where
    P: FnMut(&TreeNode) -> bool,
{
    let candidates = if recursive {
        tree.descendants(node)
    } else {
        tree.children(node).to_vec()
    };
    candidates
        .into_iter()
        .filter(|&id| tree.node(id).is_some_and(&mut predicate))
        .collect()
}

/// Whether `node` lies strictly below `ancestor`
pub fn is_descendant(tree: &ElementTree, ancestor: NodeId, node: NodeId) -> bool {
    let mut current = tree.parent(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = tree.parent(id);
    }
    false
}

/// Deepest node whose own element range contains `offset`.
///
/// A matched close tag belongs to its open tag node. Forward searches use
/// `[from, to)`, backward searches `(from, to]`.
pub fn find_by_physical_range(tree: &ElementTree, offset: usize, forward: bool) -> Option<NodeId> {
    // (node, next child to look at)
    let mut stack: Vec<(NodeId, usize)> = vec![(ROOT, 0)];
    while let Some(&(parent, index)) = stack.last() {
        let Some(&child) = tree.children(parent).get(index) else {
            stack.pop();
            if in_close_tag(tree, parent, offset, forward) {
                return Some(parent);
            }
            continue;
        };
        if let Some(frame) = stack.last_mut() {
            frame.1 += 1;
        }

        let Some(n) = tree.node(child) else { continue };
        if n.span().is_some_and(|s| s.contains(offset, forward)) {
            return Some(child);
        }
        if !n.is_open_tag() {
            continue;
        }
        // Virtual tags have no range of their own but can hold children.
        let inside = n.element.is_virtual() || n.semantic_span().is_some_and(|s| s.contains(offset, forward));
        if inside {
            stack.push((child, 0));
        } else if in_close_tag(tree, child, offset, forward) {
            return Some(child);
        }
    }
    None
}

fn in_close_tag(tree: &ElementTree, node: NodeId, offset: usize, forward: bool) -> bool {
    tree.node(node)
        .and_then(|n| n.matching_close.as_ref())
        .and_then(|e| e.span())
        .is_some_and(|s| s.contains(offset, forward))
}

/// Deepest node whose logical range contains `offset`; the root when no
/// element does.
pub fn find_by_semantic_range(tree: &ElementTree, offset: usize, forward: bool) -> Option<NodeId> {
    let root = tree.node(ROOT)?.semantic_span()?;
    if offset < root.start || offset > root.end {
        return None;
    }
    let mut current = ROOT;
    'descend: loop {
        for &child in tree.children(current) {
            let contains = tree
                .node(child)
                .and_then(TreeNode::semantic_span)
                .is_some_and(|s| s.contains(offset, forward));
            if contains {
                current = child;
                continue 'descend;
            }
        }
        return Some(current);
    }
}

/// Names of tags that may be opened as children of `node`.
///
/// Void tags defer to their parent. Children whose open tag may be omitted
/// also contribute their own legal children.
pub fn possible_open_tags<M: TagModel + ?Sized>(tree: &ElementTree, model: &M, node: NodeId) -> Vec<String> {
    let mut context = node;
    while let Some(n) = tree.node(context) {
        let holds_children = match n.name() {
            Some(name) => n.is_open_tag() && !n.element.is_self_closing() && !model.is_empty(name),
            None => n.is_root(),
        };
        if holds_children {
            break;
        }
        match n.parent {
            Some(parent) => context = parent,
            None => break,
        }
    }

    let children = if context == ROOT {
        model.root_children()
    } else {
        tree.name(context).and_then(|name| model.children(name))
    };

    let mut names = BTreeSet::new();
    if let Some(children) = children {
        collect_open_tags(model, children, &mut names);
    }
    names.into_iter().collect()
}

fn collect_open_tags<M: TagModel + ?Sized>(model: &M, children: &[&str], names: &mut BTreeSet<String>) {
    for &child in children {
        let name = child.to_ascii_lowercase();
        if names.insert(name) && model.has_optional_open_tag(child) {
            if let Some(inner) = model.children(child) {
                collect_open_tags(model, inner, names);
            }
        }
    }
}

/// Open tags a close tag could end at `node`, innermost first.
///
/// Starts at the nearest enclosing open tag and keeps walking up while the
/// tags passed may be closed implicitly. The walk stops at the first tag
/// that already has its close tag, `node` itself included.
pub fn possible_close_tags<M: TagModel + ?Sized>(tree: &ElementTree, model: &M, node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ROOT {
            break;
        }
        let Some(n) = tree.node(id) else { break };
        current = n.parent;

        let Some(name) = n.name() else { continue };
        if !n.is_open_tag() || n.element.is_self_closing() || model.is_empty(name) {
            continue;
        }
        if n.matching_close.is_some() {
            break;
        }
        result.push(id);
        if !n.element.is_virtual() && !model.has_optional_end_tag(name) {
            break;
        }
    }
    result
}

/// Pre-order walk of the subtree at `node`
pub fn visit<F>(tree: &ElementTree, node: NodeId, visitor: &mut F)
where
    F: FnMut(NodeId, &TreeNode),
{
    let mut pending = vec![node];
    while let Some(id) = pending.pop() {
        let Some(n) = tree.node(id) else { continue };
        visitor(id, n);
        pending.extend(n.children.iter().rev());
    }
}

/// Indented one-line-per-node rendering of the subtree at `node`
pub fn dump(tree: &ElementTree, node: NodeId) -> String {
    let base = tree.node(node).map_or(0, |n| n.depth);
    let mut out = String::new();
    visit(tree, node, &mut |_, n: &TreeNode| {
        let indent = (n.depth - base) as usize * 2;
        let _ = write!(out, "{:indent$}{}", "", n.kind().as_str());
        if let Some(name) = n.name() {
            let _ = write!(out, " {name}");
        }
        match n.span() {
            Some(span) => {
                let _ = write!(out, " [{}, {})", span.start, span.end);
            }
            None => out.push_str(" (virtual)"),
        }
        if let (true, Some(end)) = (n.is_open_tag(), n.semantic_end()) {
            let _ = write!(out, " ends {end}");
        }
        out.push('\n');
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token::TokenSequence;
    use crate::elements::{ElementKind, ElementsParser};
    use crate::tree::builder::{build_tree, TreeBuilderConfig};
    use crate::tree::model::{EmptyTagModel, Html5TagModel};
    use crate::tree::path::query;

    fn tree_with(source: &str, config: TreeBuilderConfig) -> ElementTree {
        let input = TokenSequence::lex(source);
        build_tree(input.shared_source(), ElementsParser::new(&input), &Html5TagModel, config)
    }

    fn tree(source: &str) -> ElementTree {
        tree_with(source, TreeBuilderConfig::default())
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let t = tree("<div><ul><li><b>x</b></ul></div>");
        let b = query(&t, ROOT, "div/ul/li/b").unwrap();
        let li = query(&t, ROOT, "div/ul/li").unwrap();
        let div = query(&t, ROOT, "div").unwrap();

        let all = ancestors(&t, b, |_| true);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], li);
        assert_eq!(*all.last().unwrap(), ROOT);

        let divs = ancestors(&t, b, |n| n.name() == Some("div"));
        assert_eq!(divs, vec![div]);

        assert!(is_descendant(&t, div, b));
        assert!(is_descendant(&t, ROOT, b));
        assert!(!is_descendant(&t, b, div));
        assert!(!is_descendant(&t, b, b));
    }

    #[test]
    fn test_children_filtered() {
        let t = tree("<div>a<p>b</p>c<p>d<i>e</i></p></div>");
        let div = query(&t, ROOT, "div").unwrap();
        let is_text = |n: &TreeNode| n.kind() == ElementKind::Text;

        let direct: Vec<_> = children_filtered(&t, div, is_text, false)
            .into_iter()
            .map(|id| t.image(id))
            .collect();
        assert_eq!(direct, vec!["a", "c"]);

        let deep: Vec<_> = children_filtered(&t, div, is_text, true)
            .into_iter()
            .map(|id| t.image(id))
            .collect();
        assert_eq!(deep, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_find_by_physical_range_direction() {
        // <div> [0,5)  text [5,8)  </div> [8,14)
        let t = tree("<div>abc</div>");
        let div = query(&t, ROOT, "div").unwrap();
        let text = t.children(div)[0];

        assert_eq!(find_by_physical_range(&t, 0, true), Some(div));
        assert_eq!(find_by_physical_range(&t, 0, false), None);
        assert_eq!(find_by_physical_range(&t, 5, true), Some(text));
        assert_eq!(find_by_physical_range(&t, 5, false), Some(div));
        assert_eq!(find_by_physical_range(&t, 8, true), Some(div));
        assert_eq!(find_by_physical_range(&t, 8, false), Some(text));
        assert_eq!(find_by_physical_range(&t, 14, true), None);
        assert_eq!(find_by_physical_range(&t, 14, false), Some(div));
    }

    #[test]
    fn test_find_by_semantic_range() {
        let t = tree("<ul><li>one<li>two</ul>x");
        let first = query(&t, ROOT, "ul/li").unwrap();
        let second = query(&t, ROOT, "ul/li|1").unwrap();
        let ul = query(&t, ROOT, "ul").unwrap();

        assert_eq!(find_by_semantic_range(&t, 4, true), Some(first));
        assert_eq!(find_by_semantic_range(&t, 8, true).and_then(|id| t.parent(id)), Some(first));
        assert_eq!(find_by_semantic_range(&t, 11, false).and_then(|id| t.parent(id)), Some(first));
        assert_eq!(find_by_semantic_range(&t, 11, true), Some(second));
        assert_eq!(find_by_semantic_range(&t, 18, true), Some(ul));
        assert_eq!(find_by_semantic_range(&t, 24, false).map(|id| t.image(id)), Some("x"));
        assert_eq!(find_by_semantic_range(&t, 24, true), Some(ROOT));
        assert_eq!(find_by_semantic_range(&t, 99, true), None);
        assert_eq!(find_by_semantic_range(&t, 0, false), Some(ROOT));
        assert_eq!(find_by_semantic_range(&t, 0, true), Some(ul));
    }

    #[test]
    fn test_virtual_nodes_are_searched() {
        let t = tree_with(
            "<table><tr><td>x</td></tr></table>",
            TreeBuilderConfig::default().with_implied_open_tags(true),
        );
        let td = query(&t, ROOT, "table/tbody/tr/td").unwrap();
        assert_eq!(find_by_physical_range(&t, 12, true), Some(td));
        assert_eq!(find_by_semantic_range(&t, 15, true).and_then(|id| t.parent(id)), Some(td));
    }

    #[test]
    fn test_possible_open_tags() {
        let t = tree("<table><tr><td></td></tr></table><p>x<br>");
        let table = query(&t, ROOT, "table").unwrap();
        let tags = possible_open_tags(&t, &Html5TagModel, table);
        assert!(tags.contains(&"tbody".to_string()));
        // tbody may be omitted, so rows are offered directly
        assert!(tags.contains(&"tr".to_string()));
        assert!(!tags.contains(&"td".to_string()));

        let br = *t.children(query(&t, ROOT, "p").unwrap()).last().unwrap();
        let in_paragraph = possible_open_tags(&t, &Html5TagModel, br);
        assert!(in_paragraph.contains(&"span".to_string()));
        assert!(!in_paragraph.contains(&"div".to_string()));

        let at_root = possible_open_tags(&t, &Html5TagModel, ROOT);
        for name in ["html", "head", "body", "div", "title"] {
            assert!(at_root.contains(&name.to_string()), "{name}");
        }
        assert!(at_root.windows(2).all(|w| w[0] < w[1]));

        assert!(possible_open_tags(&t, &EmptyTagModel, table).is_empty());
    }

    #[test]
    fn test_possible_close_tags() {
        let t = tree("<div><ul><li><p>x");
        let p = query(&t, ROOT, "div/ul/li/p").unwrap();
        let li = query(&t, ROOT, "div/ul/li").unwrap();
        let ul = query(&t, ROOT, "div/ul").unwrap();
        let text = t.children(p)[0];

        assert_eq!(possible_close_tags(&t, &Html5TagModel, text), vec![p, li, ul]);
        assert_eq!(possible_close_tags(&t, &EmptyTagModel, text), vec![p]);
        assert!(possible_close_tags(&t, &Html5TagModel, ROOT).is_empty());
    }

    #[test]
    fn test_possible_close_tags_skip_closed_tags() {
        let t = tree("<div>x</div><ul><li>y</ul>");
        let div = query(&t, ROOT, "div").unwrap();
        let li = query(&t, ROOT, "ul/li").unwrap();

        assert!(possible_close_tags(&t, &Html5TagModel, div).is_empty());
        assert!(possible_close_tags(&t, &Html5TagModel, t.children(div)[0]).is_empty());
        assert_eq!(possible_close_tags(&t, &Html5TagModel, t.children(li)[0]), vec![li]);
    }

    #[test]
    fn test_dump() {
        let t = tree("<p>a<br></p>");
        let expected = "root [0, 12)\n  open_tag p [0, 3) ends 12\n    text [3, 4)\n    open_tag br [4, 8) ends 8\n";
        assert_eq!(dump(&t, ROOT), expected);

        let mut count = 0;
        visit(&t, ROOT, &mut |_, _| count += 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_deep_nesting_walks_iteratively() {
        let depth = 200_000;
        let source = "<div>".repeat(depth) + &"</div>".repeat(depth);
        let t = tree_with(&source, TreeBuilderConfig::default());
        assert_eq!(t.len(), depth + 1);

        let mut count = 0;
        let mut deepest = 0;
        visit(&t, ROOT, &mut |_, n: &TreeNode| {
            count += 1;
            deepest = deepest.max(n.depth);
        });
        assert_eq!(count, depth + 1);
        assert_eq!(deepest, depth as u32);

        // Inside the innermost open tag, then inside the outermost close tag
        let inner = depth as NodeId;
        assert_eq!(find_by_physical_range(&t, depth * 5 - 3, true), Some(inner));
        assert_eq!(find_by_physical_range(&t, source.len() - 3, true), Some(1));
        assert_eq!(find_by_semantic_range(&t, depth * 5, true), Some(inner));

        let shallow = dump(&t, inner);
        assert_eq!(shallow, format!("open_tag div [{}, {}) ends {}\n", depth * 5 - 5, depth * 5, depth * 5 + 6));
    }
}
