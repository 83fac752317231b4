//! Tree paths
//!
//! Slash-separated open tag names, each optionally followed by `|index`:
//! the zero-based position among siblings with the same name. Index 0 is
//! written without the suffix, e.g. `html/body/table|2/tr`.

use super::document::ElementTree;
use super::node::{NodeId, ROOT};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub index: usize,
}

/// Route from a base node down to a descendant open tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreePath {
    segments: Vec<PathSegment>,
}

impl TreePath {
    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path from the root to `node`.
    ///
    /// `None` when the node or one of its ancestors is not an open tag.
    pub fn of(tree: &ElementTree, node: NodeId) -> Option<TreePath> {
        let mut segments = Vec::new();
        let mut current = node;
        while current != ROOT {
            let n = tree.node(current)?;
            if !n.is_open_tag() {
                return None;
            }
            let name = n.name()?;
            let parent = n.parent?;
            let index = tree
                .children(parent)
                .iter()
                .take_while(|&&c| c != current)
                .filter(|&&c| is_named_open_tag(tree, c, name))
                .count();
            segments.push(PathSegment {
                name: name.to_string(),
                index,
            });
            current = parent;
        }
        segments.reverse();
        Some(TreePath { segments })
    }

    /// Parse the string form. `None` when an index is not a number.
    pub fn parse(path: &str) -> Option<TreePath> {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| match segment.split_once('|') {
                Some((name, index)) => Some(PathSegment {
                    name: name.to_string(),
                    index: index.parse().ok()?,
                }),
                None => Some(PathSegment {
                    name: segment.to_string(),
                    index: 0,
                }),
            })
            .collect::<Option<Vec<_>>>()?;
        Some(TreePath { segments })
    }

    pub fn encode_to_string(&self) -> String {
        self.to_string()
    }

    /// Follow the path down from `base`
    pub fn resolve(&self, tree: &ElementTree, base: NodeId) -> Option<NodeId> {
        tree.node(base)?;
        self.segments.iter().try_fold(base, |current, segment| {
            tree.children(current)
                .iter()
                .copied()
                .filter(|&c| is_named_open_tag(tree, c, &segment.name))
                .nth(segment.index)
        })
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&segment.name)?;
            if segment.index > 0 {
                write!(f, "|{}", segment.index)?;
            }
        }
        Ok(())
    }
}

fn is_named_open_tag(tree: &ElementTree, id: NodeId, name: &str) -> bool {
    tree.node(id)
        .is_some_and(|n| n.is_open_tag() && n.name().is_some_and(|n| tree.names_equal(n, name)))
}

/// Node reached by `path` from `base`
pub fn query(tree: &ElementTree, base: NodeId, path: &str) -> Option<NodeId> {
    TreePath::parse(path)?.resolve(tree, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token::TokenSequence;
    use crate::elements::ElementsParser;
    use crate::tree::builder::{build_tree, TreeBuilderConfig};
    use crate::tree::model::{EmptyTagModel, Html5TagModel};
    use crate::tree::node::NameCase;

    fn tree(source: &str) -> ElementTree {
        let input = TokenSequence::lex(source);
        build_tree(
            input.shared_source(),
            ElementsParser::new(&input),
            &Html5TagModel,
            TreeBuilderConfig::default(),
        )
    }

    const PAGE: &str = "<html><body>\
        <table><tr><td>a</td></tr></table>\
        <table></table>\
        <table><tr><td>b<td>c</tr><tr><td>d</tr></table>\
        </body></html>";

    #[test]
    fn test_query_by_index() {
        let t = tree(PAGE);
        let tr = query(&t, ROOT, "html/body/table|2/tr|1").unwrap();
        let td = query(&t, tr, "td").unwrap();
        assert_eq!(t.image(t.children(td)[0]), "d");

        assert!(query(&t, ROOT, "html/body/table|3").is_none());
        assert!(query(&t, ROOT, "html/body/div").is_none());
        assert!(query(&t, ROOT, "html/body/table|x").is_none());
        assert_eq!(query(&t, ROOT, ""), Some(ROOT));
    }

    #[test]
    fn test_round_trip_every_open_tag() {
        let t = tree(PAGE);
        for id in t.descendants(ROOT) {
            if !t.node(id).unwrap().is_open_tag() {
                assert!(TreePath::of(&t, id).is_none());
                continue;
            }
            let path = TreePath::of(&t, id).unwrap();
            let encoded = path.encode_to_string();
            assert_eq!(TreePath::parse(&encoded), Some(path));
            assert_eq!(query(&t, ROOT, &encoded), Some(id), "{encoded}");
        }
    }

    #[test]
    fn test_encoding() {
        let t = tree(PAGE);
        let tds: Vec<_> = t
            .descendants(ROOT)
            .into_iter()
            .filter(|&id| t.name(id) == Some("td"))
            .collect();
        let encoded: Vec<_> = tds
            .iter()
            .map(|&id| TreePath::of(&t, id).unwrap().to_string())
            .collect();
        assert_eq!(
            encoded,
            vec![
                "html/body/table/tr/td",
                "html/body/table|2/tr/td",
                "html/body/table|2/tr/td|1",
                "html/body/table|2/tr|1/td",
            ]
        );
        assert_eq!(TreePath::of(&t, ROOT), Some(TreePath::default()));
    }

    #[test]
    fn test_query_respects_name_case() {
        let input = TokenSequence::lex("<A><b></b></A>");
        let insensitive = build_tree(
            input.shared_source(),
            ElementsParser::new(&input),
            &EmptyTagModel,
            TreeBuilderConfig::default(),
        );
        assert!(query(&insensitive, ROOT, "a/B").is_some());

        let sensitive = build_tree(
            input.shared_source(),
            ElementsParser::new(&input),
            &EmptyTagModel,
            TreeBuilderConfig::default().with_name_case(NameCase::Sensitive),
        );
        assert!(query(&sensitive, ROOT, "a/b").is_none());
        assert!(query(&sensitive, ROOT, "A/b").is_some());
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let path = TreePath::parse("/html//body|0/").unwrap();
        assert_eq!(path.encode_to_string(), "html/body");
        assert!(TreePath::parse("").unwrap().is_empty());
    }
}
