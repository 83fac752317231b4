//! Parallel tree building and querying
//!
//! Uses Rayon to lex, parse and build trees for independent documents, and
//! to resolve many paths against one shared tree.

use crate::cache::{CacheConfig, ElementsCache};
use crate::tree::{build_from_cache, query, ElementTree, NodeId, TagModel, TreeBuilderConfig};
use rayon::prelude::*;

/// Build one tree per source in parallel, preserving input order
pub fn parse_trees_parallel<S, M>(
    sources: &[S],
    model: &M,
    cache_config: CacheConfig,
    config: TreeBuilderConfig,
) -> Vec<ElementTree>
where
    S: AsRef<str> + Sync,
    M: TagModel + Sync + ?Sized,
{
    sources
        .par_iter()
        .map(|source| {
            let cache = ElementsCache::for_source(source.as_ref(), cache_config);
            build_from_cache(&cache, model, config)
        })
        .collect()
}

/// Resolve several paths from `base` in parallel
pub fn query_parallel(tree: &ElementTree, base: NodeId, paths: &[&str]) -> Vec<Option<NodeId>> {
    paths.par_iter().map(|path| query(tree, base, path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Html5TagModel, ROOT};

    #[test]
    fn test_parallel_trees_match_sequential() {
        let sources = ["<ul><li>a<li>b</ul>", "<p>x<p>y", "", "<table><tr><td>1</table>"];
        let trees = parse_trees_parallel(
            &sources,
            &Html5TagModel,
            CacheConfig::default().with_block_size(2),
            TreeBuilderConfig::default(),
        );
        assert_eq!(trees.len(), sources.len());

        for (source, tree) in sources.iter().zip(&trees) {
            assert_eq!(tree.source(), *source);
            let cache = ElementsCache::for_source(source, CacheConfig::default());
            let expected = build_from_cache(&cache, &Html5TagModel, TreeBuilderConfig::default());
            assert_eq!(tree.len(), expected.len());
        }
        assert!(trees[2].is_empty());
    }

    #[test]
    fn test_query_parallel() {
        let sources = vec!["<div><p>a</p><p>b</p></div>".to_string()];
        let trees = parse_trees_parallel(
            &sources,
            &Html5TagModel,
            CacheConfig::default(),
            TreeBuilderConfig::default(),
        );
        let results = query_parallel(&trees[0], ROOT, &["div", "div/p|1", "div/span"]);
        assert!(results[0].is_some());
        assert!(results[1].is_some());
        assert!(results[2].is_none());
    }
}
