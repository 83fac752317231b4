//! HtmlElements - relaxed HTML element parsing with a reclaimable cache
//!
//! Layers:
//! - core: lexer producing the token sequence
//! - elements: element parser over tokens (parse_elements)
//! - cache: block cache and restartable iterator (cache_*)
//! - tree: tree builder, paths and completion queries (tree_*)
//! - strategy: parallel tree building (parse_trees_parallel)

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod cache;
pub mod core;
pub mod elements;
pub mod strategy;
pub mod tree;

mod resource;
mod term;

use crate::cache::CacheConfig;
use crate::core::token::TokenSequence;
use crate::elements::{ElementsError, ElementsParser};
use crate::resource::{ElementsCacheRef, ElementsCacheResource, TreeRef, TreeResource};
use crate::term::{block_info_to_term, elements_to_term, invalid_start_to_term, node_to_term, problems_to_term};
use crate::tree::{NodeId, TreeBuilderConfig, TreePath, ROOT};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Borrow a binary as UTF-8 source text
fn source_str<'a>(input: &'a Binary<'_>) -> NifResult<&'a str> {
    std::str::from_utf8(input.as_slice()).map_err(|_| rustler::Error::BadArg)
}

// ============================================================================
// Element Parser
// ============================================================================

/// Parse a whole document into a list of elements
#[rustler::nif]
fn parse_elements<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let sequence = TokenSequence::lex(source_str(&input)?);
    let parser = ElementsParser::new(&sequence);
    Ok(elements_to_term(env, parser, sequence.source()))
}

/// Parse from a source offset (returns {:ok, elements} or
/// {:error, {:invalid_start_position, offset}})
#[rustler::nif]
fn parse_elements_at<'a>(env: Env<'a>, input: Binary<'a>, offset: i64) -> NifResult<Term<'a>> {
    let sequence = TokenSequence::lex(source_str(&input)?);
    match ElementsParser::from_offset(&sequence, offset) {
        Ok(parser) => {
            let list = elements_to_term(env, parser, sequence.source());
            Ok((term::ok(), list).encode(env))
        }
        Err(ElementsError::InvalidStartPosition { position, .. }) => {
            Ok(invalid_start_to_term(env, position))
        }
    }
}

// ============================================================================
// Element Cache
// ============================================================================

/// Create a cache over a document with the default block size
#[rustler::nif]
fn cache_new(input: Binary) -> NifResult<ElementsCacheRef> {
    let source = source_str(&input)?;
    Ok(ResourceArc::new(ElementsCacheResource::new(source, CacheConfig::default())))
}

/// Create a cache with an explicit block size
#[rustler::nif]
fn cache_new_with_block_size(input: Binary, block_size: usize) -> NifResult<ElementsCacheRef> {
    let source = source_str(&input)?;
    let config = CacheConfig::default().with_block_size(block_size);
    Ok(ResourceArc::new(ElementsCacheResource::new(source, config)))
}

/// Drain a fresh iterator of the cache
#[rustler::nif]
fn cache_elements<'a>(env: Env<'a>, cache_ref: ElementsCacheRef) -> NifResult<Term<'a>> {
    let cache = &cache_ref.cache;
    Ok(elements_to_term(
        env,
        cache.create_elements_iterator(),
        cache.input().source(),
    ))
}

/// Block metadata as a list of maps
#[rustler::nif]
fn cache_blocks<'a>(env: Env<'a>, cache_ref: ElementsCacheRef) -> NifResult<Term<'a>> {
    let blocks = cache_ref.cache.blocks();
    let terms = blocks
        .iter()
        .map(|info| block_info_to_term(env, info))
        .collect::<NifResult<Vec<Term<'a>>>>()?;
    Ok(terms.encode(env))
}

/// Drop retained block content; it is re-parsed on the next read
#[rustler::nif]
fn cache_release(cache_ref: ElementsCacheRef) -> rustler::Atom {
    cache_ref.cache.release_content();
    term::ok()
}

/// Change the block size used by caches created afterwards
#[rustler::nif]
fn set_default_block_size(block_size: usize) -> rustler::Atom {
    cache::set_default_block_size(block_size);
    term::ok()
}

// ============================================================================
// Tree
// ============================================================================

/// Build a tree from the cache's elements
#[rustler::nif]
fn tree_build(cache_ref: ElementsCacheRef, html_model: bool) -> TreeRef {
    let model = TreeResource::model_for(html_model);
    let tree = tree::build_from_cache(&cache_ref.cache, model, TreeBuilderConfig::default());
    ResourceArc::new(TreeResource::new(tree, html_model))
}

/// Get a node as {element, parent, children, semantic_end}
#[rustler::nif]
fn tree_node<'a>(env: Env<'a>, tree_ref: TreeRef, node: NodeId) -> NifResult<Term<'a>> {
    Ok(node_to_term(env, &tree_ref.tree, node))
}

/// Resolve a `name|index/...` path from the root
#[rustler::nif]
fn tree_query(tree_ref: TreeRef, path: &str) -> Option<NodeId> {
    tree::query(&tree_ref.tree, ROOT, path)
}

/// Encode the path of an open tag node
#[rustler::nif]
fn tree_path(tree_ref: TreeRef, node: NodeId) -> Option<String> {
    TreePath::of(&tree_ref.tree, node).map(|p| p.encode_to_string())
}

/// Deepest node at an offset, by physical or semantic range
#[rustler::nif]
fn tree_find(tree_ref: TreeRef, offset: usize, semantic: bool, forward: bool) -> Option<NodeId> {
    if semantic {
        tree::find_by_semantic_range(&tree_ref.tree, offset, forward)
    } else {
        tree::find_by_physical_range(&tree_ref.tree, offset, forward)
    }
}

/// Tag names that may be opened inside a node
#[rustler::nif]
fn tree_possible_open_tags(tree_ref: TreeRef, node: NodeId) -> Vec<String> {
    tree::possible_open_tags(&tree_ref.tree, tree_ref.model(), node)
}

/// Open tags a close tag could end at a node, as {node_id, name}
#[rustler::nif]
fn tree_possible_close_tags(tree_ref: TreeRef, node: NodeId) -> Vec<(NodeId, String)> {
    let tree = &tree_ref.tree;
    tree::possible_close_tags(tree, tree_ref.model(), node)
        .into_iter()
        .map(|id| (id, tree.name(id).unwrap_or_default().to_string()))
        .collect()
}

/// Structural problems found while building
#[rustler::nif]
fn tree_problems<'a>(env: Env<'a>, tree_ref: TreeRef) -> NifResult<Term<'a>> {
    Ok(problems_to_term(env, tree_ref.tree.problems()))
}

/// Indented text rendering of the tree
#[rustler::nif]
fn tree_dump(tree_ref: TreeRef) -> String {
    tree::dump(&tree_ref.tree, ROOT)
}

// ============================================================================
// Parallel Tree Building
// ============================================================================

/// Build trees for many documents in parallel
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_trees_parallel(inputs: Vec<Binary>, html_model: bool) -> NifResult<Vec<TreeRef>> {
    let sources = inputs
        .iter()
        .map(|input| source_str(input).map(str::to_owned))
        .collect::<NifResult<Vec<String>>>()?;

    let model = TreeResource::model_for(html_model);
    let trees = strategy::parse_trees_parallel(
        &sources,
        model,
        CacheConfig::default(),
        TreeBuilderConfig::default(),
    );
    Ok(trees
        .into_iter()
        .map(|tree| ResourceArc::new(TreeResource::new(tree, html_model)))
        .collect())
}

// ============================================================================
// NIF Initialization
// ============================================================================

#[allow(non_local_definitions)]
fn load(_env: Env, _info: Term) -> bool {
    log::debug!(
        target: "htmlelements",
        "loaded, default block size {}",
        cache::default_block_size()
    );
    true
}

rustler::init!("Elixir.HtmlElements.Native", load = load);
