//! Elements Parser Cache
//!
//! Partitions the element stream of one token sequence into blocks of at
//! most `block_size` elements. Each block is produced by a fresh element
//! parser started at the block's first token, so an evicted block can be
//! rebuilt on its own with identical boundaries.
//!
//! Block content is held weakly by the block. Strong references live in
//! iterators positioned inside the block and in a small LRU of recently
//! populated blocks; when both let go, the content is reclaimed and the
//! next read re-parses it.
//!
//! The token sequence must not change while the cache is in use.

use super::block::{BlockInfo, CacheBlock};
use super::config::CacheConfig;
use super::iterator::CachedElementsIterator;
use crate::core::token::TokenSequence;
use crate::elements::{Element, ElementsParser};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared, lock-protected block list
struct CacheState {
    blocks: Vec<CacheBlock>,
    /// Block index -> content, the recently used blocks kept alive
    retained: LruCache<usize, Arc<[Element]>>,
}

/// Block cache over the elements of one token sequence
pub struct ElementsCache {
    input: TokenSequence,
    block_size: usize,
    state: Mutex<CacheState>,
}

impl ElementsCache {
    /// Cache using the default configuration
    pub fn new(input: TokenSequence) -> Self {
        Self::with_config(input, CacheConfig::default())
    }

    pub fn with_config(input: TokenSequence, config: CacheConfig) -> Self {
        let retained = NonZeroUsize::new(config.retained_blocks).unwrap_or(NonZeroUsize::MIN);
        ElementsCache {
            input,
            block_size: config.block_size.max(1),
            state: Mutex::new(CacheState {
                blocks: Vec::new(),
                retained: LruCache::new(retained),
            }),
        }
    }

    /// Lex `source` with the built-in lexer and cache its elements
    pub fn for_source(source: &str, config: CacheConfig) -> Self {
        Self::with_config(TokenSequence::lex(source), config)
    }

    #[inline]
    pub fn input(&self) -> &TokenSequence {
        &self.input
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// A fresh iterator replaying the element sequence from the start
    pub fn create_elements_iterator(&self) -> CachedElementsIterator<'_> {
        CachedElementsIterator::new(self)
    }

    /// Metadata snapshot of every block created so far
    pub fn blocks(&self) -> Vec<BlockInfo> {
        self.lock().blocks.iter().map(CacheBlock::info).collect()
    }

    /// Drop every retained block.
    ///
    /// Content still held by live iterators survives until they move on.
    pub fn release_content(&self) {
        let mut state = self.lock();
        let released = state.retained.len();
        state.retained.clear();
        log::debug!(target: "htmlelements::cache", "released {released} retained blocks");
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Block state stays consistent even if a holder panicked: every
        // mutation is a single push or a single content swap.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Content of block `index`, creating or re-populating it as needed.
    ///
    /// `None` once the block lies past the end of the element stream.
    pub(crate) fn block_content(&self, index: usize) -> Option<Arc<[Element]>> {
        let mut state = self.lock();
        while state.blocks.len() <= index {
            if !self.append_block(&mut state) {
                return None;
            }
        }

        let block = &state.blocks[index];
        if block.is_empty() {
            return None;
        }
        if let Some(content) = block.resident_content() {
            if state.retained.get(&index).is_none() {
                state.retained.put(index, Arc::clone(&content));
            }
            return Some(content);
        }

        let content = self.repopulate(&mut state, index);
        Some(content)
    }

    /// Append the block following the last one. Returns `false` when the
    /// element stream is exhausted.
    fn append_block(&self, state: &mut CacheState) -> bool {
        let (start_index, first_token) = match state.blocks.last() {
            Some(last) if last.is_empty() => return false,
            Some(last) => (last.elements.end, last.tokens.end),
            None => (0, 0),
        };

        let (elements, next_token) = self.parse_block(first_token);
        if elements.is_empty() {
            log::debug!(
                target: "htmlelements::cache",
                "end of elements at index {start_index}, token {first_token}"
            );
            state.blocks.push(CacheBlock::empty(start_index, first_token));
            return false;
        }

        let content: Arc<[Element]> = elements.into();
        let block = CacheBlock::populated(start_index, first_token, next_token, &content);
        log::debug!(
            target: "htmlelements::cache",
            "created block {} covering elements {:?}, tokens {:?}",
            state.blocks.len(),
            block.elements,
            block.tokens
        );
        state.retained.put(state.blocks.len(), content);
        state.blocks.push(block);
        true
    }

    /// Rebuild reclaimed content of an existing block
    fn repopulate(&self, state: &mut CacheState, index: usize) -> Arc<[Element]> {
        let first_token = state.blocks[index].tokens.start;
        let (elements, next_token) = self.parse_block(first_token);
        let content: Arc<[Element]> = elements.into();

        let block = &mut state.blocks[index];
        let rebuilt = CacheBlock::populated(block.elements.start, first_token, next_token, &content);
        let consistent = rebuilt.elements == block.elements
            && rebuilt.offsets == block.offsets
            && rebuilt.tokens == block.tokens;
        if !consistent {
            // Only possible if the token sequence changed under the cache.
            log::warn!(
                target: "htmlelements::cache",
                "block {index} re-populated with different boundaries: {:?} != {:?}",
                rebuilt.elements,
                block.elements
            );
        }
        debug_assert!(consistent, "non-deterministic block re-population");
        block.content = Arc::downgrade(&content);
        block.reads += 1;
        log::trace!(
            target: "htmlelements::cache",
            "re-populated block {index} (reads: {})",
            block.reads
        );

        state.retained.put(index, Arc::clone(&content));
        content
    }

    /// Run a fresh parser from `first_token` for at most one block
    fn parse_block(&self, first_token: usize) -> (Vec<Element>, usize) {
        let mut parser = ElementsParser::at_token(&self.input, first_token);
        let elements: Vec<Element> = parser.by_ref().take(self.block_size).collect();
        (elements, parser.token_index())
    }
}
