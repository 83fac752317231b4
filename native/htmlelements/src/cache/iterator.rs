//! Cached Iterator
//!
//! Walks the cache's blocks front to back. Holds the current block's content
//! strongly, so the block it is reading from can never be reclaimed under
//! it; blocks it has left may be.

use super::elements_cache::ElementsCache;
use crate::elements::Element;
use std::sync::Arc;

/// Element iterator backed by an `ElementsCache`.
///
/// Create a new one with `ElementsCache::create_elements_iterator` to
/// restart; a single instance only moves forward.
pub struct CachedElementsIterator<'c> {
    cache: &'c ElementsCache,
    /// Index of the block to load next
    next_block: usize,
    content: Option<Arc<[Element]>>,
    position: usize,
    exhausted: bool,
}

impl<'c> CachedElementsIterator<'c> {
    pub(crate) fn new(cache: &'c ElementsCache) -> Self {
        CachedElementsIterator {
            cache,
            next_block: 0,
            content: None,
            position: 0,
            exhausted: false,
        }
    }

    /// Whether another element is available, loading the next block if the
    /// current one is used up
    pub fn has_next(&mut self) -> bool {
        self.fill()
    }

    /// Index of the block currently being read
    pub fn current_block(&self) -> Option<usize> {
        self.content.as_ref().map(|_| self.next_block - 1)
    }

    fn fill(&mut self) -> bool {
        loop {
            if let Some(content) = &self.content {
                if self.position < content.len() {
                    return true;
                }
            }
            if self.exhausted {
                return false;
            }
            match self.cache.block_content(self.next_block) {
                Some(content) => {
                    self.content = Some(content);
                    self.next_block += 1;
                    self.position = 0;
                }
                None => {
                    self.content = None;
                    self.exhausted = true;
                    return false;
                }
            }
        }
    }
}

impl Iterator for CachedElementsIterator<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.fill() {
            return None;
        }
        let element = self.content.as_ref()?.get(self.position)?.clone();
        self.position += 1;
        Some(element)
    }
}
