//! Cache blocks
//!
//! A block is a fixed window over the element stream. Its boundaries are
//! recorded once, when first populated, and never change; only its content
//! comes and goes.

use crate::core::span::Span;
use crate::elements::Element;
use std::ops::Range;
use std::sync::{Arc, Weak};

/// One window of the element stream
#[derive(Debug)]
pub struct CacheBlock {
    /// Element indices covered, half-open
    pub(crate) elements: Range<usize>,
    /// Byte range covered, `None` for the empty trailing block
    pub(crate) offsets: Option<Span>,
    /// Tokens consumed to produce the block, half-open
    pub(crate) tokens: Range<usize>,
    /// Reclaimable content; dead once nothing holds it strongly
    pub(crate) content: Weak<[Element]>,
    /// Times the content was materialized
    pub(crate) reads: usize,
}

impl CacheBlock {
    pub(crate) fn populated(
        start_index: usize,
        first_token_index: usize,
        next_token_index: usize,
        content: &Arc<[Element]>,
    ) -> Self {
        let offsets = match (content.first(), content.last()) {
            (Some(first), Some(last)) => first.span().zip(last.span()).map(|(a, b)| a.union(b)),
            _ => None,
        };
        CacheBlock {
            elements: start_index..start_index + content.len(),
            offsets,
            tokens: first_token_index..next_token_index,
            content: Arc::downgrade(content),
            reads: 1,
        }
    }

    /// Marker appended once the parser ran out of input
    pub(crate) fn empty(start_index: usize, first_token_index: usize) -> Self {
        CacheBlock {
            elements: start_index..start_index,
            offsets: None,
            tokens: first_token_index..first_token_index,
            content: Weak::<[Element; 0]>::new(),
            reads: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Content if it has not been reclaimed
    #[inline]
    pub(crate) fn resident_content(&self) -> Option<Arc<[Element]>> {
        self.content.upgrade()
    }

    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            start_index: self.elements.start,
            end_index: self.elements.end,
            start_offset: self.offsets.map(|s| s.start),
            end_offset: self.offsets.map(|s| s.end),
            first_token_index: self.tokens.start,
            last_token_index: self.tokens.end.checked_sub(1).filter(|_| !self.tokens.is_empty()),
            reads: self.reads,
            resident: self.content.strong_count() > 0,
        }
    }
}

/// Snapshot of a block's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub start_index: usize,
    pub end_index: usize,
    pub start_offset: Option<usize>,
    pub end_offset: Option<usize>,
    pub first_token_index: usize,
    pub last_token_index: Option<usize>,
    pub reads: usize,
    pub resident: bool,
}

impl BlockInfo {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;

    #[test]
    fn test_populated_block_info() {
        let content: Arc<[Element]> = vec![
            Element::leaf(ElementKind::Text, Span::new(3, 5)),
            Element::leaf(ElementKind::Comment, Span::new(5, 12)),
        ]
        .into();
        let block = CacheBlock::populated(4, 2, 6, &content);
        let info = block.info();
        assert_eq!((info.start_index, info.end_index), (4, 6));
        assert_eq!((info.start_offset, info.end_offset), (Some(3), Some(12)));
        assert_eq!((info.first_token_index, info.last_token_index), (2, Some(5)));
        assert!(info.resident);

        drop(content);
        assert!(!block.info().resident);
        assert!(block.resident_content().is_none());
    }

    #[test]
    fn test_empty_block() {
        let info = CacheBlock::empty(9, 14).info();
        assert!(info.is_empty());
        assert_eq!(info.start_offset, None);
        assert_eq!(info.last_token_index, None);
        assert_eq!(info.reads, 0);
    }
}
