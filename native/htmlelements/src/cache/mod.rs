//! Element Cache Module
//!
//! Memoizes the element stream of a token sequence in reclaimable blocks.
//!
//! ## Architecture
//!
//! ```text
//! ElementsCache
//! ├── input: TokenSequence            # shared source + tokens
//! └── state: Mutex<CacheState>
//!     ├── blocks: Vec<CacheBlock>     # append-only, boundaries fixed
//!     │   └── content: Weak<[Element]>
//!     └── retained: LruCache<usize, Arc<[Element]>>
//! ```
//!
//! Iterators hold the block they are reading strongly; everything else is
//! reclaimable and rebuilt on demand by re-running the element parser from
//! the block's first token.

pub mod block;
pub mod config;
pub mod elements_cache;
pub mod iterator;

pub use block::BlockInfo;
pub use config::{default_block_size, set_default_block_size, CacheConfig};
pub use elements_cache::ElementsCache;
pub use iterator::CachedElementsIterator;
