//! Cache tunables
//!
//! The block size is a process-wide default that tests may change; each
//! cache captures it when created, so changing it never affects a live
//! cache.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Elements per block unless overridden
pub const DEFAULT_BLOCK_SIZE: usize = 1000;

/// Populated blocks kept strongly reachable by each cache
pub const DEFAULT_RETAINED_BLOCKS: usize = 16;

static BLOCK_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_BLOCK_SIZE);

/// Current default block size
#[inline]
pub fn default_block_size() -> usize {
    BLOCK_SIZE.load(Ordering::Relaxed)
}

/// Change the default block size for caches created afterwards.
///
/// Values below 1 are clamped to 1.
pub fn set_default_block_size(size: usize) {
    BLOCK_SIZE.store(size.max(1), Ordering::Relaxed);
}

/// Per-cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of elements materialized per block
    pub block_size: usize,
    /// How many recently populated blocks stay resident after every
    /// iterator has moved past them
    pub retained_blocks: usize,
}

impl CacheConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_retained_blocks(mut self, retained_blocks: usize) -> Self {
        self.retained_blocks = retained_blocks.max(1);
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            block_size: default_block_size(),
            retained_blocks: DEFAULT_RETAINED_BLOCKS,
        }
    }
}
