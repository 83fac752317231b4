//! ResourceArc Wrappers
//!
//! Persistent state handed to the host runtime: element caches and built
//! trees. Both are shared across scheduler threads without an outer lock;
//! the cache synchronizes its own block list and trees never change after
//! building.

use crate::cache::{CacheConfig, ElementsCache};
use crate::tree::{EmptyTagModel, ElementTree, Html5TagModel, TagModel};
use rustler::ResourceArc;

/// Wrapper for ElementsCache that can be stored in a ResourceArc
pub struct ElementsCacheResource {
    pub cache: ElementsCache,
}

impl ElementsCacheResource {
    pub fn new(source: &str, config: CacheConfig) -> Self {
        ElementsCacheResource {
            cache: ElementsCache::for_source(source, config),
        }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for ElementsCacheResource {}

/// Type alias for the cache ResourceArc
pub type ElementsCacheRef = ResourceArc<ElementsCacheResource>;

static HTML5_MODEL: Html5TagModel = Html5TagModel;
static EMPTY_MODEL: EmptyTagModel = EmptyTagModel;

/// Wrapper for a built ElementTree, remembering the tag model it was built
/// with so completion queries agree with the tree's shape
pub struct TreeResource {
    pub tree: ElementTree,
    html_model: bool,
}

impl TreeResource {
    pub fn new(tree: ElementTree, html_model: bool) -> Self {
        TreeResource { tree, html_model }
    }

    /// Tag model for `html_model`
    pub fn model_for(html_model: bool) -> &'static (dyn TagModel + Sync) {
        if html_model {
            &HTML5_MODEL
        } else {
            &EMPTY_MODEL
        }
    }

    pub fn model(&self) -> &'static (dyn TagModel + Sync) {
        Self::model_for(self.html_model)
    }
}

#[rustler::resource_impl]
impl rustler::Resource for TreeResource {}

/// Type alias for tree ResourceArc
pub type TreeRef = ResourceArc<TreeResource>;
