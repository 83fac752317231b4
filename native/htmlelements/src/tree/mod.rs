//! Element tree
//!
//! Arena-backed tree assembled from an element sequence, plus path,
//! navigation and completion queries over it.
//!
//! ## Architecture
//!
//! ```text
//! CachedElementsIterator ──> TreeBuilder ──> ElementTree ──> query / TreePath
//!                               │                              │
//!                               └────────── TagModel ──────────┘
//! ```
//!
//! The tag model is only consulted for optional tags and completions;
//! `EmptyTagModel` yields a purely syntactic tree.

pub mod builder;
pub mod document;
pub mod model;
pub mod node;
pub mod path;
pub mod query;

pub use builder::{build_from_cache, build_tree, TreeBuilder, TreeBuilderConfig, TreeProblem};
pub use document::ElementTree;
pub use model::{EmptyTagModel, Html5TagModel, TagModel};
pub use node::{NameCase, NodeId, TreeNode, ROOT};
pub use path::{query, PathSegment, TreePath};
pub use query::{
    ancestors, children_filtered, dump, find_by_physical_range, find_by_semantic_range, is_descendant,
    possible_close_tags, possible_open_tags, visit,
};
