//! Parsing Strategy Module
//!
//! - Sequential: `ElementsCache` + `TreeBuilder`, one document at a time
//! - Parallel: many documents, or many queries over one tree, with rayon

pub mod parallel;

pub use parallel::{parse_trees_parallel, query_parallel};
