//! Elements Module
//!
//! The element parser and the element value type. Elements are produced in
//! source order, never overlap, and together cover every token consumed.

pub mod element;
pub mod error;
pub mod parser;

pub use element::{Attribute, Element, ElementKind, Problem};
pub use error::ElementsError;
pub use parser::ElementsParser;
