//! Core lexing primitives
//!
//! This module contains the building blocks the element parser runs on:
//! - Span: half-open byte ranges into the source
//! - Scanner: memchr-accelerated delimiter detection
//! - Lexer: relaxed HTML tokenizer producing the token sequence
//! - Token: token kinds and the shared, immutable token sequence

pub mod lexer;
pub mod scanner;
pub mod span;
pub mod token;
