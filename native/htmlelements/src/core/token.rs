//! Lexical tokens and the token sequence handed to the element parser
//!
//! The element parser treats a `TokenSequence` as an opaque, randomly
//! indexable list with a stable index → byte range mapping. Nothing here
//! validates the tokens; that is the lexer's job.

use super::span::Span;
use std::sync::Arc;

/// Type of HTML token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Character data between tags
    Text,
    /// `<` or `</`
    TagOpenSymbol,
    /// Start tag name
    TagOpen,
    /// End tag name
    TagClose,
    /// `>` or `/>`
    TagCloseSymbol,
    /// Whitespace inside a tag
    Whitespace,
    /// Attribute name
    Argument,
    /// `=` between attribute name and value
    Operator,
    /// Attribute value, quotes included
    Value,
    /// `&name;`, `&#nn;` or `&#xhh;`, possibly missing the `;`
    CharacterRef,
    /// `<!-- ... -->`, possibly unterminated
    Comment,
    /// `<!DOCTYPE ...>` and other `<!...>` markup declarations
    Declaration,
    /// `<?target ...?>`
    ProcessingInstruction,
    /// Raw content of a `<script>` element
    Script,
    /// Raw content of a `<style>` element
    Style,
    /// Stray characters inside a tag
    Error,
}

/// A lexical token: a kind plus the byte range it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Token {
            kind,
            span: Span::new(start, end),
        }
    }

    /// Token text
    #[inline]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}

/// Source text together with the tokens produced over it.
///
/// Cheap to clone; the source and the tokens are shared.
#[derive(Debug, Clone)]
pub struct TokenSequence {
    source: Arc<str>,
    tokens: Arc<[Token]>,
}

impl TokenSequence {
    /// Wrap externally produced tokens.
    ///
    /// Tokens are expected to be ordered, non-overlapping and to cover the
    /// source; this is a precondition, not checked.
    pub fn new(source: impl Into<Arc<str>>, tokens: Vec<Token>) -> Self {
        TokenSequence {
            source: source.into(),
            tokens: tokens.into(),
        }
    }

    /// Lex `source` with the built-in HTML lexer.
    pub fn lex(source: impl Into<Arc<str>>) -> Self {
        let source = source.into();
        let tokens = super::lexer::tokenize(&source);
        TokenSequence {
            source,
            tokens: tokens.into(),
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Shared handle to the source text
    #[inline]
    pub fn shared_source(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Index of the token starting exactly at `offset`.
    ///
    /// `offset == source.len()` maps to `len()` (the end position). Offsets
    /// inside a token return `None`.
    pub fn token_at_offset(&self, offset: usize) -> Option<usize> {
        if offset == self.source.len() {
            return Some(self.tokens.len());
        }
        self.tokens
            .binary_search_by(|token| token.span.start.cmp(&offset))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_at_offset() {
        let seq = TokenSequence::lex("<div></div>");
        assert_eq!(seq.token_at_offset(0), Some(0));
        assert_eq!(seq.token_at_offset(5), Some(3));
        assert_eq!(seq.token_at_offset(6), None);
        assert_eq!(seq.token_at_offset(11), Some(seq.len()));
        assert_eq!(seq.token_at_offset(12), None);
    }

    #[test]
    fn test_external_tokens() {
        let seq = TokenSequence::new(
            "ab",
            vec![Token::new(TokenKind::Text, 0, 1), Token::new(TokenKind::Text, 1, 2)],
        );
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(1).map(|t| t.text(seq.source())), Some("b"));
    }
}
