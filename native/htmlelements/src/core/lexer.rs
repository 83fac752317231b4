//! HTML Lexer - state machine producing the token sequence
//!
//! Pull-parser style: each call to `next_token` yields exactly one token.
//! Tokens cover the whole input without gaps, so the element parser can
//! rely on token boundaries as the only legal restart positions.
//!
//! The lexer is deliberately relaxed: it never fails, and malformed markup
//! is left for the element parser to report.

use super::scanner::{is_name_start_char, is_whitespace, Scanner};
use super::token::{Token, TokenKind};

/// Raw text elements whose content is not tokenized as markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawText {
    Script,
    Style,
}

impl RawText {
    fn for_tag(name: &[u8]) -> Option<Self> {
        if name.eq_ignore_ascii_case(b"script") {
            Some(RawText::Script)
        } else if name.eq_ignore_ascii_case(b"style") {
            Some(RawText::Style)
        } else {
            None
        }
    }

    fn tag_name(self) -> &'static [u8] {
        match self {
            RawText::Script => b"script",
            RawText::Style => b"style",
        }
    }

    fn token_kind(self) -> TokenKind {
        match self {
            RawText::Script => TokenKind::Script,
            RawText::Style => TokenKind::Style,
        }
    }
}

/// Current lexing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Between tags
    Content,
    /// Right after `<` or `</`, expecting the tag name
    TagName { closing: bool },
    /// Inside a start tag after its name
    InsideTag {
        raw: Option<RawText>,
        expect_value: bool,
    },
    /// Inside an end tag after its name
    InsideEndTag,
    /// Inside `<script>` or `<style>` content
    Raw(RawText),
}

/// HTML lexer implementing a pull-parser pattern
pub struct Lexer<'a> {
    scanner: Scanner<'a>,
    input: &'a [u8],
    state: LexState,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source
    pub fn new(source: &'a str) -> Self {
        Lexer {
            scanner: Scanner::new(source),
            input: source.as_bytes(),
            state: LexState::Content,
        }
    }

    /// Get the next token, `None` at end of input
    pub fn next_token(&mut self) -> Option<Token> {
        if self.scanner.is_eof() {
            return None;
        }
        let start = self.scanner.position();
        let kind = match self.state {
            LexState::Content => self.lex_content(),
            LexState::TagName { closing } => self.lex_tag_name(closing),
            LexState::InsideTag { raw, expect_value } => self.lex_inside_tag(raw, expect_value),
            LexState::InsideEndTag => self.lex_inside_end_tag(),
            LexState::Raw(raw) => self.lex_raw(raw),
        };
        let end = self.scanner.position();
        debug_assert!(end > start, "lexer must always make progress");
        Some(Token::new(kind, start, end))
    }

    fn lex_content(&mut self) -> TokenKind {
        let s = &self.scanner;
        match (s.peek(), s.peek_at(1)) {
            (Some(b'<'), Some(b'/')) if self.starts_construct() => {
                self.scanner.advance(2);
                self.state = LexState::TagName { closing: true };
                TokenKind::TagOpenSymbol
            }
            (Some(b'<'), Some(b'!')) => {
                if self.scanner.starts_with(b"<!--") {
                    self.scanner.advance(4);
                    match self.scanner.find_bytes(b"-->") {
                        Some(at) => self.scanner.set_position(at + 3),
                        None => self.scanner.advance_to_end(),
                    }
                    TokenKind::Comment
                } else {
                    self.skip_past_gt();
                    TokenKind::Declaration
                }
            }
            (Some(b'<'), Some(b'?')) => {
                self.skip_past_gt();
                TokenKind::ProcessingInstruction
            }
            (Some(b'<'), _) if self.starts_construct() => {
                self.scanner.advance(1);
                self.state = LexState::TagName { closing: false };
                TokenKind::TagOpenSymbol
            }
            (Some(b'&'), _) if self.starts_construct() => {
                self.lex_character_ref();
                TokenKind::CharacterRef
            }
            _ => {
                self.lex_text();
                TokenKind::Text
            }
        }
    }

    /// Whether the `<` or `&` at the current position starts markup
    fn starts_construct(&self) -> bool {
        let s = &self.scanner;
        match (s.peek(), s.peek_at(1)) {
            (Some(b'<'), Some(b'/')) => s
                .peek_at(2)
                .is_some_and(|b| b == b'>' || is_name_start_char(b)),
            (Some(b'<'), Some(b'!' | b'?' | b'>')) => true,
            (Some(b'<'), Some(b)) => is_name_start_char(b),
            (Some(b'&'), Some(b)) => b == b'#' || b.is_ascii_alphanumeric(),
            _ => false,
        }
    }

    fn lex_text(&mut self) {
        // The first byte is either plain text or a '<' / '&' that starts nothing.
        self.scanner.advance(1);
        loop {
            match self.scanner.find_text_boundary() {
                None => {
                    self.scanner.advance_to_end();
                    return;
                }
                Some(at) => {
                    self.scanner.set_position(at);
                    if self.starts_construct() {
                        return;
                    }
                    self.scanner.advance(1);
                }
            }
        }
    }

    fn lex_character_ref(&mut self) {
        self.scanner.advance(1);
        if self.scanner.peek() == Some(b'#') {
            self.scanner.advance(1);
            if matches!(self.scanner.peek(), Some(b'x' | b'X')) {
                self.scanner.advance(1);
                self.scanner.read_while(|b| b.is_ascii_hexdigit());
            } else {
                self.scanner.read_while(|b| b.is_ascii_digit());
            }
        } else {
            self.scanner.read_while(|b| b.is_ascii_alphanumeric());
        }
        if self.scanner.peek() == Some(b';') {
            self.scanner.advance(1);
        }
    }

    fn skip_past_gt(&mut self) {
        match self.scanner.find_byte(b'>') {
            Some(at) => self.scanner.set_position(at + 1),
            None => self.scanner.advance_to_end(),
        }
    }

    fn lex_tag_name(&mut self, closing: bool) -> TokenKind {
        match self.scanner.read_name() {
            Some((start, end)) => {
                if closing {
                    self.state = LexState::InsideEndTag;
                    TokenKind::TagClose
                } else {
                    let raw = RawText::for_tag(&self.input[start..end]);
                    self.state = LexState::InsideTag {
                        raw,
                        expect_value: false,
                    };
                    TokenKind::TagOpen
                }
            }
            // `<>` or `</>`: no name, the '>' closes the empty tag
            None => {
                self.state = if closing {
                    LexState::InsideEndTag
                } else {
                    LexState::InsideTag {
                        raw: None,
                        expect_value: false,
                    }
                };
                self.next_in_tag_kind()
            }
        }
    }

    /// Dispatch to the tag-interior lexer for the current state
    fn next_in_tag_kind(&mut self) -> TokenKind {
        match self.state {
            LexState::InsideTag { raw, expect_value } => self.lex_inside_tag(raw, expect_value),
            _ => self.lex_inside_end_tag(),
        }
    }

    fn lex_inside_tag(&mut self, raw: Option<RawText>, expect_value: bool) -> TokenKind {
        let Some(b) = self.scanner.peek() else {
            return TokenKind::Error;
        };
        match b {
            _ if is_whitespace(b) => {
                self.scanner.skip_whitespace();
                TokenKind::Whitespace
            }
            b'>' => {
                self.scanner.advance(1);
                self.state = match raw {
                    Some(raw) => LexState::Raw(raw),
                    None => LexState::Content,
                };
                TokenKind::TagCloseSymbol
            }
            b'/' if self.scanner.peek_at(1) == Some(b'>') => {
                self.scanner.advance(2);
                self.state = LexState::Content;
                TokenKind::TagCloseSymbol
            }
            b'<' => {
                // Relaxed: a new tag starts before this one was closed.
                self.state = LexState::Content;
                self.lex_content()
            }
            b'=' => {
                self.scanner.advance(1);
                self.state = LexState::InsideTag {
                    raw,
                    expect_value: true,
                };
                TokenKind::Operator
            }
            b'"' | b'\'' if expect_value => {
                self.scanner.advance(1);
                match self.scanner.find_byte(b) {
                    Some(at) => self.scanner.set_position(at + 1),
                    None => self.scanner.advance_to_end(),
                }
                self.state = LexState::InsideTag {
                    raw,
                    expect_value: false,
                };
                TokenKind::Value
            }
            _ if expect_value => {
                self.scanner
                    .read_while(|b| !is_whitespace(b) && b != b'>' && b != b'<');
                self.state = LexState::InsideTag {
                    raw,
                    expect_value: false,
                };
                TokenKind::Value
            }
            b'/' | b'"' | b'\'' => {
                self.scanner.advance(1);
                TokenKind::Error
            }
            _ => {
                self.scanner.read_while(is_argument_char);
                TokenKind::Argument
            }
        }
    }

    fn lex_inside_end_tag(&mut self) -> TokenKind {
        let Some(b) = self.scanner.peek() else {
            return TokenKind::Error;
        };
        match b {
            _ if is_whitespace(b) => {
                self.scanner.skip_whitespace();
                TokenKind::Whitespace
            }
            b'>' => {
                self.scanner.advance(1);
                self.state = LexState::Content;
                TokenKind::TagCloseSymbol
            }
            b'<' => {
                self.state = LexState::Content;
                self.lex_content()
            }
            _ => {
                self.scanner
                    .read_while(|b| !is_whitespace(b) && b != b'>' && b != b'<');
                TokenKind::Error
            }
        }
    }

    fn lex_raw(&mut self, raw: RawText) -> TokenKind {
        self.state = LexState::Content;
        match self.scanner.find_end_tag(raw.tag_name()) {
            Some(at) if at > self.scanner.position() => {
                self.scanner.set_position(at);
                raw.token_kind()
            }
            // Empty raw content: the end tag follows immediately.
            Some(_) => self.lex_content(),
            None => {
                self.scanner.advance_to_end();
                raw.token_kind()
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[inline]
fn is_argument_char(b: u8) -> bool {
    !is_whitespace(b) && !matches!(b, b'=' | b'>' | b'/' | b'<' | b'"' | b'\'')
}

/// Tokenize a whole source text
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source)
            .into_iter()
            .map(|t| (t.kind, t.text(source)))
            .collect()
    }

    #[test]
    fn test_simple_tags() {
        assert_eq!(
            kinds("<div></div>"),
            vec![
                (TagOpenSymbol, "<"),
                (TagOpen, "div"),
                (TagCloseSymbol, ">"),
                (TagOpenSymbol, "</"),
                (TagClose, "div"),
                (TagCloseSymbol, ">"),
            ]
        );
    }

    #[test]
    fn test_attributes() {
        assert_eq!(
            kinds("<a href=\"x.html\" hidden/>"),
            vec![
                (TagOpenSymbol, "<"),
                (TagOpen, "a"),
                (Whitespace, " "),
                (Argument, "href"),
                (Operator, "="),
                (Value, "\"x.html\""),
                (Whitespace, " "),
                (Argument, "hidden"),
                (TagCloseSymbol, "/>"),
            ]
        );
    }

    #[test]
    fn test_unquoted_value() {
        let tokens = kinds("<td colspan=2>");
        assert_eq!(tokens[4], (Operator, "="));
        assert_eq!(tokens[5], (Value, "2"));
        assert_eq!(tokens[6], (TagCloseSymbol, ">"));
    }

    #[test]
    fn test_text_and_entities() {
        assert_eq!(
            kinds("a < b &amp; c & d &#x41"),
            vec![(Text, "a < b "), (CharacterRef, "&amp;"), (Text, " c & d "), (CharacterRef, "&#x41")]
        );
    }

    #[test]
    fn test_comment_and_declaration() {
        assert_eq!(
            kinds("<!DOCTYPE html><!-- c --><?xml v?>"),
            vec![
                (Declaration, "<!DOCTYPE html>"),
                (Comment, "<!-- c -->"),
                (ProcessingInstruction, "<?xml v?>"),
            ]
        );
        assert_eq!(kinds("<!-- open"), vec![(Comment, "<!-- open")]);
    }

    #[test]
    fn test_script_content_is_raw() {
        assert_eq!(
            kinds("<script>if (a<b) {}</script>"),
            vec![
                (TagOpenSymbol, "<"),
                (TagOpen, "script"),
                (TagCloseSymbol, ">"),
                (Script, "if (a<b) {}"),
                (TagOpenSymbol, "</"),
                (TagClose, "script"),
                (TagCloseSymbol, ">"),
            ]
        );
        assert_eq!(kinds("<style></style>").len(), 6);
    }

    #[test]
    fn test_relaxed_unclosed_tag() {
        assert_eq!(
            kinds("<div <a>"),
            vec![
                (TagOpenSymbol, "<"),
                (TagOpen, "div"),
                (Whitespace, " "),
                (TagOpenSymbol, "<"),
                (TagOpen, "a"),
                (TagCloseSymbol, ">"),
            ]
        );
    }

    #[test]
    fn test_empty_tags() {
        assert_eq!(kinds("<>"), vec![(TagOpenSymbol, "<"), (TagCloseSymbol, ">")]);
        assert_eq!(kinds("</>"), vec![(TagOpenSymbol, "</"), (TagCloseSymbol, ">")]);
    }

    #[test]
    fn test_tokens_cover_input() {
        let source = "<p class='x'>Hi &copy; <b>there</b><!-- end -->é</p  >";
        let tokens = tokenize(source);
        let mut expected = 0;
        for token in &tokens {
            assert_eq!(token.span.start, expected);
            expected = token.span.end;
        }
        assert_eq!(expected, source.len());
    }
}
