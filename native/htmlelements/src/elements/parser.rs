//! Element Parser
//!
//! Turns a token sequence into a lazy sequence of elements. The parser keeps
//! no context between elements, so it can be started at any token boundary
//! and produces the same elements from there as a run started earlier would.
//! The block cache depends on this to re-populate evicted blocks.

use super::element::{Attribute, Element, ElementKind, Problem};
use super::error::ElementsError;
use crate::core::span::Span;
use crate::core::token::{TokenKind, TokenSequence};

/// One-shot, lazy element scanner over a token sequence
pub struct ElementsParser<'a> {
    input: &'a TokenSequence,
    index: usize,
}

impl<'a> ElementsParser<'a> {
    /// Parser positioned at the first token
    pub fn new(input: &'a TokenSequence) -> Self {
        ElementsParser { input, index: 0 }
    }

    /// Parser positioned at a token index.
    ///
    /// `index == input.len()` yields an exhausted parser.
    pub fn from_token_index(input: &'a TokenSequence, index: i64) -> Result<Self, ElementsError> {
        let position = usize::try_from(index)
            .map_err(|_| ElementsError::invalid_start(index, "negative token index"))?;
        if position > input.len() {
            return Err(ElementsError::invalid_start(index, "token index out of range"));
        }
        Ok(ElementsParser {
            input,
            index: position,
        })
    }

    /// Parser at a token index already known to be valid
    pub(crate) fn at_token(input: &'a TokenSequence, index: usize) -> Self {
        debug_assert!(index <= input.len());
        ElementsParser { input, index }
    }

    /// Parser positioned at a byte offset, which must be a token boundary.
    ///
    /// `offset == source.len()` yields an exhausted parser.
    pub fn from_offset(input: &'a TokenSequence, offset: i64) -> Result<Self, ElementsError> {
        let position = usize::try_from(offset)
            .map_err(|_| ElementsError::invalid_start(offset, "negative offset"))?;
        let index = input
            .token_at_offset(position)
            .ok_or_else(|| ElementsError::invalid_start(offset, "offset is not a token boundary"))?;
        Ok(ElementsParser { input, index })
    }

    /// Index of the next token to consume
    #[inline]
    pub fn token_index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.index < self.input.len()
    }

    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.input.get(index).map(|t| t.kind)
    }

    fn text_at(&self, index: usize) -> &'a str {
        self.input
            .get(index)
            .map_or("", |t| t.text(self.input.source()))
    }

    fn span_at(&self, index: usize) -> Span {
        self.input.get(index).map_or_else(Span::default, |t| t.span)
    }

    /// Produce the next element, consuming its tokens
    fn next_element(&mut self) -> Option<Element> {
        let token = *self.input.get(self.index)?;
        let text = token.text(self.input.source());
        let element = match token.kind {
            TokenKind::TagOpenSymbol => return Some(self.parse_tag()),
            TokenKind::Text | TokenKind::Script | TokenKind::Style => {
                Element::leaf(ElementKind::Text, token.span)
            }
            TokenKind::CharacterRef if text.ends_with(';') => {
                Element::leaf(ElementKind::EntityReference, token.span)
            }
            TokenKind::CharacterRef => Element::error(token.span, Problem::UnterminatedEntity),
            TokenKind::Comment if text.len() >= 7 && text.ends_with("-->") => {
                Element::leaf(ElementKind::Comment, token.span)
            }
            TokenKind::Comment => Element::error(token.span, Problem::UnterminatedComment),
            TokenKind::Declaration | TokenKind::ProcessingInstruction if text.ends_with('>') => {
                Element::leaf(ElementKind::Declaration, token.span)
            }
            TokenKind::Declaration | TokenKind::ProcessingInstruction => {
                Element::error(token.span, Problem::UnterminatedDeclaration)
            }
            TokenKind::TagOpen
            | TokenKind::TagClose
            | TokenKind::TagCloseSymbol
            | TokenKind::Whitespace
            | TokenKind::Argument
            | TokenKind::Operator
            | TokenKind::Value
            | TokenKind::Error => Element::error(token.span, Problem::UnexpectedToken),
        };
        self.index += 1;
        Some(element)
    }

    /// Parse an open or close tag starting at a `<` / `</` token
    fn parse_tag(&mut self) -> Element {
        let start = self.index;
        let closing = self.text_at(start) == "</";
        let name_kind = if closing {
            TokenKind::TagClose
        } else {
            TokenKind::TagOpen
        };
        self.index += 1;

        if self.kind_at(self.index) != Some(name_kind) {
            // `<>` / `</>`: swallow the '>' so the error covers the whole tag
            if self.kind_at(self.index) == Some(TokenKind::TagCloseSymbol) {
                self.index += 1;
            }
            return Element::error(self.consumed_span(start), Problem::MissingTagName);
        }
        let name = self.text_at(self.index);
        self.index += 1;

        let mut attributes: Vec<Attribute> = Vec::new();
        let mut pending_operator = false;
        loop {
            match self.kind_at(self.index) {
                Some(TokenKind::Whitespace | TokenKind::Error) => {}
                Some(TokenKind::Argument) => {
                    attributes.push(Attribute {
                        name: self.span_at(self.index),
                        value: None,
                    });
                    pending_operator = false;
                }
                Some(TokenKind::Operator) => pending_operator = true,
                Some(TokenKind::Value) => {
                    if pending_operator {
                        if let Some(last) = attributes.last_mut() {
                            last.value = Some(self.span_at(self.index));
                        }
                    }
                    pending_operator = false;
                }
                Some(TokenKind::TagCloseSymbol) => {
                    let self_closing = self.text_at(self.index) == "/>";
                    self.index += 1;
                    let span = self.consumed_span(start);
                    return if closing {
                        Element::close_tag(span, name)
                    } else {
                        Element::open_tag(span, name, attributes, self_closing)
                    };
                }
                _ => return Element::error(self.consumed_span(start), Problem::UnterminatedTag),
            }
            self.index += 1;
        }
    }

    /// Span from the token at `start` to the last consumed token
    fn consumed_span(&self, start: usize) -> Span {
        let first = self.span_at(start);
        let last = self.span_at(self.index.saturating_sub(1).max(start));
        first.union(last)
    }
}

impl Iterator for ElementsParser<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(source: &str) -> Vec<(ElementKind, usize, usize)> {
        let input = TokenSequence::lex(source);
        ElementsParser::new(&input)
            .map(|e| (e.kind(), e.from().unwrap(), e.to().unwrap()))
            .collect()
    }

    #[test]
    fn test_div_pair() {
        assert_eq!(
            summary("<div></div>"),
            vec![(ElementKind::OpenTag, 0, 5), (ElementKind::CloseTag, 5, 11)]
        );
    }

    #[test]
    fn test_invalid_start_positions() {
        let input = TokenSequence::lex("<div></div>");
        assert!(matches!(
            ElementsParser::from_offset(&input, 6),
            Err(ElementsError::InvalidStartPosition { position: 6, .. })
        ));
        assert!(ElementsParser::from_offset(&input, -1).is_err());
        assert!(ElementsParser::from_token_index(&input, -1).is_err());
        assert!(ElementsParser::from_token_index(&input, 7).is_err());

        let at_end = ElementsParser::from_offset(&input, 11).unwrap();
        assert!(!at_end.has_next());
        assert_eq!(at_end.count(), 0);
    }

    #[test]
    fn test_start_mid_stream() {
        let input = TokenSequence::lex("<div></div>");
        let mut parser = ElementsParser::from_offset(&input, 5).unwrap();
        assert_eq!(parser.token_index(), 3);
        let close = parser.next().unwrap();
        assert_eq!(close.kind(), ElementKind::CloseTag);
        assert_eq!(close.name(), Some("div"));
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_attributes_and_self_closing() {
        let source = "<img src=\"a.png\" alt=x ismap/>";
        let input = TokenSequence::lex(source);
        let element = ElementsParser::new(&input).next().unwrap();
        assert_eq!(element.kind(), ElementKind::OpenTag);
        assert!(element.is_self_closing());
        let attrs = element.attributes();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[0].unquoted_value(source), Some("a.png"));
        assert_eq!(attrs[1].value(source), Some("x"));
        assert_eq!(attrs[2].name(source), "ismap");
        assert_eq!(attrs[2].value, None);
    }

    #[test]
    fn test_mixed_content() {
        use ElementKind::*;
        assert_eq!(
            summary("<!doctype html><p>a &amp; b<!-- c --></p>"),
            vec![
                (Declaration, 0, 15),
                (OpenTag, 15, 18),
                (Text, 18, 20),
                (EntityReference, 20, 25),
                (Text, 25, 27),
                (Comment, 27, 37),
                (CloseTag, 37, 41),
            ]
        );
    }

    #[test]
    fn test_malformed_input_becomes_errors() {
        let source = "<div <a>&nbsp <!-- x";
        let input = TokenSequence::lex(source);
        let elements: Vec<Element> = ElementsParser::new(&input).collect();
        let kinds: Vec<_> = elements.iter().map(|e| (e.kind(), e.problem())).collect();
        assert_eq!(
            kinds,
            vec![
                (ElementKind::Error, Some(Problem::UnterminatedTag)),
                (ElementKind::OpenTag, None),
                (ElementKind::Error, Some(Problem::UnterminatedEntity)),
                (ElementKind::Text, None),
                (ElementKind::Error, Some(Problem::UnterminatedComment)),
            ]
        );
        assert_eq!(elements[0].image(source), "<div ");
    }

    #[test]
    fn test_missing_tag_name() {
        let input = TokenSequence::lex("<></>");
        let elements: Vec<Element> = ElementsParser::new(&input).collect();
        assert_eq!(elements.len(), 2);
        assert!(elements
            .iter()
            .all(|e| e.problem() == Some(Problem::MissingTagName)));
        assert_eq!(elements[1].span(), Some(Span::new(2, 5)));
    }

    #[test]
    fn test_elements_are_contiguous() {
        let source = "<ul><li>one<li>two</ul>\n<script>x<y</script>";
        let input = TokenSequence::lex(source);
        let mut expected = 0;
        for element in ElementsParser::new(&input) {
            let span = element.span().unwrap();
            assert_eq!(span.start, expected);
            expected = span.end;
        }
        assert_eq!(expected, source.len());
    }
}
