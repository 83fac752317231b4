//! Element types
//!
//! An `Element` is one syntactic unit of markup: a tag, a run of text, a
//! comment, a declaration, an entity reference or an error. Elements only
//! reference the source through spans; the text is sliced on demand.

use crate::core::span::Span;

/// Kind of a source element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Synthetic tree root
    Root,
    /// Attribute of an open tag
    Attribute,
    Comment,
    Declaration,
    Text,
    EntityReference,
    /// Malformed markup, see `Element::problem`
    Error,
    OpenTag,
    CloseTag,
}

impl ElementKind {
    /// Stable lowercase name, used for ids of non-tag elements and for
    /// host-runtime atoms
    pub const fn as_str(self) -> &'static str {
        match self {
            ElementKind::Root => "root",
            ElementKind::Attribute => "attribute",
            ElementKind::Comment => "comment",
            ElementKind::Declaration => "declaration",
            ElementKind::Text => "text",
            ElementKind::EntityReference => "entity_reference",
            ElementKind::Error => "error",
            ElementKind::OpenTag => "open_tag",
            ElementKind::CloseTag => "close_tag",
        }
    }

    /// Whether elements of this kind are named tags
    #[inline]
    pub const fn is_tag(self) -> bool {
        matches!(self, ElementKind::OpenTag | ElementKind::CloseTag)
    }
}

/// Why an `Error` element was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Problem {
    /// Tag not closed by `>` before the next construct or end of input
    UnterminatedTag,
    /// `<>` or `</>`
    MissingTagName,
    /// `<!--` without `-->`
    UnterminatedComment,
    /// `<!` or `<?` without `>`
    UnterminatedDeclaration,
    /// `&name` without `;`
    UnterminatedEntity,
    /// Tag-interior token found outside of a tag
    UnexpectedToken,
}

impl Problem {
    pub const fn message(self) -> &'static str {
        match self {
            Problem::UnterminatedTag => "unterminated tag",
            Problem::MissingTagName => "missing tag name",
            Problem::UnterminatedComment => "unterminated comment",
            Problem::UnterminatedDeclaration => "unterminated declaration",
            Problem::UnterminatedEntity => "unterminated entity reference",
            Problem::UnexpectedToken => "unexpected token",
        }
    }
}

/// An attribute of an open tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name span
    pub name: Span,
    /// Value span including quotes, `None` for bare attributes
    pub value: Option<Span>,
}

impl Attribute {
    #[inline]
    pub fn name<'a>(&self, source: &'a str) -> &'a str {
        self.name.slice(source)
    }

    /// Raw value, quotes included
    #[inline]
    pub fn value<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.value.map(|v| v.slice(source))
    }

    /// Value with surrounding quotes removed
    pub fn unquoted_value<'a>(&self, source: &'a str) -> Option<&'a str> {
        let raw = self.value(source)?;
        let bytes = raw.as_bytes();
        match bytes.first() {
            Some(&q @ (b'"' | b'\'')) => {
                let inner = &raw[1..];
                Some(inner.strip_suffix(q as char).unwrap_or(inner))
            }
            _ => Some(raw),
        }
    }

    /// Span of the whole attribute, value included
    #[inline]
    pub fn span(&self) -> Span {
        match self.value {
            Some(value) => self.name.union(value),
            None => self.name,
        }
    }
}

/// One lexical/syntactic unit of the source.
///
/// Immutable once produced. Virtual elements have no span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    kind: ElementKind,
    span: Option<Span>,
    name: Option<Box<str>>,
    attributes: Box<[Attribute]>,
    self_closing: bool,
    problem: Option<Problem>,
}

impl Element {
    /// Element of a kind without name or attributes
    pub fn leaf(kind: ElementKind, span: Span) -> Self {
        Element {
            kind,
            span: Some(span),
            name: None,
            attributes: Box::default(),
            self_closing: false,
            problem: None,
        }
    }

    pub fn open_tag(span: Span, name: &str, attributes: Vec<Attribute>, self_closing: bool) -> Self {
        Element {
            kind: ElementKind::OpenTag,
            span: Some(span),
            name: Some(name.into()),
            attributes: attributes.into_boxed_slice(),
            self_closing,
            problem: None,
        }
    }

    pub fn close_tag(span: Span, name: &str) -> Self {
        Element {
            kind: ElementKind::CloseTag,
            span: Some(span),
            name: Some(name.into()),
            attributes: Box::default(),
            self_closing: false,
            problem: None,
        }
    }

    pub fn error(span: Span, problem: Problem) -> Self {
        Element {
            problem: Some(problem),
            ..Element::leaf(ElementKind::Error, span)
        }
    }

    /// Open tag with no physical text, inserted by the tree builder
    pub fn virtual_open_tag(name: &str) -> Self {
        Element {
            kind: ElementKind::OpenTag,
            span: None,
            name: Some(name.into()),
            attributes: Box::default(),
            self_closing: false,
            problem: None,
        }
    }

    /// The synthetic root covering `len` bytes of source
    pub fn root(len: usize) -> Self {
        Element::leaf(ElementKind::Root, Span::new(0, len))
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Physical range, `None` for virtual elements
    #[inline]
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Start offset, `None` for virtual elements
    #[inline]
    pub fn from(&self) -> Option<usize> {
        self.span.map(|s| s.start)
    }

    /// End offset, `None` for virtual elements
    #[inline]
    pub fn to(&self) -> Option<usize> {
        self.span.map(|s| s.end)
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.span.is_none()
    }

    /// Raw text covered by the element, empty for virtual elements
    #[inline]
    pub fn image<'a>(&self, source: &'a str) -> &'a str {
        self.span.map_or("", |s| s.slice(source))
    }

    /// Tag name as written in the source
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Identifier used by tree paths: the tag name for tags, the kind
    /// name otherwise
    #[inline]
    pub fn id(&self) -> &str {
        self.name().unwrap_or(self.kind.as_str())
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute by name, ASCII case-insensitively
    pub fn attribute<'e>(&'e self, name: &str, source: &str) -> Option<&'e Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name(source).eq_ignore_ascii_case(name))
    }

    /// Open tag written as `<name/>`
    #[inline]
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Problem of an `Error` element
    #[inline]
    pub fn problem(&self) -> Option<Problem> {
        self.problem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_tag_accessors() {
        let source = "<a href='x' hidden>";
        let attrs = vec![
            Attribute {
                name: Span::new(3, 7),
                value: Some(Span::new(8, 11)),
            },
            Attribute {
                name: Span::new(12, 18),
                value: None,
            },
        ];
        let element = Element::open_tag(Span::new(0, 19), "a", attrs, false);
        assert_eq!(element.kind(), ElementKind::OpenTag);
        assert_eq!(element.id(), "a");
        assert_eq!(element.image(source), source);
        let href = element.attribute("HREF", source).unwrap();
        assert_eq!(href.value(source), Some("'x'"));
        assert_eq!(href.unquoted_value(source), Some("x"));
        assert_eq!(href.span(), Span::new(3, 11));
        assert_eq!(element.attribute("hidden", source).unwrap().value(source), None);
    }

    #[test]
    fn test_virtual_element() {
        let element = Element::virtual_open_tag("tbody");
        assert!(element.is_virtual());
        assert_eq!(element.from(), None);
        assert_eq!(element.image("anything"), "");
    }

    #[test]
    fn test_leaf_ids() {
        let text = Element::leaf(ElementKind::Text, Span::new(0, 2));
        assert_eq!(text.id(), "text");
        let error = Element::error(Span::new(0, 1), Problem::UnterminatedTag);
        assert_eq!(error.problem().map(Problem::message), Some("unterminated tag"));
    }
}
