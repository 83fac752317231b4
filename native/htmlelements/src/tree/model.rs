//! Tag model
//!
//! Per-tag knowledge the tree builder and the completion queries consult:
//! which tags are void, which may omit their end or open tag, and which
//! children a tag accepts. The builder works against any model, including
//! one that knows nothing.

/// Capability describing tag nesting rules
pub trait TagModel {
    /// Void element: never has content
    fn is_empty(&self, name: &str) -> bool;

    /// End tag may be omitted
    fn has_optional_end_tag(&self, name: &str) -> bool;

    /// Open tag may be omitted
    fn has_optional_open_tag(&self, name: &str) -> bool;

    /// Legal element children, `None` when the tag is unknown
    fn children(&self, name: &str) -> Option<&[&str]>;

    /// Legal children at document level
    fn root_children(&self) -> Option<&[&str]> {
        None
    }
}

/// Model without any knowledge
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTagModel;

impl TagModel for EmptyTagModel {
    fn is_empty(&self, _name: &str) -> bool {
        false
    }

    fn has_optional_end_tag(&self, _name: &str) -> bool {
        false
    }

    fn has_optional_open_tag(&self, _name: &str) -> bool {
        false
    }

    fn children(&self, _name: &str) -> Option<&[&str]> {
        None
    }
}

/// Flags for TagDescriptor
mod tag_flags {
    /// Void element
    pub const EMPTY: u8 = 0x01;
    /// End tag may be omitted
    pub const OPTIONAL_END: u8 = 0x02;
    /// Open tag may be omitted
    pub const OPTIONAL_OPEN: u8 = 0x04;
}

use tag_flags::{EMPTY, OPTIONAL_END, OPTIONAL_OPEN};

struct TagDescriptor {
    name: &'static str,
    flags: u8,
    children: &'static [&'static str],
}

const fn tag(name: &'static str, flags: u8, children: &'static [&'static str]) -> TagDescriptor {
    TagDescriptor {
        name,
        flags,
        children,
    }
}

const NONE: &[&str] = &[];

const PHRASING: &[&str] = &[
    "a", "abbr", "audio", "b", "bdi", "bdo", "br", "button", "canvas", "cite", "code", "data",
    "del", "dfn", "em", "embed", "i", "iframe", "img", "input", "ins", "kbd", "label", "map",
    "mark", "meter", "noscript", "object", "output", "progress", "q", "ruby", "s", "samp",
    "script", "select", "small", "span", "strong", "sub", "sup", "template", "textarea", "time",
    "u", "var", "video", "wbr",
];

const FLOW: &[&str] = &[
    "a", "abbr", "address", "article", "aside", "audio", "b", "bdi", "bdo", "blockquote", "br",
    "button", "canvas", "cite", "code", "data", "del", "details", "dfn", "dialog", "div", "dl",
    "em", "embed", "fieldset", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "i", "iframe", "img", "input", "ins", "kbd", "label", "main", "map", "mark",
    "menu", "meter", "nav", "noscript", "object", "ol", "output", "p", "pre", "progress", "q",
    "ruby", "s", "samp", "script", "section", "select", "small", "span", "strong", "sub", "sup",
    "table", "template", "textarea", "time", "u", "ul", "var", "video", "wbr",
];

const HEAD_CONTENT: &[&str] = &[
    "base", "link", "meta", "noscript", "script", "style", "template", "title",
];

const TABLE_CONTENT: &[&str] = &["caption", "colgroup", "script", "tbody", "template", "tfoot", "thead"];
const TABLE_ROWS: &[&str] = &["script", "template", "tr"];
const TABLE_CELLS: &[&str] = &["script", "td", "template", "th"];
const LIST_ITEMS: &[&str] = &["li", "script", "template"];

const TAGS: &[TagDescriptor] = &[
    tag("html", OPTIONAL_END | OPTIONAL_OPEN, &["body", "head"]),
    tag("head", OPTIONAL_END | OPTIONAL_OPEN, HEAD_CONTENT),
    tag("body", OPTIONAL_END | OPTIONAL_OPEN, FLOW),
    tag("title", 0, NONE),
    tag("style", 0, NONE),
    tag("script", 0, NONE),
    tag("textarea", 0, NONE),
    tag("noscript", 0, FLOW),
    tag("template", 0, FLOW),
    // void elements
    tag("area", EMPTY, NONE),
    tag("base", EMPTY, NONE),
    tag("br", EMPTY, NONE),
    tag("col", EMPTY, NONE),
    tag("embed", EMPTY, NONE),
    tag("hr", EMPTY, NONE),
    tag("img", EMPTY, NONE),
    tag("input", EMPTY, NONE),
    tag("link", EMPTY, NONE),
    tag("meta", EMPTY, NONE),
    tag("source", EMPTY, NONE),
    tag("track", EMPTY, NONE),
    tag("wbr", EMPTY, NONE),
    // sectioning and grouping
    tag("address", 0, FLOW),
    tag("article", 0, FLOW),
    tag("aside", 0, FLOW),
    tag("blockquote", 0, FLOW),
    tag("details", 0, FLOW),
    tag("dialog", 0, FLOW),
    tag("div", 0, FLOW),
    tag("fieldset", 0, FLOW),
    tag("figure", 0, FLOW),
    tag("figcaption", 0, FLOW),
    tag("footer", 0, FLOW),
    tag("form", 0, FLOW),
    tag("header", 0, FLOW),
    tag("main", 0, FLOW),
    tag("nav", 0, FLOW),
    tag("section", 0, FLOW),
    tag("legend", 0, PHRASING),
    tag("summary", 0, PHRASING),
    tag("h1", 0, PHRASING),
    tag("h2", 0, PHRASING),
    tag("h3", 0, PHRASING),
    tag("h4", 0, PHRASING),
    tag("h5", 0, PHRASING),
    tag("h6", 0, PHRASING),
    tag("p", OPTIONAL_END, PHRASING),
    tag("pre", 0, PHRASING),
    // lists
    tag("ul", 0, LIST_ITEMS),
    tag("ol", 0, LIST_ITEMS),
    tag("menu", 0, LIST_ITEMS),
    tag("li", OPTIONAL_END, FLOW),
    tag("dl", 0, &["dd", "div", "dt", "script", "template"]),
    tag("dt", OPTIONAL_END, PHRASING),
    tag("dd", OPTIONAL_END, FLOW),
    // tables
    tag("table", 0, TABLE_CONTENT),
    tag("caption", OPTIONAL_END, FLOW),
    tag("colgroup", OPTIONAL_END | OPTIONAL_OPEN, &["col", "template"]),
    tag("thead", OPTIONAL_END, TABLE_ROWS),
    tag("tbody", OPTIONAL_END | OPTIONAL_OPEN, TABLE_ROWS),
    tag("tfoot", OPTIONAL_END, TABLE_ROWS),
    tag("tr", OPTIONAL_END, TABLE_CELLS),
    tag("td", OPTIONAL_END, FLOW),
    tag("th", OPTIONAL_END, FLOW),
    // forms
    tag("select", 0, &["optgroup", "option", "script", "template"]),
    tag("optgroup", OPTIONAL_END, &["option", "script", "template"]),
    tag("option", OPTIONAL_END, NONE),
    tag("button", 0, PHRASING),
    tag("label", 0, PHRASING),
    tag("output", 0, PHRASING),
    tag("meter", 0, PHRASING),
    tag("progress", 0, PHRASING),
    // ruby
    tag("ruby", 0, &["b", "em", "i", "rp", "rt", "span", "strong"]),
    tag("rt", OPTIONAL_END, PHRASING),
    tag("rp", OPTIONAL_END, PHRASING),
    // text-level
    tag("a", 0, FLOW),
    tag("abbr", 0, PHRASING),
    tag("b", 0, PHRASING),
    tag("bdi", 0, PHRASING),
    tag("bdo", 0, PHRASING),
    tag("cite", 0, PHRASING),
    tag("code", 0, PHRASING),
    tag("data", 0, PHRASING),
    tag("del", 0, FLOW),
    tag("dfn", 0, PHRASING),
    tag("em", 0, PHRASING),
    tag("i", 0, PHRASING),
    tag("ins", 0, FLOW),
    tag("kbd", 0, PHRASING),
    tag("mark", 0, PHRASING),
    tag("q", 0, PHRASING),
    tag("s", 0, PHRASING),
    tag("samp", 0, PHRASING),
    tag("small", 0, PHRASING),
    tag("span", 0, PHRASING),
    tag("strong", 0, PHRASING),
    tag("sub", 0, PHRASING),
    tag("sup", 0, PHRASING),
    tag("time", 0, PHRASING),
    tag("u", 0, PHRASING),
    tag("var", 0, PHRASING),
    // embedded
    tag("audio", 0, &["source", "track"]),
    tag("video", 0, &["source", "track"]),
    tag("canvas", 0, FLOW),
    tag("iframe", 0, NONE),
    tag("map", 0, &["area"]),
    tag("object", 0, FLOW),
];

/// Built-in model of common HTML5 elements.
///
/// Names are matched ASCII case-insensitively. As in HTML, a void element
/// also counts as having an optional end tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5TagModel;

impl Html5TagModel {
    fn lookup(name: &str) -> Option<&'static TagDescriptor> {
        TAGS.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    fn has_flag(name: &str, flag: u8) -> bool {
        Self::lookup(name).is_some_and(|t| t.flags & flag != 0)
    }
}

impl TagModel for Html5TagModel {
    fn is_empty(&self, name: &str) -> bool {
        Self::has_flag(name, EMPTY)
    }

    fn has_optional_end_tag(&self, name: &str) -> bool {
        Self::has_flag(name, OPTIONAL_END | EMPTY)
    }

    fn has_optional_open_tag(&self, name: &str) -> bool {
        Self::has_flag(name, OPTIONAL_OPEN)
    }

    fn children(&self, name: &str) -> Option<&[&str]> {
        Self::lookup(name).map(|t| t.children)
    }

    fn root_children(&self) -> Option<&[&str]> {
        Some(&["html"])
    }
}

/// Whether `children` contains `name`, ASCII case-insensitively
pub(crate) fn allows(children: &[&str], name: &str) -> bool {
    children.iter().any(|c| c.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements() {
        let model = Html5TagModel;
        assert!(model.is_empty("br"));
        assert!(model.is_empty("IMG"));
        assert!(model.has_optional_end_tag("br"));
        assert!(!model.is_empty("div"));
    }

    #[test]
    fn test_optional_tags() {
        let model = Html5TagModel;
        assert!(model.has_optional_end_tag("li"));
        assert!(model.has_optional_end_tag("p"));
        assert!(!model.has_optional_end_tag("div"));
        assert!(model.has_optional_open_tag("tbody"));
        assert!(!model.has_optional_open_tag("thead"));
    }

    #[test]
    fn test_children() {
        let model = Html5TagModel;
        let p = model.children("p").unwrap();
        assert!(allows(p, "span"));
        assert!(!allows(p, "div"));
        assert!(!allows(p, "p"));
        assert!(!allows(model.children("li").unwrap(), "li"));
        assert!(model.children("blink").is_none());
        assert!(Html5TagModel::lookup("blink").is_none());
    }

    #[test]
    fn test_empty_model_knows_nothing() {
        let model = EmptyTagModel;
        assert!(!model.is_empty("br"));
        assert!(model.children("div").is_none());
        assert!(model.root_children().is_none());
    }

    #[test]
    fn test_table_lists_are_known_tags() {
        for t in TAGS {
            for child in t.children {
                assert!(Html5TagModel::lookup(child).is_some(), "{} -> {child}", t.name);
            }
        }
    }
}
