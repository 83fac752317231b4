//! Elixir Term Conversion Utilities
//!
//! Converts elements, tree nodes and cache metadata to Elixir terms.

use crate::cache::BlockInfo;
use crate::elements::{Element, ElementKind, Problem};
use crate::tree::{ElementTree, NodeId, TreeProblem};
use rustler::{Atom, Encoder, Env, NewBinary, NifResult, Term};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    invalid_start_position,
    root,
    attribute,
    comment,
    declaration,
    text,
    entity_reference,
    open_tag,
    close_tag,
    unterminated_tag,
    missing_tag_name,
    unterminated_comment,
    unterminated_declaration,
    unterminated_entity,
    unexpected_token,
    unmatched_close_tag,
    unclosed_tag,
    start_index,
    end_index,
    start_offset,
    end_offset,
    first_token_index,
    last_token_index,
    reads,
    resident,
}

pub fn kind_atom(kind: ElementKind) -> Atom {
    match kind {
        ElementKind::Root => root(),
        ElementKind::Attribute => attribute(),
        ElementKind::Comment => comment(),
        ElementKind::Declaration => declaration(),
        ElementKind::Text => text(),
        ElementKind::EntityReference => entity_reference(),
        ElementKind::Error => error(),
        ElementKind::OpenTag => open_tag(),
        ElementKind::CloseTag => close_tag(),
    }
}

pub fn problem_atom(problem: Problem) -> Atom {
    match problem {
        Problem::UnterminatedTag => unterminated_tag(),
        Problem::MissingTagName => missing_tag_name(),
        Problem::UnterminatedComment => unterminated_comment(),
        Problem::UnterminatedDeclaration => unterminated_declaration(),
        Problem::UnterminatedEntity => unterminated_entity(),
        Problem::UnexpectedToken => unexpected_token(),
    }
}

/// Convert an element to `{kind, {from, to} | nil, name | nil, attributes, problem | nil}`.
///
/// Attributes are `{name, value | nil}` pairs with quotes stripped.
pub fn element_to_term<'a>(env: Env<'a>, element: &Element, source: &str) -> Term<'a> {
    let span = element.span().map(|s| (s.start, s.end));
    let name = match element.name() {
        Some(name) => str_to_binary(env, name),
        None => rustler::types::atom::nil().encode(env),
    };

    // Build in reverse order
    let mut attrs = Term::list_new_empty(env);
    for attr in element.attributes().iter().rev() {
        let value = match attr.unquoted_value(source) {
            Some(v) => str_to_binary(env, v),
            None => rustler::types::atom::nil().encode(env),
        };
        let pair = (str_to_binary(env, attr.name(source)), value);
        attrs = attrs.list_prepend(pair.encode(env));
    }

    let problem = element.problem().map(problem_atom);
    (kind_atom(element.kind()), span, name, attrs, problem).encode(env)
}

/// Convert a sequence of elements to a list term
pub fn elements_to_term<'a, I>(env: Env<'a>, elements: I, source: &str) -> Term<'a>
where
    I: IntoIterator<Item = Element>,
{
    let terms: Vec<Term<'a>> = elements
        .into_iter()
        .map(|e| element_to_term(env, &e, source))
        .collect();
    terms.encode(env)
}

/// Convert a node to `{element, parent | nil, children, semantic_end | nil}`
pub fn node_to_term<'a>(env: Env<'a>, tree: &ElementTree, id: NodeId) -> Term<'a> {
    let Some(node) = tree.node(id) else {
        return rustler::types::atom::nil().encode(env);
    };
    let element = element_to_term(env, &node.element, tree.source());
    (element, node.parent, node.children.clone(), node.semantic_end()).encode(env)
}

/// Convert build problems to `[{reason, node_id}]`
pub fn problems_to_term<'a>(env: Env<'a>, problems: &[TreeProblem]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for problem in problems.iter().rev() {
        let reason = match problem {
            TreeProblem::UnmatchedCloseTag(_) => unmatched_close_tag(),
            TreeProblem::UnclosedTag(_) => unclosed_tag(),
        };
        list = list.list_prepend((reason, problem.node()).encode(env));
    }
    list
}

/// Convert block metadata to a map
pub fn block_info_to_term<'a>(env: Env<'a>, info: &BlockInfo) -> NifResult<Term<'a>> {
    Term::map_new(env)
        .map_put(start_index(), info.start_index)?
        .map_put(end_index(), info.end_index)?
        .map_put(start_offset(), info.start_offset)?
        .map_put(end_offset(), info.end_offset)?
        .map_put(first_token_index(), info.first_token_index)?
        .map_put(last_token_index(), info.last_token_index)?
        .map_put(reads(), info.reads)?
        .map_put(resident(), info.resident)
}

/// `{:error, {:invalid_start_position, position}}`
pub fn invalid_start_to_term(env: Env<'_>, position: i64) -> Term<'_> {
    (error(), (invalid_start_position(), position)).encode(env)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
