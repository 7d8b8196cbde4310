//! Shared tree-sitter helpers for Go sources.

use tree_sitter::{Language, Node, Parser, Tree};

/// The tree-sitter Go grammar.
#[must_use]
pub fn language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

/// Parses `source` with a fresh parser.
///
/// Fails if the grammar cannot be loaded or parsing is aborted.
pub(crate) fn parse(language: &Language, source: &[u8]) -> Result<Tree, String> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|e| format!("failed to set go language: {e}"))?;
    parser
        .parse(source, None)
        .ok_or_else(|| "parser returned no tree".to_string())
}

pub(crate) fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
    std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
}

/// Children of `node`, collected so callers can keep them past the cursor.
pub(crate) fn children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// First ERROR or MISSING node in document order.
pub(crate) fn first_error<'t>(root: &Node<'t>) -> Option<Node<'t>> {
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            stack.extend(children(&node).into_iter().rev());
        }
    }
    Some(*root)
}

/// 1-indexed line and byte column of `offset`.
pub(crate) fn line_column(source: &[u8], offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    (line, before.len() - line_start + 1)
}

/// Strips the quotes of an interpreted or raw string literal.
pub(crate) fn unquote(literal: &str) -> &str {
    literal.trim_matches(|c| c == '"' || c == '`')
}
