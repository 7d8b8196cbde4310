//! Go declaration classifier using Tree-sitter.

use mainseq_core::{DeclarationCounts, SourceClassifier, SourceError};
use std::path::Path;
use tree_sitter::{Language, Node};

use crate::syntax;

/// Counts function, interface and struct declarations in Go source.
///
/// - `func` and method declarations are concretions.
/// - Named interface types are abstractions.
/// - Named struct types are abstractions as well. Telling whether a struct
///   implements an interface would need type checking, so every struct is
///   counted towards abstractness; implementations in the same package even
///   the ratio out through their methods.
///
/// Declarations nested in function bodies are counted too. Function literals
/// and anonymous `struct{}` / `interface{}` types are not declarations.
pub struct GoClassifier {
    language: Language,
}

impl GoClassifier {
    /// Creates a new Go classifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: syntax::language(),
        }
    }

    fn count(root: &Node<'_>) -> DeclarationCounts {
        let mut counts = DeclarationCounts::default();
        let mut stack = vec![*root];

        while let Some(node) = stack.pop() {
            match node.kind() {
                "function_declaration" | "method_declaration" => counts.concretions += 1,
                "type_spec" | "type_alias" => {
                    let shape = node.child_by_field_name("type").map(|t| t.kind());
                    if matches!(shape, Some("interface_type" | "struct_type")) {
                        counts.abstractions += 1;
                    }
                }
                _ => {}
            }
            stack.extend(syntax::children(&node));
        }

        counts
    }

    fn has_package_clause(root: &Node<'_>) -> bool {
        syntax::children(root)
            .iter()
            .any(|n| n.kind() == "package_clause")
    }
}

impl Default for GoClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceClassifier for GoClassifier {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".go"]
    }

    fn classify(&self, path: &Path, source: &[u8]) -> Result<DeclarationCounts, SourceError> {
        if let Err(e) = std::str::from_utf8(source) {
            let offset = e.valid_up_to();
            let (line, column) = syntax::line_column(source, offset);
            return Err(SourceError::parse(
                path,
                source,
                offset,
                e.error_len().unwrap_or(1),
                line,
                column,
                "illegal UTF-8 encoding",
            ));
        }

        let tree = syntax::parse(&self.language, source)
            .map_err(|message| SourceError::Language { message })?;
        let root = tree.root_node();

        if let Some(err) = syntax::first_error(&root) {
            let pos = err.start_position();
            let message = if err.is_missing() {
                format!("syntax error: missing {}", err.kind())
            } else {
                "syntax error: unexpected input".to_string()
            };
            return Err(SourceError::parse(
                path,
                source,
                err.start_byte(),
                err.end_byte() - err.start_byte(),
                pos.row + 1,
                pos.column + 1,
                message,
            ));
        }

        if !Self::has_package_clause(&root) {
            return Err(SourceError::parse(
                path,
                source,
                0,
                0,
                1,
                1,
                "expected 'package' clause",
            ));
        }

        Ok(Self::count(&root))
    }
}
