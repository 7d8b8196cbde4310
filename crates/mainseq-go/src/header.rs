//! Package clause and import extraction for discovery.
//!
//! Extraction is tolerant: a file with syntax errors still yields whatever
//! clause and imports the parser recovered. Reporting the error is left to
//! the scanner.

use std::collections::BTreeSet;
use tree_sitter::{Language, Node};

use crate::syntax;

/// What discovery needs from one Go file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHeader {
    /// Name from the `package` clause, if present.
    pub package: Option<String>,
    /// Import paths, in source order.
    pub imports: Vec<String>,
}

/// Reads package clauses and imports from Go sources.
pub struct HeaderExtractor {
    language: Language,
}

impl HeaderExtractor {
    /// Creates a new extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: syntax::language(),
        }
    }

    /// Extracts the header of one file.
    #[must_use]
    pub fn extract(&self, source: &[u8]) -> FileHeader {
        let Ok(tree) = syntax::parse(&self.language, source) else {
            return FileHeader::default();
        };
        let root = tree.root_node();

        let mut header = FileHeader::default();
        for node in syntax::children(&root) {
            match node.kind() {
                "package_clause" => {
                    if header.package.is_none() {
                        header.package = Self::package_name(&node, source);
                    }
                }
                "import_declaration" => Self::collect_imports(&node, source, &mut header.imports),
                _ => {}
            }
        }
        header
    }

    fn package_name(node: &Node<'_>, src: &[u8]) -> Option<String> {
        syntax::children(node)
            .iter()
            .find(|c| c.kind() == "package_identifier")
            .map(|c| syntax::text(c, src).to_owned())
    }

    fn collect_imports(node: &Node<'_>, src: &[u8], out: &mut Vec<String>) {
        let mut stack = vec![*node];
        let mut specs = Vec::new();
        while let Some(n) = stack.pop() {
            if n.kind() == "import_spec" {
                specs.push(n);
                continue;
            }
            stack.extend(syntax::children(&n));
        }
        specs.sort_by_key(Node::start_byte);

        for spec in specs {
            if let Some(path) = spec.child_by_field_name("path") {
                let path = syntax::unquote(syntax::text(&path, src));
                if !path.is_empty() {
                    out.push(path.to_owned());
                }
            }
        }
    }
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted, deduplicated union of the imports of several files.
#[must_use]
pub fn merge_imports<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a FileHeader>,
{
    headers
        .into_iter()
        .flat_map(|h| h.imports.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
