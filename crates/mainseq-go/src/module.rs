//! `go.mod` handling.

use std::path::Path;

/// File name of a Go module definition.
pub const GO_MOD: &str = "go.mod";

/// Extracts the module path from `go.mod` content.
///
/// Accepts `module example.com/m`, quoted paths, trailing `//` comments and
/// the parenthesized form.
#[must_use]
pub fn module_path(content: &str) -> Option<String> {
    let mut lines = content
        .lines()
        .map(|l| l.split("//").next().unwrap_or("").trim());

    while let Some(line) = lines.next() {
        let Some(rest) = line.strip_prefix("module") else {
            continue;
        };
        if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
            continue;
        }
        let rest = rest.trim();
        let value = if rest == "(" {
            lines.find(|l| !l.is_empty())?
        } else {
            rest.trim_start_matches('(').trim_end_matches(')').trim()
        };
        let value = value.trim_matches(|c| c == '"' || c == '`');
        return (!value.is_empty()).then(|| value.to_string());
    }
    None
}

/// Returns `true` if `dir` holds its own `go.mod`.
#[must_use]
pub fn is_module_root(dir: &Path) -> bool {
    dir.join(GO_MOD).is_file()
}
