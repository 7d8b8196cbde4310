//! Build constraints: which files of a directory belong to the package.
//!
//! A file is left out when its name carries a `_GOOS`, `_GOARCH` or
//! `_GOOS_GOARCH` suffix for another target, or when its `//go:build` line
//! does not hold for the target. `ignore` and any other unknown tag are
//! false, `gc`, `cgo` and every `go1.N` release tag are true.

/// Operating systems Go knows about, as used in file name suffixes.
const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

/// Operating systems satisfying the `unix` tag.
const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Architectures Go knows about, as used in file name suffixes.
const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

/// Target the package files are selected for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Go name of the operating system (`linux`, `darwin`, ...).
    pub goos: String,
    /// Go name of the architecture (`amd64`, `arm64`, ...).
    pub goarch: String,
}

impl BuildTarget {
    /// Creates a target from Go names.
    #[must_use]
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    /// The machine mainseq runs on, like `go list` without `GOOS`/`GOARCH`.
    #[must_use]
    pub fn host() -> Self {
        let goos = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let goarch = match std::env::consts::ARCH {
            "x86" => "386",
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "loongarch64" => "loong64",
            "powerpc" => "ppc",
            "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
            "powerpc64" => "ppc64",
            "mips" if cfg!(target_endian = "little") => "mipsle",
            "mips64" if cfg!(target_endian = "little") => "mips64le",
            "wasm32" => "wasm",
            other => other,
        };
        Self::new(goos, goarch)
    }

    /// Whether a single build tag holds.
    #[must_use]
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch {
            return true;
        }
        match tag {
            "gc" | "cgo" => true,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            _ => is_release_tag(tag),
        }
    }

    /// Whether the `_GOOS` / `_GOARCH` suffixes of a file name allow it.
    #[must_use]
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let stem = stem.strip_suffix("_test").unwrap_or(stem);
        // The part before the first underscore never constrains.
        let Some((_, rest)) = stem.split_once('_') else {
            return true;
        };
        let parts: Vec<&str> = rest.split('_').collect();

        match parts.as_slice() {
            [.., os, arch] if KNOWN_OS.contains(os) && KNOWN_ARCH.contains(arch) => {
                self.matches_tag(os) && self.matches_tag(arch)
            }
            [.., last] if KNOWN_OS.contains(last) || KNOWN_ARCH.contains(last) => {
                self.matches_tag(last)
            }
            _ => true,
        }
    }

    /// Whether the `//go:build` line of `source`, if any, holds.
    ///
    /// A line that does not parse keeps the file; the scanner reports the
    /// file if it is not valid Go.
    #[must_use]
    pub fn matches_source(&self, source: &[u8]) -> bool {
        let Some(expr) = build_line(source) else {
            return true;
        };
        match Expr::parse(&expr) {
            Some(parsed) => parsed.eval(&|tag| self.matches_tag(tag)),
            None => {
                tracing::debug!("Unparsable //go:build line: {}", expr);
                true
            }
        }
    }
}

impl Default for BuildTarget {
    fn default() -> Self {
        Self::host()
    }
}

/// `go1.N` tags of released versions.
fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

/// The expression of the first `//go:build` line in the file header, i.e.
/// among the comments and blank lines before the package clause.
fn build_line(source: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(source);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let mut in_block = false;

    for line in text.lines() {
        let line = line.trim();
        if in_block {
            in_block = !line.contains("*/");
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(expr) = line.strip_prefix("//go:build") {
            if expr.is_empty() || expr.starts_with(char::is_whitespace) {
                return Some(expr.trim().to_string());
            }
            continue;
        }
        if line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            in_block = !line.contains("*/");
            continue;
        }
        break;
    }
    None
}

/// A parsed `//go:build` expression.
#[derive(Debug, PartialEq, Eq)]
enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn parse(input: &str) -> Option<Self> {
        let tokens = tokenize(input)?;
        let mut parser = ExprParser { tokens, pos: 0 };
        let expr = parser.or()?;
        (parser.pos == parser.tokens.len()).then_some(expr)
    }

    fn eval(&self, tag: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Self::Tag(name) => tag(name),
            Self::Not(inner) => !inner.eval(tag),
            Self::And(a, b) => a.eval(tag) && b.eval(tag),
            Self::Or(a, b) => a.eval(tag) || b.eval(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '!' => tokens.push(Token::Not),
            '&' if chars.next_if_eq(&'&').is_some() => tokens.push(Token::And),
            '|' if chars.next_if_eq(&'|').is_some() => tokens.push(Token::Or),
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut tag = String::from(c);
                while let Some(next) =
                    chars.next_if(|n| n.is_alphanumeric() || *n == '_' || *n == '.')
                {
                    tag.push(next);
                }
                tokens.push(Token::Tag(tag));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn next_if(&mut self, token: &Token) -> bool {
        if self.tokens.get(self.pos) == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Option<Expr> {
        let mut left = self.and()?;
        while self.next_if(&Token::Or) {
            left = Expr::Or(Box::new(left), Box::new(self.and()?));
        }
        Some(left)
    }

    fn and(&mut self) -> Option<Expr> {
        let mut left = self.not()?;
        while self.next_if(&Token::And) {
            left = Expr::And(Box::new(left), Box::new(self.not()?));
        }
        Some(left)
    }

    fn not(&mut self) -> Option<Expr> {
        if self.next_if(&Token::Not) {
            return Some(Expr::Not(Box::new(self.not()?)));
        }
        if self.next_if(&Token::Open) {
            let inner = self.or()?;
            return self.next_if(&Token::Close).then_some(inner);
        }
        match self.tokens.get(self.pos)? {
            Token::Tag(name) => {
                let name = name.clone();
                self.pos += 1;
                Some(Expr::Tag(name))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux() -> BuildTarget {
        BuildTarget::new("linux", "amd64")
    }

    #[test]
    fn file_name_suffixes() {
        let t = linux();
        assert!(t.matches_file_name("a.go"));
        assert!(t.matches_file_name("linux.go"));
        assert!(t.matches_file_name("x_linux.go"));
        assert!(t.matches_file_name("x_amd64.go"));
        assert!(t.matches_file_name("x_linux_amd64.go"));
        assert!(t.matches_file_name("x_helper.go"));
        assert!(!t.matches_file_name("x_windows.go"));
        assert!(!t.matches_file_name("x_arm64.go"));
        assert!(!t.matches_file_name("x_linux_arm64.go"));
        assert!(!t.matches_file_name("x_darwin_amd64.go"));
        assert!(!t.matches_file_name("x_windows_test.go"));
    }

    #[test]
    fn tag_aliases() {
        let android = BuildTarget::new("android", "arm64");
        assert!(android.matches_tag("linux"));
        assert!(android.matches_tag("unix"));
        assert!(!BuildTarget::new("windows", "amd64").matches_tag("unix"));
        assert!(BuildTarget::new("ios", "arm64").matches_tag("darwin"));
        assert!(linux().matches_tag("go1.21"));
        assert!(!linux().matches_tag("go1."));
        assert!(!linux().matches_tag("ignore"));
    }

    #[test]
    fn build_lines() {
        let t = linux();
        assert!(!t.matches_source(b"//go:build ignore\n\npackage main\n"));
        assert!(!t.matches_source(b"// Code generated.\n\n//go:build windows\n\npackage a\n"));
        assert!(t.matches_source(b"//go:build linux && amd64\n\npackage a\n"));
        assert!(t.matches_source(b"//go:build !windows\n\npackage a\n"));
        assert!(t.matches_source(b"//go:build (darwin || linux) && !386\n\npackage a\n"));
        assert!(!t.matches_source(b"//go:build darwin || (linux && arm64)\n\npackage a\n"));
        assert!(t.matches_source(b"/* header\n*/\n//go:build unix\npackage a\n"));
    }

    #[test]
    fn build_line_after_package_clause_is_ignored() {
        assert!(linux().matches_source(b"package a\n\n//go:build ignore\n"));
    }

    #[test]
    fn unparsable_line_keeps_the_file() {
        assert!(linux().matches_source(b"//go:build linux &&\n\npackage a\n"));
        assert!(linux().matches_source(b"//go:build (linux\n\npackage a\n"));
    }

    #[test]
    fn lookalike_directive_is_not_a_constraint() {
        assert!(linux().matches_source(b"//go:buildx ignore\n\npackage a\n"));
    }

    #[test]
    fn host_uses_go_names() {
        let host = BuildTarget::host();
        assert_ne!(host.goos, "macos");
        assert_ne!(host.goarch, "x86_64");
        assert_ne!(host.goarch, "aarch64");
    }
}
