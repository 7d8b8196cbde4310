//! Package discovery for a Go module.
//!
//! Every directory under the module root holding Go files that build for
//! the target is a package. Test files, files named `_*` or `.*` and files
//! excluded by build constraints are left out, as `go list` does. A
//! package's full name is the module path joined with the directory
//! relative to the root, its imports are the deduplicated union of the
//! imports of its files.

use mainseq_core::{Package, PackageSet, SourceClassifier};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::build::BuildTarget;
use crate::classifier::GoClassifier;
use crate::header::{merge_imports, FileHeader, HeaderExtractor};
use crate::module::{self, GO_MOD};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["vendor", "testdata"];

/// Options for [`discover`].
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Glob patterns, relative to the module root, of files or directories
    /// to leave out.
    pub exclude: Vec<String>,
    /// Target that build constraints are evaluated for; the host by default.
    pub target: BuildTarget,
}

impl DiscoveryOptions {
    /// Adds an exclude pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Selects files for another target than the host.
    #[must_use]
    pub fn target(mut self, target: BuildTarget) -> Self {
        self.target = target;
        self
    }
}

/// Errors when discovering packages.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// No `go.mod` at the root.
    #[error("no go.mod found in {root}")]
    MissingModule {
        /// Directory that was searched.
        root: PathBuf,
    },
    /// `go.mod` has no usable `module` directive.
    #[error("{path}: no module directive")]
    InvalidModule {
        /// Path of the `go.mod`.
        path: PathBuf,
    },
    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// Directory traversal failed.
    #[error("walk failed: {0}")]
    Walk(#[from] ignore::Error),
    /// An exclude pattern is not a valid glob.
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Discovers the packages of the Go module rooted at `root`.
///
/// Packages are returned sorted by full name.
///
/// # Errors
///
/// Returns an error if `root` holds no valid `go.mod`, if a source file
/// cannot be read, or if traversal fails.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<PackageSet, DiscoveryError> {
    let module_path = read_module_path(root)?;
    info!("Discovering packages of {} in {}", module_path, root.display());

    let excludes = options
        .exclude
        .iter()
        .map(|p| glob::Pattern::new(p))
        .collect::<Result<Vec<_>, _>>()?;

    let classifier = GoClassifier::new();
    let files_by_dir = collect_go_files(root, &excludes, classifier.extensions(), &options.target)?;
    let extractor = HeaderExtractor::new();

    let mut packages = Vec::new();
    for (dir, candidates) in files_by_dir {
        let mut files = Vec::with_capacity(candidates.len());
        let mut headers = Vec::with_capacity(candidates.len());
        for file in candidates {
            let path = dir.join(&file);
            let source = std::fs::read(&path).map_err(|e| DiscoveryError::Io {
                path: path.clone(),
                source: e,
            })?;
            if !options.target.matches_source(&source) {
                debug!("Build constraints exclude: {}", path.display());
                continue;
            }
            headers.push(extractor.extract(&source));
            files.push(file);
        }
        if files.is_empty() {
            continue;
        }

        let rel = dir.strip_prefix(root).unwrap_or(&dir);
        let full_name = full_name(&module_path, rel);
        let name = package_name(&headers, rel, &module_path);
        let imports = merge_imports(&headers);

        debug!(
            "Package {} ({} file(s), {} import(s))",
            full_name,
            files.len(),
            imports.len()
        );
        packages.push(Package::new(name, full_name, imports, dir, files));
    }

    packages.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    info!("Found {} package(s)", packages.len());

    Ok(packages.into_iter().collect())
}

fn read_module_path(root: &Path) -> Result<String, DiscoveryError> {
    let path = root.join(GO_MOD);
    if !path.is_file() {
        return Err(DiscoveryError::MissingModule {
            root: root.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(&path).map_err(|e| DiscoveryError::Io {
        path: path.clone(),
        source: e,
    })?;
    module::module_path(&content).ok_or(DiscoveryError::InvalidModule { path })
}

/// Groups candidate source files by directory; file names are sorted.
fn collect_go_files(
    root: &Path,
    excludes: &[glob::Pattern],
    extensions: &[&str],
    target: &BuildTarget,
) -> Result<BTreeMap<PathBuf, Vec<String>>, DiscoveryError> {
    let walk_root = root.to_path_buf();
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .filter_entry(move |entry| keep_dir(&walk_root, entry));

    let mut by_dir: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_package_source(file_name, extensions) || !target.matches_file_name(file_name) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if excludes.iter().any(|p| p.matches_path(rel)) {
            debug!("Excluding: {}", rel.display());
            continue;
        }

        if let Some(dir) = path.parent() {
            by_dir
                .entry(dir.to_path_buf())
                .or_default()
                .push(file_name.to_owned());
        }
    }

    for files in by_dir.values_mut() {
        files.sort();
    }
    Ok(by_dir)
}

/// Decides whether the walk descends into a directory.
fn keep_dir(root: &Path, entry: &ignore::DirEntry) -> bool {
    if !entry.file_type().is_some_and(|t| t.is_dir()) || entry.path() == root {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('_') || SKIPPED_DIRS.contains(&name.as_ref()) {
        return false;
    }
    // Nested modules are analysed on their own.
    !module::is_module_root(entry.path())
}

fn is_package_source(file_name: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| file_name.ends_with(ext))
        && !file_name.ends_with("_test.go")
        && !file_name.starts_with(|c: char| c == '_' || c == '.')
}

fn full_name(module_path: &str, rel: &Path) -> String {
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if rel.is_empty() {
        module_path.to_string()
    } else {
        format!("{module_path}/{rel}")
    }
}

fn package_name(headers: &[FileHeader], rel: &Path, module_path: &str) -> String {
    headers
        .iter()
        .find_map(|h| h.package.clone())
        .or_else(|| rel.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| {
            module_path
                .rsplit('/')
                .next()
                .unwrap_or(module_path)
                .to_string()
        })
}
