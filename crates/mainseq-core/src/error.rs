//! Errors raised while scanning package sources.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// A failure scanning a single source file.
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(mainseq::read))]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed.
    #[error("{path}:{line}:{column}: {message}")]
    #[diagnostic(code(mainseq::parse), help("fix the syntax error before running the analysis"))]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Line of the first syntax error (1-indexed).
        line: usize,
        /// Column of the first syntax error (1-indexed).
        column: usize,
        /// Description of the error.
        message: String,
        /// Source text, for rendering.
        #[source_code]
        src: NamedSource<String>,
        /// Span of the offending node.
        #[label("here")]
        span: SourceSpan,
    },

    /// The parser could not be set up for the language.
    #[error("language setup failed: {message}")]
    #[diagnostic(code(mainseq::language))]
    Language {
        /// Description of the error.
        message: String,
    },

    /// The scan task for the file did not complete.
    #[error("scan of {path} did not complete: {message}")]
    #[diagnostic(code(mainseq::task))]
    Task {
        /// File whose task failed.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
}

impl SourceError {
    /// Builds a parse error pointing at `offset..offset + length` in `source`.
    #[must_use]
    pub fn parse(
        path: impl Into<PathBuf>,
        source: &[u8],
        offset: usize,
        length: usize,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let text = String::from_utf8_lossy(source).into_owned();
        Self::Parse {
            src: NamedSource::new(path.display().to_string(), text),
            span: SourceSpan::from((offset, length)),
            path,
            line,
            column,
            message: message.into(),
        }
    }

    /// The file this error is about, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Task { path, .. } => {
                Some(path)
            }
            Self::Language { .. } => None,
        }
    }
}

/// All file failures of one package. Scanning stops at the first package
/// that reports any.
#[derive(Debug, Error, Diagnostic)]
#[error("{} error(s) processing package {package}", errors.len())]
#[diagnostic(
    code(mainseq::scan),
    help("please fix these before continuing")
)]
pub struct PackageScanError {
    /// Full name of the failing package.
    pub package: String,
    /// Every failure collected for the package.
    #[related]
    pub errors: Vec<SourceError>,
}

/// Errors that abort an analysis run.
#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    /// A package's sources could not be scanned.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scan(#[from] PackageScanError),

    /// No classifier was configured.
    #[error("no source classifier configured")]
    #[diagnostic(code(mainseq::setup))]
    NoClassifier,
}
