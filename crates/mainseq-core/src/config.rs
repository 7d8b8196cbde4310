//! Configuration types for mainseq.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Highest number of decimals the text output accepts.
pub const MAX_PRECISION: usize = 6;

/// Top-level configuration, as read from `mainseq.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Output configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Validate value ranges.
    ///
    /// # Errors
    ///
    /// Returns error describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analyzer.max_concurrency == Some(0) {
            return Err(ConfigError::Validation(
                "analyzer.max_concurrency must be at least 1".into(),
            ));
        }
        if self.output.precision > MAX_PRECISION {
            return Err(ConfigError::Validation(format!(
                "output.precision must be at most {MAX_PRECISION}"
            )));
        }
        Ok(())
    }

    /// The effective concurrency limit.
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.analyzer
            .max_concurrency
            .unwrap_or_else(default_parallelism)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Module root to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns of directories to leave out of discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum number of files read or parsed at the same time.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: Vec::new(),
            max_concurrency: None,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format name (`text`, `json` or `compact`).
    #[serde(default = "default_format")]
    pub format: String,

    /// Decimals shown for each score.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Whether to color the text output.
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            precision: default_precision(),
            color: true,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_format() -> String {
    "text".to_string()
}

fn default_precision() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Number of threads the machine offers, at least one.
#[must_use]
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(mainseq::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(mainseq::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A value is out of range.
    #[error("config validation: {0}")]
    #[diagnostic(code(mainseq::config::validation))]
    Validation(String),
}
