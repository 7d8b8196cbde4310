//! Locating and loading `mainseq` configuration.
//!
//! First match wins:
//!
//! 1. `--config <FILE>`
//! 2. `mainseq.toml` or `.mainseq.toml` in the analysed directory, then in
//!    each parent up to and including the enclosing module root (`go.mod`)
//! 3. `config.toml` in the global directory (`$MAINSEQ_CONFIG_DIR`, else
//!    `~/.mainseq/`)
//! 4. Built-in defaults

use mainseq_core::{Config, ConfigError};
use std::fmt;
use std::path::{Path, PathBuf};

const LOCAL_NAMES: [&str; 2] = ["mainseq.toml", ".mainseq.toml"];
const GLOBAL_NAME: &str = "config.toml";
const GLOBAL_DIR_ENV: &str = "MAINSEQ_CONFIG_DIR";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Found next to the analysed module.
    Local(PathBuf),
    /// User-wide file.
    Global(PathBuf),
    /// Nothing found.
    Builtin,
}

impl ConfigSource {
    /// File backing this source.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Local(p) | Self::Global(p) => Some(p),
            Self::Builtin => None,
        }
    }

    /// Reads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// holds values outside their accepted range. An explicit path that
    /// does not exist is an error; the other sources only exist once found.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let config = match self.path() {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Local(p) => write!(f, "{}", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Builtin => f.write_str("built-in defaults"),
        }
    }
}

/// Resolves the configuration for an analysis of `start`.
#[must_use]
pub fn resolve(start: &Path, explicit: Option<&Path>) -> ConfigSource {
    let source = resolve_with(start, explicit, global_dir().as_deref());
    tracing::debug!("Configuration: {}", source);
    source
}

fn resolve_with(start: &Path, explicit: Option<&Path>, global: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(path) = find_local(start) {
        return ConfigSource::Local(path);
    }

    global
        .map(|dir| dir.join(GLOBAL_NAME))
        .filter(|p| p.is_file())
        .map_or(ConfigSource::Builtin, ConfigSource::Global)
}

/// Walks from `start` towards the filesystem root, stopping after the first
/// directory that is a module root.
fn find_local(start: &Path) -> Option<PathBuf> {
    let start = search_start(start);
    for dir in start.ancestors() {
        let found = LOCAL_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file());
        if found.is_some() {
            return found;
        }
        if mainseq_go::module::is_module_root(dir) {
            break;
        }
    }
    None
}

/// Resolves a relative start against the working directory, so that `.`
/// has parents to climb.
fn search_start(start: &Path) -> PathBuf {
    if start.is_absolute() {
        return start.to_path_buf();
    }
    start.canonicalize().unwrap_or_else(|e| {
        tracing::debug!("Cannot resolve {}: {}", start.display(), e);
        start.to_path_buf()
    })
}

fn global_dir() -> Option<PathBuf> {
    std::env::var_os(GLOBAL_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".mainseq")))
}
