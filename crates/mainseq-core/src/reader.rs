//! File reading seam.

use std::path::Path;

/// Reads source bytes for the scanner.
pub trait SourceReader: Send + Sync {
    /// Returns the full content of `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be read.
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Reads straight from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
