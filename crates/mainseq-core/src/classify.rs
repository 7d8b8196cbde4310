//! Source classification seam.
//!
//! `SourceClassifier` is the extension point for language support: an
//! implementation reads one file's source and counts the declarations that
//! contribute to abstractness.

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};
use std::path::Path;

/// Declaration counts of one file, or of a whole package once summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationCounts {
    /// Function and method declarations.
    pub concretions: u64,
    /// Interface and struct type declarations.
    pub abstractions: u64,
}

impl DeclarationCounts {
    /// Creates counts from explicit values.
    #[must_use]
    pub fn new(concretions: u64, abstractions: u64) -> Self {
        Self {
            concretions,
            abstractions,
        }
    }

    /// `abstractions / concretions`.
    ///
    /// A package without any function declaration has no defined
    /// abstractness; the result is NaN in that case, whatever the number of
    /// abstractions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn abstractness(&self) -> f64 {
        if self.concretions == 0 {
            return f64::NAN;
        }
        self.abstractions as f64 / self.concretions as f64
    }
}

impl Add for DeclarationCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            concretions: self.concretions + rhs.concretions,
            abstractions: self.abstractions + rhs.abstractions,
        }
    }
}

impl AddAssign for DeclarationCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for DeclarationCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Trait for language-specific declaration counting.
///
/// Implementations are shared across scan tasks and must be stateless with
/// respect to individual files.
pub trait SourceClassifier: Send + Sync {
    /// Language identifier (e.g., `"go"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this classifier handles (e.g., `&[".go"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Counts declarations in one file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] if the source is not syntactically
    /// valid, or [`SourceError::Language`] if the parser cannot be set up.
    fn classify(&self, path: &Path, source: &[u8]) -> Result<DeclarationCounts, SourceError>;
}
