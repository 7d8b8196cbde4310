//! Package model shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Distance above which a package is considered off the main sequence.
pub const ZONE_DISTANCE_THRESHOLD: f64 = 0.5;

/// A single package as produced by discovery and enriched by analysis.
///
/// Counts are kept as `f64` so the ratio formulas operate on them directly
/// and undefined results surface as NaN rather than a panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Short display name (the package clause).
    pub name: String,
    /// Unique name (module path plus relative directory).
    pub full_name: String,
    /// Import paths, in order. May reference packages outside the analysed set.
    pub imports: Vec<String>,
    /// Fan-out: number of imports.
    pub import_count: f64,
    /// Fan-in: number of in-scope packages importing this one.
    pub depended_on_by_count: f64,
    /// `import_count / (import_count + depended_on_by_count)`.
    pub stability: f64,
    /// `abstractions / concretions` across all files of the package.
    pub abstractness: f64,
    /// `|stability + abstractness - 1|`.
    pub distance_from_median: f64,
    /// Directory holding the package sources.
    pub dir: PathBuf,
    /// Source file names relative to `dir`.
    pub go_files: Vec<String>,
}

impl Package {
    /// Creates a freshly discovered package.
    ///
    /// Fan-out is taken from `imports`, fan-in starts at zero and the derived
    /// scores are NaN until their stage has run.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        imports: Vec<String>,
        dir: impl Into<PathBuf>,
        go_files: Vec<String>,
    ) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let import_count = imports.len() as f64;
        Self {
            name: name.into(),
            full_name: full_name.into(),
            imports,
            import_count,
            depended_on_by_count: 0.0,
            stability: f64::NAN,
            abstractness: f64::NAN,
            distance_from_median: f64::NAN,
            dir: dir.into(),
            go_files,
        }
    }

    /// Returns `true` if the package neither imports nor is imported by
    /// anything in scope. Its stability is undefined.
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.import_count == 0.0 && self.depended_on_by_count == 0.0
    }

    /// Returns `true` if any derived score is the undefined sentinel.
    #[must_use]
    pub fn has_undefined_metric(&self) -> bool {
        self.stability.is_nan() || self.abstractness.is_nan() || self.distance_from_median.is_nan()
    }

    /// Classifies the package against the main sequence.
    #[must_use]
    pub fn zone(&self) -> Zone {
        Zone::classify(self.stability, self.abstractness, self.distance_from_median)
    }
}

/// Region of the stability/abstractness plane a package falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    /// Concrete and heavily depended upon.
    Pain,
    /// Abstract and unused.
    Uselessness,
    /// Close enough to the main sequence.
    MainSequence,
    /// One of the inputs is undefined.
    Undefined,
}

impl Zone {
    /// Classifies a point of the plane.
    #[must_use]
    pub fn classify(stability: f64, abstractness: f64, distance: f64) -> Self {
        if stability.is_nan() || abstractness.is_nan() || distance.is_nan() {
            return Self::Undefined;
        }
        if distance <= ZONE_DISTANCE_THRESHOLD {
            return Self::MainSequence;
        }
        if stability < 0.5 && abstractness < 0.5 {
            Self::Pain
        } else if stability >= 0.5 && abstractness >= 0.5 {
            Self::Uselessness
        } else {
            Self::MainSequence
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pain => write!(f, "pain"),
            Self::Uselessness => write!(f, "uselessness"),
            Self::MainSequence => write!(f, "main-sequence"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// Packages keyed by full name, with the discovery order kept separately
/// for deterministic presentation.
#[derive(Debug, Clone, Default)]
pub struct PackageSet {
    packages: HashMap<String, Package>,
    names: Vec<String>,
}

impl PackageSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a package. Re-inserting a known name replaces the package but
    /// keeps its original position.
    pub fn insert(&mut self, package: Package) {
        let key = package.full_name.clone();
        if self.packages.insert(key.clone(), package).is_none() {
            self.names.push(key);
        }
    }

    /// Looks up a package by full name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Package> {
        self.packages.get(full_name)
    }

    /// Looks up a package by full name for mutation.
    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut Package> {
        self.packages.get_mut(full_name)
    }

    /// Returns `true` if a package with this full name is in scope.
    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.packages.contains_key(full_name)
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns `true` if the set holds no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Full names in presentation order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Packages in presentation order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Package> {
        self.names.iter().filter_map(|n| self.packages.get(n))
    }

    /// Mutable access to every package, in no particular order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Package> {
        self.packages.values_mut()
    }

    /// Consumes the set, returning packages in presentation order.
    #[must_use]
    pub fn into_ordered(mut self) -> Vec<Package> {
        self.names
            .iter()
            .filter_map(|n| self.packages.remove(n))
            .collect()
    }
}

impl FromIterator<Package> for PackageSet {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        let mut set = Self::new();
        for package in iter {
            set.insert(package);
        }
        set
    }
}
