//! Concurrent package scanner.
//!
//! Every source file of a package is read and classified in its own task.
//! A single semaphore, owned by the scanner and shared by every task it
//! spawns, caps how many files are being read or parsed at once across all
//! packages. The coordinating task joins every file task of a package before
//! looking at the results, so per-package counts are only ever merged by one
//! task and no failure is dropped.

use crate::classify::{DeclarationCounts, SourceClassifier};
use crate::error::{PackageScanError, SourceError};
use crate::model::{Package, PackageSet};
use crate::reader::SourceReader;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Scans package sources and derives abstractness.
///
/// Cloning a scanner shares its concurrency limit.
#[derive(Clone)]
pub struct PackageScanner {
    classifier: Arc<dyn SourceClassifier>,
    reader: Arc<dyn SourceReader>,
    limiter: Arc<Semaphore>,
    max_concurrency: usize,
}

impl PackageScanner {
    /// Creates a scanner allowing at most `max_concurrency` files in flight.
    ///
    /// A limit of zero is raised to one.
    #[must_use]
    pub fn new(
        classifier: Arc<dyn SourceClassifier>,
        reader: Arc<dyn SourceReader>,
        max_concurrency: usize,
    ) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            classifier,
            reader,
            limiter: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    /// The configured concurrency limit.
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Number of file slots currently free.
    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Classifies every file of `package` and sums the counts.
    ///
    /// # Errors
    ///
    /// Returns every read or parse failure of the package at once.
    pub async fn scan_package(
        &self,
        package: &Package,
    ) -> Result<DeclarationCounts, PackageScanError> {
        info!(
            "Scanning {} {} source file(s) in package {}",
            package.go_files.len(),
            self.classifier.language_id(),
            package.full_name
        );

        let mut tasks = JoinSet::new();
        let mut paths = HashMap::new();
        for file in &package.go_files {
            let path = package.dir.join(file);
            let limiter = Arc::clone(&self.limiter);
            let classifier = Arc::clone(&self.classifier);
            let reader = Arc::clone(&self.reader);
            let handle = tasks.spawn(scan_file(limiter, classifier, reader, path.clone()));
            paths.insert(handle.id(), path);
        }

        let mut counts = DeclarationCounts::default();
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(file_counts)) => counts += file_counts,
                Ok(Err(e)) => errors.push(e),
                Err(e) => errors.push(SourceError::Task {
                    path: paths
                        .remove(&e.id())
                        .unwrap_or_else(|| package.dir.clone()),
                    message: e.to_string(),
                }),
            }
        }

        if !errors.is_empty() {
            errors.sort_by(|a, b| a.path().cmp(&b.path()));
            warn!(
                "{} error(s) processing package {}",
                errors.len(),
                package.full_name
            );
            return Err(PackageScanError {
                package: package.full_name.clone(),
                errors,
            });
        }

        debug!(
            "{}: {} concretion(s), {} abstraction(s)",
            package.full_name, counts.concretions, counts.abstractions
        );
        Ok(counts)
    }

    /// Sets abstractness on every package, in presentation order.
    ///
    /// Returns the number of files scanned.
    ///
    /// # Errors
    ///
    /// Stops at the first package with any failure; packages after it are
    /// not scanned.
    pub async fn scan_all(&self, packages: &mut PackageSet) -> Result<usize, PackageScanError> {
        let names = packages.names().to_vec();
        let mut files_scanned = 0;

        for name in &names {
            let Some(package) = packages.get(name) else {
                continue;
            };
            let counts = self.scan_package(package).await?;
            files_scanned += package.go_files.len();

            if let Some(p) = packages.get_mut(name) {
                p.abstractness = counts.abstractness();
            }
        }

        Ok(files_scanned)
    }
}

/// Reads and classifies one file while holding a slot of the limiter.
async fn scan_file(
    limiter: Arc<Semaphore>,
    classifier: Arc<dyn SourceClassifier>,
    reader: Arc<dyn SourceReader>,
    path: PathBuf,
) -> Result<DeclarationCounts, SourceError> {
    let Ok(permit) = limiter.acquire_owned().await else {
        return Err(SourceError::Task {
            path,
            message: "concurrency limiter closed".into(),
        });
    };

    let task_path = path.clone();
    let joined = tokio::task::spawn_blocking(move || {
        // Released when the closure returns, on success and failure alike.
        let _permit = permit;
        read_and_classify(reader.as_ref(), classifier.as_ref(), &task_path)
    })
    .await;

    match joined {
        Ok(result) => result,
        // Surfaces in the join set, which maps the task back to its file.
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(SourceError::Task {
            path,
            message: e.to_string(),
        }),
    }
}

fn read_and_classify(
    reader: &dyn SourceReader,
    classifier: &dyn SourceClassifier,
    path: &Path,
) -> Result<DeclarationCounts, SourceError> {
    debug!("Scanning: {}", path.display());
    let source = reader.read(path).map_err(|e| SourceError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    classifier.classify(path, &source)
}
