//! Pipeline orchestration: fan-in, abstractness, then stability and distance.

use crate::classify::SourceClassifier;
use crate::config::default_parallelism;
use crate::error::AnalysisError;
use crate::graph::{dependents_of, gather_depended_on_by_count};
use crate::metrics::{calculate_distance, calculate_stability};
use crate::model::{Package, PackageSet, Zone};
use crate::reader::{FsReader, SourceReader};
use crate::scanner::PackageScanner;

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Builder for configuring an [`Analysis`].
#[derive(Default)]
pub struct AnalysisBuilder {
    classifier: Option<Arc<dyn SourceClassifier>>,
    reader: Option<Arc<dyn SourceReader>>,
    max_concurrency: Option<usize>,
}

impl AnalysisBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the classifier used for every source file.
    #[must_use]
    pub fn classifier<C: SourceClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Sets the file reader (default: [`FsReader`]).
    #[must_use]
    pub fn reader(mut self, reader: Arc<dyn SourceReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Sets the maximum number of files in flight.
    #[must_use]
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Builds the analysis.
    ///
    /// # Errors
    ///
    /// Returns an error if no classifier was given.
    pub fn build(self) -> Result<Analysis, AnalysisError> {
        let classifier = self.classifier.ok_or(AnalysisError::NoClassifier)?;
        let reader = self.reader.unwrap_or_else(|| Arc::new(FsReader));
        let limit = self.max_concurrency.unwrap_or_else(default_parallelism);

        Ok(Analysis {
            scanner: PackageScanner::new(classifier, reader, limit),
        })
    }
}

/// Computes coupling metrics for a discovered package set.
///
/// Use [`Analysis::builder()`] to construct an instance.
pub struct Analysis {
    scanner: PackageScanner,
}

impl Analysis {
    /// Creates a new builder for configuring an analysis.
    #[must_use]
    pub fn builder() -> AnalysisBuilder {
        AnalysisBuilder::new()
    }

    /// Runs every stage on a freshly discovered set.
    ///
    /// Fan-in and abstractness are complete for all packages before any
    /// stability or distance is computed. Nothing is returned on failure.
    ///
    /// # Errors
    ///
    /// Returns the failures of the first package whose sources could not be
    /// read or parsed.
    pub async fn run(&self, mut packages: PackageSet) -> Result<MetricsReport, AnalysisError> {
        info!("Starting analysis of {} package(s)", packages.len());

        gather_depended_on_by_count(&mut packages);
        let files_scanned = self.scanner.scan_all(&mut packages).await?;

        calculate_stability(&mut packages);
        calculate_distance(&mut packages);

        let report = MetricsReport {
            packages: packages.into_ordered(),
            files_scanned,
        };

        info!(
            "Analysis complete: {} package(s), {} file(s), {} undefined",
            report.packages.len(),
            report.files_scanned,
            report.undefined_count()
        );

        Ok(report)
    }
}

/// Fully enriched packages, in presentation order.
#[derive(Debug, Default, Serialize)]
pub struct MetricsReport {
    /// Every analysed package.
    pub packages: Vec<Package>,
    /// Number of source files scanned.
    pub files_scanned: usize,
}

impl MetricsReport {
    /// Looks up a package by full name.
    #[must_use]
    pub fn package(&self, full_name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.full_name == full_name)
    }

    /// Number of packages with at least one undefined score.
    #[must_use]
    pub fn undefined_count(&self) -> usize {
        self.packages
            .iter()
            .filter(|p| p.has_undefined_metric())
            .count()
    }

    /// Full names of the packages importing `full_name`, in presentation
    /// order.
    #[must_use]
    pub fn dependents_of(&self, full_name: &str) -> Vec<&str> {
        dependents_of(&self.packages, full_name)
    }

    /// Packages falling into `zone`.
    #[must_use]
    pub fn in_zone(&self, zone: Zone) -> Vec<&Package> {
        self.packages.iter().filter(|p| p.zone() == zone).collect()
    }
}
