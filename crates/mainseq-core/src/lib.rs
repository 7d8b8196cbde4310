//! # mainseq-core
//!
//! Core of the mainseq coupling analyzer.
//!
//! Given a set of packages and their imports, this crate computes per
//! package:
//!
//! - fan-out and fan-in over the in-scope dependency graph ([`graph`])
//! - abstractness, by scanning every source file concurrently under a single
//!   concurrency limit ([`PackageScanner`])
//! - stability and the distance from the main sequence ([`metrics`])
//!
//! Language support plugs in through [`SourceClassifier`].
//!
//! ## Example
//!
//! ```ignore
//! use mainseq_core::Analysis;
//!
//! let analysis = Analysis::builder()
//!     .classifier(GoClassifier::new())
//!     .max_concurrency(8)
//!     .build()?;
//!
//! let report = analysis.run(packages).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod classify;
mod config;
mod error;
mod model;
mod reader;
mod scanner;

pub mod graph;
pub mod metrics;

pub use analysis::{Analysis, AnalysisBuilder, MetricsReport};
pub use classify::{DeclarationCounts, SourceClassifier};
pub use config::{
    default_parallelism, AnalyzerConfig, Config, ConfigError, OutputConfig, MAX_PRECISION,
};
pub use error::{AnalysisError, PackageScanError, SourceError};
pub use model::{Package, PackageSet, Zone, ZONE_DISTANCE_THRESHOLD};
pub use reader::{FsReader, SourceReader};
pub use scanner::PackageScanner;
