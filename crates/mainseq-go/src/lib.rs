//! # mainseq-go
//!
//! Go support for mainseq, built on Tree-sitter.
//!
//! - [`GoClassifier`] counts function, interface and struct declarations
//!   for the abstractness scan
//! - [`discover`] turns a Go module into a [`mainseq_core::PackageSet`]:
//!   one package per directory, imports read from the sources, files
//!   selected by [`BuildTarget`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod build;
pub mod classifier;
pub mod discovery;
pub mod header;
pub mod module;
mod syntax;

pub use build::BuildTarget;
pub use classifier::GoClassifier;
pub use discovery::{discover, DiscoveryError, DiscoveryOptions};
pub use header::{FileHeader, HeaderExtractor};
