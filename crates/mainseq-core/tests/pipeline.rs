//! Integration test: the whole pipeline over an in-memory package set.
//!
//! Sources are `"<functions> <types>"` pairs so that counts are explicit
//! and independent of any language grammar.

use mainseq_core::{
    Analysis, AnalysisError, DeclarationCounts, Package, PackageSet, SourceClassifier,
    SourceError, SourceReader, Zone,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct PairClassifier;

impl SourceClassifier for PairClassifier {
    fn language_id(&self) -> &'static str {
        "pair"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".pair"]
    }

    fn classify(&self, path: &Path, source: &[u8]) -> Result<DeclarationCounts, SourceError> {
        let text = std::str::from_utf8(source).unwrap_or("");
        let nums: Vec<u64> = text
            .split_whitespace()
            .filter_map(|t| t.parse().ok())
            .collect();
        match nums.as_slice() {
            [c, a] => Ok(DeclarationCounts::new(*c, *a)),
            _ => Err(SourceError::parse(path, source, 0, 0, 1, 1, "expected two numbers")),
        }
    }
}

struct Files(HashMap<PathBuf, &'static str>);

impl SourceReader for Files {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.0
            .get(path)
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
    }
}

/// One package per `(name, imports, source)`, each with a single file.
fn fixture(specs: &[(&str, &[&str], &'static str)]) -> (PackageSet, Arc<Files>) {
    let mut set = PackageSet::new();
    let mut files = HashMap::new();
    for (name, imports, source) in specs {
        let dir = PathBuf::from("/mod").join(name);
        files.insert(dir.join("x.pair"), *source);
        set.insert(Package::new(
            *name,
            *name,
            imports.iter().map(|s| (*s).to_string()).collect(),
            dir,
            vec!["x.pair".to_string()],
        ));
    }
    (set, Arc::new(Files(files)))
}

async fn run(specs: &[(&str, &[&str], &'static str)]) -> Result<mainseq_core::MetricsReport, AnalysisError> {
    let (set, files) = fixture(specs);
    let analysis = Analysis::builder()
        .classifier(PairClassifier)
        .reader(files)
        .max_concurrency(2)
        .build()
        .expect("analysis should build");
    analysis.run(set).await
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn two_package_chain() {
    let report = run(&[("a", &["b"], "1 0"), ("b", &[], "1 0")])
        .await
        .expect("analysis should succeed");

    let a = report.package("a").expect("a present");
    assert!(close(a.import_count, 1.0));
    assert!(close(a.depended_on_by_count, 0.0));
    assert!(close(a.stability, 1.0));
    assert!(close(a.abstractness, 0.0));
    assert!(close(a.distance_from_median, 0.0));

    let b = report.package("b").expect("b present");
    assert!(close(b.import_count, 0.0));
    assert!(close(b.depended_on_by_count, 1.0));
    assert!(close(b.stability, 0.0));
    assert!(close(b.abstractness, 0.0));
    assert!(close(b.distance_from_median, 1.0));
    assert_eq!(b.zone(), Zone::Pain);

    assert_eq!(report.files_scanned, 2);
}

#[tokio::test]
async fn isolated_package_has_nan_stability_and_distance() {
    let report = run(&[("lone", &["fmt"], "2 1"), ("solo", &[], "1 1")])
        .await
        .expect("analysis should succeed");

    let solo = report.package("solo").expect("solo present");
    assert!(solo.stability.is_nan());
    assert!(solo.distance_from_median.is_nan());
    assert_eq!(solo.zone(), Zone::Undefined);

    // Out-of-scope import still counts as fan-out.
    let lone = report.package("lone").expect("lone present");
    assert!(close(lone.stability, 1.0));
    assert!(close(lone.abstractness, 0.5));
    assert!(close(lone.distance_from_median, 0.5));

    assert_eq!(report.undefined_count(), 1);
}

#[tokio::test]
async fn package_without_functions_has_nan_abstractness() {
    let report = run(&[("api", &[], "0 1"), ("impl", &["api"], "3 0")])
        .await
        .expect("analysis should succeed");

    let api = report.package("api").expect("api present");
    assert!(api.abstractness.is_nan());
    assert!(api.distance_from_median.is_nan());
    assert!(close(api.stability, 0.0));
}

#[tokio::test]
async fn fan_in_counts_distinct_importers() {
    let report = run(&[
        ("core", &[], "1 0"),
        ("a", &["core"], "1 0"),
        ("b", &["core", "a"], "1 0"),
        ("c", &["core", "b", "external/x"], "1 0"),
    ])
    .await
    .expect("analysis should succeed");

    let fan_in: Vec<f64> = ["core", "a", "b", "c"]
        .iter()
        .map(|n| report.package(n).map_or(f64::NAN, |p| p.depended_on_by_count))
        .collect();
    assert_eq!(fan_in, vec![3.0, 1.0, 1.0, 0.0]);

    for p in &report.packages {
        assert!((0.0..=1.0).contains(&p.stability));
        assert!((0.0..=1.0).contains(&p.distance_from_median));
    }
}

#[tokio::test]
async fn dependents_are_listed_by_importer() {
    let report = run(&[
        ("core", &[], "1 0"),
        ("web", &["core", "fmt"], "1 0"),
        ("cli", &["core", "web"], "1 0"),
    ])
    .await
    .expect("analysis should succeed");

    assert_eq!(report.dependents_of("core"), vec!["web", "cli"]);
    assert_eq!(report.dependents_of("web"), vec!["cli"]);
    assert!(report.dependents_of("cli").is_empty());
    assert_eq!(report.dependents_of("fmt"), vec!["web"]);

    for p in &report.packages {
        #[allow(clippy::cast_precision_loss)]
        let listed = report.dependents_of(&p.full_name).len() as f64;
        assert!((listed - p.depended_on_by_count).abs() < f64::EPSILON);
    }
}

#[tokio::test]
async fn report_keeps_presentation_order() {
    let report = run(&[("z", &[], "1 0"), ("a", &["z"], "1 0"), ("m", &["a"], "1 0")])
        .await
        .expect("analysis should succeed");
    let names: Vec<&str> = report.packages.iter().map(|p| p.full_name.as_str()).collect();
    assert_eq!(names, vec!["z", "a", "m"]);
}

#[tokio::test]
async fn unparsable_file_aborts_without_report() {
    let result = run(&[("a", &["b"], "1 0"), ("b", &[], "not numbers"), ("c", &[], "1 0")]).await;

    match result {
        Err(AnalysisError::Scan(err)) => {
            assert_eq!(err.package, "b");
            assert_eq!(err.errors.len(), 1);
            assert_eq!(
                err.errors[0].path(),
                Some(Path::new("/mod/b/x.pair"))
            );
        }
        other => panic!("expected scan failure, got {other:?}"),
    }
}

#[tokio::test]
async fn report_serializes_undefined_as_null() {
    let report = run(&[("solo", &[], "0 0")])
        .await
        .expect("analysis should succeed");
    let json = serde_json::to_value(&report).expect("report should serialize");
    assert!(json["packages"][0]["stability"].is_null());
    assert!(json["packages"][0]["abstractness"].is_null());
    assert_eq!(json["files_scanned"], 1);
}

#[test]
fn build_without_classifier_fails() {
    assert!(matches!(
        Analysis::builder().build(),
        Err(AnalysisError::NoClassifier)
    ));
}
