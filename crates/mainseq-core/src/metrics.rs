//! Stability and distance from the main sequence.
//!
//! ```text
//! abstractness
//!  1 +  zone of      .
//!    |  uselessness   .
//!    |                  .  main sequence (S + A = 1)
//!    |                    .
//!    |  zone of pain        .
//!  0 +-----------------------+ stability
//!    0                       1
//! ```
//!
//! Both stages are whole-set transformations. Each package's result depends
//! only on its own fields, so the order packages are visited in is irrelevant.
//! Zero denominators are not special-cased: they yield NaN, which then flows
//! into the distance.

use crate::model::PackageSet;
use tracing::debug;

/// `import_count / (import_count + depended_on_by_count)`.
///
/// NaN when both counts are zero.
#[must_use]
pub fn stability(import_count: f64, depended_on_by_count: f64) -> f64 {
    import_count / (import_count + depended_on_by_count)
}

/// `|stability + abstractness - 1|`.
#[must_use]
pub fn distance_from_main_sequence(stability: f64, abstractness: f64) -> f64 {
    (stability + abstractness - 1.0).abs()
}

/// Computes stability for every package.
///
/// Requires fan-in to have been gathered for the whole set.
pub fn calculate_stability(packages: &mut PackageSet) {
    for p in packages.values_mut() {
        if p.is_isolated() {
            debug!("{} is isolated, stability is undefined", p.full_name);
        }
        p.stability = stability(p.import_count, p.depended_on_by_count);
    }
}

/// Computes the distance from the main sequence for every package.
///
/// Requires stability and abstractness to be set for the whole set.
pub fn calculate_distance(packages: &mut PackageSet) {
    for p in packages.values_mut() {
        p.distance_from_median = distance_from_main_sequence(p.stability, p.abstractness);
    }
}
