//! Dependency graph builder: inverts the import relation to get fan-in.

use crate::model::{Package, PackageSet};
use tracing::debug;

/// Counts, for every package, how many in-scope packages import it.
///
/// Imports of packages outside the set are ignored. Self-imports are counted
/// like any other import.
///
/// This is not idempotent: it must run exactly once on a freshly discovered
/// set, a second call adds the same counts again.
pub fn gather_depended_on_by_count(packages: &mut PackageSet) {
    let edges: Vec<String> = packages
        .iter_ordered()
        .flat_map(|p| p.imports.iter())
        .filter(|target| packages.contains(target))
        .cloned()
        .collect();

    debug!("{} in-scope import edge(s)", edges.len());

    for target in edges {
        if let Some(p) = packages.get_mut(&target) {
            p.depended_on_by_count += 1.0;
        }
    }
}

/// Returns the packages importing `full_name`, in the order given.
///
/// A self-import lists the package as its own dependent.
#[must_use]
pub fn dependents_of<'a>(
    packages: impl IntoIterator<Item = &'a Package>,
    full_name: &str,
) -> Vec<&'a str> {
    packages
        .into_iter()
        .filter(|p| p.imports.iter().any(|i| i == full_name))
        .map(|p| p.full_name.as_str())
        .collect()
}
