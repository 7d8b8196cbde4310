//! Analyse command implementation.

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use mainseq_core::{Analysis, AnalysisError, Config, Zone, MAX_PRECISION};
use mainseq_go::{discover, DiscoveryOptions, GoClassifier};
use std::io::IsTerminal;
use std::path::PathBuf;

use super::output::{self, Presentation};
use crate::config_resolver::ConfigSource;
use crate::{OutputFormat, ZoneArg};

/// Exit code when a package lands in the zone given to `--fail-on-zone`.
const ZONE_EXIT_CODE: i32 = 2;

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub path: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub max_concurrency: Option<usize>,
    pub exclude: Vec<String>,
    pub precision: Option<usize>,
    pub no_color: bool,
    pub fail_on_zone: Option<ZoneArg>,
    pub verbose: bool,
}

/// Settings after merging configuration and command line.
#[derive(Debug)]
struct Settings {
    root: PathBuf,
    exclude: Vec<String>,
    max_concurrency: usize,
    presentation: Presentation,
}

/// Runs the analyse command.
pub fn run(source: &ConfigSource, overrides: Overrides) -> Result<()> {
    if let ConfigSource::Global(path) = source {
        tracing::info!("Using global config: {}", path.display());
    }
    let config = source
        .load()
        .with_context(|| format!("Failed to load configuration from {source}"))?;
    let fail_on_zone = overrides.fail_on_zone;
    let settings = merge(&config, overrides, color_allowed())?;

    let options = DiscoveryOptions {
        exclude: settings.exclude.clone(),
        ..DiscoveryOptions::default()
    };
    let packages = discover(&settings.root, &options)
        .with_context(|| format!("Failed to discover packages in {}", settings.root.display()))?;
    if packages.is_empty() {
        tracing::warn!("No Go packages found in {}", settings.root.display());
    }

    let analysis = Analysis::builder()
        .classifier(GoClassifier::new())
        .max_concurrency(settings.max_concurrency)
        .build()
        .context("Failed to build analysis")?;

    tracing::info!(
        "Analysing {} with at most {} file(s) in flight",
        settings.root.display(),
        settings.max_concurrency
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let report = match runtime.block_on(analysis.run(packages)) {
        Ok(report) => report,
        Err(AnalysisError::Scan(err)) => {
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    output::print(&report, &settings.presentation)?;

    if let Some(zone) = fail_on_zone.map(zone_of) {
        let offenders = report.in_zone(zone);
        if !offenders.is_empty() {
            for package in &offenders {
                tracing::warn!("{} is in the zone of {}", package.full_name, zone);
            }
            std::process::exit(ZONE_EXIT_CODE);
        }
    }

    Ok(())
}

fn merge(config: &Config, overrides: Overrides, color_allowed: bool) -> Result<Settings> {
    let format = match overrides.format {
        Some(format) => format,
        None => OutputFormat::from_str(&config.output.format, true)
            .map_err(|_| anyhow!("Unknown output.format {:?}", config.output.format))?,
    };

    let precision = overrides.precision.unwrap_or(config.output.precision);
    if precision > MAX_PRECISION {
        bail!("--precision must be at most {MAX_PRECISION}");
    }

    let max_concurrency = overrides
        .max_concurrency
        .unwrap_or_else(|| config.max_concurrency());
    if max_concurrency == 0 {
        bail!("--max-concurrency must be at least 1");
    }

    let mut exclude = config.analyzer.exclude.clone();
    exclude.extend(overrides.exclude);

    Ok(Settings {
        root: overrides
            .path
            .unwrap_or_else(|| config.analyzer.root.clone()),
        exclude,
        max_concurrency,
        presentation: Presentation {
            format,
            color: config.output.color && !overrides.no_color && color_allowed,
            precision,
            verbose: overrides.verbose,
        },
    })
}

/// Colors only go to a terminal, and never when `NO_COLOR` is set.
fn color_allowed() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn zone_of(arg: ZoneArg) -> Zone {
    match arg {
        ZoneArg::Pain => Zone::Pain,
        ZoneArg::Uselessness => Zone::Uselessness,
    }
}
