//! Rendering of metrics reports.

use anyhow::Result;
use mainseq_core::{MetricsReport, Package};
use std::fmt::Write as _;

use crate::OutputFormat;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[1;32m";
const YELLOW: &str = "\x1b[1;33m";
const RED: &str = "\x1b[1;31m";

/// How a report is shown.
#[derive(Debug, Clone, Copy)]
pub struct Presentation {
    /// Output format.
    pub format: OutputFormat,
    /// ANSI colors in the text table.
    pub color: bool,
    /// Decimals per score.
    pub precision: usize,
    /// Extra columns and the importers of each package in the text table.
    pub verbose: bool,
}

/// Print a report to stdout.
pub fn print(report: &MetricsReport, presentation: &Presentation) -> Result<()> {
    let rendered = match presentation.format {
        OutputFormat::Text => render_text(report, presentation),
        OutputFormat::Json => render_json(report)?,
        OutputFormat::Compact => render_compact(report, presentation.precision),
    };
    print!("{rendered}");
    Ok(())
}

/// Formats a score, spelling out undefined values.
fn score(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.precision$}")
    }
}

fn stability_color(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        None
    } else if value < 0.5 {
        Some(GREEN)
    } else if value < 1.0 {
        Some(YELLOW)
    } else {
        Some(RED)
    }
}

struct Cell {
    text: String,
    color: Option<&'static str>,
    numeric: bool,
}

impl Cell {
    fn label(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            numeric: false,
        }
    }

    fn number(text: String, color: Option<&'static str>) -> Self {
        Self {
            text,
            color,
            numeric: true,
        }
    }
}

fn header(verbose: bool) -> Vec<&'static str> {
    let mut columns = vec!["NAME", "STABILITY", "ABSTRACTNESS", "DISTANCE"];
    if verbose {
        columns.extend(["IMPORTS", "DEPENDENTS", "ZONE"]);
    }
    columns
}

fn row(package: &Package, p: &Presentation) -> Vec<Cell> {
    let mut cells = vec![
        Cell::label(package.full_name.as_str()),
        Cell::number(
            score(package.stability, p.precision),
            stability_color(package.stability),
        ),
        Cell::number(score(package.abstractness, p.precision), Some(BOLD)),
        Cell::number(score(package.distance_from_median, p.precision), Some(BOLD)),
    ];
    if p.verbose {
        cells.push(Cell::number(package.import_count.to_string(), None));
        cells.push(Cell::number(package.depended_on_by_count.to_string(), None));
        cells.push(Cell::label(package.zone().to_string()));
    }
    cells
}

/// Lists the in-scope importers of every package that has any.
fn render_dependents(report: &MetricsReport, out: &mut String) {
    let listed: Vec<(&str, Vec<&str>)> = report
        .packages
        .iter()
        .map(|p| (p.full_name.as_str(), report.dependents_of(&p.full_name)))
        .filter(|(_, dependents)| !dependents.is_empty())
        .collect();
    if listed.is_empty() {
        return;
    }

    out.push_str("Dependents:\n");
    for (name, dependents) in listed {
        let _ = writeln!(out, "  {name} <- {}", dependents.join(", "));
    }
}

/// Renders the text table followed by a summary line.
///
/// In verbose mode the importers of each package are listed between the two.
pub fn render_text(report: &MetricsReport, p: &Presentation) -> String {
    let header = header(p.verbose);
    let rows: Vec<Vec<Cell>> = report.packages.iter().map(|pkg| row(pkg, p)).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.text.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{separator}+\n");

    let mut out = String::new();
    out.push_str(&separator);
    out.push('|');
    for (title, width) in header.iter().zip(&widths) {
        let _ = write!(out, " {title:^width$} |");
    }
    out.push('\n');
    out.push_str(&separator);

    for cells in &rows {
        out.push('|');
        for (cell, width) in cells.iter().zip(&widths) {
            let padded = if cell.numeric {
                format!("{:>width$}", cell.text)
            } else {
                format!("{:<width$}", cell.text)
            };
            match cell.color.filter(|_| p.color) {
                Some(color) => {
                    let _ = write!(out, " {color}{padded}{RESET} |");
                }
                None => {
                    let _ = write!(out, " {padded} |");
                }
            }
        }
        out.push('\n');
    }
    if !rows.is_empty() {
        out.push_str(&separator);
    }
    if p.verbose {
        render_dependents(report, &mut out);
    }

    let _ = writeln!(
        out,
        "{} package(s), {} file(s) scanned, {} with undefined metrics",
        report.packages.len(),
        report.files_scanned,
        report.undefined_count()
    );
    out
}

/// Renders the report as pretty JSON; undefined values become `null`.
pub fn render_json(report: &MetricsReport) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// Renders one line per package.
pub fn render_compact(report: &MetricsReport, precision: usize) -> String {
    let mut out = String::new();
    for package in &report.packages {
        let _ = writeln!(
            out,
            "{} stability={} abstractness={} distance={}",
            package.full_name,
            score(package.stability, precision),
            score(package.abstractness, precision),
            score(package.distance_from_median, precision),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn package(full_name: &str, imports: &[&str], d: f64, s: f64, a: f64, dist: f64) -> Package {
        let mut p = Package::new(
            full_name.rsplit('/').next().unwrap_or(full_name),
            full_name,
            imports.iter().map(|i| (*i).to_string()).collect(),
            PathBuf::from(full_name),
            vec!["x.go".into()],
        );
        p.depended_on_by_count = d;
        p.stability = s;
        p.abstractness = a;
        p.distance_from_median = dist;
        p
    }

    fn report() -> MetricsReport {
        MetricsReport {
            packages: vec![
                package("example.com/m/a", &["example.com/m/b", "example.com/m/svc"], 0.0, 1.0, 0.0, 0.0),
                package("example.com/m/b", &[], 2.0, 0.0, f64::NAN, f64::NAN),
                package("example.com/m/svc", &["example.com/m/b", "fmt"], 1.0, 0.5, 0.3, 0.2),
            ],
            files_scanned: 4,
        }
    }

    fn plain(format: OutputFormat) -> Presentation {
        Presentation {
            format,
            color: false,
            precision: 1,
            verbose: false,
        }
    }

    #[test]
    fn score_formatting() {
        assert_eq!(score(0.5, 1), "0.5");
        assert_eq!(score(2.0 / 3.0, 3), "0.667");
        assert_eq!(score(1.0, 0), "1");
        assert_eq!(score(f64::NAN, 2), "NaN");
    }

    #[test]
    fn stability_colors() {
        assert_eq!(stability_color(0.0), Some(GREEN));
        assert_eq!(stability_color(0.5), Some(YELLOW));
        assert_eq!(stability_color(0.99), Some(YELLOW));
        assert_eq!(stability_color(1.0), Some(RED));
        assert_eq!(stability_color(f64::NAN), None);
    }

    #[test]
    fn compact_lines() {
        let out = render_compact(&report(), 1);
        insta::assert_snapshot!(out.trim_end(), @r"
        example.com/m/a stability=1.0 abstractness=0.0 distance=0.0
        example.com/m/b stability=0.0 abstractness=NaN distance=NaN
        example.com/m/svc stability=0.5 abstractness=0.3 distance=0.2
        ");
    }

    #[test]
    fn text_table_without_color() {
        let out = render_text(&report(), &plain(OutputFormat::Text));
        insta::assert_snapshot!(out.trim_end(), @r"
        +-------------------+-----------+--------------+----------+
        |       NAME        | STABILITY | ABSTRACTNESS | DISTANCE |
        +-------------------+-----------+--------------+----------+
        | example.com/m/a   |       1.0 |          0.0 |      0.0 |
        | example.com/m/b   |       0.0 |          NaN |      NaN |
        | example.com/m/svc |       0.5 |          0.3 |      0.2 |
        +-------------------+-----------+--------------+----------+
        3 package(s), 4 file(s) scanned, 1 with undefined metrics
        ");
    }

    #[test]
    fn text_table_verbose_columns() {
        let mut p = plain(OutputFormat::Text);
        p.verbose = true;
        let out = render_text(&report(), &p);
        let header = out.lines().nth(1).unwrap();
        assert!(header.contains("IMPORTS"));
        assert!(header.contains("DEPENDENTS"));
        assert!(header.contains("ZONE"));

        let b = out.lines().find(|l| l.contains("example.com/m/b")).unwrap();
        assert!(b.contains("undefined"));
        let svc = out.lines().find(|l| l.contains("example.com/m/svc")).unwrap();
        assert!(svc.contains("main-sequence"));

        let tail: Vec<&str> = out.lines().skip_while(|l| *l != "Dependents:").collect();
        insta::assert_snapshot!(tail.join("\n"), @r"
        Dependents:
          example.com/m/b <- example.com/m/a, example.com/m/svc
          example.com/m/svc <- example.com/m/a
        3 package(s), 4 file(s) scanned, 1 with undefined metrics
        ");
    }

    #[test]
    fn dependents_only_in_verbose_mode() {
        let out = render_text(&report(), &plain(OutputFormat::Text));
        assert!(!out.contains("Dependents:"));

        let lone = MetricsReport {
            packages: vec![package("example.com/m/a", &["fmt"], 0.0, 1.0, 0.0, 0.0)],
            files_scanned: 1,
        };
        let mut p = plain(OutputFormat::Text);
        p.verbose = true;
        assert!(!render_text(&lone, &p).contains("Dependents:"));
    }

    #[test]
    fn text_table_colors() {
        let mut p = plain(OutputFormat::Text);
        p.color = true;
        let out = render_text(&report(), &p);

        let a = out.lines().find(|l| l.contains("example.com/m/a")).unwrap();
        assert!(a.contains(&format!("{RED}1.0{RESET}")));
        assert!(a.contains(&format!("{BOLD}0.0{RESET}")));
        assert!(!a.contains(&format!("{BOLD}example")));

        let b = out.lines().find(|l| l.contains("example.com/m/b")).unwrap();
        assert!(b.contains(&format!("{GREEN}0.0{RESET}")));
    }

    #[test]
    fn empty_report() {
        let out = render_text(&MetricsReport::default(), &plain(OutputFormat::Text));
        assert!(out.ends_with("0 package(s), 0 file(s) scanned, 0 with undefined metrics\n"));
        assert!(render_compact(&MetricsReport::default(), 1).is_empty());
    }

    #[test]
    fn json_uses_null_for_undefined() {
        let out = render_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let b = &value["packages"][1];
        assert_eq!(b["full_name"], "example.com/m/b");
        assert!(b["abstractness"].is_null());
        assert!(b["distance_from_median"].is_null());
        assert_eq!(b["stability"], 0.0);
        assert_eq!(value["files_scanned"], 4);
    }
}
