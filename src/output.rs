//! CLI output formatting.
//!
//! Each surface has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! ## Scan summary
//!
//! ```text
//! Archive: /srv/archive — 2 journals, 12483 pages
//! ArbeiterZeitung (12441 pages)
//!     1890 (140 pages)
//!         altoxml 0/140  metadata-v1 140/140  texts 138/140  xml 140/140
//!     1892 (96 pages) [1891-1893]
//!         ...
//! Diagnostics (1)
//!     folder '1890_fixup' under ArbeiterZeitung/images is not a year or year range
//! ```
//!
//! The `[1891-1893]` suffix marks a year whose pages were enumerated from
//! a range folder rather than a folder named after the year itself.

use crate::model::{DatasetSnapshot, Diagnostic, Page};
use crate::report::MissingYear;
use std::collections::BTreeSet;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format the per-journal, per-year coverage summary of a snapshot.
pub fn format_snapshot_summary(snapshot: &DatasetSnapshot) -> Vec<String> {
    let mut lines = vec![format!(
        "Archive: {} — {} journals, {} pages",
        snapshot.root.display(),
        snapshot.journals.len(),
        snapshot.total_pages()
    )];

    for journal in &snapshot.journals {
        lines.push(format!("{} ({} pages)", journal.name, journal.total_pages()));
        for year in &journal.years {
            let year_name = year.year.to_string();
            let origin = if year.source_folder == year_name {
                String::new()
            } else {
                format!(" [{}]", year.source_folder)
            };
            lines.push(format!(
                "{}{} ({} pages){}",
                indent(1),
                year_name,
                year.total_pages,
                origin
            ));
            let cells: Vec<String> = year
                .covered
                .iter()
                .map(|(target, covered)| format!("{target} {covered}/{}", year.total_pages))
                .collect();
            if !cells.is_empty() {
                lines.push(format!("{}{}", indent(2), cells.join("  ")));
            }
        }
    }

    lines.extend(format_diagnostics(&snapshot.diagnostics));
    lines
}

/// Format the diagnostics section; empty when there is nothing to say.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    if diagnostics.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Diagnostics ({})", diagnostics.len())];
    lines.extend(diagnostics.iter().map(|d| format!("{}{d}", indent(1))));
    lines
}

/// Format a missing-years report: one `journal year` row per line.
pub fn format_missing_years(target: &str, rows: &[MissingYear]) -> Vec<String> {
    let mut lines = vec![format!("Missing years for '{target}' ({})", rows.len())];
    lines.extend(
        rows.iter()
            .map(|row| format!("{}{} {}", indent(1), row.journal, row.year)),
    );
    lines
}

/// Format a missing-pages report: one `journal year page` row per line.
pub fn format_missing_pages(target: &str, rows: &[Page]) -> Vec<String> {
    let mut lines = vec![format!("Missing pages for '{target}' ({})", rows.len())];
    lines.extend(rows.iter().map(|row| {
        format!(
            "{}{} {} {}",
            indent(1),
            row.journal,
            row.year,
            row.page_id
        )
    }));
    lines
}

/// Format the per-year drill-down: every target's missing page ids for
/// one (journal, year).
pub fn format_year_detail(
    journal: &str,
    year: u16,
    total_pages: u32,
    rows: &[(&str, &BTreeSet<String>)],
) -> Vec<String> {
    let mut lines = vec![format!("{journal} {year} — {total_pages} pages")];
    if rows.is_empty() {
        lines.push(format!("{}complete: no derivatives missing", indent(1)));
        return lines;
    }
    for (target, pages) in rows {
        lines.push(format!("{}{target}: {} missing", indent(1), pages.len()));
        lines.extend(pages.iter().map(|page| format!("{}{page}", indent(2))));
    }
    lines
}

pub fn print_snapshot_summary(snapshot: &DatasetSnapshot) {
    for line in format_snapshot_summary(snapshot) {
        println!("{line}");
    }
}

pub fn print_missing_years(target: &str, rows: &[MissingYear]) {
    for line in format_missing_years(target, rows) {
        println!("{line}");
    }
}

pub fn print_missing_pages(target: &str, rows: &[Page]) {
    for line in format_missing_pages(target, rows) {
        println!("{line}");
    }
}

pub fn print_year_detail(
    journal: &str,
    year: u16,
    total_pages: u32,
    rows: &[(&str, &BTreeSet<String>)],
) {
    for line in format_year_detail(journal, year, total_pages, rows) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report;
    use crate::test_helpers::sample_snapshot;

    #[test]
    fn summary_leads_with_archive_totals() {
        let snapshot = sample_snapshot();
        let lines = format_snapshot_summary(&snapshot);
        assert!(lines[0].contains("2 journals"));
        assert!(lines[0].contains("4 pages"));
    }

    #[test]
    fn summary_marks_range_folder_years() {
        let snapshot = sample_snapshot();
        let lines = format_snapshot_summary(&snapshot);
        // VB 1900 comes from the range folder 1899-1901 in the sample.
        assert!(lines.iter().any(|l| l.contains("1900") && l.contains("[1899-1901]")));
        // AZ 1890 comes from a plain year folder: no origin marker.
        assert!(
            lines
                .iter()
                .any(|l| l.trim_start().starts_with("1890") && !l.contains('['))
        );
    }

    #[test]
    fn summary_shows_coverage_cells() {
        let snapshot = sample_snapshot();
        let lines = format_snapshot_summary(&snapshot);
        assert!(lines.iter().any(|l| l.contains("texts 1/2")));
    }

    #[test]
    fn diagnostics_section_only_when_present() {
        let mut snapshot = sample_snapshot();
        snapshot.diagnostics.clear();
        let lines = format_snapshot_summary(&snapshot);
        assert!(!lines.iter().any(|l| l.starts_with("Diagnostics")));
    }

    #[test]
    fn report_rows_render_one_per_line() {
        let snapshot = sample_snapshot();
        let years = report::missing_years(&snapshot, "texts");
        let lines = format_missing_years("texts", &years);
        assert_eq!(lines.len(), years.len() + 1);
        assert!(lines[1].contains("ArbeiterZeitung 1891"));

        let pages = report::missing_pages(&snapshot, "texts");
        let lines = format_missing_pages("texts", &pages);
        assert!(lines[1].contains("ArbeiterZeitung 1890 0002"));
    }

    #[test]
    fn year_detail_handles_complete_years() {
        let lines = format_year_detail("VB", 1900, 12, &[]);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("complete"));
    }
}
