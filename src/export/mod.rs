pub mod csv;
pub mod excel;

use crate::cli::ExportFormat;
use crate::error::Result;
use crate::reconcile::RunReport;
use indas_mapper_common::{ExportRecord, OutputRow, OUTPUT_COLUMNS};
use std::path::{Path, PathBuf};

/// Base name used when `--output` is a directory
pub const DEFAULT_TITLE: &str = "mapping_results";

fn output_path_for_format(output: &Path, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", DEFAULT_TITLE, extension))
    } else {
        output.to_path_buf()
    }
}

fn output_paths_for_both(output: &Path) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        (
            output.join(format!("{}.csv", DEFAULT_TITLE)),
            output.join(format!("{}.xlsx", DEFAULT_TITLE)),
        )
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_TITLE);
        (
            parent.join(format!("{}.csv", stem)),
            parent.join(format!("{}.xlsx", stem)),
        )
    }
}

/// Write the result table; returns the files written
pub fn export_results(rows: &[OutputRow], format: ExportFormat, output: &Path) -> Result<Vec<PathBuf>> {
    let written = match format {
        ExportFormat::Csv => {
            let path = output_path_for_format(output, "csv");
            csv::write_csv(rows, &path)?;
            vec![path]
        }
        ExportFormat::Excel => {
            let path = output_path_for_format(output, "xlsx");
            excel::write_excel(rows, &path)?;
            vec![path]
        }
        ExportFormat::Both => {
            let (csv_path, excel_path) = output_paths_for_both(output);
            csv::write_csv(rows, &csv_path)?;
            excel::write_excel(rows, &excel_path)?;
            vec![csv_path, excel_path]
        }
    };

    for path in &written {
        println!("✔ Saved: {}", path.display());
    }

    Ok(written)
}

/// Render the result rows as a fixed-width text table
pub fn render_table(rows: &[OutputRow]) -> String {
    let records: Vec<ExportRecord> = rows.iter().map(ExportRecord::from).collect();

    let mut widths = OUTPUT_COLUMNS.map(|title| title.chars().count());
    for record in &records {
        for (width, cell) in widths.iter_mut().zip(record.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 6]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut table = vec![line(OUTPUT_COLUMNS)];
    table.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    table.extend(records.iter().map(|r| line(r.cells())));
    table.join("\n")
}

/// Print the result table and run counters
pub fn print_summary(report: &RunReport) {
    println!();
    if report.rows.is_empty() {
        println!("No mapped rows.");
    } else {
        println!("{}", render_table(&report.rows));
    }

    println!();
    println!(
        "Mapped: {}  (cache: {}, confirmed: {})  Skipped: {}  Failed: {}",
        report.rows.len(),
        report.cache_hits(),
        report.confirmed(),
        report.skipped.len(),
        report.failures.len()
    );

    for failure in &report.failures {
        println!(
            "  ✗ row {}: {} ({}): {}",
            failure.row_number, failure.account_name, failure.context, failure.failure
        );
    }

    if report.aborted {
        println!("Run stopped before the end of the file.");
    }
}
