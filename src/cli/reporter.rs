// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::convert::ConvertResult;
use super::summary::{AttributeSummary, DatasetSummary};
use crate::table::Table;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Print a dataset summary
    pub fn report_summary(summary: &DatasetSummary) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "File:".bold(), summary.path.cyan());
        println!("{}", "━".repeat(80).bright_black());

        Self::print_row("Kind", summary.kind.to_string());
        Self::print_row(
            "Encoding",
            summary.encoding.clone().unwrap_or_else(|| "-".to_string()),
        );
        if summary.swap_bytes {
            Self::print_row("Byte order", "little-endian (swapped)".to_string());
        }
        Self::print_row("Title", summary.title.clone());
        Self::print_row("Points", summary.points.to_string());
        Self::print_row("Polygons", summary.polygons.to_string());
        Self::print_row("Cells", summary.cells.to_string());

        if let Some(bounds) = &summary.bounds {
            Self::print_row(
                "Bounds",
                format!(
                    "[{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}]",
                    bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
                ),
            );
        }

        println!("\n{}", "Attributes:".bold());
        let attributes = [
            ("Point scalars", &summary.point_scalars),
            ("Point vectors", &summary.point_vectors),
            ("Cell scalars", &summary.cell_scalars),
            ("Cell vectors", &summary.cell_vectors),
        ];
        for (label, attribute) in attributes {
            if let Some(attribute) = attribute {
                Self::print_row(label, Self::describe(attribute));
            }
        }

        println!("\n{} {}", "Fields:".bold(), summary.fields.len());
        for field in &summary.fields {
            let association = field
                .association
                .map(|a| a.keyword().to_string())
                .unwrap_or_default();
            println!(
                "  {} {} {}x{} {}",
                field.name.cyan(),
                field.ty.yellow(),
                field.rows,
                field.columns,
                association.bright_black()
            );
        }

        println!("{}", "━".repeat(80).bright_black());
    }

    /// Print per-file outcomes of a batch conversion; returns the failure count
    pub fn report_conversions(results: &[ConvertResult], duration: Duration) -> usize {
        let mut failed = 0;
        for result in results {
            match &result.output {
                Ok(output) => println!(
                    "{} {} -> {}",
                    "✅".green(),
                    result.input.display(),
                    output.display().to_string().cyan()
                ),
                Err(e) => {
                    failed += 1;
                    eprintln!("{} {}: {:#}", "❌".red(), result.input.display(), e);
                }
            }
        }

        println!("\n{}", "━".repeat(80).bright_black());
        println!(
            "  {} {}",
            "Converted:".bright_black(),
            (results.len() - failed).to_string().green()
        );
        println!(
            "  {} {}",
            "Failed:".bright_black(),
            if failed > 0 {
                failed.to_string().red()
            } else {
                failed.to_string().green()
            }
        );
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
        failed
    }

    /// Print a numeric field one row per line
    pub fn report_table(name: &str, table: &Table) {
        println!("{} {} ({}x{})", "Field:".bold(), name.cyan(), table.nrows(), table.ncols());
        for row in table.row_iter() {
            let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            println!("{}", values.join(" "));
        }
    }

    /// Print a string field one entry per line
    pub fn report_strings(name: &str, values: &[String]) {
        println!("{} {} ({} strings)", "Field:".bold(), name.cyan(), values.len());
        for value in values {
            println!("{}", value);
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    fn print_row(name: &str, value: String) {
        println!("  {} {}", format!("{}:", name).bright_black(), value.cyan());
    }

    fn describe(attribute: &AttributeSummary) -> String {
        format!(
            "{} ({}, {}x{})",
            attribute.name, attribute.ty, attribute.rows, attribute.columns
        )
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
