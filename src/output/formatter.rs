//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.
//! Plain output is also what the text report file contains, so every
//! figure is printed with exactly one decimal digit.

use crate::{
    error::{AppError, Result},
    models::{NormalizedNodeResult, Report},
    stats::{OverallStats, RegionStats, StatisticsEngine},
    types::CheckType,
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format request metadata: target, request id, link, completeness
    fn format_summary(&self, report: &Report) -> Result<String>;

    /// Format overall statistics
    fn format_overall_stats(&self, report: &Report) -> Result<String>;

    /// Format per-region statistics
    fn format_region_stats(&self, report: &Report) -> Result<String>;

    /// Format per-node results as a table
    fn format_node_results(&self, report: &Report) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    fn format_success(&self, message: &str) -> Result<String>;

    fn format_info(&self, message: &str) -> Result<String>;

    /// Format the complete report
    fn format_report(&self, report: &Report) -> Result<String> {
        let title = format!("{} RESULTS SUMMARY", report.check_type.as_str().to_uppercase());
        let mut output = String::new();
        output.push_str(&self.format_header(&title)?);
        output.push_str("\n\n");
        output.push_str(&self.format_summary(report)?);
        output.push_str("\n\n");
        output.push_str(&self.format_overall_stats(report)?);
        output.push_str("\n\n");
        output.push_str(&self.format_region_stats(report)?);
        output.push_str("\n\n");
        output.push_str(&self.format_node_results(report)?);
        Ok(output)
    }
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Cut cells at their column's `max_width`; off for saved reports
    pub truncate_cells: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            truncate_cells: true,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    pub show_borders: bool,
    pub show_header: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
    pub max_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment, min_width: usize, max_width: usize) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width,
            max_width,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

pub(crate) fn fmt_error(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format output: {}", e))
}

/// Latency with one decimal digit
pub(crate) fn format_ms(value: f64) -> String {
    format!("{:.1} ms", value)
}

pub(crate) fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

/// Label for the latency measure of a check type
pub(crate) fn latency_label(check_type: CheckType) -> &'static str {
    match check_type {
        CheckType::Ping => "RTT",
        CheckType::Http => "Response Time",
    }
}

/// "Country, City" location label
pub(crate) fn location(result: &NormalizedNodeResult) -> String {
    format!("{}, {}", result.country, result.city)
}

/// Per-node latency cell: min/avg/max for ping, single time for HTTP
pub(crate) fn node_latency(check_type: CheckType, result: &NormalizedNodeResult) -> String {
    if result.attempts_succeeded == 0 {
        return "N/A".to_string();
    }
    match check_type {
        CheckType::Ping => format!(
            "{:.1} / {:.1} / {:.1} ms",
            result.latency_min_ms, result.latency_avg_ms, result.latency_max_ms
        ),
        CheckType::Http => format_ms(result.latency_avg_ms),
    }
}

/// Per-node outcome cell: "ok/total" for ping, "code message" for HTTP
pub(crate) fn node_outcome(check_type: CheckType, result: &NormalizedNodeResult) -> String {
    match (check_type, &result.http) {
        (CheckType::Http, Some(http)) => format!("{} {}", http.status_code, http.status_message),
        _ => format!("{}/{}", result.attempts_succeeded, result.attempts_total),
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given format and data
    pub(crate) fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output.trim_end().to_string()
    }

    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        format
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let content = rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                let width = column.min_width.max(column.header.chars().count()).max(content);
                if self.options.truncate_cells {
                    width.min(column.max_width)
                } else {
                    width
                }
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| &c.alignment).unwrap_or(&Alignment::Left);
            let padded_cell = align_text(cell, width, alignment);

            if format.show_borders {
                row.push(' ');
                row.push_str(&padded_cell);
                row.push_str(" |");
            } else {
                row.push_str(&padded_cell);
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::from("+");
        for &width in widths {
            border.push_str(&"-".repeat(width + 2));
            border.push('+');
        }
        border
    }

    fn region_table(&self, report: &Report) -> String {
        let format = TableFormat {
            columns: vec![
                Column::new("Region", Alignment::Left, 6, 10),
                Column::new("Nodes", Alignment::Right, 5, 6),
                Column::new("Success", Alignment::Right, 7, 12),
                Column::new("Rate", Alignment::Right, 6, 8),
                Column::new("Min", Alignment::Right, 8, 14),
                Column::new("Avg", Alignment::Right, 8, 14),
                Column::new("Max", Alignment::Right, 8, 14),
            ],
            show_borders: self.options.table_borders,
            show_header: true,
        };

        let rows: Vec<RowData> = report
            .region_stats
            .values()
            .map(|stats| region_row(stats))
            .collect();

        self.create_table(&format, &rows)
    }

    fn node_table(&self, report: &Report) -> String {
        let latency_header = match report.check_type {
            CheckType::Ping => "RTT min/avg/max",
            CheckType::Http => "Response Time",
        };
        let outcome_header = match report.check_type {
            CheckType::Ping => "Result",
            CheckType::Http => "Status",
        };

        let mut columns = vec![
            Column::new("Location", Alignment::Left, 20, 40),
            Column::new(outcome_header, Alignment::Left, 8, 30),
            Column::new(latency_header, Alignment::Right, 13, 30),
            Column::new("IP Address", Alignment::Left, 10, 40),
        ];
        if self.options.verbose_mode {
            columns.insert(0, Column::new("Node", Alignment::Left, 4, 40));
        }

        let format = TableFormat {
            columns,
            show_borders: self.options.table_borders,
            show_header: true,
        };

        let rows: Vec<RowData> = report
            .node_results
            .iter()
            .map(|result| {
                let mut row = vec![
                    location(result),
                    node_outcome(report.check_type, result),
                    node_latency(report.check_type, result),
                    result.ip.clone(),
                ];
                if self.options.verbose_mode {
                    row.insert(0, result.node_id.clone());
                }
                row
            })
            .collect();

        self.create_table(&format, &rows)
    }
}

fn region_row(stats: &RegionStats) -> RowData {
    let latency = |value: f64| if stats.successes > 0 { format!("{:.1}", value) } else { "N/A".to_string() };
    vec![
        stats.region.as_str().to_string(),
        stats.nodes.to_string(),
        format!("{}/{}", stats.successes, stats.attempts),
        format_percentage(stats.success_rate()),
        latency(stats.latency_min_ms),
        latency(stats.latency_avg_ms),
        latency(stats.latency_max_ms),
    ]
}

/// Align text within specified width, truncating if needed
pub(crate) fn align_text(text: &str, width: usize, alignment: &Alignment) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }

    let padding = width - len;
    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
        }
    }
}

fn write_overall(output: &mut String, check_type: CheckType, overall: &OverallStats) -> Result<()> {
    let label = latency_label(check_type);
    writeln!(output, "  Nodes Reported: {}", overall.nodes).map_err(fmt_error)?;
    write!(
        output,
        "  Success Rate:   {}/{} ({})",
        overall.successes,
        overall.attempts,
        format_percentage(overall.success_rate())
    )
    .map_err(fmt_error)?;

    if overall.successes > 0 {
        write!(output, "\n  Average {}: {}", label, format_ms(overall.latency_avg_ms)).map_err(fmt_error)?;
        write!(
            output,
            "\n  Min/Max {}: {} / {}",
            label,
            format_ms(overall.latency_min_ms),
            format_ms(overall.latency_max_ms)
        )
        .map_err(fmt_error)?;
    }
    Ok(())
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len().max(76) + 4);

        writeln!(output, "{}", border).map_err(fmt_error)?;
        writeln!(output, "  {}", title).map_err(fmt_error)?;
        write!(output, "{}", border).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_summary(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Check Type:     {}", report.check_type).map_err(fmt_error)?;
        writeln!(output, "Host:           {}", report.target_host).map_err(fmt_error)?;
        writeln!(output, "Timestamp:      {}", report.timestamp.to_rfc3339()).map_err(fmt_error)?;
        writeln!(output, "Request ID:     {}", report.request_id).map_err(fmt_error)?;
        writeln!(output, "Permanent Link: {}", report.permanent_link).map_err(fmt_error)?;

        if report.complete {
            write!(output, "Status:         complete").map_err(fmt_error)?;
        } else {
            write!(
                output,
                "Status:         partial ({} node(s) did not respond)",
                report.pending_nodes.len()
            )
            .map_err(fmt_error)?;
            if self.options.verbose_mode && !report.pending_nodes.is_empty() {
                write!(output, "\nPending Nodes:  {}", report.pending_nodes.join(", ")).map_err(fmt_error)?;
            }
        }

        Ok(output)
    }

    fn format_overall_stats(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "Overall Statistics:").map_err(fmt_error)?;
        write_overall(&mut output, report.check_type, &report.overall_stats)?;

        if let Some(fastest) = StatisticsEngine::fastest_region(&report.region_stats) {
            write!(
                output,
                "\n  Fastest Region: {} ({} avg)",
                fastest.region,
                format_ms(fastest.latency_avg_ms)
            )
            .map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_region_stats(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "Statistics by Region (latency in ms):").map_err(fmt_error)?;

        if report.region_stats.is_empty() {
            write!(output, "  No region reported results.").map_err(fmt_error)?;
        } else {
            write!(output, "{}", self.region_table(report)).map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_node_results(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "Detailed Results by Node:").map_err(fmt_error)?;

        if report.node_results.is_empty() {
            write!(output, "  No node results available.").map_err(fmt_error)?;
        } else {
            write!(output, "{}", self.node_table(report)).map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }

    fn format_info(&self, message: &str) -> Result<String> {
        Ok(message.to_string())
    }
}
