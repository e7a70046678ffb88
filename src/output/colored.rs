//! Colored formatter implementation with terminal color support
//!
//! Mirrors the plain layout but pads each cell before coloring it, so
//! ANSI escape codes never disturb column alignment.

use super::formatter::{
    fmt_error, format_ms, format_percentage, latency_label, location, node_latency, node_outcome, FormattingOptions,
    OutputFormatter, PlainFormatter,
};
use crate::{
    error::Result,
    models::{NormalizedNodeResult, Report},
    stats::StatisticsEngine,
    types::CheckType,
};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatencyLevel {
    Excellent, // < 50ms
    Good,      // 50-100ms
    Fair,      // 100-300ms
    Poor,      // 300-1000ms
    VeryPoor,  // > 1000ms
}

impl LatencyLevel {
    pub fn from_latency(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 100.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            highlight: Color::Magenta,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

const LOCATION_WIDTH: usize = 30;
const OUTCOME_WIDTH: usize = 15;
const LATENCY_WIDTH: usize = 25;

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    fn section_header(&self, title: &str) -> ColoredString {
        if self.options.enable_color {
            title.bold().color(self.color_scheme.header)
        } else {
            title.normal()
        }
    }

    fn latency_colored(&self, latency_ms: f64) -> ColoredString {
        let level = LatencyLevel::from_latency(latency_ms);
        self.colorize(&format_ms(latency_ms), level.color())
    }

    fn percentage_colored(&self, percentage: f64) -> ColoredString {
        let color = if percentage >= 95.0 {
            self.color_scheme.success
        } else if percentage >= 50.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        };
        self.colorize(&format_percentage(percentage), color)
    }

    /// Color for a node row: green when every attempt succeeded, red when none did
    fn node_color(&self, result: &NormalizedNodeResult) -> Color {
        if result.attempts_total > 0 && result.attempts_succeeded == result.attempts_total {
            self.color_scheme.success
        } else if result.attempts_succeeded > 0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        }
    }

    fn node_row(&self, check_type: CheckType, result: &NormalizedNodeResult) -> String {
        let location = format!("{:<width$}", location(result), width = LOCATION_WIDTH);
        let outcome = format!("{:<width$}", node_outcome(check_type, result), width = OUTCOME_WIDTH);
        let latency_text = format!("{:<width$}", node_latency(check_type, result), width = LATENCY_WIDTH);

        let latency = if result.is_reachable() {
            self.colorize(&latency_text, LatencyLevel::from_latency(result.latency_avg_ms).color())
        } else {
            self.dimmed(&latency_text)
        };

        let mut row = format!(
            "{} {} {} {}",
            location,
            self.colorize(&outcome, self.node_color(result)),
            latency,
            result.ip
        );
        if self.options.verbose_mode {
            row = format!("{} {}", row, self.dimmed(&format!("[{}]", result.node_id)));
        }
        row
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len().max(76) + 4);

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border)).map_err(fmt_error)?;
        writeln!(output, "  {}", self.bold(title).color(self.color_scheme.header)).map_err(fmt_error)?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.border)).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_summary(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Host:           {}", self.bold(&report.target_host)).map_err(fmt_error)?;
        writeln!(output, "Request ID:     {}", self.colorize(&report.request_id, self.color_scheme.info))
            .map_err(fmt_error)?;
        writeln!(output, "Permanent Link: {}", self.colorize(&report.permanent_link, self.color_scheme.info))
            .map_err(fmt_error)?;

        if report.complete {
            write!(output, "Status:         {}", self.colorize("complete", self.color_scheme.success))
                .map_err(fmt_error)?;
        } else {
            let status = format!("partial ({} node(s) did not respond)", report.pending_nodes.len());
            write!(output, "Status:         {}", self.colorize(&status, self.color_scheme.warning))
                .map_err(fmt_error)?;
            if self.options.verbose_mode && !report.pending_nodes.is_empty() {
                write!(output, "\nPending Nodes:  {}", self.dimmed(&report.pending_nodes.join(", ")))
                    .map_err(fmt_error)?;
            }
        }

        Ok(output)
    }

    fn format_overall_stats(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let overall = &report.overall_stats;
        let label = latency_label(report.check_type);

        writeln!(output, "{}", self.section_header("Overall Statistics:")).map_err(fmt_error)?;
        writeln!(output, "  Nodes Reported: {}", overall.nodes).map_err(fmt_error)?;
        write!(
            output,
            "  Success Rate:   {} ({})",
            self.bold(&format!("{}/{}", overall.successes, overall.attempts)),
            self.percentage_colored(overall.success_rate())
        )
        .map_err(fmt_error)?;

        if overall.successes > 0 {
            write!(output, "\n  Average {}: {}", label, self.latency_colored(overall.latency_avg_ms))
                .map_err(fmt_error)?;
            write!(
                output,
                "\n  Min/Max {}: {} / {}",
                label,
                self.latency_colored(overall.latency_min_ms),
                self.latency_colored(overall.latency_max_ms)
            )
            .map_err(fmt_error)?;
        }

        if let Some(fastest) = StatisticsEngine::fastest_region(&report.region_stats) {
            write!(
                output,
                "\n  Fastest Region: {} ({} avg)",
                self.colorize(fastest.region.as_str(), self.color_scheme.highlight),
                self.latency_colored(fastest.latency_avg_ms)
            )
            .map_err(fmt_error)?;
        }

        Ok(output)
    }

    fn format_region_stats(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        write!(output, "{}", self.section_header("Statistics by Region:")).map_err(fmt_error)?;

        if report.region_stats.is_empty() {
            write!(output, "\n  {}", self.dimmed("No region reported results.")).map_err(fmt_error)?;
            return Ok(output);
        }

        let label = latency_label(report.check_type);
        for stats in report.region_stats.values() {
            write!(
                output,
                "\n\n  {} {}",
                self.bold(stats.region.as_str()),
                self.dimmed(&format!("({})", stats.region.description()))
            )
            .map_err(fmt_error)?;
            write!(
                output,
                "\n    Success Rate: {}/{} ({})",
                stats.successes,
                stats.attempts,
                self.percentage_colored(stats.success_rate())
            )
            .map_err(fmt_error)?;

            if stats.successes > 0 {
                write!(output, "\n    Average {}: {}", label, self.latency_colored(stats.latency_avg_ms))
                    .map_err(fmt_error)?;
                write!(
                    output,
                    "\n    Min/Max {}: {} / {}",
                    label,
                    format_ms(stats.latency_min_ms),
                    format_ms(stats.latency_max_ms)
                )
                .map_err(fmt_error)?;
            }
        }

        Ok(output)
    }

    fn format_node_results(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "{}", self.section_header("Detailed Results by Node:")).map_err(fmt_error)?;

        if report.node_results.is_empty() {
            write!(output, "  {}", self.dimmed("No node results available.")).map_err(fmt_error)?;
            return Ok(output);
        }

        let (outcome_header, latency_header) = match report.check_type {
            CheckType::Ping => ("Result", "RTT min/avg/max"),
            CheckType::Http => ("Status", "Response Time"),
        };
        let header = format!(
            "{:<lw$} {:<ow$} {:<rw$} {}",
            "Location",
            outcome_header,
            latency_header,
            "IP Address",
            lw = LOCATION_WIDTH,
            ow = OUTCOME_WIDTH,
            rw = LATENCY_WIDTH
        );
        let rule = "-".repeat(header.len());

        writeln!(output, "{}", self.bold(&header)).map_err(fmt_error)?;
        writeln!(output, "{}", self.colorize(&rule, self.color_scheme.border)).map_err(fmt_error)?;

        let rows: Vec<String> = report
            .node_results
            .iter()
            .map(|result| self.node_row(report.check_type, result))
            .collect();
        write!(output, "{}", rows.join("\n")).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.bold("ERROR:").color(self.color_scheme.error), self.colorize(error, self.color_scheme.error)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!(
            "{} {}",
            self.bold("WARNING:").color(self.color_scheme.warning),
            self.colorize(warning, self.color_scheme.warning)
        ))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(self.colorize(message, self.color_scheme.success).to_string())
    }

    fn format_info(&self, message: &str) -> Result<String> {
        Ok(self.colorize(message, self.color_scheme.info).to_string())
    }
}

/// Helper functions for color management
impl ColoredFormatter {
    /// Check if terminal supports colors
    pub fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && std::env::var("TERM").map(|term| term != "dumb").unwrap_or(true)
    }

    /// Enable or disable colors at runtime
    pub fn set_colors_enabled(&mut self, enabled: bool) {
        self.options.enable_color = enabled && Self::supports_color();
    }

    /// Uncolored rendering of the same report, as written to text files
    pub fn plain(&self) -> &PlainFormatter {
        &self.plain_formatter
    }
}
