//! Output formatting and display system
//!
//! Renders check reports for the terminal (plain or colored) and saves
//! them to JSON or text files.

mod colored;
mod formatter;
mod writer;

pub use colored::{ColorScheme, ColoredFormatter, LatencyLevel};
pub use formatter::{Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData, TableFormat};
pub use writer::ReportWriter;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            table_borders: true,
            truncate_cells: true,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_messages() {
        let plain = OutputFormatterFactory::create_plain_formatter();
        assert_eq!(plain.format_warning("slow").unwrap(), "WARNING: slow");

        let colored = OutputFormatterFactory::create_formatter(true, false);
        assert!(colored.format_warning("slow").unwrap().contains("slow"));
    }
}
