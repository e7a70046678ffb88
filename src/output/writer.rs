//! Saving reports to disk as JSON or text

use super::formatter::{FormattingOptions, OutputFormatter, PlainFormatter};
use crate::{
    error::{AppError, Result},
    models::Report,
    types::{CheckType, OutputFormat},
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Writes a [`Report`] to a file in the requested format
pub struct ReportWriter {
    format: OutputFormat,
}

impl ReportWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// `<check_type>_result_<YYYYmmdd_HHMMSS>.<ext>`
    pub fn default_filename(check_type: CheckType, format: OutputFormat, now: DateTime<Utc>) -> String {
        format!(
            "{}_result_{}.{}",
            check_type.as_str(),
            now.format("%Y%m%d_%H%M%S"),
            format.extension()
        )
    }

    /// Render the report in this writer's format
    pub fn render(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Txt => {
                let formatter = PlainFormatter::new(FormattingOptions {
                    enable_color: false,
                    verbose_mode: true,
                    table_borders: true,
                    truncate_cells: false,
                });
                let mut text = formatter.format_report(report)?;
                text.push('\n');
                Ok(text)
            }
        }
    }

    /// Write the report to `path`, or to the default file name in the
    /// current directory when `path` is `None`. Returns the path written.
    pub fn save(&self, report: &Report, path: Option<&Path>) -> Result<PathBuf> {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(Self::default_filename(report.check_type, self.format, Utc::now())),
        };

        let contents = self.render(report)?;
        std::fs::write(&target, contents)
            .map_err(|e| AppError::io(format!("Failed to write results to {}: {}", target.display(), e)))?;

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckJob, HttpOutcome, JobHandle, NormalizedNodeResult};
    use crate::types::Region;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn report() -> Report {
        let job = CheckJob::new(CheckType::Ping, "example.com", vec!["de1.node.check-host.net"]).unwrap();
        let handle = JobHandle {
            request_id: "abc".to_string(),
            permanent_link: "https://check-host.net/check-report/abc".to_string(),
        };
        let node = NormalizedNodeResult {
            node_id: "de1.node.check-host.net".to_string(),
            country: "Germany".to_string(),
            city: "Nuremberg".to_string(),
            region: Region::Eu,
            attempts_succeeded: 2,
            attempts_total: 2,
            latency_min_ms: 12.345,
            latency_avg_ms: 15.6789,
            latency_max_ms: 19.0128,
            ip: "1.1.1.1".to_string(),
            http: None,
            samples_ms: vec![12.345, 19.0128],
        };
        Report::assemble(&job, &handle, true, vec![], vec![node])
    }

    #[test]
    fn test_default_filename() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(
            ReportWriter::default_filename(CheckType::Ping, OutputFormat::Json, at),
            "ping_result_20240305_070809.json"
        );
        assert_eq!(
            ReportWriter::default_filename(CheckType::Http, OutputFormat::Txt, at),
            "http_result_20240305_070809.txt"
        );
    }

    #[test]
    fn test_save_json_keeps_full_precision() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        let written = ReportWriter::new(OutputFormat::Json).save(&report(), Some(&path)).unwrap();
        assert_eq!(written, path);

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["check_type"], "ping");
        assert_eq!(value["target_host"], "example.com");
        assert_eq!(value["node_results"][0]["latency_avg_ms"], 15.6789);
        assert_eq!(value["region_stats"]["EU"]["successes"], 2);

        let parsed: Report = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.request_id, "abc");
    }

    #[test]
    fn test_save_text_rounds_to_one_decimal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        ReportWriter::new(OutputFormat::Txt).save(&report(), Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.contains("Check Type:     ping"));
        assert!(text.contains("Host:           example.com"));
        assert!(text.contains("12.3 / 15.7 / 19.0 ms"));
        assert!(!text.contains("15.6789"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_text_keeps_long_status_message() {
        let message = "SSL_connect returned=1 errno=0 state=error: certificate verify failed";
        let job = CheckJob::new(CheckType::Http, "https://example.com", vec!["de1.node.check-host.net"]).unwrap();
        let handle = JobHandle {
            request_id: "tls".to_string(),
            permanent_link: "https://check-host.net/check-report/tls".to_string(),
        };
        let node = NormalizedNodeResult {
            node_id: "de1.node.check-host.net".to_string(),
            country: "Germany".to_string(),
            city: "Nuremberg".to_string(),
            region: Region::Eu,
            attempts_succeeded: 0,
            attempts_total: 1,
            latency_min_ms: 0.0,
            latency_avg_ms: 0.0,
            latency_max_ms: 0.0,
            ip: "N/A".to_string(),
            http: Some(HttpOutcome {
                success: false,
                response_time_ms: 0.0,
                status_code: "N/A".to_string(),
                status_message: message.to_string(),
            }),
            samples_ms: vec![],
        };
        let report = Report::assemble(&job, &handle, true, vec![], vec![node]);

        let text = ReportWriter::new(OutputFormat::Txt).render(&report).unwrap();
        assert!(text.contains(&format!("N/A {}", message)));

        // Terminal tables still cap the column
        let terminal = PlainFormatter::new(FormattingOptions {
            enable_color: false,
            verbose_mode: true,
            table_borders: true,
            truncate_cells: true,
        })
        .format_report(&report)
        .unwrap();
        assert!(!terminal.contains(message));
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = ReportWriter::new(OutputFormat::Json).save(&report(), Some(&path)).unwrap_err();
        assert_eq!(err.category(), "IO");
        assert_eq!(err.exit_code(), 5);
    }
}
