/*!
 * Run summary reporting
 *
 * Renders the totals of an aggregation run as a console table using the
 * tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::config::CHARS_PER_TOKEN;
use crate::utils::format_file_size;

/// Totals of one aggregation run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Output file path
    pub output_file: String,
    /// Wall-clock time of the run
    pub duration: Duration,
    /// Files whose content was written
    pub files_written: usize,
    /// Binary files skipped
    pub binary_skipped: usize,
    /// Unreadable files skipped
    pub read_failures: usize,
    /// Total bytes written to the sink
    pub bytes_written: u64,
    /// Configured context window size, in tokens
    pub token_limit: usize,
}

impl RunSummary {
    /// Rough token estimate of the written output
    pub fn estimated_tokens(&self) -> usize {
        self.bytes_written as usize / CHARS_PER_TOKEN
    }

    /// Tokens left under the configured limit (negative when over)
    pub fn headroom(&self) -> i64 {
        self.token_limit as i64 - self.estimated_tokens() as i64
    }

    /// Whether the output fits the configured limit
    pub fn fits(&self) -> bool {
        self.headroom() >= 0
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(metric: &str, value: String) -> Self {
        Self {
            metric: metric.to_string(),
            value,
        }
    }
}

/// Report generator for run summaries
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string for a run summary
    pub fn generate_report(&self, summary: &RunSummary) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(summary),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, summary: &RunSummary) {
        println!("\n{}", self.generate_report(summary));
    }

    fn generate_console_report(&self, summary: &RunSummary) -> String {
        let headroom = summary.headroom();
        let verdict = if summary.fits() {
            "Fits within limit"
        } else {
            "Exceeds limit"
        };

        let rows = vec![
            SummaryRow::new("Output file", summary.output_file.clone()),
            SummaryRow::new("Duration", format!("{:.2}s", summary.duration.as_secs_f64())),
            SummaryRow::new("Files written", summary.files_written.to_string()),
            SummaryRow::new("Binary files skipped", summary.binary_skipped.to_string()),
            SummaryRow::new("Unreadable files skipped", summary.read_failures.to_string()),
            SummaryRow::new(
                "Size written",
                format!(
                    "{} ({} bytes)",
                    format_file_size(summary.bytes_written),
                    summary.bytes_written
                ),
            ),
            SummaryRow::new(
                "Estimated tokens",
                format!("~{}", summary.estimated_tokens()),
            ),
            SummaryRow::new("Token limit", summary.token_limit.to_string()),
            SummaryRow::new("Headroom", format!("{} tokens ({})", headroom, verdict)),
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()));
        table.to_string()
    }
}
