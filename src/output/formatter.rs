//! Output formatters for run results
//!
//! Provides Table, JSON, and summary output formats.

use crate::models::{RunSummary, TestOutcome, TestReport};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a single test report
    pub fn format_report(&self, report: &TestReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Summary => self.format_report_summary(report),
        }
    }

    fn format_report_table(&self, report: &TestReport) -> String {
        let status_str = if self.colorize {
            match report.outcome {
                TestOutcome::Passed => "\x1b[32m✓ PASS   \x1b[0m",
                TestOutcome::Failed => "\x1b[31m✗ FAIL   \x1b[0m",
                TestOutcome::Errored => "\x1b[31m! ERROR  \x1b[0m",
                TestOutcome::Pending => "\x1b[33m○ PENDING\x1b[0m",
            }
        } else {
            match report.outcome {
                TestOutcome::Passed => "✓ PASS   ",
                TestOutcome::Failed => "✗ FAIL   ",
                TestOutcome::Errored => "! ERROR  ",
                TestOutcome::Pending => "○ PENDING",
            }
        };

        let mut line = format!("{status_str} {}", report.full_name);
        if report.outcome.is_problem() {
            if let Some(message) = &report.message {
                match report.phase {
                    Some(phase) => line.push_str(&format!("\n            [{phase}] {message}")),
                    None => line.push_str(&format!("\n            {message}")),
                }
            }
        }
        for fault in &report.teardown_faults {
            line.push_str(&format!("\n            teardown: {fault}"));
        }
        line
    }

    fn format_report_summary(&self, report: &TestReport) -> String {
        format!("{} {}", report.outcome.symbol(), report.full_name)
    }

    /// Format a run summary
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", summary.suite));
        output.push_str("════════════════════════════════════════════════════════════════\n");

        for report in &summary.reports {
            output.push_str(&format!("  {}\n", self.format_report_table(report)));
        }

        output.push_str("════════════════════════════════════════════════════════════════\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", summary.passed)
        } else {
            summary.passed.to_string()
        };
        let fail_str = if self.colorize && summary.failed + summary.errored > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "  Total: {} | Pass: {} | Fail: {} | Error: {} | Pending: {}\n",
            summary.total, pass_str, fail_str, summary.errored, summary.pending
        ));
        output.push_str(&format!("  Pass Rate: {:5.1}%\n", summary.pass_rate()));

        output
    }

    fn format_summary_brief(&self, summary: &RunSummary) -> String {
        let mut output: Vec<String> = summary
            .problems()
            .map(|report| self.format_report_summary(report))
            .collect();
        output.push(format!(
            "{}: {}/{} passed, {} failed, {} errored, {} pending",
            summary.suite,
            summary.passed,
            summary.total,
            summary.failed,
            summary.errored,
            summary.pending
        ));
        output.join("\n")
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}
