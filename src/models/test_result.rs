//! Test outcome models
//!
//! Defines per-test outcomes, reports, and the run summary handed to
//! reporting tools.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a test record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    SettingUp,
    Running,
    TearingDown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not started"),
            Phase::SettingUp => write!(f, "setup"),
            Phase::Running => write!(f, "body"),
            Phase::TearingDown => write!(f, "teardown"),
        }
    }
}

/// Final outcome of a test record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
    Errored,
    Pending,
}

impl TestOutcome {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestOutcome::Passed => "✓",
            TestOutcome::Failed => "✗",
            TestOutcome::Errored => "!",
            TestOutcome::Pending => "○",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    /// Failed or errored
    pub fn is_problem(&self) -> bool {
        matches!(self, TestOutcome::Failed | TestOutcome::Errored)
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestOutcome::Passed => write!(f, "PASS"),
            TestOutcome::Failed => write!(f, "FAIL"),
            TestOutcome::Errored => write!(f, "ERROR"),
            TestOutcome::Pending => write!(f, "PENDING"),
        }
    }
}

/// Result of a single test record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub full_name: String,
    pub outcome: TestOutcome,
    pub message: Option<String>,
    /// Phase the primary fault was raised in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    /// Faults raised by teardown actions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teardown_faults: Vec<String>,
}

impl TestReport {
    fn new(full_name: impl Into<String>, outcome: TestOutcome) -> Self {
        Self {
            full_name: full_name.into(),
            outcome,
            message: None,
            phase: None,
            teardown_faults: Vec::new(),
        }
    }

    pub fn passed(full_name: impl Into<String>) -> Self {
        Self::new(full_name, TestOutcome::Passed)
    }

    pub fn failed(full_name: impl Into<String>, phase: Phase, message: impl Into<String>) -> Self {
        Self::new(full_name, TestOutcome::Failed)
            .with_phase(phase)
            .with_message(message)
    }

    pub fn errored(full_name: impl Into<String>, phase: Phase, message: impl Into<String>) -> Self {
        Self::new(full_name, TestOutcome::Errored)
            .with_phase(phase)
            .with_message(message)
    }

    pub fn pending(full_name: impl Into<String>) -> Self {
        Self::new(full_name, TestOutcome::Pending)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attach teardown faults. A record that otherwise passed becomes errored.
    pub fn with_teardown_faults(mut self, faults: Vec<String>) -> Self {
        if self.outcome == TestOutcome::Passed {
            if let Some(first) = faults.first() {
                self.outcome = TestOutcome::Errored;
                self.phase = Some(Phase::TearingDown);
                self.message = Some(first.clone());
            }
        }
        self.teardown_faults.extend(faults);
        self
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.outcome.symbol(), self.full_name)?;
        if let Some(msg) = &self.message {
            match self.phase {
                Some(phase) => write!(f, " - [{phase}] {msg}")?,
                None => write!(f, " - {msg}")?,
            }
        }
        for fault in &self.teardown_faults {
            write!(f, "\n    teardown: {fault}")?;
        }
        Ok(())
    }
}

/// Summary of one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub suite: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub pending: usize,
    pub reports: Vec<TestReport>,
}

impl RunSummary {
    pub fn new(suite: impl Into<String>, reports: Vec<TestReport>) -> Self {
        let count = |outcome: TestOutcome| reports.iter().filter(|r| r.outcome == outcome).count();
        let passed = count(TestOutcome::Passed);
        let failed = count(TestOutcome::Failed);
        let errored = count(TestOutcome::Errored);
        let pending = count(TestOutcome::Pending);

        Self {
            suite: suite.into(),
            total: reports.len(),
            passed,
            failed,
            errored,
            pending,
            reports,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        let runnable = self.total - self.pending;
        if runnable == 0 {
            0.0
        } else {
            (self.passed as f64 / runnable as f64) * 100.0
        }
    }

    /// No record failed or errored
    pub fn is_all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }

    pub fn report(&self, full_name: &str) -> Option<&TestReport> {
        self.reports.iter().find(|r| r.full_name == full_name)
    }

    pub fn problems(&self) -> impl Iterator<Item = &TestReport> {
        self.reports.iter().filter(|r| r.outcome.is_problem())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.suite)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for report in &self.reports {
            writeln!(f, "  {report}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Error: {} | Pending: {}",
            self.total, self.passed, self.failed, self.errored, self.pending
        )?;
        writeln!(f, "Pass Rate: {:.1}%", self.pass_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_flags() {
        assert!(TestOutcome::Passed.is_success());
        assert!(!TestOutcome::Pending.is_success());
        assert!(TestOutcome::Errored.is_problem());
        assert!(!TestOutcome::Pending.is_problem());
    }

    #[test]
    fn test_teardown_fault_turns_pass_into_error() {
        let report = TestReport::passed("test: a").with_teardown_faults(vec!["boom".into()]);
        assert_eq!(report.outcome, TestOutcome::Errored);
        assert_eq!(report.phase, Some(Phase::TearingDown));
        assert_eq!(report.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_teardown_fault_keeps_failure() {
        let report = TestReport::failed("test: a", Phase::Running, "expected 1")
            .with_teardown_faults(vec!["boom".into()]);
        assert_eq!(report.outcome, TestOutcome::Failed);
        assert_eq!(report.message.as_deref(), Some("expected 1"));
        assert_eq!(report.teardown_faults, vec!["boom".to_string()]);
    }

    #[test]
    fn test_run_summary() {
        let reports = vec![
            TestReport::passed("test: a"),
            TestReport::failed("test: b", Phase::Running, "nope"),
            TestReport::pending("test: c"),
            TestReport::errored("test: d", Phase::SettingUp, "broken"),
        ];

        let summary = RunSummary::new("suite", reports);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.errored, 1);
        assert!(!summary.is_all_passed());
        assert_eq!(summary.problems().count(), 2);
        assert!(summary.report("test: c").is_some());
    }

    #[test]
    fn test_display_includes_phase() {
        let report = TestReport::errored("test: a", Phase::SettingUp, "broken");
        assert_eq!(report.to_string(), "! test: a - [setup] broken");
    }
}
