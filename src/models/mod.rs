//! Data models for test execution
//!
//! Outcomes and reports exposed to reporting tools.

mod test_result;

pub use test_result::{Phase, RunSummary, TestOutcome, TestReport};
