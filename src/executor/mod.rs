//! Test execution engine
//!
//! Provides sequential execution of resolved records and classification of
//! the signals their actions raise.

mod runner;
mod signal;

pub use runner::TestRunner;
pub use signal::{DefaultClassifier, FailureClassifier, Signal, SignalKind};
