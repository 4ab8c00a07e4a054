//! Bundled suites
//!
//! Suites that run the engine against itself. The `nestspec` binary runs
//! these; the integration tests assert on their outcomes.

mod context;

pub use context::{context_suite, ContextTestState};
