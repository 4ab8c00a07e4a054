//! nestspec - nested, context-scoped test execution
//!
//! Tests are declared inside nested contexts. Each context contributes setup
//! and teardown actions that every test beneath it inherits, and a composed
//! name built from the descriptions along its path. A static context runs
//! its setups once and shares one state across every test beneath it.
//!
//! ## Usage
//!
//! ```
//! use nestspec::{check_eq, ContextNode, TestRunner};
//!
//! #[derive(Default)]
//! struct Fields {
//!     value: u32,
//! }
//!
//! let root = ContextNode::<Fields>::build("", |ctx| {
//!     ctx.context("a counter", |ctx| {
//!         ctx.setup(|st| {
//!             st.value = 1;
//!             Ok(())
//!         });
//!         ctx.should("start at one", |st| check_eq(1u32, st.value));
//!         Ok(())
//!     })?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let summary = TestRunner::default().run_tree(&root);
//! assert!(summary.is_all_passed());
//! assert_eq!(summary.reports[0].full_name, "test: a counter should start at one");
//! ```

pub mod assertion;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod models;
pub mod output;
pub mod resolve;
pub mod state;
pub mod suites;
pub mod utils;

pub use assertion::{check, check_eq, check_match, flunk, AssertionFailure};
pub use config::RunConfig;
pub use context::{Action, ActionResult, ContextBuilder, ContextId, ContextNode};
pub use error::{BuildError, BuildResult};
pub use executor::{DefaultClassifier, FailureClassifier, Signal, SignalKind, TestRunner};
pub use models::{Phase, RunSummary, TestOutcome, TestReport};
pub use resolve::{resolve, Plan, Resolver, StateBinding, TestCaseRecord};
pub use state::ExecutionState;
