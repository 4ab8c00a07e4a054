//! Test execution runner
//!
//! Executes resolved records strictly in order. Each record goes through
//! setup, body and teardown against the state it is bound to; pending
//! records touch no state at all.

use std::collections::HashMap;
use std::panic;

use tracing::{debug, error, info, trace, warn};

use super::signal::{invoke, DefaultClassifier, FailureClassifier, SignalKind};
use crate::config::RunConfig;
use crate::context::{Action, ContextId, ContextNode};
use crate::models::{Phase, RunSummary, TestOutcome, TestReport};
use crate::resolve::{Plan, Resolver, StateBinding, StaticScope, TestCaseRecord};
use crate::state::ExecutionState;

/// Test runner for resolved context trees
pub struct TestRunner {
    config: RunConfig,
    classifier: Box<dyn FailureClassifier>,
}

impl TestRunner {
    /// Create a new test runner
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            classifier: Box::new(DefaultClassifier),
        }
    }

    /// Replace the signal classifier
    pub fn with_classifier(mut self, classifier: impl FailureClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Resolve `root` (honouring the configured filter) and run it
    pub fn run_tree<S: Default>(&self, root: &ContextNode<S>) -> RunSummary {
        let resolver = match &self.config.filter {
            Some(filter) => Resolver::new().with_filter(filter.as_str()),
            None => Resolver::new(),
        };
        let plan = resolver.resolve(root);
        let name = if root.description().is_empty() {
            "nestspec"
        } else {
            root.description()
        };
        self.run(name, &plan)
    }

    /// Run every record of `plan` in order
    pub fn run<S: Default>(&self, suite: &str, plan: &Plan<S>) -> RunSummary {
        info!("Running {} tests of {}", plan.len(), suite);

        let _hook = self.config.quiet_panics.then(QuietPanics::install);
        let mut shared: HashMap<ContextId, SharedState<S>> = HashMap::new();
        let mut reports = Vec::with_capacity(plan.len());

        for (index, record) in plan.records().iter().enumerate() {
            let report = self.run_record(plan, &mut shared, index, record);
            match report.outcome {
                TestOutcome::Passed | TestOutcome::Pending => debug!("  {}", report),
                TestOutcome::Failed => warn!("  {}", report),
                TestOutcome::Errored => error!("  {}", report),
            }
            reports.push(report);
        }

        let summary = RunSummary::new(suite, reports);
        info!(
            "Run completed - Pass: {} | Fail: {} | Error: {} | Pending: {}",
            summary.passed, summary.failed, summary.errored, summary.pending
        );
        summary
    }

    fn run_record<S: Default>(
        &self,
        plan: &Plan<S>,
        shared: &mut HashMap<ContextId, SharedState<S>>,
        index: usize,
        record: &TestCaseRecord<S>,
    ) -> TestReport {
        let name = record.full_name();
        let Some(body) = record.body() else {
            trace!(test = name, "pending, skipping setup and teardown");
            return TestReport::pending(name);
        };

        match record.binding() {
            StateBinding::Fresh => {
                let mut state = ExecutionState::new(S::default());
                state.enter(name);
                self.exercise(
                    &mut state,
                    record.before(),
                    record.setup_chain(),
                    body,
                    record.teardown_chain(),
                )
            }
            StateBinding::Shared(id) => {
                let Some(scope) = plan.scope(id) else {
                    return TestReport::errored(
                        name,
                        Phase::NotStarted,
                        format!("no static scope registered for context {id}"),
                    );
                };

                let report = {
                    let slot = shared
                        .entry(id)
                        .or_insert_with(|| self.acquire(scope, name));
                    match &slot.setup_fault {
                        Some(fault) => TestReport::errored(
                            name,
                            Phase::SettingUp,
                            format!(
                                "static context \"{}\" setup failed: {fault}",
                                scope.description()
                            ),
                        ),
                        None => {
                            slot.state.enter(name);
                            self.exercise(
                                &mut slot.state,
                                record.before(),
                                record.local_setups(),
                                body,
                                record.local_teardowns(),
                            )
                        }
                    }
                };

                if plan.is_last_use(id, index) {
                    if let Some(mut slot) = shared.remove(&id) {
                        let faults = self.tear_down(&mut slot.state, scope.teardown_chain());
                        debug!(
                            scope = %id,
                            "Released static context \"{}\"",
                            scope.description()
                        );
                        return report.with_teardown_faults(faults);
                    }
                }
                report
            }
        }
    }

    /// Create the shared state of `scope` and run its setups once
    fn acquire<S: Default>(&self, scope: &StaticScope<S>, first_test: &str) -> SharedState<S> {
        debug!(scope = %scope.id(), "Acquiring static context \"{}\"", scope.description());
        let mut state = ExecutionState::new(S::default());
        state.enter(first_test);

        let mut setup_fault = None;
        for action in scope.setup_chain() {
            if let Err(signal) = invoke(action, &mut state) {
                setup_fault = Some(signal.message());
                break;
            }
        }

        SharedState { state, setup_fault }
    }

    fn exercise<S>(
        &self,
        state: &mut ExecutionState<S>,
        before: Option<&Action<S>>,
        setups: &[Action<S>],
        body: &Action<S>,
        teardowns: &[Action<S>],
    ) -> TestReport {
        let name = state.test_name().to_string();
        let mut report = None;

        trace!(test = %name, phase = %Phase::SettingUp);
        for action in before.into_iter().chain(setups) {
            if let Err(signal) = invoke(action, state) {
                report = Some(TestReport::errored(&name, Phase::SettingUp, signal.message()));
                break;
            }
        }

        if report.is_none() {
            trace!(test = %name, phase = %Phase::Running);
            if let Err(signal) = invoke(body, state) {
                report = Some(match self.classifier.classify(&signal) {
                    SignalKind::AssertionFailure => {
                        TestReport::failed(&name, Phase::Running, signal.message())
                    }
                    SignalKind::OtherFault => {
                        TestReport::errored(&name, Phase::Running, signal.message())
                    }
                });
            }
        }

        trace!(test = %name, phase = %Phase::TearingDown);
        let faults = self.tear_down(state, teardowns);
        report
            .unwrap_or_else(|| TestReport::passed(&name))
            .with_teardown_faults(faults)
    }

    /// Run every teardown, collecting faults instead of stopping at the first
    fn tear_down<S>(&self, state: &mut ExecutionState<S>, teardowns: &[Action<S>]) -> Vec<String> {
        let mut faults = Vec::new();
        for action in teardowns {
            if let Err(signal) = invoke(action, state) {
                warn!(test = state.test_name(), "Teardown fault: {}", signal);
                faults.push(signal.message());
            }
        }
        faults
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

struct SharedState<S> {
    state: ExecutionState<S>,
    setup_fault: Option<String>,
}

type PanicHook = Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Silences the panic hook while actions run
struct QuietPanics {
    previous: Option<PanicHook>,
}

impl QuietPanics {
    fn install() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}
