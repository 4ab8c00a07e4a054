//! Raised signals and their classification
//!
//! Anything an action raises, whether a returned error or a panic, becomes a
//! [`Signal`]. A [`FailureClassifier`] decides whether it is an assertion
//! failure or some other fault.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::assertion::AssertionFailure;
use crate::context::Action;
use crate::state::ExecutionState;

/// Something raised by an action
#[derive(Debug)]
pub enum Signal {
    Error(anyhow::Error),
    Panic { message: String },
}

impl Signal {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Signal::Panic { message }
    }

    pub fn message(&self) -> String {
        match self {
            Signal::Error(err) => format!("{err:#}"),
            Signal::Panic { message } => message.clone(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Error(err) => write!(f, "{err:#}"),
            Signal::Panic { message } => write!(f, "panicked: {message}"),
        }
    }
}

/// Classification of a raised signal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    AssertionFailure,
    OtherFault,
}

/// Decides which signals count as assertion failures
pub trait FailureClassifier {
    fn classify(&self, signal: &Signal) -> SignalKind;
}

impl<F> FailureClassifier for F
where
    F: Fn(&Signal) -> SignalKind,
{
    fn classify(&self, signal: &Signal) -> SignalKind {
        self(signal)
    }
}

/// Classifies by signal type, never by message text.
///
/// A panic is how `assert!` and friends report a broken expectation, so every
/// panic is an assertion failure, as under `cargo test`. A returned error is
/// an assertion failure only when it carries [`AssertionFailure`]; any other
/// returned error is a fault.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultClassifier;

impl FailureClassifier for DefaultClassifier {
    fn classify(&self, signal: &Signal) -> SignalKind {
        let is_assertion = match signal {
            Signal::Error(err) => err.downcast_ref::<AssertionFailure>().is_some(),
            Signal::Panic { .. } => true,
        };
        if is_assertion {
            SignalKind::AssertionFailure
        } else {
            SignalKind::OtherFault
        }
    }
}

/// Invoke `action`, turning returned errors and panics into signals
pub(crate) fn invoke<S>(action: &Action<S>, state: &mut ExecutionState<S>) -> Result<(), Signal> {
    match catch_unwind(AssertUnwindSafe(|| action(state))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Signal::Error(err)),
        Err(payload) => Err(Signal::from_panic(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::flunk;
    use crate::context::ActionResult;
    use std::rc::Rc;

    #[test]
    fn test_default_classifier() {
        let classifier = DefaultClassifier;
        assert_eq!(
            classifier.classify(&Signal::Error(flunk("nope"))),
            SignalKind::AssertionFailure
        );
        assert_eq!(
            classifier.classify(&Signal::Error(anyhow::anyhow!("io"))),
            SignalKind::OtherFault
        );
        assert_eq!(
            classifier.classify(&Signal::Panic {
                message: "assertion `left == right` failed".into()
            }),
            SignalKind::AssertionFailure
        );
    }

    #[test]
    fn test_message_text_does_not_decide_kind() {
        let classifier = DefaultClassifier;
        assert_eq!(
            classifier.classify(&Signal::Error(anyhow::anyhow!(
                "assertion database unavailable"
            ))),
            SignalKind::OtherFault
        );
        assert_eq!(
            classifier.classify(&Signal::Panic {
                message: "expected one item".into()
            }),
            SignalKind::AssertionFailure
        );
    }

    #[test]
    fn test_custom_assert_message_is_a_failure() {
        let action: Action<u32> = Rc::new(|st: &mut ExecutionState<u32>| -> ActionResult {
            assert!(**st == 1, "expected one item");
            Ok(())
        });
        let mut state = ExecutionState::new(0);
        let signal = invoke(&action, &mut state).unwrap_err();
        assert_eq!(signal.message(), "expected one item");
        assert_eq!(
            DefaultClassifier.classify(&signal),
            SignalKind::AssertionFailure
        );
    }

    #[test]
    fn test_closure_classifier() {
        let everything_fails = |_: &Signal| SignalKind::AssertionFailure;
        assert_eq!(
            everything_fails.classify(&Signal::Error(anyhow::anyhow!("io"))),
            SignalKind::AssertionFailure
        );
    }

    #[test]
    fn test_invoke_catches_panics() {
        let action: Action<()> = Rc::new(|_: &mut ExecutionState<()>| -> ActionResult {
            panic!("kaboom")
        });
        let mut state = ExecutionState::new(());
        match invoke(&action, &mut state) {
            Err(Signal::Panic { message }) => assert_eq!(message, "kaboom"),
            other => panic!("expected panic signal, got {other:?}"),
        }
    }

    #[test]
    fn test_invoke_passes_errors_through() {
        let action: Action<()> = Rc::new(|_: &mut ExecutionState<()>| Err(flunk("expected")));
        let mut state = ExecutionState::new(());
        let signal = invoke(&action, &mut state).unwrap_err();
        assert_eq!(signal.message(), "expected");
    }
}
