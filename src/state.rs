//! Execution state
//!
//! The mutable field bag a test's setups, body and teardowns run against.
//! Dynamic contexts get a fresh one per test; a static context shares one
//! across every test bound to it.

use std::ops::{Deref, DerefMut};

/// Mutable state hosting one or more test executions
#[derive(Debug, Default)]
pub struct ExecutionState<S> {
    fields: S,
    test_name: String,
}

impl<S> ExecutionState<S> {
    pub fn new(fields: S) -> Self {
        Self {
            fields,
            test_name: String::new(),
        }
    }

    /// Full name of the test currently executing against this state
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub(crate) fn enter(&mut self, test_name: &str) {
        self.test_name.clear();
        self.test_name.push_str(test_name);
    }

    pub fn fields(&self) -> &S {
        &self.fields
    }

    pub fn into_fields(self) -> S {
        self.fields
    }
}

impl<S> Deref for ExecutionState<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.fields
    }
}

impl<S> DerefMut for ExecutionState<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }

    #[test]
    fn test_field_access_through_deref() {
        let mut state = ExecutionState::new(Counter::default());
        state.hits += 2;
        assert_eq!(state.fields().hits, 2);
        assert_eq!(state.into_fields().hits, 2);
    }

    #[test]
    fn test_enter_replaces_name() {
        let mut state = ExecutionState::new(());
        state.enter("test: a should b");
        state.enter("test: a should c");
        assert_eq!(state.test_name(), "test: a should c");
    }
}
