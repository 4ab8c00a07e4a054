//! Declarative context builder
//!
//! Every call appends to the node currently being built. Builder calls are
//! ordinary method calls, so tests can be generated in plain loops.

use std::rc::Rc;

use tracing::trace;

use super::{Action, ActionResult, ContextNode, IdAllocator, Member, TestDeclaration};
use crate::error::BuildError;
use crate::state::ExecutionState;

/// Builder targeting one context node
pub struct ContextBuilder<'a, S> {
    node: &'a mut ContextNode<S>,
    ids: &'a mut IdAllocator,
}

impl<'a, S: 'static> ContextBuilder<'a, S> {
    pub(crate) fn new(node: &'a mut ContextNode<S>, ids: &'a mut IdAllocator) -> Self {
        Self { node, ids }
    }

    /// Description of the node being built
    pub fn description(&self) -> &str {
        self.node.description()
    }

    pub fn is_static(&self) -> bool {
        self.node.is_static()
    }

    /// Append a setup action
    pub fn setup<F>(&mut self, action: F) -> &mut Self
    where
        F: Fn(&mut ExecutionState<S>) -> ActionResult + 'static,
    {
        self.node.setups.push(Rc::new(action));
        self
    }

    /// Append a teardown action
    pub fn teardown<F>(&mut self, action: F) -> &mut Self
    where
        F: Fn(&mut ExecutionState<S>) -> ActionResult + 'static,
    {
        self.node.teardowns.push(Rc::new(action));
        self
    }

    /// Declare a test named `should <description>`
    pub fn should<F>(&mut self, description: impl AsRef<str>, body: F) -> &mut Self
    where
        F: Fn(&mut ExecutionState<S>) -> ActionResult + 'static,
    {
        let body: Action<S> = Rc::new(body);
        self.push_test(TestDeclaration::new(should_name(description), Some(body)))
    }

    /// Declare a `should` without a body; it is always pending
    pub fn should_stub(&mut self, description: impl AsRef<str>) -> &mut Self {
        self.push_test(TestDeclaration::new(should_name(description), None))
    }

    /// Declare a test whose `before` hook runs ahead of the setup chain.
    ///
    /// Static contexts reject this: their setups run once for the whole
    /// subtree, so there is no per-test point to hook into.
    pub fn should_with_before<B, F>(
        &mut self,
        description: impl AsRef<str>,
        before: B,
        body: F,
    ) -> Result<&mut Self, BuildError>
    where
        B: Fn(&mut ExecutionState<S>) -> ActionResult + 'static,
        F: Fn(&mut ExecutionState<S>) -> ActionResult + 'static,
    {
        if self.node.is_static() {
            return Err(BuildError::invalid_operation(
                format!("should({:?}, before)", description.as_ref()),
                self.node.description(),
            ));
        }
        let body: Action<S> = Rc::new(body);
        let declaration =
            TestDeclaration::new(should_name(description), Some(body)).with_before(Rc::new(before));
        Ok(self.push_test(declaration))
    }

    /// Declare an explicitly pending test without a body
    pub fn should_eventually(&mut self, description: impl AsRef<str>) -> &mut Self {
        self.push_test(TestDeclaration::new(should_name(description), None).pending())
    }

    /// Declare an explicitly pending test; `body` is kept but never executed
    pub fn should_eventually_with<F>(
        &mut self,
        description: impl AsRef<str>,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&mut ExecutionState<S>) -> ActionResult + 'static,
    {
        let body: Action<S> = Rc::new(body);
        self.push_test(TestDeclaration::new(should_name(description), Some(body)).pending())
    }

    /// Declare a test named exactly `description`
    pub fn test<F>(&mut self, description: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&mut ExecutionState<S>) -> ActionResult + 'static,
    {
        let body: Action<S> = Rc::new(body);
        self.push_test(TestDeclaration::new(description.into(), Some(body)))
    }

    /// Declare a nested context
    pub fn context<F>(
        &mut self,
        description: impl Into<String>,
        block: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: FnOnce(&mut ContextBuilder<'_, S>) -> Result<(), BuildError>,
    {
        self.child(description.into(), false, block)
    }

    /// Declare a nested context whose setups and teardowns run once for the
    /// whole subtree
    pub fn static_context<F>(
        &mut self,
        description: impl Into<String>,
        block: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: FnOnce(&mut ContextBuilder<'_, S>) -> Result<(), BuildError>,
    {
        self.child(description.into(), true, block)
    }

    /// Apply a captured block to this node without adding a nesting level
    pub fn merge_block<F>(&mut self, block: F) -> Result<&mut Self, BuildError>
    where
        F: FnOnce(&mut ContextBuilder<'_, S>) -> Result<(), BuildError>,
    {
        block(&mut ContextBuilder::new(&mut *self.node, &mut *self.ids))?;
        Ok(self)
    }

    fn child<F>(
        &mut self,
        description: String,
        is_static: bool,
        block: F,
    ) -> Result<&mut Self, BuildError>
    where
        F: FnOnce(&mut ContextBuilder<'_, S>) -> Result<(), BuildError>,
    {
        let mut child = ContextNode::new(self.ids.allocate(), description, is_static);
        trace!(id = %child.id(), description = child.description(), is_static, "building context");
        block(&mut ContextBuilder::new(&mut child, &mut *self.ids))?;
        self.node.members.push(Member::Context(child));
        Ok(self)
    }

    fn push_test(&mut self, declaration: TestDeclaration<S>) -> &mut Self {
        self.node.members.push(Member::Test(declaration));
        self
    }
}

fn should_name(description: impl AsRef<str>) -> String {
    format!("should {}", description.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut ExecutionState<()>) -> ActionResult {
        Ok(())
    }

    #[test]
    fn test_declarations_append_to_current_node() {
        let root = ContextNode::build("", |ctx| {
            ctx.setup(noop).setup(noop).teardown(noop);
            ctx.should("run", noop).should_stub("wait");
            Ok(())
        })
        .unwrap();

        assert_eq!(root.setups().len(), 2);
        assert_eq!(root.teardowns().len(), 1);
        let names: Vec<_> = root.tests().map(|t| t.description().to_string()).collect();
        assert_eq!(names, vec!["should run", "should wait"]);
    }

    #[test]
    fn test_generated_in_loop() {
        let root = ContextNode::build("", |ctx| {
            for i in 0..5 {
                ctx.should(format!("check #{i}"), noop);
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(root.test_count(), 5);
    }

    #[test]
    fn test_merge_block_adds_no_level() {
        fn shared(ctx: &mut ContextBuilder<'_, ()>) -> Result<(), BuildError> {
            ctx.setup(noop);
            ctx.should("come from the macro", noop);
            ctx.context("inner", |_| Ok(()))?;
            Ok(())
        }

        let root = ContextNode::build("", |ctx| {
            ctx.context("outer", |ctx| {
                ctx.merge_block(shared)?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let outer = root.children().next().unwrap();
        assert_eq!(outer.setups().len(), 1);
        assert_eq!(outer.tests().count(), 1);
        assert_eq!(outer.children().count(), 1);
        assert_eq!(outer.children().next().unwrap().description(), "inner");
    }

    #[test]
    fn test_static_context_rejects_before_hook() {
        let result = ContextNode::build("", |ctx| {
            ctx.static_context("stash", |ctx| {
                ctx.should_with_before("foo", noop, noop)?;
                Ok(())
            })?;
            Ok(())
        });

        match result {
            Err(BuildError::InvalidOperation { call, context }) => {
                assert!(call.contains("foo"));
                assert_eq!(context, "stash");
            }
            other => panic!("expected InvalidOperation, got {other:?}"),
        }
    }

    #[test]
    fn test_dynamic_context_accepts_before_hook() {
        let root = ContextNode::build("", |ctx| {
            ctx.context("dynamic", |ctx| {
                ctx.should_with_before("foo", noop, noop)?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let dynamic = root.children().next().unwrap();
        assert!(dynamic.tests().next().unwrap().before().is_some());
    }

    #[test]
    fn test_pending_variants() {
        let root = ContextNode::<()>::build("", |ctx| {
            ctx.should_eventually("later");
            ctx.should_eventually_with("never run", |_| anyhow::bail!("ran"));
            ctx.should_stub("piggyback");
            Ok(())
        })
        .unwrap();

        assert!(root.tests().all(|t| t.is_pending()));
        assert!(root.tests().all(|t| t.runnable_body().is_none()));
    }
}
