//! Context tree
//!
//! A context is a named scope grouping setup and teardown actions, tests
//! and nested contexts. The tree is built once through [`ContextBuilder`]
//! and is immutable afterwards.

mod builder;

pub use builder::ContextBuilder;

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::error::BuildError;
use crate::state::ExecutionState;

/// Outcome of a single action invocation
pub type ActionResult = anyhow::Result<()>;

/// A setup, teardown, before-hook or test body
pub type Action<S> = Rc<dyn Fn(&mut ExecutionState<S>) -> ActionResult>;

/// Identity of a context node within its tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContextId(usize);

impl ContextId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self) -> ContextId {
        let id = ContextId(self.next);
        self.next += 1;
        id
    }
}

/// A declared test
pub struct TestDeclaration<S> {
    description: String,
    body: Option<Action<S>>,
    before: Option<Action<S>>,
    marked_pending: bool,
}

impl<S> TestDeclaration<S> {
    pub(crate) fn new(description: String, body: Option<Action<S>>) -> Self {
        Self {
            description,
            body,
            before: None,
            marked_pending: false,
        }
    }

    pub(crate) fn pending(mut self) -> Self {
        self.marked_pending = true;
        self
    }

    pub(crate) fn with_before(mut self, before: Action<S>) -> Self {
        self.before = Some(before);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Pending when explicitly marked or declared without a body
    pub fn is_pending(&self) -> bool {
        self.marked_pending || self.body.is_none()
    }

    /// The body to execute; `None` for pending declarations even if a body was given
    pub fn runnable_body(&self) -> Option<&Action<S>> {
        if self.marked_pending {
            None
        } else {
            self.body.as_ref()
        }
    }

    pub fn before(&self) -> Option<&Action<S>> {
        self.before.as_ref()
    }
}

impl<S> fmt::Debug for TestDeclaration<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDeclaration")
            .field("description", &self.description)
            .field("pending", &self.is_pending())
            .field("before", &self.before.is_some())
            .finish()
    }
}

/// Entry of a context, kept in declaration order
pub(crate) enum Member<S> {
    Test(TestDeclaration<S>),
    Context(ContextNode<S>),
}

/// One nested scope of the context tree
pub struct ContextNode<S> {
    id: ContextId,
    description: String,
    is_static: bool,
    setups: Vec<Action<S>>,
    teardowns: Vec<Action<S>>,
    members: Vec<Member<S>>,
}

impl<S: 'static> ContextNode<S> {
    /// Build a root context by evaluating `block` against it
    pub fn build<F>(description: impl Into<String>, block: F) -> Result<Self, BuildError>
    where
        F: FnOnce(&mut ContextBuilder<'_, S>) -> Result<(), BuildError>,
    {
        let mut ids = IdAllocator::default();
        let mut root = ContextNode::new(ids.allocate(), description.into(), false);
        ContextBuilder::new(&mut root, &mut ids).merge_block(block)?;
        Ok(root)
    }
}

impl<S> ContextNode<S> {
    pub(crate) fn new(id: ContextId, description: String, is_static: bool) -> Self {
        Self {
            id,
            description,
            is_static,
            setups: Vec::new(),
            teardowns: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn setups(&self) -> &[Action<S>] {
        &self.setups
    }

    pub fn teardowns(&self) -> &[Action<S>] {
        &self.teardowns
    }

    /// Child contexts in declaration order
    pub fn children(&self) -> impl Iterator<Item = &ContextNode<S>> {
        self.members.iter().filter_map(|m| match m {
            Member::Context(node) => Some(node),
            Member::Test(_) => None,
        })
    }

    /// Locally declared tests in declaration order
    pub fn tests(&self) -> impl Iterator<Item = &TestDeclaration<S>> {
        self.members.iter().filter_map(|m| match m {
            Member::Test(test) => Some(test),
            Member::Context(_) => None,
        })
    }

    pub(crate) fn members(&self) -> &[Member<S>] {
        &self.members
    }

    /// Number of test declarations in this subtree
    pub fn test_count(&self) -> usize {
        self.members
            .iter()
            .map(|m| match m {
                Member::Test(_) => 1,
                Member::Context(node) => node.test_count(),
            })
            .sum()
    }
}

impl<S> fmt::Debug for ContextNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextNode")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("is_static", &self.is_static)
            .field("setups", &self.setups.len())
            .field("teardowns", &self.teardowns.len())
            .field("tests", &self.tests().collect::<Vec<_>>())
            .field("children", &self.children().collect::<Vec<_>>())
            .finish()
    }
}
