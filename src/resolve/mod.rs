//! Flattening pass
//!
//! Walks a context tree depth-first and produces one [`TestCaseRecord`] per
//! declared test, in declaration order. Each record carries its inherited
//! setup and teardown chains, its composed name and the state instance it
//! must execute against.
//!
//! ## State binding
//!
//! A record with no static ancestor gets fresh state. Otherwise it shares the
//! state of its *nearest* static ancestor (itself included). That ancestor's
//! [`StaticScope`] owns the prefix of the setup chain up to and including the
//! static node, and the matching suffix of the teardown chain; both run once
//! per scope. The rest of each chain still runs per test.

mod name;

pub use name::{compose_name, NAME_MARKER};

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::context::{Action, ContextId, ContextNode, Member, TestDeclaration};

/// Which execution state a record runs against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateBinding {
    /// New state for this record alone
    Fresh,
    /// The shared state of the static context with this id
    Shared(ContextId),
}

/// One executable test, fully resolved
pub struct TestCaseRecord<S> {
    full_name: String,
    before: Option<Action<S>>,
    setup_chain: Vec<Action<S>>,
    teardown_chain: Vec<Action<S>>,
    body: Option<Action<S>>,
    binding: StateBinding,
    shared_setups: usize,
    shared_teardowns: usize,
}

impl<S> TestCaseRecord<S> {
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn is_pending(&self) -> bool {
        self.body.is_none()
    }

    pub fn body(&self) -> Option<&Action<S>> {
        self.body.as_ref()
    }

    pub fn before(&self) -> Option<&Action<S>> {
        self.before.as_ref()
    }

    pub fn binding(&self) -> StateBinding {
        self.binding
    }

    /// Every inherited setup, root first
    pub fn setup_chain(&self) -> &[Action<S>] {
        &self.setup_chain
    }

    /// Every inherited teardown, innermost level first
    pub fn teardown_chain(&self) -> &[Action<S>] {
        &self.teardown_chain
    }

    /// Setups run for this record alone (below its static scope, if any)
    pub fn local_setups(&self) -> &[Action<S>] {
        &self.setup_chain[self.shared_setups..]
    }

    /// Teardowns run for this record alone (below its static scope, if any)
    pub fn local_teardowns(&self) -> &[Action<S>] {
        &self.teardown_chain[..self.teardown_chain.len() - self.shared_teardowns]
    }
}

impl<S> fmt::Debug for TestCaseRecord<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCaseRecord")
            .field("full_name", &self.full_name)
            .field("pending", &self.is_pending())
            .field("binding", &self.binding)
            .field("setups", &self.setup_chain.len())
            .field("teardowns", &self.teardown_chain.len())
            .finish()
    }
}

/// Shared state scope of one static context
pub struct StaticScope<S> {
    id: ContextId,
    description: String,
    setup_chain: Vec<Action<S>>,
    teardown_chain: Vec<Action<S>>,
    members: usize,
    last_use: Option<usize>,
}

impl<S> StaticScope<S> {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Setups run once, when the shared state is first acquired.
    ///
    /// This is the full chain from the root through this static node. A
    /// static context nested inside another static context is a scope of its
    /// own with fresh state, so the outer static's setups run again when the
    /// inner scope is acquired: once per scope, not once per subtree.
    pub fn setup_chain(&self) -> &[Action<S>] {
        &self.setup_chain
    }

    /// Teardowns run once, after the last record using the state
    pub fn teardown_chain(&self) -> &[Action<S>] {
        &self.teardown_chain
    }

    /// Number of records bound to this scope
    pub fn members(&self) -> usize {
        self.members
    }

    /// Index of the last non-pending record bound to this scope
    pub fn last_use(&self) -> Option<usize> {
        self.last_use
    }
}

impl<S> fmt::Debug for StaticScope<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticScope")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("members", &self.members)
            .field("last_use", &self.last_use)
            .finish()
    }
}

/// Records of a tree in execution order, plus their static scopes
pub struct Plan<S> {
    records: Vec<TestCaseRecord<S>>,
    scopes: BTreeMap<ContextId, StaticScope<S>>,
}

impl<S> Plan<S> {
    pub fn records(&self) -> &[TestCaseRecord<S>] {
        &self.records
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.full_name()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn scope(&self, id: ContextId) -> Option<&StaticScope<S>> {
        self.scopes.get(&id)
    }

    pub fn scopes(&self) -> impl Iterator<Item = &StaticScope<S>> {
        self.scopes.values()
    }

    /// Whether the record at `index` is the last user of `id`'s shared state
    pub fn is_last_use(&self, id: ContextId, index: usize) -> bool {
        self.scope(id).and_then(StaticScope::last_use) == Some(index)
    }
}

impl<S> fmt::Debug for Plan<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("records", &self.records)
            .field("scopes", &self.scopes.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Flattens context trees into plans
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    filter: Option<String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only records whose full name contains `filter` (case-insensitive)
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into().to_lowercase());
        self
    }

    pub fn resolve<S>(&self, root: &ContextNode<S>) -> Plan<S> {
        let mut records = Vec::new();
        let mut scopes = BTreeMap::new();
        walk(root, &mut Vec::new(), &mut records, &mut scopes);

        if let Some(filter) = &self.filter {
            records.retain(|r: &TestCaseRecord<S>| r.full_name.to_lowercase().contains(filter));
        }

        for (index, record) in records.iter().enumerate() {
            if let StateBinding::Shared(id) = record.binding {
                if let Some(scope) = scopes.get_mut(&id) {
                    scope.members += 1;
                    if !record.is_pending() {
                        scope.last_use = Some(index);
                    }
                }
            }
        }
        scopes.retain(|_, scope| scope.members > 0);

        debug!(
            records = records.len(),
            static_scopes = scopes.len(),
            "Resolved context tree"
        );

        Plan { records, scopes }
    }
}

/// Resolve every test of `root` with no filtering
pub fn resolve<S>(root: &ContextNode<S>) -> Plan<S> {
    Resolver::new().resolve(root)
}

fn walk<'a, S>(
    node: &'a ContextNode<S>,
    path: &mut Vec<&'a ContextNode<S>>,
    records: &mut Vec<TestCaseRecord<S>>,
    scopes: &mut BTreeMap<ContextId, StaticScope<S>>,
) {
    path.push(node);

    if node.is_static() {
        scopes.insert(node.id(), static_scope(path));
    }

    for member in node.members() {
        match member {
            Member::Test(test) => records.push(record(path, test)),
            Member::Context(child) => walk(child, path, records, scopes),
        }
    }

    path.pop();
}

fn record<S>(path: &[&ContextNode<S>], test: &TestDeclaration<S>) -> TestCaseRecord<S> {
    let full_name = compose_name(path.iter().map(|n| n.description()), test.description());

    let (binding, shared_setups, shared_teardowns) =
        match path.iter().rposition(|n| n.is_static()) {
            Some(nearest) => {
                let owned = &path[..=nearest];
                (
                    StateBinding::Shared(path[nearest].id()),
                    owned.iter().map(|n| n.setups().len()).sum(),
                    owned.iter().map(|n| n.teardowns().len()).sum(),
                )
            }
            None => (StateBinding::Fresh, 0, 0),
        };

    TestCaseRecord {
        full_name,
        before: test.before().cloned(),
        setup_chain: setup_chain(path),
        teardown_chain: teardown_chain(path),
        body: test.runnable_body().cloned(),
        binding,
        shared_setups,
        shared_teardowns,
    }
}

fn static_scope<S>(path: &[&ContextNode<S>]) -> StaticScope<S> {
    let node = path[path.len() - 1];
    StaticScope {
        id: node.id(),
        description: node.description().to_string(),
        setup_chain: setup_chain(path),
        teardown_chain: teardown_chain(path),
        members: 0,
        last_use: None,
    }
}

fn setup_chain<S>(path: &[&ContextNode<S>]) -> Vec<Action<S>> {
    path.iter()
        .flat_map(|n| n.setups().iter().cloned())
        .collect()
}

fn teardown_chain<S>(path: &[&ContextNode<S>]) -> Vec<Action<S>> {
    path.iter()
        .rev()
        .flat_map(|n| n.teardowns().iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ActionResult;
    use crate::state::ExecutionState;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn noop(_: &mut ExecutionState<()>) -> ActionResult {
        Ok(())
    }

    fn push(log: &Log, label: &'static str) -> impl Fn(&mut ExecutionState<()>) -> ActionResult {
        let log = log.clone();
        move |_| {
            log.borrow_mut().push(label);
            Ok(())
        }
    }

    fn replay(actions: &[Action<()>]) {
        let mut state = ExecutionState::new(());
        for action in actions {
            action(&mut state).unwrap();
        }
    }

    #[test]
    fn test_one_record_per_declaration() {
        let root = ContextNode::build("", |ctx| {
            ctx.should("a", noop);
            ctx.context("x", |ctx| {
                ctx.should_stub("b");
                ctx.static_context("y", |ctx| {
                    ctx.should("c", noop);
                    ctx.should_eventually("d");
                    Ok(())
                })?;
                Ok(())
            })?;
            ctx.should("e", noop);
            Ok(())
        })
        .unwrap();

        let plan = resolve(&root);
        assert_eq!(plan.len(), root.test_count());
        assert_eq!(
            plan.names(),
            vec![
                "test: should a",
                "test: x should b",
                "test: x y should c",
                "test: x y should d",
                "test: should e",
            ]
        );
    }

    #[test]
    fn test_nested_names() {
        let root = ContextNode::build("", |ctx| {
            ctx.context("A", |ctx| {
                ctx.context("B", |ctx| {
                    ctx.test("X", noop);
                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        assert_eq!(resolve(&root).names(), vec!["test: A B X"]);
    }

    #[test]
    fn test_chain_ordering() {
        let log: Log = Rc::default();
        let root = ContextNode::build("", |ctx| {
            ctx.context("A", |ctx| {
                ctx.setup(push(&log, "S1")).setup(push(&log, "S2"));
                ctx.teardown(push(&log, "T1"));
                ctx.context("B", |ctx| {
                    ctx.setup(push(&log, "S3"));
                    ctx.teardown(push(&log, "T2"));
                    ctx.should("order", noop);
                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let plan = resolve(&root);
        let record = &plan.records()[0];
        replay(record.setup_chain());
        replay(record.teardown_chain());
        assert_eq!(*log.borrow(), vec!["S1", "S2", "S3", "T2", "T1"]);
    }

    #[test]
    fn test_binding_uses_nearest_static() {
        let root = ContextNode::build("", |ctx| {
            ctx.should("fresh", noop);
            ctx.static_context("outer", |ctx| {
                ctx.setup(noop);
                ctx.should("outer test", noop);
                ctx.context("dynamic", |ctx| {
                    ctx.setup(noop);
                    ctx.teardown(noop);
                    ctx.should("dynamic test", noop);
                    Ok(())
                })?;
                ctx.static_context("inner", |ctx| {
                    ctx.setup(noop);
                    ctx.should("inner test", noop);
                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let outer = root.children().next().unwrap();
        let inner = outer.children().nth(1).unwrap();
        let plan = resolve(&root);
        let records = plan.records();

        assert_eq!(records[0].binding(), StateBinding::Fresh);
        assert_eq!(records[1].binding(), StateBinding::Shared(outer.id()));
        assert_eq!(records[2].binding(), StateBinding::Shared(outer.id()));
        assert_eq!(records[3].binding(), StateBinding::Shared(inner.id()));

        assert_eq!(records[2].setup_chain().len(), 2);
        assert_eq!(records[2].local_setups().len(), 1);
        assert_eq!(records[2].local_teardowns().len(), 1);
        assert!(records[3].local_setups().is_empty());

        let outer_scope = plan.scope(outer.id()).unwrap();
        assert_eq!(outer_scope.members(), 2);
        assert_eq!(outer_scope.last_use(), Some(2));
        assert_eq!(outer_scope.setup_chain().len(), 1);

        let inner_scope = plan.scope(inner.id()).unwrap();
        assert_eq!(inner_scope.setup_chain().len(), 2);
        assert!(plan.is_last_use(inner.id(), 3));
    }

    #[test]
    fn test_pending_records_do_not_extend_scope() {
        let root = ContextNode::build("", |ctx| {
            ctx.static_context("s", |ctx| {
                ctx.should("runs", noop);
                ctx.should_eventually("later");
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let plan = resolve(&root);
        let scope = plan.scopes().next().unwrap();
        assert_eq!(scope.members(), 2);
        assert_eq!(scope.last_use(), Some(0));
    }

    #[test]
    fn test_deeply_nested_pending_resolves_once() {
        let root = ContextNode::<()>::build("", |ctx| {
            ctx.context("context", |ctx| {
                ctx.context("with nested subcontexts", |ctx| {
                    ctx.should_eventually("only print this statement once");
                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let plan = resolve(&root);
        assert_eq!(plan.len(), 1);
        assert!(plan.records()[0].is_pending());
    }

    #[test]
    fn test_filter_recomputes_last_use() {
        let root = ContextNode::build("", |ctx| {
            ctx.static_context("s", |ctx| {
                ctx.should("keep one", noop);
                ctx.should("drop", noop);
                ctx.should("keep two", noop);
                Ok(())
            })?;
            ctx.static_context("gone", |ctx| {
                ctx.should("drop too", noop);
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let plan = Resolver::new().with_filter("KEEP").resolve(&root);
        assert_eq!(plan.names(), vec!["test: s should keep one", "test: s should keep two"]);
        assert_eq!(plan.scopes().count(), 1);
        assert_eq!(plan.scopes().next().unwrap().last_use(), Some(1));
    }
}
