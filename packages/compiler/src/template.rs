//! Compiled Template
//!
//! The reusable result of compiling one tree node: the deferred linking
//! callbacks collected for that node, the recorded positions of compiled
//! children, and the node's new-scope decision. Templates are immutable once
//! compilation finishes and are shared read-only across every link call.

use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

use crate::dom::{DataValue, NodeRef};
use crate::exception_handler::ExceptionHandler;
use crate::injector::{Injector, Local, Locals};
use crate::scope::{Scope, SCOPE_DATA_KEY};

/// A deferred linking callback, in the shape the behavior factory produced
/// it: a plain callable of the element, or one routed through the injection
/// collaborator with declared injectable names.
#[derive(Clone)]
pub enum LinkFn {
    /// Called directly with the scope as context.
    Direct(Rc<dyn Fn(&Scope, &NodeRef) -> anyhow::Result<()>>),
    /// Invoked through the injector with `$element` supplied as a local.
    Injected(Rc<InjectedLink>),
}

impl LinkFn {
    pub fn direct<F>(f: F) -> LinkFn
    where
        F: Fn(&Scope, &NodeRef) -> anyhow::Result<()> + 'static,
    {
        LinkFn::Direct(Rc::new(f))
    }

    pub fn injected<F>(inject: &[&str], run: F) -> LinkFn
    where
        F: Fn(&Scope, &[Local]) -> anyhow::Result<()> + 'static,
    {
        LinkFn::Injected(Rc::new(InjectedLink {
            inject: inject.iter().map(|name| name.to_string()).collect(),
            run: Rc::new(run),
        }))
    }
}

/// A linking callback with declared injectables.
pub struct InjectedLink {
    pub inject: Vec<String>,
    #[allow(clippy::type_complexity)]
    pub run: Rc<dyn Fn(&Scope, &[Local]) -> anyhow::Result<()>>,
}

/// A node's new-scope decision. At most one effective decision per node;
/// the first non-`Keep` setter wins.
#[derive(Clone, Default)]
pub enum NewScope {
    /// Link against the caller's scope.
    #[default]
    Keep,
    /// Create a plain child scope.
    Child,
    /// Create a child scope seeded from the producer's return value.
    ChildFrom(Rc<dyn Fn(&Scope) -> Value>),
}

impl NewScope {
    pub fn is_keep(&self) -> bool {
        matches!(self, NewScope::Keep)
    }
}

impl fmt::Debug for NewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewScope::Keep => f.write_str("Keep"),
            NewScope::Child => f.write_str("Child"),
            NewScope::ChildFrom(_) => f.write_str("ChildFrom(..)"),
        }
    }
}

/// Everything a link pass needs besides the tree: the collaborators the
/// compiler was built with.
#[derive(Clone)]
pub(crate) struct LinkContext {
    pub(crate) injector: Rc<dyn Injector>,
    pub(crate) exception_handler: Rc<dyn ExceptionHandler>,
}

/// Compiled form of one tree node.
#[derive(Default)]
pub struct Template {
    link_fns: SmallVec<[LinkFn; 2]>,
    paths: SmallVec<[usize; 4]>,
    children: Vec<Template>,
    new_scope: NewScope,
}

impl Template {
    pub(crate) fn add_link_fn(&mut self, link_fn: Option<LinkFn>) {
        if let Some(link_fn) = link_fn {
            self.link_fns.push(link_fn);
        }
    }

    pub(crate) fn add_child(&mut self, index: usize, child: Option<Template>) {
        if let Some(child) = child {
            self.paths.push(index);
            self.children.push(child);
        }
    }

    /// First effective setter wins; `Keep` never overrides a decision.
    pub(crate) fn set_new_scope(&mut self, decision: NewScope) {
        if self.new_scope.is_keep() {
            self.new_scope = decision;
        }
    }

    /// A template with no callbacks and no children contributes nothing at
    /// runtime and is dropped by its parent.
    pub fn is_empty(&self) -> bool {
        self.link_fns.is_empty() && self.paths.is_empty()
    }

    pub fn new_scope(&self) -> &NewScope {
        &self.new_scope
    }

    pub fn paths(&self) -> &[usize] {
        &self.paths
    }

    pub fn children(&self) -> &[Template] {
        &self.children
    }

    pub fn link_fn_count(&self) -> usize {
        self.link_fns.len()
    }

    /// Bind this template to a live element. Callback failures are reported
    /// and do not stop later callbacks or children.
    pub(crate) fn link(&self, element: &NodeRef, scope: &Scope, cx: &LinkContext) {
        let child_scope = match &self.new_scope {
            NewScope::Keep => scope.clone(),
            NewScope::Child => scope.new_child(),
            NewScope::ChildFrom(seed) => scope.new_child_from(seed(scope)),
        };
        if !self.new_scope.is_keep() {
            element.set_data(SCOPE_DATA_KEY, DataValue::Scope(child_scope.clone()));
        }

        let locals = Locals::element(element);
        for link_fn in &self.link_fns {
            let outcome = match link_fn {
                LinkFn::Injected(injected) => {
                    cx.injector.invoke_link(&child_scope, injected, &locals)
                }
                LinkFn::Direct(run) => run(&child_scope, element),
            };
            if let Err(error) = outcome {
                cx.exception_handler.handle(error);
            }
        }

        for (slot, path) in self.paths.iter().enumerate() {
            // the callbacks above may have grown or shrunk the live child
            // list; a recorded position that no longer holds a node is
            // skipped
            if let Some(child) = element.child_node(*path) {
                self.children[slot].link(&child, &child_scope, cx);
            }
        }
    }
}
