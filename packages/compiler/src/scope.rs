//! Data-Binding Scope
//!
//! A hierarchical value store: reads walk the parent chain, writes stay
//! local, children can be seeded from an object. This is just enough scope
//! machinery for linking; change detection lives outside this crate.

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dom::{NodeRef, WeakNodeRef};

/// Data key under which a linked element carries its bound scope.
pub const SCOPE_DATA_KEY: &str = "$$scope";

/// Shared handle to one scope. Clones refer to the same scope; equality is
/// identity.
#[derive(Clone, Default)]
pub struct Scope {
    inner: Rc<RefCell<ScopeInner>>,
}

#[derive(Default)]
struct ScopeInner {
    parent: Option<Scope>,
    values: Map<String, Value>,
    // weak: the element's document owns scope annotations, a strong handle
    // here would cycle
    element: Option<WeakNodeRef>,
}

impl Scope {
    /// A fresh root scope.
    pub fn new() -> Scope {
        Scope::default()
    }

    /// A child scope inheriting reads from `self`.
    pub fn new_child(&self) -> Scope {
        let child = Scope::new();
        child.inner.borrow_mut().parent = Some(self.clone());
        child
    }

    /// A child scope seeded with the entries of `seed` (non-object seeds
    /// contribute nothing).
    pub fn new_child_from(&self, seed: Value) -> Scope {
        let child = self.new_child();
        if let Value::Object(entries) = seed {
            child.inner.borrow_mut().values = entries;
        }
        child
    }

    /// Read a value, walking up the parent chain.
    pub fn get(&self, key: &str) -> Option<Value> {
        let inner = self.inner.borrow();
        match inner.values.get(key) {
            Some(value) => Some(value.clone()),
            None => inner.parent.as_ref().and_then(|parent| parent.get(key)),
        }
    }

    /// Write a value locally, shadowing any parent entry.
    pub fn set(&self, key: &str, value: Value) {
        self.inner.borrow_mut().values.insert(key.to_string(), value);
    }

    pub fn parent(&self) -> Option<Scope> {
        self.inner.borrow().parent.clone()
    }

    pub fn root(&self) -> Scope {
        match self.parent() {
            Some(parent) => parent.root(),
            None => self.clone(),
        }
    }

    /// The element this scope was last bound to, if still alive.
    pub fn element(&self) -> Option<NodeRef> {
        let element = self.inner.borrow().element.clone();
        element.and_then(|weak| weak.upgrade())
    }

    pub fn set_element(&self, element: &NodeRef) {
        self.inner.borrow_mut().element = Some(element.downgrade());
    }

    pub fn same(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scope")
            .field("values", &inner.values)
            .field("has_parent", &inner.parent.is_some())
            .finish()
    }
}
