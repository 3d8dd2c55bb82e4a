//! Injection Collaborator
//!
//! Behavior factories and linking callbacks may declare the injectables they
//! want by name instead of taking positional arguments. The compiler routes
//! those through an [`Injector`], which resolves each declared name and
//! calls the target. The shipped [`LocalInjector`] resolves from the
//! supplied locals only; an application with a real service container can
//! implement the trait over it.

use anyhow::{anyhow, Result};

use crate::compiler::CompileApi;
use crate::dom::NodeRef;
use crate::registry::InjectedFactory;
use crate::scope::Scope;
use crate::template::InjectedLink;

/// Name of the matched-element local.
pub const ELEMENT_LOCAL: &str = "$element";
/// Name of the matched-attribute-value local.
pub const VALUE_LOCAL: &str = "$value";

/// The values available for injection at one invocation site.
#[derive(Clone, Default)]
pub struct Locals {
    pub element: Option<NodeRef>,
    pub value: Option<String>,
}

impl Locals {
    pub fn element(element: &NodeRef) -> Locals {
        Locals {
            element: Some(element.clone()),
            value: None,
        }
    }

    pub fn with_value(element: &NodeRef, value: impl Into<String>) -> Locals {
        Locals {
            element: Some(element.clone()),
            value: Some(value.into()),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Local> {
        match name {
            ELEMENT_LOCAL => self.element.clone().map(Local::Element),
            VALUE_LOCAL => self.value.clone().map(Local::Value),
            _ => None,
        }
    }
}

/// A resolved injectable.
#[derive(Clone, Debug)]
pub enum Local {
    Element(NodeRef),
    Value(String),
}

impl Local {
    pub fn as_element(&self) -> Option<&NodeRef> {
        match self {
            Local::Element(element) => Some(element),
            Local::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Local::Value(value) => Some(value),
            Local::Element(_) => None,
        }
    }
}

/// Instantiates behavior factories and runs injected linking callbacks.
///
/// The two entry points differ only in their context: factories run during
/// compilation against the per-call compiler API, callbacks run during
/// linking against the bound scope.
pub trait Injector {
    fn invoke_factory(
        &self,
        api: &CompileApi<'_>,
        factory: &InjectedFactory,
        locals: &Locals,
    ) -> Result<Option<crate::template::LinkFn>>;

    fn invoke_link(&self, scope: &Scope, link: &InjectedLink, locals: &Locals) -> Result<()>;
}

/// Resolves declared injectables from the supplied locals, nothing else.
/// Unknown names are an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalInjector;

impl LocalInjector {
    fn resolve(locals: &Locals, names: &[String]) -> Result<Vec<Local>> {
        names
            .iter()
            .map(|name| {
                locals
                    .resolve(name)
                    .ok_or_else(|| anyhow!("unknown injectable '{name}'"))
            })
            .collect()
    }
}

impl Injector for LocalInjector {
    fn invoke_factory(
        &self,
        api: &CompileApi<'_>,
        factory: &InjectedFactory,
        locals: &Locals,
    ) -> Result<Option<crate::template::LinkFn>> {
        let args = Self::resolve(locals, &factory.inject)?;
        (factory.create)(api, &args)
    }

    fn invoke_link(&self, scope: &Scope, link: &InjectedLink, locals: &Locals) -> Result<()> {
        let args = Self::resolve(locals, &link.inject)?;
        (link.run)(scope, &args)
    }
}
