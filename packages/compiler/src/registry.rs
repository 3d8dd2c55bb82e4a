//! Behavior Registries
//!
//! The four lookup tables the compiler matches against: text markup and
//! attribute markup (ordered lists, every matcher runs), directives (one
//! factory per lowercased attribute name) and widgets (one factory per
//! element name or `@attribute` name).

use indexmap::IndexMap;
use std::rc::Rc;

use crate::compiler::CompileApi;
use crate::dom::NodeRef;
use crate::injector::{Local, Locals};
use crate::template::LinkFn;

/// Text markup matcher: `(api, text, text_node, parent_element)`. Matchers
/// typically rewrite the text node in place so a later pass picks it up.
pub type MarkupFn = Rc<dyn Fn(&CompileApi<'_>, &str, &NodeRef, &NodeRef) -> anyhow::Result<()>>;

/// Attribute markup matcher: `(api, value, attr_name, element)`.
pub type AttrMarkupFn = Rc<dyn Fn(&CompileApi<'_>, &str, &str, &NodeRef) -> anyhow::Result<()>>;

/// A factory callable invoked directly with the matching locals.
pub type FactoryFn = Rc<dyn Fn(&CompileApi<'_>, &Locals) -> anyhow::Result<Option<LinkFn>>>;

/// A widget or directive factory invoked with its declared injectables
/// resolved from the locals.
pub struct InjectedFactory {
    pub inject: Vec<String>,
    #[allow(clippy::type_complexity)]
    pub create: Rc<dyn Fn(&CompileApi<'_>, &[Local]) -> anyhow::Result<Option<LinkFn>>>,
}

/// A widget or directive factory. Invoked once per matched node during
/// compilation; the returned callback (if any) runs at every link.
#[derive(Clone)]
pub enum BehaviorFactory {
    /// Called directly with the matching locals.
    Direct(FactoryFn),
    /// Routed through the injection collaborator.
    Injected(Rc<InjectedFactory>),
}

impl BehaviorFactory {
    pub fn direct<F>(f: F) -> BehaviorFactory
    where
        F: Fn(&CompileApi<'_>, &Locals) -> anyhow::Result<Option<LinkFn>> + 'static,
    {
        BehaviorFactory::Direct(Rc::new(f))
    }

    pub fn injected<F>(inject: &[&str], create: F) -> BehaviorFactory
    where
        F: Fn(&CompileApi<'_>, &[Local]) -> anyhow::Result<Option<LinkFn>> + 'static,
    {
        BehaviorFactory::Injected(Rc::new(InjectedFactory {
            inject: inject.iter().map(|name| name.to_string()).collect(),
            create: Rc::new(create),
        }))
    }
}

/// The compiler's read-only view of every registered behavior.
#[derive(Clone, Default)]
pub struct Registries {
    markup: Vec<MarkupFn>,
    attr_markup: Vec<AttrMarkupFn>,
    directives: IndexMap<String, BehaviorFactory>,
    widgets: IndexMap<String, BehaviorFactory>,
}

impl Registries {
    pub fn new() -> Registries {
        Registries::default()
    }

    pub fn add_markup<F>(&mut self, matcher: F) -> &mut Self
    where
        F: Fn(&CompileApi<'_>, &str, &NodeRef, &NodeRef) -> anyhow::Result<()> + 'static,
    {
        self.markup.push(Rc::new(matcher));
        self
    }

    pub fn add_attr_markup<F>(&mut self, matcher: F) -> &mut Self
    where
        F: Fn(&CompileApi<'_>, &str, &str, &NodeRef) -> anyhow::Result<()> + 'static,
    {
        self.attr_markup.push(Rc::new(matcher));
        self
    }

    /// Register a directive for an attribute name (stored lowercased).
    pub fn add_directive(&mut self, name: &str, factory: BehaviorFactory) -> &mut Self {
        self.directives
            .insert(name.to_ascii_lowercase(), factory);
        self
    }

    /// Register a widget for an element name (stored lowercased).
    pub fn add_widget(&mut self, name: &str, factory: BehaviorFactory) -> &mut Self {
        self.widgets.insert(name.to_ascii_lowercase(), factory);
        self
    }

    /// Register a widget for an attribute name (`@name` key).
    pub fn add_attr_widget(&mut self, name: &str, factory: BehaviorFactory) -> &mut Self {
        self.widgets
            .insert(format!("@{}", name.to_ascii_lowercase()), factory);
        self
    }

    pub(crate) fn markup_fns(&self) -> &[MarkupFn] {
        &self.markup
    }

    pub(crate) fn attr_markup_fns(&self) -> &[AttrMarkupFn] {
        &self.attr_markup
    }

    pub(crate) fn directive(&self, lowercased_name: &str) -> Option<&BehaviorFactory> {
        self.directives.get(lowercased_name)
    }

    pub(crate) fn widget(&self, element_name: &str) -> Option<&BehaviorFactory> {
        self.widgets.get(element_name)
    }

    pub(crate) fn attr_widget(&self, attr_name: &str) -> Option<&BehaviorFactory> {
        self.widgets
            .get(format!("@{}", attr_name.to_ascii_lowercase()).as_str())
    }
}
