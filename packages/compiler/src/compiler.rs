//! Template Compiler
//!
//! Walks a node tree once, matching every node and attribute against the
//! behavior registries, and accumulates the deferred work into a reusable
//! [`Template`]. The returned [`Linker`] binds that template to a scope any
//! number of times, optionally against a structural clone of the compiled
//! tree.
//!
//! Compilation order per node: attribute widgets (sorted attribute order,
//! first match wins) → element widget → text markup → attribute markup →
//! directives → recursion into children. A matched widget owns its node:
//! directive processing and descent are switched off before the widget
//! factory runs, and the factory may flip them back through the per-call
//! API.

use bitflags::bitflags;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::CompilerConfig;
use crate::dom::{DataValue, Dom, NodeRef};
use crate::error::CompileError;
use crate::exception_handler::{ExceptionHandler, StderrExceptionHandler};
use crate::injector::{Injector, LocalInjector, Locals};
use crate::registry::{BehaviorFactory, Registries};
use crate::scope::{Scope, SCOPE_DATA_KEY};
use crate::template::{LinkContext, LinkFn, NewScope, Template};
use crate::util::namespace_class;

bitflags! {
    /// Per-node switches behaviors flip through the per-call API.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct NodeFlags: u8 {
        const DESCEND = 1 << 0;
        const DIRECTIVES = 1 << 1;
    }
}

/// Mutable per-node compilation state, shared between the compiler and the
/// behavior factories it invokes for that node.
struct NodeContext {
    flags: Cell<NodeFlags>,
    new_scope: RefCell<NewScope>,
}

impl NodeContext {
    fn new() -> NodeContext {
        NodeContext {
            flags: Cell::new(NodeFlags::all()),
            new_scope: RefCell::new(NewScope::Keep),
        }
    }

    fn get(&self, flag: NodeFlags) -> bool {
        self.flags.get().contains(flag)
    }

    fn set(&self, flag: NodeFlags, on: bool) {
        let mut flags = self.flags.get();
        flags.set(flag, on);
        self.flags.set(flags);
    }

    fn take_new_scope(&self) -> NewScope {
        self.new_scope.replace(NewScope::Keep)
    }
}

/// The narrow mutator surface handed to every behavior factory invocation.
pub struct CompileApi<'a> {
    compiler: &'a Compiler,
    ctx: &'a NodeContext,
}

impl CompileApi<'_> {
    /// Re-entrant invocation of the whole compiler, for behaviors that
    /// compile nested content themselves (conditionals, repeaters). The
    /// nested compilation is independent of the one in flight.
    pub fn compile(&self, target: impl Into<CompileTarget>) -> Result<Linker, CompileError> {
        self.compiler.compile(target)
    }

    /// Get, or set, whether the compiler descends into this node's children.
    pub fn descend(&self, set: Option<bool>) -> bool {
        if let Some(on) = set {
            self.ctx.set(NodeFlags::DESCEND, on);
        }
        self.ctx.get(NodeFlags::DESCEND)
    }

    /// Get, or set, whether directive and attribute-markup processing
    /// continues for this node.
    pub fn directives(&self, set: Option<bool>) -> bool {
        if let Some(on) = set {
            self.ctx.set(NodeFlags::DIRECTIVES, on);
        }
        self.ctx.get(NodeFlags::DIRECTIVES)
    }

    /// Get the node's new-scope decision, or set it if still undecided.
    /// The first effective setter wins.
    pub fn scope(&self, set: Option<NewScope>) -> NewScope {
        if let Some(decision) = set {
            let mut current = self.ctx.new_scope.borrow_mut();
            if current.is_keep() {
                *current = decision;
            }
        }
        self.ctx.new_scope.borrow().clone()
    }
}

/// What to compile: raw markup, a single element, or a selection that must
/// hold exactly one root.
pub enum CompileTarget {
    Markup(String),
    Element(NodeRef),
    Selection(Vec<NodeRef>),
}

impl From<&str> for CompileTarget {
    fn from(markup: &str) -> CompileTarget {
        CompileTarget::Markup(markup.to_string())
    }
}

impl From<String> for CompileTarget {
    fn from(markup: String) -> CompileTarget {
        CompileTarget::Markup(markup)
    }
}

impl From<NodeRef> for CompileTarget {
    fn from(element: NodeRef) -> CompileTarget {
        CompileTarget::Element(element)
    }
}

impl From<&NodeRef> for CompileTarget {
    fn from(element: &NodeRef) -> CompileTarget {
        CompileTarget::Element(element.clone())
    }
}

impl From<Vec<NodeRef>> for CompileTarget {
    fn from(selection: Vec<NodeRef>) -> CompileTarget {
        CompileTarget::Selection(selection)
    }
}

/// The compiler. Registries and collaborators are supplied at construction
/// and read-only afterwards; one instance serves an application for its
/// lifetime.
pub struct Compiler {
    registries: Registries,
    injector: Rc<dyn Injector>,
    exception_handler: Rc<dyn ExceptionHandler>,
    config: CompilerConfig,
}

impl Compiler {
    /// A compiler with the default collaborators: locals-only injection and
    /// stderr failure reporting.
    pub fn new(registries: Registries) -> Compiler {
        Compiler::with_collaborators(
            registries,
            Rc::new(LocalInjector),
            Rc::new(StderrExceptionHandler),
        )
    }

    pub fn with_collaborators(
        registries: Registries,
        injector: Rc<dyn Injector>,
        exception_handler: Rc<dyn ExceptionHandler>,
    ) -> Compiler {
        Compiler {
            registries,
            injector,
            exception_handler,
            config: CompilerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Compiler {
        self.config = config;
        self
    }

    /// Compile a tree into a reusable linking function.
    pub fn compile(&self, target: impl Into<CompileTarget>) -> Result<Linker, CompileError> {
        let element = match target.into() {
            CompileTarget::Markup(markup) => {
                let dom = Dom::new();
                single_root(dom.parse(markup.trim()))?
            }
            CompileTarget::Element(element) => element,
            CompileTarget::Selection(selection) => single_root(selection)?,
        };
        // remembered so a clone can be re-located at the same position even
        // if the sibling structure shifts later
        let index = element.index_in_parent();
        let template = self.templatize(&element, index)?.unwrap_or_default();
        Ok(Linker {
            template: Rc::new(template),
            element,
            cx: LinkContext {
                injector: self.injector.clone(),
                exception_handler: self.exception_handler.clone(),
            },
        })
    }

    /// Compile one node into a template, or `None` if nothing matched
    /// anywhere in its subtree.
    fn templatize(
        &self,
        element: &NodeRef,
        element_index: usize,
    ) -> Result<Option<Template>, CompileError> {
        let prefix = &self.config.annotation_prefix;
        let name = element.node_name();
        let ns_class = namespace_class(&name);
        element.add_class(&ns_class);

        let mut template = Template::default();
        let ctx = NodeContext::new();
        let api = CompileApi {
            compiler: self,
            ctx: &ctx,
        };

        // attribute widgets first, in sorted attribute order; the
        // lexicographically first resolving attribute wins and ends the scan
        let mut widget: Option<(BehaviorFactory, Locals)> = None;
        for (attr_name, value) in self.each_attribute(element) {
            if let Some(factory) = self.registries.attr_widget(&attr_name) {
                element.add_class(&format!("{prefix}-attr-widget"));
                widget = Some((factory.clone(), Locals::with_value(element, value)));
                break;
            }
        }
        if widget.is_none() {
            if let Some(factory) = self.registries.widget(&name.to_ascii_lowercase()) {
                if !ns_class.is_empty() {
                    element.add_class(&format!("{prefix}-widget"));
                }
                widget = Some((factory.clone(), Locals::element(element)));
            }
        }

        let mut element = element.clone();
        if let Some((factory, locals)) = widget {
            // a widget fully owns its node
            ctx.set(NodeFlags::DESCEND, false);
            ctx.set(NodeFlags::DIRECTIVES, false);
            let parent = element.parent();
            template.add_link_fn(self.invoke_factory(&api, &factory, &locals)?);
            // the factory may have replaced or moved the node; continue with
            // whatever now sits at the recorded position
            if let Some(parent) = parent {
                if let Some(live) = parent.child_node(element_index) {
                    element = live;
                }
            }
        }

        if ctx.get(NodeFlags::DESCEND) {
            // markup runs for text-node children only
            let mut i = 0;
            while i < element.child_count() {
                let is_text = element
                    .child_node(i)
                    .map(|child| child.is_text())
                    .unwrap_or(false);
                if is_text {
                    for matcher in self.registries.markup_fns() {
                        // a matcher may have consumed nodes; re-fetch the
                        // live child before every call
                        let Some(text_node) = element.child_node(i) else {
                            break;
                        };
                        matcher(&api, &text_node.text(), &text_node, &element)?;
                    }
                }
                i += 1;
            }
        }

        if ctx.get(NodeFlags::DIRECTIVES) {
            for (attr_name, value) in self.each_attribute(&element) {
                for matcher in self.registries.attr_markup_fns() {
                    matcher(&api, &value, &attr_name, &element)?;
                }
            }
            for (attr_name, value) in self.each_attribute(&element) {
                let attr_name = attr_name.to_ascii_lowercase();
                if let Some(factory) = self.registries.directive(&attr_name) {
                    element.add_class(&format!("{prefix}-directive"));
                    let locals = Locals::with_value(&element, value);
                    template.add_link_fn(self.invoke_factory(&api, factory, &locals)?);
                }
            }
        }

        if ctx.get(NodeFlags::DESCEND) {
            // non-text children, by live position
            let mut i = 0;
            while let Some(child) = element.child_node(i) {
                if !child.is_text() {
                    template.add_child(i, self.templatize(&child, i)?);
                }
                i += 1;
            }
        }

        template.set_new_scope(ctx.take_new_scope());
        Ok(if template.is_empty() {
            None
        } else {
            Some(template)
        })
    }

    fn invoke_factory(
        &self,
        api: &CompileApi<'_>,
        factory: &BehaviorFactory,
        locals: &Locals,
    ) -> Result<Option<LinkFn>, CompileError> {
        let produced = match factory {
            BehaviorFactory::Direct(create) => create(api, locals),
            BehaviorFactory::Injected(injected) => {
                self.injector.invoke_factory(api, injected, locals)
            }
        };
        produced.map_err(CompileError::Behavior)
    }

    /// Sorted-by-name snapshot of an element's attributes, with the
    /// hyperlink decoding path applied. Mutation during matching cannot
    /// perturb an iteration already in flight.
    fn each_attribute(&self, element: &NodeRef) -> Vec<(String, String)> {
        let mut attrs = BTreeMap::new();
        for attr in element.attributes() {
            let value = if self.config.decode_hyperlinks && attr.name == "href" {
                crate::util::percent_decode(&attr.value)
            } else {
                attr.value
            };
            attrs.insert(attr.name, value);
        }
        attrs.into_iter().collect()
    }
}

fn single_root(mut roots: Vec<NodeRef>) -> Result<NodeRef, CompileError> {
    if roots.is_empty() {
        return Err(CompileError::EmptySelection);
    }
    if roots.len() > 1 {
        let markup = roots.iter().map(|root| root.outer_html()).collect();
        return Err(CompileError::MultipleRoots { markup });
    }
    Ok(roots.remove(0))
}

/// The linking function produced by [`Compiler::compile`]: binds the
/// compiled template to a scope and returns the bound element. One linker
/// may be invoked any number of times; with the clone path each call yields
/// an independent instance.
pub struct Linker {
    template: Rc<Template>,
    element: NodeRef,
    cx: LinkContext,
}

impl Linker {
    /// Link the compiled element itself.
    pub fn link(&self, scope: Option<&Scope>) -> Result<NodeRef, CompileError> {
        self.run(scope, None)
    }

    /// Link a structural clone of the compiled element. `connect` runs
    /// before linking so the caller can attach the clone to a live tree
    /// first.
    pub fn link_clone(
        &self,
        scope: Option<&Scope>,
        connect: impl Fn(&NodeRef, &Scope),
    ) -> Result<NodeRef, CompileError> {
        self.run(scope, Some(&connect))
    }

    /// The compiled form, shared by every link call.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The element the template was compiled from.
    pub fn element(&self) -> &NodeRef {
        &self.element
    }

    fn run(
        &self,
        scope: Option<&Scope>,
        connect: Option<&dyn Fn(&NodeRef, &Scope)>,
    ) -> Result<NodeRef, CompileError> {
        let scope = scope.ok_or(CompileError::MissingScope)?;
        // the clone must preserve structure exactly; a normalizing clone
        // would break the recorded child positions
        let element = if connect.is_some() {
            self.element.clone_subtree()
        } else {
            self.element.clone()
        };
        element.set_data(SCOPE_DATA_KEY, DataValue::Scope(scope.clone()));
        scope.set_element(&element);
        if let Some(connect) = connect {
            connect(&element, scope);
        }
        self.template.link(&element, scope, &self.cx);
        Ok(element)
    }
}
