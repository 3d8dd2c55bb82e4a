#![deny(clippy::all)]

//! Two-phase template compiler over a DOM-like node tree.
//!
//! `compile` walks the tree once, matching nodes and attributes against four
//! pluggable behavior registries (text markup, attribute markup, directives,
//! widgets) and collecting the deferred work into a reusable [`Template`].
//! The resulting [`Linker`] binds that template to a data-binding [`Scope`]
//! — against the original tree, or against a structural clone per call, so
//! one compiled template can drive many independent instances.

pub mod compiler;
pub mod config;
pub mod dom;
pub mod error;
pub mod exception_handler;
pub mod injector;
pub mod registry;
pub mod scope;
pub mod template;
pub mod util;

// Re-exports
pub use compiler::{CompileApi, CompileTarget, Compiler, Linker};
pub use config::CompilerConfig;
pub use dom::{Attribute, DataValue, Dom, NodeId, NodeRef, WeakNodeRef};
pub use error::CompileError;
pub use exception_handler::{
    CollectingExceptionHandler, ExceptionHandler, StderrExceptionHandler,
};
pub use injector::{Injector, Local, LocalInjector, Locals, ELEMENT_LOCAL, VALUE_LOCAL};
pub use registry::{AttrMarkupFn, BehaviorFactory, FactoryFn, InjectedFactory, MarkupFn, Registries};
pub use scope::{Scope, SCOPE_DATA_KEY};
pub use template::{InjectedLink, LinkFn, NewScope, Template};
