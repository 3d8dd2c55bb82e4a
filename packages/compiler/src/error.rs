//! Error taxonomy for the template compiler.

use thiserror::Error;

/// Failures produced by `compile` and `link`.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The compile target resolved to more than one element root.
    #[error("Cannot compile multiple element roots:{markup}")]
    MultipleRoots { markup: String },

    /// The compile target resolved to no nodes at all.
    #[error("Cannot compile an empty selection")]
    EmptySelection,

    /// `link` was called without a scope.
    #[error("A scope is required to link a template")]
    MissingScope,

    /// A user-supplied behavior factory failed while instantiating.
    #[error(transparent)]
    Behavior(#[from] anyhow::Error),
}
