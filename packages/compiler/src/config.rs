//! Compiler configuration.

/// Tunable knobs for a [`Compiler`](crate::Compiler).
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Prefix used for the structural class annotations the compiler stamps
    /// onto matched nodes (e.g. `tpl-directive`). Defaults to `tpl`.
    pub annotation_prefix: String,
    /// Whether `href` attribute values are percent-decoded in the attribute
    /// snapshot handed to behaviors. Defaults to `true`.
    pub decode_hyperlinks: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            annotation_prefix: "tpl".to_string(),
            decode_hyperlinks: true,
        }
    }
}
