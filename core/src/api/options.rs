//! Configuration options for running Pila programs.

/// Configuration options for bytecode execution.
///
/// These options control resource limits and interactive behavior of the VM.
///
/// # Example
///
/// ```
/// use pila_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_steps: Some(10_000),
///     ..ExecutionOptions::default()
/// };
/// assert_eq!(options.max_stack_depth, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Write an `Input <type>:` prompt before every `read`.
    ///
    /// Default: false
    pub prompt_on_read: bool,

    /// Maximum operand stack depth.
    ///
    /// Default: 1024
    pub max_stack_depth: usize,

    /// Maximum number of executed instructions (if Some).
    ///
    /// Set to `None` for unlimited execution (be careful with untrusted code!).
    ///
    /// Default: None
    pub max_steps: Option<usize>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            prompt_on_read: false,
            max_stack_depth: 1024,
            max_steps: None,
        }
    }
}
