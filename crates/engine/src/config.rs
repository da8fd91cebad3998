use serde::Deserialize;

/// The default maximum number of traversal steps per evaluation.
pub const MAX_EXECUTION_DEPTH: usize = 10;

/// Evaluation limits bound into every program a [`crate::Compiler`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EvaluationConfig {
    /// The maximum number of field, index and call steps a single evaluation
    /// may perform, call arguments included. The same bound applies to the
    /// nesting level the flattening transforms descend to.
    ///
    /// Defaults to [`MAX_EXECUTION_DEPTH`].
    pub max_execution_depth: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_execution_depth: MAX_EXECUTION_DEPTH,
        }
    }
}
