use std::fmt;

/// Error types for the mathmend pipeline
///
/// Most failures are accumulated into the `PipelineResult` log rather than
/// surfaced through `Result`. These variants cover the internal stage
/// boundaries where propagation with `?` is the right tool.
#[derive(Debug, Clone, PartialEq)]
pub enum MendError {
    /// The deterministic formula compiler rejected its input
    Compile(String),

    /// The compiled tree violated a structural invariant
    TreeInvariant(String),

    /// The external semantic rewrite capability failed or is unavailable
    Escalation(String),

    /// The external semantic rewrite capability exceeded its time budget
    EscalationTimeout { elapsed_ms: u64, limit_ms: u64 },

    /// Engine error without a more specific category
    Engine(String),
}

impl fmt::Display for MendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MendError::Compile(msg) => write!(f, "Compile error: {}", msg),
            MendError::TreeInvariant(msg) => write!(f, "Tree invariant violation: {}", msg),
            MendError::Escalation(msg) => write!(f, "Escalation error: {}", msg),
            MendError::EscalationTimeout {
                elapsed_ms,
                limit_ms,
            } => write!(
                f,
                "Escalation timed out after {}ms (limit {}ms)",
                elapsed_ms, limit_ms
            ),
            MendError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for MendError {}

impl From<std::fmt::Error> for MendError {
    fn from(err: std::fmt::Error) -> Self {
        MendError::Engine(format!("Format error: {}", err))
    }
}
