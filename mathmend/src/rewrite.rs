//! External semantic rewrite capability
//!
//! Escalation boundary for input local repair cannot fix. Implementations
//! receive reconstructed formula text only, never the semantic tree, and
//! must respect the passed time budget. The pipeline is fully functional
//! with no capability configured; escalation then terminates the run as a
//! failure instead of guessing.

use crate::config::PipelineConfig;
use crate::error::MendError;
use std::time::{Duration, Instant};

/// Best-effort syntax-level repair of formula text
pub trait SemanticRewrite: Send + Sync {
    fn rewrite(&self, text: &str, timeout: Duration) -> Result<String, MendError>;
}

/// Stub capability for deployments without an external rewriter
///
/// Always fails, which drives the orchestrator down the same terminal
/// path as a real rewriter outage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRewrite;

impl SemanticRewrite for NoRewrite {
    fn rewrite(&self, _text: &str, _timeout: Duration) -> Result<String, MendError> {
        Err(MendError::Escalation(
            "no semantic rewrite capability configured".to_string(),
        ))
    }
}

/// Wall-clock guard around one escalation call
pub struct EscalationDeadline {
    start: Instant,
}

impl EscalationDeadline {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn budget(config: &PipelineConfig) -> Duration {
        Duration::from_millis(config.escalation_timeout_ms)
    }

    /// Fail if the call outlived its budget, even when it returned a value
    pub fn check(&self, config: &PipelineConfig) -> Result<(), MendError> {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        if elapsed_ms > config.escalation_timeout_ms {
            return Err(MendError::EscalationTimeout {
                elapsed_ms,
                limit_ms: config.escalation_timeout_ms,
            });
        }
        Ok(())
    }
}
