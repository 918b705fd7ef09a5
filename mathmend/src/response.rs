//! Pipeline result record

use crate::error::MendError;
use crate::gate::CorruptionReport;
use serde::Serialize;

/// The one externally observed artifact of a pipeline run
///
/// Constructed once per input and never mutated after return. Callers
/// must treat `is_valid == false` as "do not render `clean_markup` or
/// `semantic_tree` without a fallback indicator"; `human_readable` stays
/// populated best-effort either way. Serialized field order is part of
/// the contract.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub clean_markup: String,
    pub semantic_tree: String,
    pub human_readable: String,
    pub is_valid: bool,
    pub confidence: f64,
    pub corruption: CorruptionReport,
    pub used_escalation: bool,
    pub log: Vec<String>,
}

impl PipelineResult {
    /// An invalid result with nothing but diagnostics
    pub fn failed(log: Vec<String>, corruption: CorruptionReport) -> Self {
        Self {
            clean_markup: String::new(),
            semantic_tree: String::new(),
            human_readable: String::new(),
            is_valid: false,
            confidence: 0.0,
            corruption,
            used_escalation: false,
            log,
        }
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, MendError> {
        serde_json::to_string(self)
            .map_err(|e| MendError::Engine(format!("JSON serialization failed: {}", e)))
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, MendError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MendError::Engine(format!("JSON serialization failed: {}", e)))
    }
}
