/// Tunables for one pipeline invocation
///
/// The configuration is read-only for the lifetime of a `Pipeline`; nothing
/// in the pipeline mutates shared state, so one configured instance can
/// serve concurrent requests.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum fixed-point reconstruction passes before giving up
    /// Real usage: 1-2 passes, Ceiling: 5
    pub max_reconstruct_passes: usize,

    /// Largest delimiter deficit the balancer will repair
    /// A deficit beyond this is reported as a violation, never guessed at
    pub max_balance_deficit: usize,

    /// Minimum letter count before a shredded run is promoted to a command
    /// or roman word; shorter runs are legitimate subscript notation
    pub min_shred_letters: usize,

    /// Time budget for the external semantic rewrite call in milliseconds
    pub escalation_timeout_ms: u64,

    /// Maximum diagnostic log entries retained in a result
    pub max_log_entries: usize,

    /// Maximum accepted input size in bytes
    /// Real usage: ~200 bytes per formula, Limit: 256 KB
    pub max_input_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_reconstruct_passes: 5,
            max_balance_deficit: 3,
            min_shred_letters: 3,
            escalation_timeout_ms: 30_000,
            max_log_entries: 200,
            max_input_bytes: 256 * 1024,
        }
    }
}

impl PipelineConfig {
    /// Create a new PipelineConfig with default values
    pub fn new() -> Self {
        Self::default()
    }
}
