//! Result of a single "score next batch" call.

use serde::{Deserialize, Serialize};

/// Progress counters returned by one scoring call.
///
/// Field names on the wire follow the scoring service's API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Records scored by this call.
    #[serde(rename = "total_processadas")]
    pub processed_count: u64,
    /// Records still unscored after this call.
    #[serde(rename = "total_pendentes_restantes")]
    pub remaining_pending_count: u64,
    /// Set by the service once nothing is left to score.
    #[serde(rename = "concluido")]
    pub is_complete: bool,
}

impl BatchResult {
    pub fn new(processed_count: u64, remaining_pending_count: u64) -> Self {
        Self {
            processed_count,
            remaining_pending_count,
            is_complete: remaining_pending_count == 0,
        }
    }
}
