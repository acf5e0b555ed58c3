//! Configuration for the OpenBarter settlement engine.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Tunable limits for a settlement-engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum executions accepted per `bulk_execute` call.
    pub max_bulk_executions: usize,
    /// Maximum fee entries accepted per order.
    pub max_fees_per_order: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_bulk_executions: constants::DEFAULT_MAX_BULK_EXECUTIONS,
            max_fees_per_order: constants::DEFAULT_MAX_FEES_PER_ORDER,
        }
    }
}
