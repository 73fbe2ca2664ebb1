//! Engine tunables.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::TransitionEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of automatic links followed after one requested
    /// transition. Reaching it stops the chain without failing the call.
    pub max_chain_depth: usize,
    /// How many times one link is reloaded and retried after losing a
    /// version compare-and-swap.
    pub max_conflict_retries: u32,
    /// Actor recorded on automatic transitions.
    pub system_actor: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: 10,
            max_conflict_retries: 3,
            system_actor: "system".to_string(),
        }
    }
}
