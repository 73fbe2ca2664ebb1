//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every key has a default, so an
//! empty file (or no file) gives the standard lifecycle:
//!
//! ```yaml
//! lifecycle:
//!   registration_closing_window_hours: 48
//!   abstract_closing_window_hours: 48
//! engine:
//!   max_chain_depth: 10
//!   max_conflict_retries: 3
//!   system_actor: system
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use atlas_engine::EngineConfig;
use atlas_state::LifecycleConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub lifecycle: LifecycleConfig,
    pub engine: EngineConfig,
}

impl AtlasConfig {
    /// Read `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse YAML text. Blank input yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}
