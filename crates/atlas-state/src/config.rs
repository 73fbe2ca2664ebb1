//! Tunables for the standard lifecycle rules.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration consumed by [`crate::StateRegistry::standard`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long before the registration deadline `registration_open`
    /// automatically moves to `registration_closing`.
    pub registration_closing_window_hours: i64,
    /// How long before the abstract deadline `abstract_submission_open`
    /// automatically moves to `abstract_submission_closing`.
    pub abstract_closing_window_hours: i64,
}

impl LifecycleConfig {
    /// Registration closing window as a duration.
    pub fn registration_closing_window(&self) -> Duration {
        Duration::hours(self.registration_closing_window_hours.max(0))
    }

    /// Abstract closing window as a duration.
    pub fn abstract_closing_window(&self) -> Duration {
        Duration::hours(self.abstract_closing_window_hours.max(0))
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            registration_closing_window_hours: 48,
            abstract_closing_window_hours: 48,
        }
    }
}
