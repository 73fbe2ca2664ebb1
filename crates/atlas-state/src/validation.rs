//! # Validation Registry
//!
//! Named guard predicates invoked by requirement rules. The host application
//! supplies the implementations; this module defines the contract, the
//! registry, and a standard set covering the five validations the standard
//! lifecycle references.
//!
//! Predicates are asynchronous so that a host can consult another service
//! (a venue booking system, a payments backend) before answering. The
//! engine awaits them one at a time in the order the rule lists them.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StateError;
use crate::event::Event;
use crate::registry::StateRegistry;

// ─── Names ───────────────────────────────────────────────────────────

/// Identifier of a guard predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationName {
    /// End date falls after start date.
    DateConsistency,
    /// A usable venue is attached.
    VenueAvailability,
    /// Registration deadline and categories are configured.
    RegistrationConfiguration,
    /// Abstract deadline and topics are configured.
    AbstractConfiguration,
    /// Every scheduled session is fully specified.
    ScheduleCompleteness,
}

impl ValidationName {
    /// Every validation name.
    pub const ALL: [ValidationName; 5] = [
        Self::DateConsistency,
        Self::VenueAvailability,
        Self::RegistrationConfiguration,
        Self::AbstractConfiguration,
        Self::ScheduleCompleteness,
    ];

    /// The wire name (e.g. `"dateConsistency"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateConsistency => "dateConsistency",
            Self::VenueAvailability => "venueAvailability",
            Self::RegistrationConfiguration => "registrationConfiguration",
            Self::AbstractConfiguration => "abstractConfiguration",
            Self::ScheduleCompleteness => "scheduleCompleteness",
        }
    }
}

impl std::fmt::Display for ValidationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ValidationName {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| StateError::UnknownValidation(s.to_string()))
    }
}

// ─── Contract ────────────────────────────────────────────────────────

/// Result of one guard predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the predicate holds.
    pub valid: bool,
    /// Human-readable reasons, one per problem found.
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    /// A passing outcome.
    pub fn pass() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Passing when `errors` is empty, failing otherwise.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Boxed future returned by [`Validation::validate`].
pub type ValidationFuture<'a> = Pin<Box<dyn Future<Output = ValidationOutcome> + Send + 'a>>;

/// A guard predicate.
///
/// Plain `Fn(&Event) -> ValidationOutcome` closures and functions implement
/// this trait directly.
pub trait Validation: Send + Sync {
    /// Evaluate the predicate against an event.
    fn validate<'a>(&'a self, event: &'a Event) -> ValidationFuture<'a>;
}

impl<F> Validation for F
where
    F: Fn(&Event) -> ValidationOutcome + Send + Sync,
{
    fn validate<'a>(&'a self, event: &'a Event) -> ValidationFuture<'a> {
        Box::pin(std::future::ready(self(event)))
    }
}

// ─── Registry ────────────────────────────────────────────────────────

/// Mapping from validation name to predicate.
#[derive(Clone, Default)]
pub struct ValidationRegistry {
    validations: HashMap<ValidationName, Arc<dyn Validation>>,
}

impl ValidationRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the standard predicates from [`standard`].
    pub fn with_standard_validations() -> Self {
        let mut registry = Self::new();
        registry.register(ValidationName::DateConsistency, standard::date_consistency);
        registry.register(ValidationName::VenueAvailability, standard::venue_availability);
        registry.register(
            ValidationName::RegistrationConfiguration,
            standard::registration_configuration,
        );
        registry.register(
            ValidationName::AbstractConfiguration,
            standard::abstract_configuration,
        );
        registry.register(
            ValidationName::ScheduleCompleteness,
            standard::schedule_completeness,
        );
        registry
    }

    /// Register a predicate, replacing any existing one with the same name.
    pub fn register(&mut self, name: ValidationName, validation: impl Validation + 'static) {
        self.validations.insert(name, Arc::new(validation));
    }

    /// Look up a predicate.
    pub fn get(&self, name: ValidationName) -> Option<Arc<dyn Validation>> {
        self.validations.get(&name).cloned()
    }

    /// Validations referenced by `registry` that have no predicate here.
    pub fn missing(&self, registry: &StateRegistry) -> BTreeSet<ValidationName> {
        registry
            .referenced_validations()
            .into_iter()
            .filter(|name| !self.validations.contains_key(name))
            .collect()
    }
}

impl std::fmt::Debug for ValidationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.validations.keys().collect();
        names.sort();
        f.debug_struct("ValidationRegistry")
            .field("validations", &names)
            .finish()
    }
}

// ─── Standard predicates ─────────────────────────────────────────────

/// Default predicates for the standard lifecycle.
///
/// They only inspect the event record. Hosts that need to consult external
/// systems register their own implementation under the same name.
pub mod standard {
    use super::*;

    /// `endDate` must be strictly after `startDate`.
    pub fn date_consistency(event: &Event) -> ValidationOutcome {
        let mut errors = Vec::new();
        let start = event.instant("startDate");
        let end = event.instant("endDate");
        if start.is_none() {
            errors.push("startDate is missing or not a valid date".to_string());
        }
        if end.is_none() {
            errors.push("endDate is missing or not a valid date".to_string());
        }
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors.push(format!("endDate ({end}) must be after startDate ({start})"));
            }
        }
        ValidationOutcome::from_errors(errors)
    }

    /// The venue must be a non-empty name, or an object with a non-empty
    /// `name` and, when given, a positive `capacity`.
    pub fn venue_availability(event: &Event) -> ValidationOutcome {
        let mut errors = Vec::new();
        match event.field("venue") {
            None => errors.push("venue is not set".to_string()),
            Some(Value::String(name)) => {
                if name.trim().is_empty() {
                    errors.push("venue name is empty".to_string());
                }
            }
            Some(Value::Object(venue)) => {
                let named = venue
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| !name.trim().is_empty());
                if !named {
                    errors.push("venue name is empty".to_string());
                }
                if let Some(capacity) = venue.get("capacity").filter(|c| !c.is_null()) {
                    if !capacity.as_u64().is_some_and(|c| c > 0) {
                        errors.push("venue capacity must be a positive integer".to_string());
                    }
                }
            }
            Some(_) => errors.push("venue must be a name or a venue object".to_string()),
        }
        ValidationOutcome::from_errors(errors)
    }

    /// Registration needs a deadline no later than the event start and at
    /// least one registration category.
    pub fn registration_configuration(event: &Event) -> ValidationOutcome {
        let mut errors = deadline_errors(event, "registrationSettings.deadline");
        if !non_empty_array(event, "registrationSettings.categories") {
            errors.push("registrationSettings.categories must list at least one category".to_string());
        }
        ValidationOutcome::from_errors(errors)
    }

    /// The abstract call needs a deadline no later than the event start and
    /// at least one topic.
    pub fn abstract_configuration(event: &Event) -> ValidationOutcome {
        let mut errors = deadline_errors(event, "abstractSettings.deadline");
        if !non_empty_array(event, "abstractSettings.topics") {
            errors.push("abstractSettings.topics must list at least one topic".to_string());
        }
        ValidationOutcome::from_errors(errors)
    }

    /// Every session needs a title and a start time before its end time.
    pub fn schedule_completeness(event: &Event) -> ValidationOutcome {
        let Some(sessions) = event.field("schedule.sessions").and_then(Value::as_array) else {
            return ValidationOutcome::from_errors(vec![
                "schedule.sessions must be a list".to_string()
            ]);
        };
        if sessions.is_empty() {
            return ValidationOutcome::from_errors(vec![
                "schedule must contain at least one session".to_string()
            ]);
        }

        let mut errors = Vec::new();
        for (index, session) in sessions.iter().enumerate() {
            let title_ok = session
                .get("title")
                .and_then(Value::as_str)
                .is_some_and(|t| !t.trim().is_empty());
            if !title_ok {
                errors.push(format!("session {index}: title is missing"));
            }
            let start = session_instant(session, "startTime");
            let end = session_instant(session, "endTime");
            match (start, end) {
                (Some(start), Some(end)) if end <= start => {
                    errors.push(format!("session {index}: endTime must be after startTime"));
                }
                (Some(_), Some(_)) => {}
                _ => errors.push(format!("session {index}: startTime and endTime are required")),
            }
        }
        ValidationOutcome::from_errors(errors)
    }

    fn deadline_errors(event: &Event, path: &str) -> Vec<String> {
        let mut errors = Vec::new();
        match event.instant(path) {
            None => errors.push(format!("{path} is missing or not a valid date")),
            Some(deadline) => {
                if let Some(start) = event.instant("startDate") {
                    if deadline > start {
                        errors.push(format!(
                            "{path} ({deadline}) must not be after startDate ({start})"
                        ));
                    }
                }
            }
        }
        errors
    }

    fn non_empty_array(event: &Event, path: &str) -> bool {
        event
            .field(path)
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty())
    }

    fn session_instant(session: &Value, key: &str) -> Option<atlas_core::Timestamp> {
        session
            .get(key)
            .and_then(Value::as_str)
            .and_then(|s| atlas_core::Timestamp::parse_date_or_datetime(s).ok())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
