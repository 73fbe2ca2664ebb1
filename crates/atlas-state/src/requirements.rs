//! # Entry Requirements
//!
//! A requirement rule guards entry into a state: a list of dotted field
//! paths that must resolve to a non-null value, plus named validations that
//! must pass. Every problem is collected so that a caller can fix them all
//! in one round trip.

use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::validation::{ValidationName, ValidationRegistry};

/// Preconditions for entering a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRule {
    /// Dotted field paths that must be present and non-null.
    pub fields: Vec<String>,
    /// Validations to run, in order.
    pub validations: Vec<ValidationName>,
}

impl RequirementRule {
    /// Build a rule from static field paths and validation names.
    pub fn new(fields: &[&str], validations: &[ValidationName]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            validations: validations.to_vec(),
        }
    }

    /// Check the rule against `event`, returning every violation found.
    ///
    /// Missing fields are reported first, in rule order, followed by
    /// validation failures in rule order. Validations are awaited one at a
    /// time. A validation with no registered predicate is a violation: a
    /// guard that cannot be evaluated does not pass.
    pub async fn evaluate(
        &self,
        event: &Event,
        validations: &ValidationRegistry,
    ) -> Vec<RequirementViolation> {
        let mut violations: Vec<RequirementViolation> = self
            .fields
            .iter()
            .filter(|path| event.field(path).is_none())
            .map(|path| RequirementViolation::MissingField { path: path.clone() })
            .collect();

        for name in &self.validations {
            let Some(validation) = validations.get(*name) else {
                tracing::warn!(validation = %name, event_id = %event.id, "no predicate registered for validation");
                violations.push(RequirementViolation::ValidationUnavailable { validation: *name });
                continue;
            };
            let outcome = validation.validate(event).await;
            if outcome.valid {
                continue;
            }
            if outcome.errors.is_empty() {
                violations.push(RequirementViolation::ValidationFailed {
                    validation: *name,
                    message: "validation failed".to_string(),
                });
            }
            violations.extend(outcome.errors.into_iter().map(|message| {
                RequirementViolation::ValidationFailed {
                    validation: *name,
                    message,
                }
            }));
        }

        violations
    }
}

/// One reason a state's entry requirements are not met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementViolation {
    /// A required field is absent or null.
    MissingField {
        /// The dotted path that failed to resolve.
        path: String,
    },
    /// A validation reported a problem.
    ValidationFailed {
        /// The failing validation.
        validation: ValidationName,
        /// What it reported.
        message: String,
    },
    /// The rule names a validation that has no predicate.
    ValidationUnavailable {
        /// The unregistered validation.
        validation: ValidationName,
    },
}

impl std::fmt::Display for RequirementViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { path } => write!(f, "missing required field `{path}`"),
            Self::ValidationFailed {
                validation,
                message,
            } => write!(f, "{validation}: {message}"),
            Self::ValidationUnavailable { validation } => {
                write!(f, "{validation}: no predicate registered")
            }
        }
    }
}
