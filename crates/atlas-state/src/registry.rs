//! # State Registry
//!
//! Immutable lookup tables for the event lifecycle:
//!
//! - the transition graph (`allowed_targets`),
//! - entry requirements per target state (`requirements_for`),
//! - ordered state-entry actions (`actions_for`),
//! - automatic rules per source state (`automatic_rule`).
//!
//! The standard tables are built once per process by
//! [`StateRegistry::standard`]. Hosts and tests can assemble their own
//! graphs through [`RegistryBuilder`]; `build()` rejects automatic rules
//! whose edge is missing from the graph and terminal states with edges.
//!
//! Guards are deliberately sparse: only five states carry an entry
//! requirement.

use std::collections::{BTreeMap, BTreeSet};

use crate::action::ActionName;
use crate::automatic::{AutomaticRule, AutomaticRules, DataCondition, TimeCondition};
use crate::config::LifecycleConfig;
use crate::error::StateError;
use crate::requirements::RequirementRule;
use crate::state::EventState;
use crate::validation::ValidationName;

static NO_TARGETS: BTreeSet<EventState> = BTreeSet::new();
static NO_RULES: AutomaticRules = AutomaticRules {
    time_based: None,
    conditional: None,
};

/// The lifecycle tables consulted by the engine and the scanner.
#[derive(Debug, Clone, Default)]
pub struct StateRegistry {
    graph: BTreeMap<EventState, BTreeSet<EventState>>,
    requirements: BTreeMap<EventState, RequirementRule>,
    actions: BTreeMap<EventState, Vec<ActionName>>,
    automatic: BTreeMap<EventState, AutomaticRules>,
}

impl StateRegistry {
    /// The standard event lifecycle.
    pub fn standard(config: &LifecycleConfig) -> Self {
        Self {
            graph: standard_graph(),
            requirements: standard_requirements(),
            actions: standard_actions(),
            automatic: standard_automatic(config),
        }
    }

    /// A builder pre-loaded with the standard tables, for hosts that want
    /// to extend them.
    pub fn standard_builder(config: &LifecycleConfig) -> RegistryBuilder {
        RegistryBuilder {
            registry: Self::standard(config),
        }
    }

    /// An empty builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Whether `name` is a state in the fixed enumeration.
    pub fn is_known_state(&self, name: &str) -> bool {
        name.parse::<EventState>().is_ok()
    }

    /// States reachable from `state` in one manual transition. Empty for
    /// terminal states and for states the graph does not mention.
    pub fn allowed_targets(&self, state: EventState) -> &BTreeSet<EventState> {
        self.graph.get(&state).unwrap_or(&NO_TARGETS)
    }

    /// Whether `from -> to` is an edge of the graph.
    pub fn can_transition(&self, from: EventState, to: EventState) -> bool {
        self.allowed_targets(from).contains(&to)
    }

    /// The entry guard for `state`, if it has one.
    pub fn requirements_for(&self, state: EventState) -> Option<&RequirementRule> {
        self.requirements.get(&state)
    }

    /// Actions to run on entry into `state`, in order.
    pub fn actions_for(&self, state: EventState) -> &[ActionName] {
        self.actions.get(&state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Automatic rules keyed on `state` as the source.
    pub fn automatic_rule(&self, state: EventState) -> &AutomaticRules {
        self.automatic.get(&state).unwrap_or(&NO_RULES)
    }

    /// Source states carrying a time-based rule, in lifecycle order.
    pub fn states_with_time_rules(&self) -> Vec<EventState> {
        self.automatic
            .iter()
            .filter(|(_, rules)| rules.time_based.is_some())
            .map(|(state, _)| *state)
            .collect()
    }

    /// Every action name any state can emit.
    pub fn referenced_actions(&self) -> BTreeSet<ActionName> {
        self.actions.values().flatten().copied().collect()
    }

    /// Every validation name any guard references.
    pub fn referenced_validations(&self) -> BTreeSet<ValidationName> {
        self.requirements
            .values()
            .flat_map(|rule| rule.validations.iter().copied())
            .collect()
    }
}

// ─── Builder ─────────────────────────────────────────────────────────

/// Assembles a [`StateRegistry`].
///
/// Later calls for the same state replace earlier ones.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: StateRegistry,
}

impl RegistryBuilder {
    /// Set the outgoing edges of `from`.
    pub fn edges(mut self, from: EventState, to: &[EventState]) -> Self {
        self.registry.graph.insert(from, to.iter().copied().collect());
        self
    }

    /// Set the entry guard of `state`.
    pub fn requirement(mut self, state: EventState, rule: RequirementRule) -> Self {
        self.registry.requirements.insert(state, rule);
        self
    }

    /// Set the ordered entry actions of `state`.
    pub fn actions(mut self, state: EventState, actions: &[ActionName]) -> Self {
        self.registry.actions.insert(state, actions.to_vec());
        self
    }

    /// Set the time-based rule of `from`.
    pub fn time_rule(mut self, from: EventState, to: EventState, condition: TimeCondition) -> Self {
        self.registry.automatic.entry(from).or_default().time_based =
            Some(AutomaticRule { to, condition });
        self
    }

    /// Set the conditional rule of `from`.
    pub fn conditional_rule(
        mut self,
        from: EventState,
        to: EventState,
        condition: DataCondition,
    ) -> Self {
        self.registry.automatic.entry(from).or_default().conditional =
            Some(AutomaticRule { to, condition });
        self
    }

    /// Check consistency and freeze the tables.
    pub fn build(self) -> Result<StateRegistry, StateError> {
        let registry = self.registry;

        for (state, targets) in &registry.graph {
            if state.is_terminal() && !targets.is_empty() {
                return Err(StateError::TerminalHasEdges { state: *state });
            }
        }

        for (from, rules) in &registry.automatic {
            let targets = [
                rules.time_based.as_ref().map(|r| r.to),
                rules.conditional.as_ref().map(|r| r.to),
            ];
            for to in targets.into_iter().flatten() {
                if !registry.can_transition(*from, to) {
                    return Err(StateError::RuleWithoutEdge { from: *from, to });
                }
            }
        }

        Ok(registry)
    }
}

// ─── Standard tables ─────────────────────────────────────────────────

fn standard_graph() -> BTreeMap<EventState, BTreeSet<EventState>> {
    use EventState::*;

    let edges: [(EventState, &[EventState]); 20] = [
        (Draft, &[Planning, Cancelled]),
        (Planning, &[Approved, Cancelled, Postponed]),
        (
            Approved,
            &[RegistrationOpen, AbstractSubmissionOpen, Planning, Cancelled, Postponed],
        ),
        (
            RegistrationOpen,
            &[RegistrationClosing, RegistrationClosed, AbstractSubmissionOpen, Cancelled, Postponed],
        ),
        (
            RegistrationClosing,
            &[RegistrationClosed, RegistrationOpen, Cancelled, Postponed],
        ),
        (
            RegistrationClosed,
            &[RegistrationOpen, AbstractSubmissionOpen, SchedulePublished, Cancelled, Postponed],
        ),
        (
            AbstractSubmissionOpen,
            &[AbstractSubmissionClosing, AbstractSubmissionClosed, Cancelled, Postponed],
        ),
        (
            AbstractSubmissionClosing,
            &[AbstractSubmissionClosed, AbstractSubmissionOpen, Cancelled, Postponed],
        ),
        (AbstractSubmissionClosed, &[ReviewInProgress, Cancelled, Postponed]),
        (ReviewInProgress, &[ReviewCompleted, Cancelled, Postponed]),
        (ReviewCompleted, &[SchedulePublished, Cancelled, Postponed]),
        (SchedulePublished, &[ReadyToStart, Cancelled, Postponed]),
        (ReadyToStart, &[InProgress, Cancelled, Postponed]),
        (InProgress, &[Paused, Completed, Cancelled]),
        (Paused, &[InProgress, Cancelled]),
        (Completed, &[Closed]),
        (Closed, &[Archived]),
        (Cancelled, &[Archived]),
        (Postponed, &[Planning, Cancelled]),
        (Archived, &[]),
    ];

    edges
        .into_iter()
        .map(|(from, to)| (from, to.iter().copied().collect()))
        .collect()
}

fn standard_requirements() -> BTreeMap<EventState, RequirementRule> {
    use ValidationName::*;

    BTreeMap::from([
        (
            EventState::Approved,
            RequirementRule::new(
                &["title", "description", "startDate", "endDate", "venue"],
                &[DateConsistency, VenueAvailability],
            ),
        ),
        (
            EventState::RegistrationOpen,
            RequirementRule::new(
                &["registrationSettings.deadline", "registrationSettings.categories"],
                &[RegistrationConfiguration],
            ),
        ),
        (
            EventState::AbstractSubmissionOpen,
            RequirementRule::new(
                &["abstractSettings.deadline", "abstractSettings.topics"],
                &[AbstractConfiguration],
            ),
        ),
        (
            EventState::SchedulePublished,
            RequirementRule::new(&["schedule.sessions"], &[ScheduleCompleteness]),
        ),
        (
            EventState::ReadyToStart,
            RequirementRule::new(&["startDate", "endDate", "venue"], &[DateConsistency]),
        ),
    ])
}

fn standard_actions() -> BTreeMap<EventState, Vec<ActionName>> {
    use ActionName::*;

    BTreeMap::from([
        (EventState::Approved, vec![NotifyStakeholders]),
        (
            EventState::RegistrationOpen,
            vec![SendRegistrationOpenNotification, EnableRegistrationPortal],
        ),
        (EventState::RegistrationClosing, vec![SendRegistrationClosingReminder]),
        (
            EventState::RegistrationClosed,
            vec![DisableRegistrationPortal, GenerateAttendeeList],
        ),
        (
            EventState::AbstractSubmissionOpen,
            vec![SendAbstractCallNotification, EnableAbstractPortal],
        ),
        (EventState::AbstractSubmissionClosing, vec![SendAbstractDeadlineReminder]),
        (
            EventState::AbstractSubmissionClosed,
            vec![DisableAbstractPortal, AssignReviewers],
        ),
        (EventState::ReviewInProgress, vec![SendReviewerInvitations]),
        (
            EventState::ReviewCompleted,
            vec![SendAbstractDecisions, CreateScheduleDraft],
        ),
        (EventState::SchedulePublished, vec![SendCalendarInvites]),
        (EventState::ReadyToStart, vec![SendEventReminders]),
        (EventState::InProgress, vec![EnableCheckIn]),
        (
            EventState::Completed,
            vec![DisableCheckIn, SendFeedbackSurvey, GenerateFinalReport],
        ),
        (EventState::Cancelled, vec![SendCancellationNotice]),
        (EventState::Postponed, vec![SendPostponementNotice]),
        (EventState::Archived, vec![ArchiveEventData]),
    ])
}

fn standard_automatic(config: &LifecycleConfig) -> BTreeMap<EventState, AutomaticRules> {
    const REGISTRATION_DEADLINE: &str = "registrationSettings.deadline";
    const ABSTRACT_DEADLINE: &str = "abstractSettings.deadline";

    fn time(to: EventState, condition: TimeCondition) -> AutomaticRules {
        AutomaticRules {
            time_based: Some(AutomaticRule { to, condition }),
            conditional: None,
        }
    }

    fn conditional(to: EventState, condition: DataCondition) -> AutomaticRules {
        AutomaticRules {
            time_based: None,
            conditional: Some(AutomaticRule { to, condition }),
        }
    }

    BTreeMap::from([
        (
            EventState::RegistrationOpen,
            time(
                EventState::RegistrationClosing,
                TimeCondition::DeadlineApproaching {
                    path: REGISTRATION_DEADLINE.into(),
                    window: config.registration_closing_window(),
                },
            ),
        ),
        (
            EventState::RegistrationClosing,
            time(
                EventState::RegistrationClosed,
                TimeCondition::Reached {
                    path: REGISTRATION_DEADLINE.into(),
                },
            ),
        ),
        (
            EventState::AbstractSubmissionOpen,
            time(
                EventState::AbstractSubmissionClosing,
                TimeCondition::DeadlineApproaching {
                    path: ABSTRACT_DEADLINE.into(),
                    window: config.abstract_closing_window(),
                },
            ),
        ),
        (
            EventState::AbstractSubmissionClosing,
            time(
                EventState::AbstractSubmissionClosed,
                TimeCondition::Reached {
                    path: ABSTRACT_DEADLINE.into(),
                },
            ),
        ),
        (
            EventState::ReadyToStart,
            time(
                EventState::InProgress,
                TimeCondition::Reached {
                    path: "startDate".into(),
                },
            ),
        ),
        (
            EventState::InProgress,
            time(
                EventState::Completed,
                TimeCondition::Reached {
                    path: "endDate".into(),
                },
            ),
        ),
        (
            EventState::AbstractSubmissionClosed,
            conditional(
                EventState::ReviewInProgress,
                DataCondition::FlagSet {
                    path: "abstractSettings.reviewersAssigned".into(),
                },
            ),
        ),
        (
            EventState::ReviewInProgress,
            conditional(
                EventState::ReviewCompleted,
                DataCondition::NonePending {
                    total: "abstractStats.totalSubmissions".into(),
                    pending: "abstractStats.pendingReviews".into(),
                },
            ),
        ),
    ])
}

// ─── Tests ───────────────────────────────────────────────────────────
