//! End-to-end lifecycle scenarios against the in-memory store.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use atlas_core::{EventId, ManualClock, Timestamp};
use atlas_engine::{
    ActionError, ActionFuture, ActionHandler, ActionRegistry, ChainHalt, EngineConfig, EventStore,
    InMemoryEventStore, StoreError, TransitionEngine, TransitionError, TransitionOptions,
};
use atlas_state::{
    ActionName, DataCondition, Event, EventState, RequirementRule, RequirementViolation,
    StateRegistry, ValidationName,
};

const NOW: &str = "2026-03-01T12:00:00Z";

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Timestamp::parse(NOW).unwrap()))
}

fn id(raw: &str) -> EventId {
    EventId::new(raw).unwrap()
}

fn event_in(raw_id: &str, state: EventState) -> Event {
    let mut event = Event::new(id(raw_id));
    event.status = state;
    event
}

fn engine_with(events: Vec<Event>) -> TransitionEngine<InMemoryEventStore> {
    engine_with_actions(events, ActionRegistry::new())
}

fn engine_with_actions(
    events: Vec<Event>,
    actions: ActionRegistry,
) -> TransitionEngine<InMemoryEventStore> {
    let store = InMemoryEventStore::new();
    for event in events {
        store.insert(event).unwrap();
    }
    TransitionEngine::builder(store)
        .clock(clock())
        .actions(actions)
        .build()
}

fn recorder(log: &Arc<Mutex<Vec<ActionName>>>, action: ActionName) -> impl ActionHandler {
    let log = log.clone();
    move |_: &Event, _: &str| -> Result<(), ActionError> {
        log.lock().push(action);
        Ok(())
    }
}

// ─── Example scenarios ───────────────────────────────────────────────

#[tokio::test]
async fn scenario_1_draft_to_planning() {
    let engine = engine_with(vec![Event::new(id("evt-1"))]);

    let result = engine
        .transition(&id("evt-1"), EventState::Planning, "user1", TransitionOptions::new())
        .await
        .unwrap();

    assert_eq!(result.final_state(), EventState::Planning);
    assert_eq!(result.steps.len(), 1);
    assert!(result.steps[0].actions.is_empty());
    assert_eq!(engine.store().get(&id("evt-1")).unwrap().state_history.len(), 1);
}

#[tokio::test]
async fn scenario_2_approval_without_required_fields() {
    let engine = engine_with(vec![event_in("evt-2", EventState::Planning)
        .with_field("description", "Annual meeting")]);

    let err = engine
        .transition(&id("evt-2"), EventState::Approved, "user1", TransitionOptions::new())
        .await
        .unwrap_err();

    let (target, violations) = match err {
        TransitionError::RequirementsNotMet { target, violations, .. } => (target, violations),
        other => panic!("expected RequirementsNotMet, got {other:?}"),
    };
    assert_eq!(target, EventState::Approved);
    let missing: Vec<&str> = violations
        .iter()
        .filter_map(|v| match v {
            RequirementViolation::MissingField { path } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(missing, vec!["title", "startDate", "endDate", "venue"]);

    let stored = engine.store().get(&id("evt-2")).unwrap();
    assert_eq!(stored.status, EventState::Planning);
    assert!(stored.state_history.is_empty());
    assert_eq!(stored.version, 0);
}

#[tokio::test]
async fn scenario_3_approval_with_complete_details() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let actions = ActionRegistry::new().with(
        ActionName::NotifyStakeholders,
        recorder(&log, ActionName::NotifyStakeholders),
    );
    let event = event_in("evt-3", EventState::Planning)
        .with_field("title", "Atlas Summit")
        .with_field("description", "Annual meeting")
        .with_field("startDate", "2026-06-01")
        .with_field("endDate", "2026-06-03")
        .with_field("venue", json!({ "name": "Hall A", "capacity": 400 }));
    let engine = engine_with_actions(vec![event], actions);

    let result = engine
        .transition(&id("evt-3"), EventState::Approved, "user1", TransitionOptions::new())
        .await
        .unwrap();

    assert_eq!(result.final_state(), EventState::Approved);
    assert_eq!(result.steps.len(), 1);
    assert!(result.steps[0].actions.iter().all(|outcome| outcome.ok));
    assert_eq!(*log.lock(), vec![ActionName::NotifyStakeholders]);
}

#[tokio::test]
async fn scenario_4_manual_call_chains_into_registration_closed() {
    let event = event_in("evt-4", EventState::RegistrationOpen)
        .with_field("registrationSettings.deadline", "2026-02-28T12:00:00Z");
    let engine = engine_with(vec![event]);

    let result = engine
        .transition(
            &id("evt-4"),
            EventState::RegistrationClosing,
            "user1",
            TransitionOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.final_state(), EventState::RegistrationClosed);
    assert!(result.chain_halt.is_none());
    let records: Vec<_> = result.records().cloned().collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].actor, "user1");
    assert_eq!(records[1].actor, "system");
    assert_eq!(records[1].from_state, EventState::RegistrationClosing);
    assert_eq!(records[1].to_state, EventState::RegistrationClosed);
    assert!(records[1].reason.as_deref().unwrap_or_default().contains("registrationSettings.deadline"));
    assert!(result.steps[1].automatic);

    let stored = engine.store().get(&id("evt-4")).unwrap();
    assert_eq!(stored.state_history, records);
}

#[tokio::test]
async fn scenario_4_scheduled_scan_walks_registration_closed() {
    let due = event_in("evt-4-due", EventState::RegistrationOpen)
        .with_field("registrationSettings.deadline", "2026-02-28");
    let later = event_in("evt-4-later", EventState::RegistrationOpen)
        .with_field("registrationSettings.deadline", "2026-09-01");
    let engine = engine_with(vec![due, later]);

    let report = engine.run_scheduled_scan().await.unwrap();

    assert_eq!(report.applied.len(), 1);
    assert!(report.skipped.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(report.applied[0].event_id, id("evt-4-due"));
    assert_eq!(report.applied[0].edge.to, EventState::RegistrationClosing);
    assert_eq!(report.applied[0].committed, 2);

    let stored = engine.store().get(&id("evt-4-due")).unwrap();
    assert_eq!(stored.status, EventState::RegistrationClosed);
    assert!(stored.state_history.iter().all(|r| r.actor == "system"));
    assert_eq!(
        engine.store().get(&id("evt-4-later")).unwrap().status,
        EventState::RegistrationOpen
    );
}

#[tokio::test]
async fn scenario_5_force_from_archived_still_invalid() {
    let engine = engine_with(vec![event_in("evt-5", EventState::Archived)]);

    for target in EventState::ALL {
        let err = engine
            .transition(&id("evt-5"), target, "admin", TransitionOptions::new().forced())
            .await
            .unwrap_err();
        assert!(
            matches!(err, TransitionError::InvalidTransition { forced: true, .. }),
            "{target}: {err:?}"
        );
    }
    assert_eq!(engine.store().get(&id("evt-5")).unwrap().version, 0);
}

#[tokio::test]
async fn scenario_6_forced_transition_skips_requirements() {
    let engine = engine_with(vec![
        event_in("evt-6a", EventState::Planning),
        event_in("evt-6b", EventState::Planning),
    ]);

    let cancelled = engine
        .transition(
            &id("evt-6a"),
            EventState::Cancelled,
            "admin",
            TransitionOptions::new().forced().with_reason("sponsor withdrew"),
        )
        .await
        .unwrap();
    assert!(cancelled.steps[0].record.forced);
    assert_eq!(cancelled.steps[0].record.reason.as_deref(), Some("sponsor withdrew"));

    // approved is guarded and the event has none of the required fields.
    let approved = engine
        .transition(&id("evt-6b"), EventState::Approved, "admin", TransitionOptions::new().forced())
        .await
        .unwrap();
    assert_eq!(approved.final_state(), EventState::Approved);
    assert!(approved.steps[0].record.forced);
}

// ─── Properties ──────────────────────────────────────────────────────

#[tokio::test]
async fn failing_action_does_not_stop_the_others() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let actions = ActionRegistry::new()
        .with(ActionName::DisableCheckIn, recorder(&log, ActionName::DisableCheckIn))
        .with(ActionName::SendFeedbackSurvey, |_: &Event, _: &str| -> Result<(), ActionError> {
            Err(ActionError::failed("survey service down"))
        })
        .with(ActionName::GenerateFinalReport, recorder(&log, ActionName::GenerateFinalReport));
    let engine = engine_with_actions(vec![event_in("evt-act", EventState::InProgress)], actions);

    let result = engine
        .transition(&id("evt-act"), EventState::Completed, "user1", TransitionOptions::new())
        .await
        .unwrap();

    let outcomes: Vec<_> = result.steps[0]
        .actions
        .iter()
        .map(|o| (o.action, o.ok))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (ActionName::DisableCheckIn, true),
            (ActionName::SendFeedbackSurvey, false),
            (ActionName::GenerateFinalReport, true),
        ]
    );
    assert_eq!(
        *log.lock(),
        vec![ActionName::DisableCheckIn, ActionName::GenerateFinalReport]
    );
    assert_eq!(result.steps[0].failed_actions().count(), 1);
    assert_eq!(
        engine.store().get(&id("evt-act")).unwrap().status,
        EventState::Completed
    );
}

#[tokio::test]
async fn invalid_edge_leaves_event_untouched() {
    let original = event_in("evt-bad", EventState::Draft).with_field("title", "Atlas Summit");
    let engine = engine_with(vec![original.clone()]);

    let err = engine
        .transition(&id("evt-bad"), EventState::InProgress, "user1", TransitionOptions::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransitionError::InvalidTransition {
            event_id: id("evt-bad"),
            from: EventState::Draft,
            to: EventState::InProgress,
            forced: false,
        }
    );
    assert_eq!(engine.store().get(&id("evt-bad")).unwrap(), original);
}

#[tokio::test]
async fn nothing_transitions_back_into_draft() {
    let engine = engine_with(vec![event_in("evt-p", EventState::Postponed)]);
    let err = engine
        .transition(&id("evt-p"), EventState::Draft, "admin", TransitionOptions::new().forced())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
}

struct AssignReviewers {
    store: InMemoryEventStore,
}

impl ActionHandler for AssignReviewers {
    fn handle<'a>(&'a self, event: &'a Event, _actor: &'a str) -> ActionFuture<'a> {
        Box::pin(async move {
            let mut current = self
                .store
                .load(&event.id)
                .await
                .map_err(|e| ActionError::failed(e.to_string()))?;
            let version = current.version;
            current.set_field("abstractSettings.reviewersAssigned", true);
            current.version += 1;
            self.store
                .save(current, version)
                .await
                .map_err(|e| ActionError::failed(e.to_string()))
        })
    }
}

#[tokio::test]
async fn chain_sees_fields_written_by_actions() {
    let store = InMemoryEventStore::new();
    store
        .insert(
            event_in("evt-rev", EventState::AbstractSubmissionOpen)
                .with_field("abstractSettings.deadline", "2026-08-01"),
        )
        .unwrap();
    let actions = ActionRegistry::new().with(
        ActionName::AssignReviewers,
        AssignReviewers {
            store: store.clone(),
        },
    );
    let engine = TransitionEngine::builder(store)
        .clock(clock())
        .actions(actions)
        .build();

    let result = engine
        .transition(
            &id("evt-rev"),
            EventState::AbstractSubmissionClosed,
            "chair",
            TransitionOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.final_state(), EventState::ReviewInProgress);
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.steps[1].record.actor, "system");
    assert_eq!(
        result.event.field("abstractSettings.reviewersAssigned"),
        Some(&json!(true))
    );
}

fn pause_loop_registry() -> StateRegistry {
    StateRegistry::builder()
        .edges(EventState::Draft, &[EventState::InProgress])
        .edges(EventState::InProgress, &[EventState::Paused])
        .edges(EventState::Paused, &[EventState::InProgress])
        .conditional_rule(
            EventState::InProgress,
            EventState::Paused,
            DataCondition::FlagSet { path: "flapping".into() },
        )
        .conditional_rule(
            EventState::Paused,
            EventState::InProgress,
            DataCondition::FlagSet { path: "flapping".into() },
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn automatic_cycle_stops_at_depth_bound() {
    let store = InMemoryEventStore::new();
    store
        .insert(Event::new(id("evt-loop")).with_field("flapping", true))
        .unwrap();
    let engine = TransitionEngine::builder(store)
        .registry(pause_loop_registry())
        .clock(clock())
        .config(EngineConfig {
            max_chain_depth: 4,
            ..EngineConfig::default()
        })
        .build();

    let result = engine
        .transition(&id("evt-loop"), EventState::InProgress, "user1", TransitionOptions::new())
        .await
        .unwrap();

    assert_eq!(result.steps.len(), 5);
    assert!(matches!(
        result.chain_halt,
        Some(ChainHalt::DepthExceeded { max_depth: 4, .. })
    ));
    assert_eq!(result.final_state(), EventState::InProgress);
    assert_eq!(engine.store().get(&id("evt-loop")).unwrap().state_history.len(), 5);
}

#[tokio::test]
async fn failed_follow_up_keeps_committed_link() {
    let registry = StateRegistry::builder()
        .edges(EventState::Draft, &[EventState::Planning])
        .edges(EventState::Planning, &[EventState::Approved])
        .requirement(
            EventState::Approved,
            RequirementRule::new(&["title"], &[ValidationName::VenueAvailability]),
        )
        .conditional_rule(
            EventState::Planning,
            EventState::Approved,
            DataCondition::FlagSet { path: "autoApprove".into() },
        )
        .build()
        .unwrap();
    let store = InMemoryEventStore::new();
    store
        .insert(Event::new(id("evt-auto")).with_field("autoApprove", true))
        .unwrap();
    let engine = TransitionEngine::builder(store)
        .registry(registry)
        .clock(clock())
        .build();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    engine
        .observers()
        .on_transition_error(move |notice| sink.lock().push(notice.kind.clone()));

    let result = engine
        .transition(&id("evt-auto"), EventState::Planning, "user1", TransitionOptions::new())
        .await
        .unwrap();

    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.final_state(), EventState::Planning);
    let Some(ChainHalt::FollowUpFailed { edge, error }) = &result.chain_halt else {
        panic!("expected a failed follow-up, got {:?}", result.chain_halt);
    };
    assert_eq!(edge.to, EventState::Approved);
    assert_eq!(error.kind(), "requirements_not_met");
    assert_eq!(*errors.lock(), vec!["requirements_not_met".to_string()]);
    assert_eq!(engine.store().get(&id("evt-auto")).unwrap().version, 1);
}

#[tokio::test]
async fn observers_see_every_link() {
    let event = event_in("evt-obs", EventState::RegistrationOpen)
        .with_field("registrationSettings.deadline", "2026-02-01");
    let engine = engine_with(vec![event]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    engine
        .observers()
        .on_transition(move |n| sink.lock().push((n.to_state, n.actor.clone(), n.automatic)));

    engine
        .transition(
            &id("evt-obs"),
            EventState::RegistrationClosing,
            "user1",
            TransitionOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        *seen.lock(),
        vec![
            (EventState::RegistrationClosing, "user1".to_string(), false),
            (EventState::RegistrationClosed, "system".to_string(), true),
        ]
    );
}

#[tokio::test]
async fn rejected_manual_calls_reach_error_observers() {
    let engine = engine_with(vec![event_in("evt-err", EventState::Planning)]);
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    engine.observers().on_transition_error(move |notice| {
        sink.lock().push((
            notice.from_state,
            notice.to_state,
            notice.automatic,
            notice.kind.clone(),
        ))
    });

    let guarded = engine
        .transition(&id("evt-err"), EventState::Approved, "user1", TransitionOptions::new())
        .await;
    assert!(matches!(guarded, Err(TransitionError::RequirementsNotMet { .. })));
    let forced = engine
        .transition(
            &id("evt-err"),
            EventState::Archived,
            "admin",
            TransitionOptions::new().forced(),
        )
        .await;
    assert!(matches!(forced, Err(TransitionError::InvalidTransition { .. })));
    let missing = engine
        .transition(&id("ghost"), EventState::Planning, "user1", TransitionOptions::new())
        .await;
    assert!(matches!(missing, Err(TransitionError::EventNotFound(_))));

    assert_eq!(
        *errors.lock(),
        vec![
            (
                Some(EventState::Planning),
                EventState::Approved,
                false,
                "requirements_not_met".to_string()
            ),
            (
                Some(EventState::Planning),
                EventState::Archived,
                false,
                "invalid_transition".to_string()
            ),
            (None, EventState::Planning, false, "event_not_found".to_string()),
        ]
    );
    assert!(engine.store().get(&id("evt-err")).unwrap().state_history.is_empty());
}

// ─── Concurrency ─────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_on_one_event_serialize() {
    let engine = Arc::new(engine_with(vec![Event::new(id("evt-race"))]));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .transition(
                        &id("evt-race"),
                        EventState::Planning,
                        &format!("user{i}"),
                        TransitionOptions::new(),
                    )
                    .await
            })
        })
        .collect();

    let mut committed = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => committed += 1,
            Err(err) => assert_eq!(err.kind(), "invalid_transition"),
        }
    }

    assert_eq!(committed, 1);
    let stored = engine.store().get(&id("evt-race")).unwrap();
    assert_eq!(stored.state_history.len(), 1);
    assert_eq!(stored.version, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_events_proceed_independently() {
    let events = (0..16).map(|i| Event::new(id(&format!("evt-{i}")))).collect();
    let engine = Arc::new(engine_with(events));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .transition(
                        &id(&format!("evt-{i}")),
                        EventState::Planning,
                        "user1",
                        TransitionOptions::new(),
                    )
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert!(engine
        .store()
        .snapshot()
        .iter()
        .all(|event| event.status == EventState::Planning));
}

/// Loses the first `conflicts` saves to a simulated concurrent writer.
struct ContendedStore {
    inner: InMemoryEventStore,
    conflicts: AtomicU32,
}

impl EventStore for ContendedStore {
    async fn load(&self, id: &EventId) -> Result<Event, StoreError> {
        self.inner.load(id).await
    }

    async fn save(&self, event: Event, expected_version: u64) -> Result<(), StoreError> {
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::VersionConflict {
                event_id: event.id,
                expected: expected_version,
                actual: expected_version + 1,
            });
        }
        self.inner.save(event, expected_version).await
    }

    async fn list_in_states(&self, states: &[EventState]) -> Result<Vec<Event>, StoreError> {
        self.inner.list_in_states(states).await
    }
}

fn contended_engine(conflicts: u32) -> TransitionEngine<ContendedStore> {
    let inner = InMemoryEventStore::new();
    inner.insert(Event::new(id("evt-cas"))).unwrap();
    TransitionEngine::builder(ContendedStore {
        inner,
        conflicts: AtomicU32::new(conflicts),
    })
    .clock(clock())
    .build()
}

#[tokio::test]
async fn version_conflicts_are_retried() {
    let engine = contended_engine(3);
    let result = engine
        .transition(&id("evt-cas"), EventState::Planning, "user1", TransitionOptions::new())
        .await
        .unwrap();
    assert_eq!(result.steps.len(), 1);
    assert_eq!(engine.store().inner.get(&id("evt-cas")).unwrap().version, 1);
}

#[tokio::test]
async fn exhausted_conflict_retries_surface_as_store_error() {
    let engine = contended_engine(4);
    let err = engine
        .transition(&id("evt-cas"), EventState::Planning, "user1", TransitionOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransitionError::Store(StoreError::VersionConflict { .. })
    ));
    assert_eq!(engine.store().inner.get(&id("evt-cas")).unwrap().version, 0);
}

// ─── Scheduled scan races ────────────────────────────────────────────

/// Lists events from a snapshot taken before they were last changed.
struct StaleListingStore {
    inner: InMemoryEventStore,
    listed: Vec<Event>,
}

impl EventStore for StaleListingStore {
    async fn load(&self, id: &EventId) -> Result<Event, StoreError> {
        self.inner.load(id).await
    }

    async fn save(&self, event: Event, expected_version: u64) -> Result<(), StoreError> {
        self.inner.save(event, expected_version).await
    }

    async fn list_in_states(&self, states: &[EventState]) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .listed
            .iter()
            .filter(|event| states.contains(&event.status))
            .cloned()
            .collect())
    }
}

#[tokio::test]
async fn scan_skips_candidate_that_moved_on() {
    let listed = event_in("evt-moved", EventState::RegistrationOpen)
        .with_field("registrationSettings.deadline", "2026-02-28T12:00:00Z");
    let mut current = listed.clone();
    current.status = EventState::Cancelled;
    let inner = InMemoryEventStore::new();
    inner.insert(current).unwrap();
    let engine = TransitionEngine::builder(StaleListingStore {
        inner,
        listed: vec![listed],
    })
    .clock(clock())
    .build();

    let candidates = engine.scan_qualifying().await.unwrap();
    assert_eq!(candidates.len(), 1);

    let report = engine.run_scheduled_scan().await.unwrap();

    assert!(report.applied.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].event_id, id("evt-moved"));
    assert_eq!(report.skipped[0].committed, 0);
    let stored = engine.store().inner.get(&id("evt-moved")).unwrap();
    assert_eq!(stored.status, EventState::Cancelled);
    assert!(stored.state_history.is_empty());
    assert_eq!(stored.version, 0);
}

// ─── History monotonicity ────────────────────────────────────────────

mod history {
    use super::*;
    use proptest::prelude::*;

    fn any_state() -> impl Strategy<Value = EventState> {
        (0..EventState::ALL.len()).prop_map(|i| EventState::ALL[i])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn history_only_grows_one_record_per_link(
            targets in proptest::collection::vec((any_state(), any::<bool>()), 1..24)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let engine = engine_with(vec![Event::new(id("evt-prop"))]);
                let mut previous = Vec::new();

                for (target, force) in targets {
                    let options = if force {
                        TransitionOptions::new().forced()
                    } else {
                        TransitionOptions::new()
                    };
                    let outcome = engine.transition(&id("evt-prop"), target, "user1", options).await;
                    let history = engine.store().get(&id("evt-prop")).unwrap().state_history;

                    match outcome {
                        Ok(result) => {
                            prop_assert_eq!(history.len(), previous.len() + result.steps.len());
                            for (record, step) in history[previous.len()..].iter().zip(&result.steps) {
                                prop_assert_eq!(record, &step.record);
                            }
                        }
                        Err(_) => prop_assert_eq!(history.len(), previous.len()),
                    }
                    prop_assert_eq!(&history[..previous.len()], previous.as_slice());
                    for pair in history.windows(2) {
                        prop_assert_eq!(pair[0].to_state, pair[1].from_state);
                    }
                    previous = history;
                }
                Ok(())
            })?;
        }
    }
}
