//! # Scheduled Scan
//!
//! Periodic sweep for time-based transitions. The host calls
//! [`TransitionEngine::run_scheduled_scan`] from whatever scheduler it
//! runs; every qualifying event is moved through the ordinary
//! [`TransitionEngine::transition`] path as the system actor.
//!
//! The scan races user transitions. A hit whose event has already left the
//! scanned state, or whose edge is no longer valid, is a skip rather than a
//! failure.

use serde::{Deserialize, Serialize};

use atlas_core::EventId;
use atlas_state::AutomaticEdge;

use crate::engine::{TransitionEngine, TransitionOptions};
use crate::error::TransitionError;
use crate::store::EventStore;

/// An event that qualifies for an automatic time-based transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanCandidate {
    pub event_id: EventId,
    pub edge: AutomaticEdge,
}

/// What happened to one candidate during a scheduled scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEntry {
    pub event_id: EventId,
    pub edge: AutomaticEdge,
    /// Links committed, including automatic follow-ups. Zero unless applied.
    #[serde(default)]
    pub committed: usize,
    /// Why the candidate was skipped or failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Summary of one scheduled scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Candidates whose transition was committed.
    pub applied: Vec<ScanEntry>,
    /// Candidates that had moved on before their transition ran.
    pub skipped: Vec<ScanEntry>,
    /// Candidates whose transition was rejected or could not be stored.
    pub failed: Vec<ScanEntry>,
}

impl ScanReport {
    /// Number of candidates the scan considered.
    pub fn total(&self) -> usize {
        self.applied.len() + self.skipped.len() + self.failed.len()
    }
}

impl<S: EventStore> TransitionEngine<S> {
    /// Events currently qualifying for a time-based transition, without
    /// applying anything.
    pub async fn scan_qualifying(&self) -> Result<Vec<ScanCandidate>, TransitionError> {
        let states = self.scanner().candidate_states();
        let events = self.store().list_in_states(&states).await?;
        Ok(self
            .scanner()
            .scan_all_qualifying(&events)
            .into_iter()
            .map(|hit| ScanCandidate {
                event_id: hit.event.id.clone(),
                edge: hit.edge,
            })
            .collect())
    }

    /// Apply every qualifying time-based transition.
    ///
    /// Only listing the candidates can fail the whole scan. Individual
    /// transitions are sorted into the report.
    pub async fn run_scheduled_scan(&self) -> Result<ScanReport, TransitionError> {
        let candidates = self.scan_qualifying().await?;
        let mut report = ScanReport::default();

        for ScanCandidate { event_id, edge } in candidates {
            let options = TransitionOptions::new()
                .with_reason(edge.reason.clone())
                .expecting(edge.from);
            let actor = self.config().system_actor.clone();

            match self.transition(&event_id, edge.to, &actor, options).await {
                Ok(result) => report.applied.push(ScanEntry {
                    event_id,
                    edge,
                    committed: result.steps.len(),
                    detail: None,
                }),
                Err(error) if error.is_benign_for_scan() => {
                    tracing::debug!(event_id = %event_id, error = %error, "scan candidate moved on, skipping");
                    report.skipped.push(ScanEntry {
                        event_id,
                        edge,
                        committed: 0,
                        detail: Some(error.to_string()),
                    });
                }
                Err(error) => {
                    tracing::warn!(event_id = %event_id, to = %edge.to, error = %error, "scheduled transition failed");
                    report.failed.push(ScanEntry {
                        event_id,
                        edge,
                        committed: 0,
                        detail: Some(error.to_string()),
                    });
                }
            }
        }

        tracing::info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "scheduled scan finished"
        );
        Ok(report)
    }
}
