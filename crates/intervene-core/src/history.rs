//! Append-only intervention history
//!
//! One record per intervention that reached a terminal state. Records are
//! never mutated after append. Readers take a snapshot, which is a frozen
//! prefix of the log and stays valid while appends continue.

use crate::action::ResolutionAction;
use crate::state_machine::InterventionState;
use crate::suggestion::Suggestion;
use crate::types::{InterventionContext, InterventionId, InterventionType, SessionId};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// How an intervention ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A non-abort decision was accepted
    Succeeded,
    /// No usable decision (timeout, invalid bound, source failure)
    Failed,
    /// Aborted by decision or external cancellation
    Aborted,
}

impl Outcome {
    /// Outcome implied by a terminal state
    #[must_use]
    pub fn from_terminal(state: InterventionState) -> Option<Self> {
        match state {
            InterventionState::Resolved => Some(Self::Succeeded),
            InterventionState::Escalated => Some(Self::Failed),
            InterventionState::Aborted => Some(Self::Aborted),
            _ => None,
        }
    }
}

/// Immutable record of one finished intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionRecord {
    /// Intervention id
    pub intervention_id: InterventionId,
    /// Context snapshot
    pub context: InterventionContext,
    /// Suggestions offered to the decision source
    pub suggestions: Vec<Suggestion>,
    /// Action returned to the caller
    pub action: ResolutionAction,
    /// Outcome classification
    pub outcome: Outcome,
    /// Terminal state reached
    pub final_state: InterventionState,
    /// Human readable reason for the resolution
    pub reason: String,
    /// Number of decision rounds
    pub attempt_count: u32,
    /// When submit started
    pub started_at: DateTime<Utc>,
    /// When the terminal state was reached
    pub finished_at: DateTime<Utc>,
    /// Wall-clock time from submit to terminal state
    pub duration: Duration,
}

impl InterventionRecord {
    /// Session the record belongs to
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.context.session_id
    }

    /// Intervention type
    #[inline]
    #[must_use]
    pub fn intervention_type(&self) -> &InterventionType {
        &self.context.intervention_type
    }

    /// Check if the intervention resolved successfully
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }
}

/// Frozen view of the history
pub type HistorySnapshot = im::Vector<Arc<InterventionRecord>>;

/// Append-only record log
#[derive(Debug, Default)]
pub struct InterventionLog {
    inner: RwLock<HistorySnapshot>,
}

impl InterventionLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its position
    pub(crate) fn append(&self, record: InterventionRecord) -> usize {
        let mut guard = self.inner.write();
        guard.push_back(Arc::new(record));
        guard.len() - 1
    }

    /// Cheap structural-sharing snapshot
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        self.inner.read().clone()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if no intervention finished yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
