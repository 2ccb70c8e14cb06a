//! Session statistics
//!
//! The ledger is never stored. It is recomputed from the record history
//! every time, so it cannot drift from what it summarizes.

use crate::action::ActionChoice;
use crate::history::{InterventionRecord, Outcome};
use crate::types::{InterventionType, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Aggregate statistics over a set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsLedger {
    /// Session summarized, `None` for the whole history
    pub session_id: Option<SessionId>,
    /// Number of completed interventions
    pub total_interventions: usize,
    /// Interventions per type
    pub intervention_types: BTreeMap<InterventionType, usize>,
    /// Resolutions per action family
    pub actions: BTreeMap<ActionChoice, usize>,
    /// Interventions that resolved successfully
    pub succeeded: usize,
    /// Interventions that escalated
    pub failed: usize,
    /// Interventions that were aborted
    pub aborted: usize,
    /// `succeeded / total_interventions`, 0.0 when empty
    pub success_rate: f64,
    /// Mean submit-to-resolution time, `None` when empty
    pub average_recovery_duration: Option<Duration>,
}

impl StatisticsLedger {
    /// Summarize the given records
    #[must_use]
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a InterventionRecord>,
    {
        let mut ledger = Self::default();
        let mut total_duration = Duration::ZERO;

        for record in records {
            ledger.total_interventions += 1;
            *ledger
                .intervention_types
                .entry(record.intervention_type().clone())
                .or_default() += 1;
            *ledger.actions.entry(record.action.choice()).or_default() += 1;
            match record.outcome {
                Outcome::Succeeded => ledger.succeeded += 1,
                Outcome::Failed => ledger.failed += 1,
                Outcome::Aborted => ledger.aborted += 1,
            }
            total_duration = total_duration.saturating_add(record.duration);
        }

        if ledger.total_interventions > 0 {
            #[allow(clippy::cast_precision_loss)]
            {
                ledger.success_rate =
                    ledger.succeeded as f64 / ledger.total_interventions as f64;
            }
            let count = u32::try_from(ledger.total_interventions).unwrap_or(u32::MAX);
            ledger.average_recovery_duration = Some(total_duration / count);
        }

        ledger
    }

    /// Summarize the records of one session
    #[must_use]
    pub fn for_session<'a, I>(session_id: &SessionId, records: I) -> Self
    where
        I: IntoIterator<Item = &'a InterventionRecord>,
    {
        let mut ledger = Self::from_records(
            records
                .into_iter()
                .filter(|record| record.session_id() == session_id),
        );
        ledger.session_id = Some(session_id.clone());
        ledger
    }

    /// Count for one intervention type
    #[must_use]
    pub fn count_of(&self, intervention_type: &InterventionType) -> usize {
        self.intervention_types
            .get(intervention_type)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::record;
    use crate::state_machine::InterventionState;

    #[test]
    fn empty_history() {
        let ledger = StatisticsLedger::from_records(std::iter::empty());
        assert_eq!(ledger.total_interventions, 0);
        assert_eq!(ledger.success_rate, 0.0);
        assert_eq!(ledger.average_recovery_duration, None);
    }

    #[test]
    fn counts_and_rates() {
        let records = vec![
            record("s", InterventionType::ToolFailure, InterventionState::Resolved, 100),
            record("s", InterventionType::ToolFailure, InterventionState::Escalated, 300),
            record("s", InterventionType::PlanFailure, InterventionState::Resolved, 200),
            record("s", InterventionType::PlanFailure, InterventionState::Aborted, 400),
        ];
        let ledger = StatisticsLedger::from_records(&records);

        assert_eq!(ledger.total_interventions, 4);
        assert_eq!(ledger.count_of(&InterventionType::ToolFailure), 2);
        assert_eq!(ledger.count_of(&InterventionType::PlanFailure), 2);
        assert_eq!(ledger.succeeded, 2);
        assert_eq!(ledger.failed, 1);
        assert_eq!(ledger.aborted, 1);
        assert_eq!(ledger.success_rate, 0.5);
        assert_eq!(
            ledger.average_recovery_duration,
            Some(Duration::from_millis(250))
        );
        assert_eq!(ledger.actions.get(&ActionChoice::Skip), Some(&2));
        assert_eq!(ledger.actions.get(&ActionChoice::Abort), Some(&2));
    }

    #[test]
    fn session_filter() {
        let records = vec![
            record("a", InterventionType::ToolFailure, InterventionState::Resolved, 10),
            record("b", InterventionType::ToolFailure, InterventionState::Resolved, 10),
            record("a", InterventionType::PlanFailure, InterventionState::Escalated, 10),
        ];
        let ledger = StatisticsLedger::for_session(&SessionId::new("a"), &records);

        assert_eq!(ledger.session_id, Some(SessionId::new("a")));
        assert_eq!(ledger.total_interventions, 2);
        assert_eq!(ledger.success_rate, 0.5);
        assert_eq!(ledger.count_of(&InterventionType::ToolFailure), 1);
    }
}
