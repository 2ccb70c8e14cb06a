//! Per-intervention state machine
//!
//! ```text
//! Created -> Suggesting -> AwaitingDecision <-> Resolving -> Resolved
//!                                  |                |
//!                                  +-> Escalated <--+
//!                                  +-> Aborted   <--+
//! ```

use crate::error::StateMachineError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of one intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionState {
    /// Context received, not yet validated
    Created,
    /// Generating suggestions
    Suggesting,
    /// Suspended on the decision source
    AwaitingDecision,
    /// Validating the returned decision
    Resolving,
    /// A valid decision was accepted
    Resolved,
    /// No usable decision arrived (timeout, invalid bound, source failure)
    Escalated,
    /// Aborted by decision or external cancellation
    Aborted,
}

impl InterventionState {
    /// Terminal states produce a record
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Escalated | Self::Aborted)
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: InterventionState) -> Vec<InterventionState> {
    use InterventionState::*;
    match from {
        Created => vec![Suggesting],
        Suggesting => vec![AwaitingDecision, Aborted],
        AwaitingDecision => vec![Resolving, Escalated, Aborted],
        Resolving => vec![AwaitingDecision, Resolved, Escalated, Aborted],
        Resolved | Escalated | Aborted => vec![],
    }
}

/// Validates a state transition
///
/// # Errors
/// `StateMachineError::IllegalTransition` when `to` is not reachable.
pub fn validate_transition(
    from: InterventionState,
    to: InterventionState,
) -> Result<(), StateMachineError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StateMachineError::IllegalTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::InterventionState::*;
    use super::*;

    #[test]
    fn happy_path_is_legal() {
        let path = [Created, Suggesting, AwaitingDecision, Resolving, Resolved];
        for pair in path.windows(2) {
            assert!(validate_transition(pair[0], pair[1]).is_ok());
        }
    }

    #[test]
    fn invalid_decision_loops_back() {
        assert!(validate_transition(Resolving, AwaitingDecision).is_ok());
    }

    #[test]
    fn cannot_skip_validation() {
        assert!(validate_transition(Created, AwaitingDecision).is_err());
        assert!(validate_transition(AwaitingDecision, Resolved).is_err());
    }

    #[test]
    fn terminal_states_are_final() {
        for state in [Resolved, Escalated, Aborted] {
            assert!(state.is_terminal());
            assert!(allowed_transitions(state).is_empty());
        }
        assert!(!Resolving.is_terminal());
    }
}
