//! Error types for the intervention coordinator
//!
//! Only malformed input is a hard failure. Everything that can go wrong
//! after a context has been accepted degrades to a terminal
//! `ResolutionAction`, so the errors below split into:
//! - `ValidationError` - the context cannot be coordinated at all
//! - `InvalidDecision` - a decision was rejected (bounded retry, never surfaced)
//! - `DecisionSourceError` - the decision source itself broke (escalates)
//! - `ConfigError` - configuration could not be loaded
//! - `StateMachineError` - an internal transition bug

use crate::state_machine::InterventionState;

/// Main coordinator error type
#[derive(Debug, thiserror::Error)]
pub enum InterventionError {
    /// The submitted context violates its invariants
    #[error("invalid intervention context: {0}")]
    Validation(#[from] ValidationError),

    /// The coordinator attempted an illegal state transition
    #[error("state machine error: {0}")]
    StateMachine(#[from] StateMachineError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl InterventionError {
    /// Check if the error was caused by malformed input
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Context invariant violations, checked in the CREATED state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Session id is empty or whitespace
    #[error("session_id must not be empty")]
    EmptySessionId,

    /// TOOL_FAILURE without the failed step
    #[error("tool failure requires a failed_step")]
    MissingFailedStep,

    /// PLAN_FAILURE with no plan to reason about
    #[error("plan failure requires a non-empty current_plan")]
    EmptyPlan,

    /// completed_steps is longer than, or diverges from, current_plan
    #[error("completed_steps is not a prefix of current_plan (diverges at step {index})")]
    CompletedStepsNotPrefix {
        /// Zero-based index of the first offending step
        index: usize,
    },
}

/// Reasons a decision is rejected in the RESOLVING state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDecision {
    /// ALTERNATIVE with a blank approach
    #[error("alternative requires a non-empty alternative_approach")]
    EmptyAlternative,

    /// RETRY with a patch that changes nothing
    #[error("retry modifications, when present, must not be empty")]
    EmptyModifications,

    /// Raw operator input that maps to no menu entry
    #[error("unrecognized decision: {raw:?}")]
    Unrecognized {
        /// The raw text as received
        raw: String,
    },
}

/// Failures of the decision source itself
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionSourceError {
    /// The rendering surface went away before answering
    #[error("decision channel disconnected")]
    Disconnected,

    /// Backend specific failure
    #[error("decision source failed: {0}")]
    Failed(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read the configuration file
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or schema error
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid config value for {field}: {message}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// State machine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    /// Transition not present in the transition table
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: InterventionState,
        /// Requested state
        to: InterventionState,
    },
}
