//! Intervene Core - failure intervention for autonomous agents
//!
//! When a tool call fails, or a whole plan becomes unworkable, the agent
//! hands the failure to an [`InterventionCoordinator`], which:
//! - Validates the failure context
//! - Synthesizes ranked recovery suggestions
//! - Suspends until a decision source (operator or policy) answers
//! - Validates the decision, bounded by a deadline and a retry limit
//! - Records the outcome for session statistics
//!
//! The caller gets back a [`ResolutionAction`] and executes it.
//!
//! # Example
//!
//! ```rust,ignore
//! use intervene_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(ScriptedDecisionSource::with_decisions([
//!     ResolutionAction::alternative("google_scholar_api"),
//! ]));
//! let coordinator = InterventionCoordinator::new(CoordinatorConfig::new(), source);
//!
//! let context = InterventionContext::tool_failure(
//!     "session-1",
//!     "Find recent papers on quantum error correction",
//!     FailedStep::new(StepKind::ToolCall, "arxiv_search"),
//!     "Network timeout while calling arxiv_search",
//! );
//! let action = coordinator.submit(context).await?;
//!
//! println!("resolved with {action}");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod action;
pub mod config;
pub mod coordinator;
pub mod decision;
pub mod error;
pub mod history;
pub mod ledger;
pub mod registry;
pub mod state_machine;
pub mod suggestion;
pub mod types;

// Re-exports for convenience
pub use action::{ActionChoice, ActionMenu, MenuOption, ResolutionAction};
pub use config::{CoordinatorConfig, MAX_SUGGESTIONS, MIN_SUGGESTIONS};
pub use coordinator::InterventionCoordinator;
pub use decision::{
    parse_raw_decision, ChannelDecisionSource, Decision, DecisionRequest, DecisionSource,
    DecisionTicket, ScriptedDecisionSource, TopSuggestionPolicy,
};
pub use error::{
    ConfigError, DecisionSourceError, InterventionError, InvalidDecision, StateMachineError,
    ValidationError,
};
pub use history::{HistorySnapshot, InterventionLog, InterventionRecord, Outcome};
pub use ledger::StatisticsLedger;
pub use registry::SessionRegistry;
pub use state_machine::InterventionState;
pub use suggestion::{
    batch_defect, FailureCategory, PlanCondition, Suggestion, SuggestionCategory,
    SuggestionEngine, SuggestionProvider,
};
pub use types::{
    FailedStep, InterventionContext, InterventionId, InterventionType, Parameters, SessionId,
    StepKind,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Intervene Core
    pub use crate::{
        CoordinatorConfig, Decision, DecisionSource, FailedStep, InterventionContext,
        InterventionCoordinator, InterventionError, InterventionType, ResolutionAction,
        ScriptedDecisionSource, SessionId, StatisticsLedger, StepKind, Suggestion,
        SuggestionEngine,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
