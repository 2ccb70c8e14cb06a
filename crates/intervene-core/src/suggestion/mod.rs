//! Recovery suggestion synthesis
//!
//! The engine is a pure function of the intervention context: no I/O, no
//! clock, no randomness. The same context always yields the same ranked
//! batch.
//!
//! - Tool failures: the error message is classified into one
//!   [`FailureCategory`] and combined with the failed step's kind.
//! - Plan failures: the failure reason is classified into a
//!   [`PlanCondition`] and combined with how much of the plan completed.
//! - Any other intervention kind gets the generic playbook.
//!
//! The coordinator talks to the engine through [`SuggestionProvider`] so
//! that a misbehaving provider can be replaced by the generic fallback.

mod classify;
mod playbook;

pub use classify::{classify_error, classify_plan_failure, FailureCategory, PlanCondition};

use crate::config::{MAX_SUGGESTIONS, MIN_SUGGESTIONS};
use crate::types::{InterventionContext, InterventionType};
use playbook::Move;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What produced a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    /// Tool failure playbook
    Tool(FailureCategory),
    /// Plan failure playbook
    Plan(PlanCondition),
    /// Generic fallback substituted by the coordinator
    Fallback,
}

/// One ranked, advisory recovery recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// 1-based rank, 1 is the most useful
    pub rank: u32,
    /// Natural language recommendation
    pub text: String,
    /// Category that produced it
    pub category: SuggestionCategory,
    /// Stable id of the rule that produced it
    pub rule: String,
}

/// Anything that can propose suggestions for a context
#[cfg_attr(test, mockall::automock)]
pub trait SuggestionProvider: Send + Sync {
    /// Ranked suggestions for the context
    fn suggest(&self, context: &InterventionContext) -> Vec<Suggestion>;
}

/// Rule-table driven suggestion engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionEngine {
    limit: usize,
}

impl SuggestionEngine {
    /// Create engine with the default batch size
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            limit: MAX_SUGGESTIONS,
        }
    }

    /// With batch size (clamped to 3..=5)
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(MIN_SUGGESTIONS, MAX_SUGGESTIONS);
        self
    }

    /// Batch size
    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Generate ranked suggestions
    #[must_use]
    pub fn generate(&self, context: &InterventionContext) -> Vec<Suggestion> {
        match context.intervention_type {
            InterventionType::PlanFailure => {
                let condition = classify_plan_failure(&context.error_message);
                let moves = playbook::plan_moves(context, condition);
                finalize(moves, self.limit, SuggestionCategory::Plan(condition))
            }
            InterventionType::Other(_) => finalize(
                playbook::generic_moves(),
                self.limit,
                SuggestionCategory::Tool(FailureCategory::Unrecognized),
            ),
            InterventionType::ToolFailure => {
                let category = classify_error(&context.error_message);
                let mut moves = playbook::category_moves(category);
                if let Some(step) = &context.failed_step {
                    moves.extend(playbook::step_moves(
                        &step.kind,
                        category,
                        &context.error_message,
                    ));
                }
                finalize(moves, self.limit, SuggestionCategory::Tool(category))
            }
        }
    }

    /// The generic playbook: retry, adjust approach, switch provider, skip, abort
    #[must_use]
    pub fn fallback(&self) -> Vec<Suggestion> {
        finalize(
            playbook::generic_moves(),
            self.limit,
            SuggestionCategory::Fallback,
        )
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionProvider for SuggestionEngine {
    fn suggest(&self, context: &InterventionContext) -> Vec<Suggestion> {
        self.generate(context)
    }
}

/// Describe what is wrong with a batch, if anything
///
/// A usable batch is non-empty, ranked 1..=n in order, has no blank
/// texts and no duplicate texts.
#[must_use]
pub fn batch_defect(batch: &[Suggestion]) -> Option<&'static str> {
    if batch.is_empty() {
        return Some("empty batch");
    }
    if batch.iter().any(|s| s.text.trim().is_empty()) {
        return Some("blank suggestion text");
    }
    if !batch
        .iter()
        .zip(1u32..)
        .all(|(suggestion, expected)| suggestion.rank == expected)
    {
        return Some("ranks are not 1..=n");
    }
    let mut seen = HashSet::new();
    if !batch.iter().all(|s| seen.insert(s.text.as_str())) {
        return Some("duplicate suggestions");
    }
    None
}

/// Sort by score, dedupe, truncate keeping pinned moves, top up, rank
fn finalize(mut moves: Vec<Move>, limit: usize, category: SuggestionCategory) -> Vec<Suggestion> {
    // stable: ties keep playbook order
    moves.sort_by(|a, b| b.score.cmp(&a.score));

    let mut rules = HashSet::new();
    let mut texts = HashSet::new();
    moves.retain(|m| rules.insert(m.rule) && texts.insert(m.text.clone()));

    let pinned = moves.iter().filter(|m| m.pinned).count();
    let mut free = limit.max(pinned) - pinned;
    let mut selected: Vec<Move> = moves
        .into_iter()
        .filter(|m| {
            if m.pinned {
                true
            } else if free > 0 {
                free -= 1;
                true
            } else {
                false
            }
        })
        .collect();

    if selected.len() < MIN_SUGGESTIONS {
        for extra in playbook::generic_moves() {
            if selected.len() >= MIN_SUGGESTIONS {
                break;
            }
            if selected
                .iter()
                .all(|m| m.rule != extra.rule && m.text != extra.text)
            {
                selected.push(extra);
            }
        }
    }

    selected
        .into_iter()
        .zip(1u32..)
        .map(|(m, rank)| Suggestion {
            rank,
            text: m.text,
            category,
            rule: m.rule.to_string(),
        })
        .collect()
}
