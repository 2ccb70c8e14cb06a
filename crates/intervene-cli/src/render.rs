//! Plain-text rendering of decision payloads and results

use intervene_core::{
    DecisionRequest, InterventionContext, InterventionRecord, InterventionType,
    StatisticsLedger, Suggestion,
};
use std::fmt;

/// Decision payload as shown to an operator
pub(crate) struct RequestView<'a>(pub(crate) &'a DecisionRequest);

impl fmt::Display for RequestView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = self.0;
        writeln!(
            f,
            "Intervention {} (attempt {})",
            request.intervention_id, request.attempt
        )?;
        write!(f, "{}", ContextView(&request.context))?;

        if let Some(rejection) = &request.rejection {
            writeln!(f, "Previous answer rejected: {rejection}")?;
        }

        if !request.suggestions.is_empty() {
            writeln!(f, "Suggestions:")?;
            write!(f, "{}", SuggestionsView(&request.suggestions))?;
        }

        writeln!(f, "Actions:")?;
        for option in &request.menu.options {
            writeln!(f, "  {}) {}", option.key, option.label)?;
        }
        write!(
            f,
            "Answer with a number or keyword and an optional payload, e.g. \"1: google_scholar_api\""
        )
    }
}

/// The failure itself
pub(crate) struct ContextView<'a>(pub(crate) &'a InterventionContext);

impl fmt::Display for ContextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = self.0;
        writeln!(f, "Type: {}", context.intervention_type)?;
        if !context.original_query.is_empty() {
            writeln!(f, "Query: {}", context.original_query)?;
        }
        if let Some(step) = &context.failed_step {
            writeln!(f, "Failed step: [{}] {}", step.kind, step.description)?;
        }

        let label = match context.intervention_type {
            InterventionType::PlanFailure => "Failure reason",
            _ => "Error",
        };
        if !context.error_message.is_empty() {
            writeln!(f, "{label}: {}", context.error_message)?;
        }

        if !context.current_plan.is_empty() {
            writeln!(
                f,
                "Plan ({}/{} completed):",
                context.completed_steps.len(),
                context.current_plan.len()
            )?;
            let done = context.completed_steps.len();
            for (index, step) in context.current_plan.iter().enumerate() {
                let mark = if index < done { "x" } else { " " };
                writeln!(f, "  {}. [{mark}] {step}", index + 1)?;
            }
        }
        Ok(())
    }
}

/// Ranked suggestion list
pub(crate) struct SuggestionsView<'a>(pub(crate) &'a [Suggestion]);

impl fmt::Display for SuggestionsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for suggestion in self.0 {
            writeln!(f, "  {}. {}", suggestion.rank, suggestion.text)?;
        }
        Ok(())
    }
}

/// One finished intervention
pub(crate) struct RecordView<'a>(pub(crate) &'a InterventionRecord);

impl fmt::Display for RecordView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        writeln!(f, "Action: {}", record.action)?;
        writeln!(f, "Final state: {:?}", record.final_state)?;
        writeln!(f, "Reason: {}", record.reason)?;
        writeln!(f, "Decision rounds: {}", record.attempt_count)?;
        writeln!(f, "Duration: {} ms", record.duration.as_millis())
    }
}

/// Session statistics
pub(crate) struct SummaryView<'a>(pub(crate) &'a StatisticsLedger);

impl fmt::Display for SummaryView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ledger = self.0;
        if let Some(session) = &ledger.session_id {
            writeln!(f, "Session: {session}")?;
        }
        writeln!(f, "Total interventions: {}", ledger.total_interventions)?;
        for (kind, count) in &ledger.intervention_types {
            writeln!(f, "  {kind}: {count}")?;
        }
        writeln!(f, "Success rate: {:.1}%", ledger.success_rate * 100.0)?;
        match ledger.average_recovery_duration {
            Some(average) => writeln!(f, "Average recovery: {} ms", average.as_millis()),
            None => writeln!(f, "Average recovery: n/a"),
        }
    }
}
