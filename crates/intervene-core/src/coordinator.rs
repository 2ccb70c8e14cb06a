//! Intervention coordinator
//!
//! Drives one failure through the state machine:
//! - CREATED: validate the context (the only hard failure)
//! - SUGGESTING: ask the provider, fall back to the generic playbook
//! - AWAITING_DECISION: suspend on the decision source, bounded by the deadline
//! - RESOLVING: validate the decision, loop back on invalid ones
//! - RESOLVED / ESCALATED / ABORTED: append a record, return the action
//!
//! One coordinator serves one session. It never executes the action; the
//! caller does.

use crate::action::{ActionMenu, ResolutionAction};
use crate::config::CoordinatorConfig;
use crate::decision::{Decision, DecisionRequest, DecisionSource};
use crate::error::{DecisionSourceError, InterventionError, InvalidDecision, StateMachineError};
use crate::history::{HistorySnapshot, InterventionLog, InterventionRecord, Outcome};
use crate::ledger::StatisticsLedger;
use crate::state_machine::{validate_transition, InterventionState};
use crate::suggestion::{batch_defect, Suggestion, SuggestionEngine, SuggestionProvider};
use crate::types::{InterventionContext, InterventionId, SessionId};
use chrono::Utc;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Reason recorded when the deadline passes
pub const REASON_TIMEOUT: &str = "timeout";
/// Reason recorded when invalid decisions exceed the bound
pub const REASON_INVALID_BOUND: &str = "invalid decision exceeded retry bound";
/// Reason recorded on external cancellation
pub const REASON_CANCELLED: &str = "externally cancelled";
/// Reason recorded for an operator abort without a reason
pub const REASON_OPERATOR_ABORT: &str = "aborted by decision";

/// Coordinates interventions for one session
pub struct InterventionCoordinator {
    config: CoordinatorConfig,
    provider: Arc<dyn SuggestionProvider>,
    fallback: SuggestionEngine,
    source: Arc<dyn DecisionSource>,
    log: InterventionLog,
    /// Parent of every in-flight intervention's token
    root: Mutex<CancellationToken>,
}

impl fmt::Debug for InterventionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterventionCoordinator")
            .field("config", &self.config)
            .field("records", &self.log.len())
            .finish_non_exhaustive()
    }
}

/// In-flight bookkeeping for one intervention
struct Run {
    id: InterventionId,
    session_id: SessionId,
    state: InterventionState,
    attempt: u32,
}

impl Run {
    fn advance(&mut self, to: InterventionState) -> Result<(), StateMachineError> {
        validate_transition(self.state, to)?;
        tracing::debug!(
            intervention_id = %self.id,
            session_id = %self.session_id,
            from = ?self.state,
            to = ?to,
            attempt = self.attempt,
            "intervention transition"
        );
        self.state = to;
        Ok(())
    }
}

/// How a run ended, before it is recorded
struct Terminal {
    state: InterventionState,
    action: ResolutionAction,
    reason: String,
}

impl Terminal {
    fn abort(state: InterventionState, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            state,
            action: ResolutionAction::abort(reason.clone()),
            reason,
        }
    }
}

/// What came back from one decision round
enum Answer {
    Decided(Decision),
    SourceFailed(DecisionSourceError),
    Cancelled,
}

impl InterventionCoordinator {
    /// Create coordinator with the rule-table suggestion engine
    #[must_use]
    pub fn new(config: CoordinatorConfig, source: Arc<dyn DecisionSource>) -> Self {
        let engine = SuggestionEngine::new().with_limit(config.suggestion_limit());
        Self {
            config,
            provider: Arc::new(engine),
            fallback: engine,
            source,
            log: InterventionLog::new(),
            root: Mutex::new(CancellationToken::new()),
        }
    }

    /// With a different suggestion provider
    #[inline]
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Drive one intervention to a terminal state
    ///
    /// Cancelled by [`InterventionCoordinator::cancel_pending`].
    ///
    /// # Errors
    /// `InterventionError::Validation` for a malformed context. Every
    /// other failure resolves to an ABORT action.
    pub async fn submit(
        &self,
        context: InterventionContext,
    ) -> Result<ResolutionAction, InterventionError> {
        let scope = CancelScope {
            coordinator: self.root.lock().child_token(),
            caller: None,
        };
        self.run(context, scope).await
    }

    /// Like [`InterventionCoordinator::submit`], also cancelled by `cancel`
    ///
    /// # Errors
    /// See [`InterventionCoordinator::submit`].
    pub async fn submit_with_cancel(
        &self,
        context: InterventionContext,
        cancel: CancellationToken,
    ) -> Result<ResolutionAction, InterventionError> {
        let scope = CancelScope {
            coordinator: self.root.lock().child_token(),
            caller: Some(cancel),
        };
        self.run(context, scope).await
    }

    /// Cancel every in-flight intervention
    ///
    /// Interventions submitted afterwards are unaffected.
    pub fn cancel_pending(&self) {
        let previous = std::mem::replace(&mut *self.root.lock(), CancellationToken::new());
        previous.cancel();
    }

    /// Frozen snapshot of every finished intervention
    #[must_use]
    pub fn history(&self) -> HistorySnapshot {
        self.log.snapshot()
    }

    /// Statistics for one session
    #[must_use]
    pub fn summary(&self, session_id: &SessionId) -> StatisticsLedger {
        let snapshot = self.log.snapshot();
        StatisticsLedger::for_session(session_id, snapshot.iter().map(|r| r.as_ref()))
    }

    /// Statistics over the whole history
    #[must_use]
    pub fn summary_all(&self) -> StatisticsLedger {
        let snapshot = self.log.snapshot();
        StatisticsLedger::from_records(snapshot.iter().map(|r| r.as_ref()))
    }

    async fn run(
        &self,
        context: InterventionContext,
        cancel: CancelScope,
    ) -> Result<ResolutionAction, InterventionError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut run = Run {
            id: InterventionId::new(),
            session_id: context.session_id.clone(),
            state: InterventionState::Created,
            attempt: 0,
        };

        if let Err(err) = context.validate() {
            tracing::warn!(
                intervention_id = %run.id,
                session_id = %run.session_id,
                error = %err,
                "rejected intervention context"
            );
            return Err(err.into());
        }
        tracing::info!(
            intervention_id = %run.id,
            session_id = %run.session_id,
            intervention_type = %context.intervention_type,
            "intervention submitted"
        );

        run.advance(InterventionState::Suggesting)?;
        let suggestions: Arc<[Suggestion]> = self.suggestions_for(&run, &context).into();
        let context = Arc::new(context);

        let terminal = if cancel.is_cancelled() {
            run.advance(InterventionState::Aborted)?;
            Terminal::abort(InterventionState::Aborted, REASON_CANCELLED)
        } else {
            self.decide(&mut run, &context, &suggestions, &cancel).await?
        };

        let action = terminal.action.clone();
        self.finish(run, context, suggestions, terminal, started_at, clock);
        Ok(action)
    }

    fn suggestions_for(&self, run: &Run, context: &InterventionContext) -> Vec<Suggestion> {
        if !self.config.enable_suggestions {
            return Vec::new();
        }

        let batch = self.provider.suggest(context);
        match batch_defect(&batch) {
            None => batch,
            Some(defect) => {
                tracing::warn!(
                    intervention_id = %run.id,
                    session_id = %run.session_id,
                    defect,
                    "suggestion provider output unusable, using generic fallback"
                );
                self.fallback.fallback()
            }
        }
    }

    /// Decision rounds until a terminal state
    async fn decide(
        &self,
        run: &mut Run,
        context: &Arc<InterventionContext>,
        suggestions: &Arc<[Suggestion]>,
        cancel: &CancelScope,
    ) -> Result<Terminal, StateMachineError> {
        let menu = ActionMenu::for_type(&context.intervention_type);
        let timeout = self.config.decision_timeout();
        let mut invalid = 0u32;
        let mut rejection = None;

        loop {
            run.advance(InterventionState::AwaitingDecision)?;
            run.attempt += 1;

            let request = DecisionRequest {
                intervention_id: run.id,
                attempt: run.attempt,
                context: Arc::clone(context),
                suggestions: Arc::clone(suggestions),
                menu: menu.clone(),
                rejection: rejection.take(),
            };

            // each round gets the full deadline
            let answer = tokio::select! {
                biased;
                () = cancel.cancelled() => Answer::Cancelled,
                result = tokio::time::timeout(timeout, self.source.decide(&request, timeout)) => {
                    match result {
                        Ok(Ok(decision)) => Answer::Decided(decision),
                        Ok(Err(err)) => Answer::SourceFailed(err),
                        Err(_) => Answer::Decided(Decision::TimedOut),
                    }
                }
            };

            let decision = match answer {
                Answer::Cancelled => {
                    run.advance(InterventionState::Aborted)?;
                    return Ok(Terminal::abort(InterventionState::Aborted, REASON_CANCELLED));
                }
                Answer::SourceFailed(err) => {
                    tracing::warn!(
                        intervention_id = %run.id,
                        session_id = %run.session_id,
                        error = %err,
                        "decision source failed"
                    );
                    run.advance(InterventionState::Escalated)?;
                    return Ok(Terminal::abort(
                        InterventionState::Escalated,
                        format!("decision source unavailable: {err}"),
                    ));
                }
                Answer::Decided(Decision::TimedOut) => {
                    tracing::warn!(
                        intervention_id = %run.id,
                        session_id = %run.session_id,
                        timeout_ms = self.config.decision_timeout_ms,
                        "no decision before deadline"
                    );
                    run.advance(InterventionState::Escalated)?;
                    return Ok(Terminal::abort(InterventionState::Escalated, REASON_TIMEOUT));
                }
                Answer::Decided(decision) => decision,
            };

            run.advance(InterventionState::Resolving)?;
            match accept(decision, context) {
                Ok(action) if action.is_abort() => {
                    run.advance(InterventionState::Aborted)?;
                    let reason = action
                        .abort_reason()
                        .unwrap_or(REASON_OPERATOR_ABORT)
                        .to_string();
                    return Ok(Terminal {
                        state: InterventionState::Aborted,
                        action,
                        reason,
                    });
                }
                Ok(action) => {
                    run.advance(InterventionState::Resolved)?;
                    return Ok(Terminal {
                        state: InterventionState::Resolved,
                        reason: format!("resolved: {action}"),
                        action,
                    });
                }
                Err(err) => {
                    invalid += 1;
                    tracing::warn!(
                        intervention_id = %run.id,
                        session_id = %run.session_id,
                        attempt = run.attempt,
                        error = %err,
                        "invalid decision"
                    );
                    if invalid > self.config.max_invalid_decisions {
                        run.advance(InterventionState::Escalated)?;
                        return Ok(Terminal::abort(
                            InterventionState::Escalated,
                            REASON_INVALID_BOUND,
                        ));
                    }
                    rejection = Some(err.to_string());
                }
            }
        }
    }

    fn finish(
        &self,
        run: Run,
        context: Arc<InterventionContext>,
        suggestions: Arc<[Suggestion]>,
        terminal: Terminal,
        started_at: chrono::DateTime<Utc>,
        clock: Instant,
    ) {
        let outcome = Outcome::from_terminal(terminal.state).unwrap_or(Outcome::Failed);
        let duration = clock.elapsed();

        tracing::info!(
            intervention_id = %run.id,
            session_id = %run.session_id,
            state = ?terminal.state,
            attempt = run.attempt,
            action = %terminal.action,
            reason = %terminal.reason,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "intervention finished"
        );

        let context = Arc::try_unwrap(context).unwrap_or_else(|shared| (*shared).clone());
        self.log.append(InterventionRecord {
            intervention_id: run.id,
            context,
            suggestions: suggestions.to_vec(),
            action: terminal.action,
            outcome,
            final_state: terminal.state,
            reason: terminal.reason,
            attempt_count: run.attempt,
            started_at,
            finished_at: Utc::now(),
            duration,
        });
    }
}

/// Validate a decision in the RESOLVING state
fn accept(
    decision: Decision,
    context: &InterventionContext,
) -> Result<ResolutionAction, InvalidDecision> {
    match decision {
        Decision::Action(action) => {
            action.validate(&context.intervention_type)?;
            Ok(action)
        }
        Decision::Unrecognized { raw } => Err(InvalidDecision::Unrecognized { raw }),
        Decision::TimedOut => Err(InvalidDecision::Unrecognized {
            raw: String::new(),
        }),
    }
}

/// Tokens that can cancel one intervention
struct CancelScope {
    coordinator: CancellationToken,
    caller: Option<CancellationToken>,
}

impl CancelScope {
    fn is_cancelled(&self) -> bool {
        self.coordinator.is_cancelled()
            || self.caller.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    async fn cancelled(&self) {
        match &self.caller {
            Some(caller) => {
                tokio::select! {
                    () = self.coordinator.cancelled() => {}
                    () = caller.cancelled() => {}
                }
            }
            None => self.coordinator.cancelled().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::ScriptedDecisionSource;
    use crate::suggestion::{MockSuggestionProvider, SuggestionCategory};
    use crate::types::{FailedStep, StepKind};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn tool_context() -> InterventionContext {
        InterventionContext::tool_failure(
            "session-1",
            "Find recent papers on quantum error correction",
            FailedStep::new(StepKind::ToolCall, "arxiv_search"),
            "Network timeout while calling arxiv_search",
        )
    }

    fn coordinator(
        config: CoordinatorConfig,
        source: &Arc<ScriptedDecisionSource>,
    ) -> InterventionCoordinator {
        InterventionCoordinator::new(config, source.clone())
    }

    fn quick() -> CoordinatorConfig {
        CoordinatorConfig::new().with_decision_timeout(Duration::from_millis(100))
    }

    #[tokio::test]
    async fn alternative_round_trip() {
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::alternative("X"),
        ]));
        let coordinator = coordinator(quick(), &source);

        let action = coordinator.submit(tool_context()).await.unwrap();

        assert_eq!(action, ResolutionAction::alternative("X"));
        let history = coordinator.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, action);
        assert_eq!(history[0].final_state, InterventionState::Resolved);
        assert_eq!(history[0].outcome, Outcome::Succeeded);
        assert_eq!(history[0].attempt_count, 1);
        assert_eq!(history[0].reason, "resolved: alternative: X");
    }

    #[tokio::test]
    async fn malformed_context_is_rejected_without_record() {
        let source = Arc::new(ScriptedDecisionSource::new());
        let coordinator = coordinator(quick(), &source);
        let mut context = tool_context();
        context.failed_step = None;

        let err = coordinator.submit(context).await.unwrap_err();

        assert!(err.is_validation());
        assert!(coordinator.history().is_empty());
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn timeout_resolves_as_abort() {
        let source = Arc::new(ScriptedDecisionSource::new());
        let coordinator = coordinator(
            CoordinatorConfig::new().with_decision_timeout(Duration::from_millis(50)),
            &source,
        );

        let started = Instant::now();
        let action = coordinator.submit(tool_context()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(action, ResolutionAction::abort(REASON_TIMEOUT));
        let history = coordinator.history();
        let record = &history[0];
        assert_eq!(record.reason, "timeout");
        assert_eq!(record.final_state, InterventionState::Escalated);
        assert_eq!(record.outcome, Outcome::Failed);
    }

    #[tokio::test]
    async fn invalid_then_valid_decision() {
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::alternative(" "),
            ResolutionAction::Skip,
        ]));
        let coordinator = coordinator(quick(), &source);

        let action = coordinator.submit(tool_context()).await.unwrap();

        assert_eq!(action, ResolutionAction::Skip);
        assert_eq!(coordinator.history()[0].attempt_count, 2);
        let requests = source.requests();
        assert_eq!(requests[0].rejection, None);
        assert_eq!(requests[1].attempt, 2);
        assert!(requests[1]
            .rejection
            .as_deref()
            .unwrap()
            .contains("alternative_approach"));
    }

    #[tokio::test]
    async fn invalid_decisions_beyond_bound_force_abort() {
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            Decision::Unrecognized {
                raw: "maybe".to_string(),
            },
            Decision::Action(ResolutionAction::alternative("")),
            Decision::Action(ResolutionAction::Skip),
        ]));
        let coordinator = coordinator(quick(), &source);

        let action = coordinator.submit(tool_context()).await.unwrap();

        assert_eq!(action, ResolutionAction::abort(REASON_INVALID_BOUND));
        assert_eq!(source.remaining(), 1);
        let history = coordinator.history();
        let record = &history[0];
        assert_eq!(record.reason, REASON_INVALID_BOUND);
        assert_eq!(record.attempt_count, 2);
    }

    #[tokio::test]
    async fn higher_bound_allows_more_rounds() {
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::alternative(""),
            ResolutionAction::alternative(""),
            ResolutionAction::retry(),
        ]));
        let coordinator = coordinator(quick().with_max_invalid_decisions(2), &source);

        let action = coordinator.submit(tool_context()).await.unwrap();
        assert_eq!(action, ResolutionAction::retry());
        assert_eq!(coordinator.history()[0].attempt_count, 3);
    }

    #[tokio::test]
    async fn deadline_restarts_each_round() {
        let source = Arc::new(ScriptedDecisionSource::new());
        source.push_delayed(ResolutionAction::alternative(""), Duration::from_millis(60));
        source.push_delayed(ResolutionAction::Skip, Duration::from_millis(60));
        let coordinator = coordinator(
            CoordinatorConfig::new().with_decision_timeout(Duration::from_millis(100)),
            &source,
        );

        let action = coordinator.submit(tool_context()).await.unwrap();
        assert_eq!(action, ResolutionAction::Skip);
    }

    #[tokio::test]
    async fn operator_abort_is_recorded_as_aborted() {
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::Abort { reason: None },
        ]));
        let coordinator = coordinator(quick(), &source);

        let action = coordinator.submit(tool_context()).await.unwrap();

        assert_eq!(action, ResolutionAction::Abort { reason: None });
        let history = coordinator.history();
        let record = &history[0];
        assert_eq!(record.final_state, InterventionState::Aborted);
        assert_eq!(record.outcome, Outcome::Aborted);
        assert_eq!(record.reason, REASON_OPERATOR_ABORT);
    }

    #[tokio::test]
    async fn source_failure_escalates() {
        let source = Arc::new(ScriptedDecisionSource::new());
        source.push_error(DecisionSourceError::Disconnected);
        let coordinator = coordinator(quick(), &source);

        let action = coordinator.submit(tool_context()).await.unwrap();

        assert!(action.is_abort());
        let history = coordinator.history();
        let record = &history[0];
        assert_eq!(record.final_state, InterventionState::Escalated);
        assert_eq!(
            record.reason,
            "decision source unavailable: decision channel disconnected"
        );
    }

    #[tokio::test]
    async fn cancel_pending_unblocks_submit() {
        let source = Arc::new(ScriptedDecisionSource::new());
        let coordinator = Arc::new(coordinator(CoordinatorConfig::new(), &source));

        let pending = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.submit(tool_context()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        coordinator.cancel_pending();

        let action = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(action, ResolutionAction::abort(REASON_CANCELLED));
        let history = coordinator.history();
        let record = &history[0];
        assert_eq!(record.final_state, InterventionState::Aborted);
        assert_eq!(record.reason, "externally cancelled");

        // later submissions are not affected
        source.push(ResolutionAction::Skip);
        assert_eq!(
            coordinator.submit(tool_context()).await.unwrap(),
            ResolutionAction::Skip
        );
    }

    #[tokio::test]
    async fn caller_token_cancels() {
        let source = Arc::new(ScriptedDecisionSource::new());
        let coordinator = coordinator(CoordinatorConfig::new(), &source);
        let token = CancellationToken::new();
        let trigger = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let action = coordinator
            .submit_with_cancel(tool_context(), token)
            .await
            .unwrap();
        assert_eq!(action, ResolutionAction::abort(REASON_CANCELLED));
    }

    #[tokio::test]
    async fn already_cancelled_token_aborts_before_asking() {
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::Skip,
        ]));
        let coordinator = coordinator(quick(), &source);
        let token = CancellationToken::new();
        token.cancel();

        let action = coordinator
            .submit_with_cancel(tool_context(), token)
            .await
            .unwrap();

        assert_eq!(action, ResolutionAction::abort(REASON_CANCELLED));
        assert!(source.requests().is_empty());
        assert_eq!(coordinator.history()[0].attempt_count, 0);
    }

    #[tokio::test]
    async fn empty_provider_output_uses_fallback() {
        let mut provider = MockSuggestionProvider::new();
        provider.expect_suggest().times(1).returning(|_| Vec::new());
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::Skip,
        ]));
        let coordinator = coordinator(quick(), &source).with_provider(Arc::new(provider));

        coordinator.submit(tool_context()).await.unwrap();

        let requests = source.requests();
        let offered = &requests[0].suggestions;
        assert_eq!(offered.len(), 5);
        assert!(offered
            .iter()
            .all(|s| s.category == SuggestionCategory::Fallback));
        assert_eq!(coordinator.history()[0].suggestions.len(), 5);
    }

    #[tokio::test]
    async fn malformed_provider_output_uses_fallback() {
        let mut provider = MockSuggestionProvider::new();
        provider.expect_suggest().returning(|_| {
            let mut batch = SuggestionEngine::new().fallback();
            batch[1].text = batch[0].text.clone();
            batch
        });
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::Skip,
        ]));
        let coordinator = coordinator(quick(), &source).with_provider(Arc::new(provider));

        coordinator.submit(tool_context()).await.unwrap();

        let requests = source.requests();
        let offered = &requests[0].suggestions;
        assert_eq!(batch_defect(offered), None);
    }

    #[tokio::test]
    async fn disabled_suggestions_skip_provider() {
        let mut provider = MockSuggestionProvider::new();
        provider.expect_suggest().never();
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::Skip,
        ]));
        let coordinator = coordinator(quick().with_suggestions(false), &source)
            .with_provider(Arc::new(provider));

        let action = coordinator.submit(tool_context()).await.unwrap();

        assert_eq!(action, ResolutionAction::Skip);
        assert!(source.requests()[0].suggestions.is_empty());
    }

    #[tokio::test]
    async fn summary_filters_by_session() {
        let source = Arc::new(ScriptedDecisionSource::with_decisions([
            ResolutionAction::Skip,
            ResolutionAction::Skip,
        ]));
        let coordinator = coordinator(quick(), &source);
        let mut other = tool_context();
        other.session_id = SessionId::new("session-2");

        coordinator.submit(tool_context()).await.unwrap();
        coordinator.submit(other).await.unwrap();

        assert_eq!(
            coordinator
                .summary(&SessionId::new("session-1"))
                .total_interventions,
            1
        );
        assert_eq!(coordinator.summary_all().total_interventions, 2);
    }
}
