//! Decision sources
//!
//! The coordinator depends only on the [`DecisionSource`] capability.
//! Provided backends:
//! - [`ScriptedDecisionSource`] - replays a fixed script (tests, demos)
//! - [`ChannelDecisionSource`] - hands requests to an external rendering
//!   surface over a channel and waits for its reply
//! - [`TopSuggestionPolicy`] - automated policy taking the best suggestion

use crate::action::{ActionChoice, ActionMenu, ResolutionAction};
use crate::error::DecisionSourceError;
use crate::suggestion::Suggestion;
use crate::types::{InterventionContext, InterventionId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Everything a decision source needs to decide
///
/// This is also the payload a rendering surface shows to an operator:
/// the query, the failed step or plan, the error, the ranked suggestions
/// and the fixed action menu.
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    /// Intervention being decided
    pub intervention_id: InterventionId,
    /// 1-based decision round
    pub attempt: u32,
    /// The failure
    pub context: Arc<InterventionContext>,
    /// Ranked suggestions
    pub suggestions: Arc<[Suggestion]>,
    /// Fixed action menu
    pub menu: ActionMenu,
    /// Why the previous decision was rejected
    pub rejection: Option<String>,
}

impl DecisionRequest {
    /// Highest ranked suggestion
    #[must_use]
    pub fn top_suggestion(&self) -> Option<&Suggestion> {
        self.suggestions.iter().min_by_key(|s| s.rank)
    }
}

/// Answer of a decision source
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// A typed action (still subject to validation)
    Action(ResolutionAction),
    /// Raw input that maps to no menu entry
    Unrecognized {
        /// The raw text
        raw: String,
    },
    /// The source gave up waiting
    TimedOut,
}

impl From<ResolutionAction> for Decision {
    fn from(action: ResolutionAction) -> Self {
        Self::Action(action)
    }
}

/// Capability that supplies resolution decisions
#[async_trait]
pub trait DecisionSource: Send + Sync {
    /// Decide on a request within `timeout`
    ///
    /// The coordinator enforces the deadline independently, so a source
    /// that overruns is cut off either way.
    ///
    /// # Errors
    /// `DecisionSourceError` when the backend itself fails.
    async fn decide(
        &self,
        request: &DecisionRequest,
        timeout: Duration,
    ) -> Result<Decision, DecisionSourceError>;
}

#[async_trait]
impl<T: DecisionSource + ?Sized> DecisionSource for Arc<T> {
    async fn decide(
        &self,
        request: &DecisionRequest,
        timeout: Duration,
    ) -> Result<Decision, DecisionSourceError> {
        (**self).decide(request, timeout).await
    }
}

#[derive(Debug, Clone)]
struct ScriptStep {
    delay: Option<Duration>,
    answer: Result<Decision, DecisionSourceError>,
}

/// Replays a fixed sequence of decisions
///
/// Once the script is exhausted the source never answers.
#[derive(Debug, Default)]
pub struct ScriptedDecisionSource {
    script: Mutex<VecDeque<ScriptStep>>,
    seen: Mutex<Vec<DecisionRequest>>,
}

impl ScriptedDecisionSource {
    /// Create empty script (never answers)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script that answers with these decisions in order
    #[must_use]
    pub fn with_decisions<I, D>(decisions: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Decision>,
    {
        let source = Self::new();
        for decision in decisions {
            source.push(decision);
        }
        source
    }

    /// Queue an immediate answer
    pub fn push(&self, decision: impl Into<Decision>) {
        self.script.lock().push_back(ScriptStep {
            delay: None,
            answer: Ok(decision.into()),
        });
    }

    /// Queue an answer given after `delay`
    pub fn push_delayed(&self, decision: impl Into<Decision>, delay: Duration) {
        self.script.lock().push_back(ScriptStep {
            delay: Some(delay),
            answer: Ok(decision.into()),
        });
    }

    /// Queue a backend failure
    pub fn push_error(&self, error: DecisionSourceError) {
        self.script.lock().push_back(ScriptStep {
            delay: None,
            answer: Err(error),
        });
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<DecisionRequest> {
        self.seen.lock().clone()
    }

    /// Answers not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl DecisionSource for ScriptedDecisionSource {
    async fn decide(
        &self,
        request: &DecisionRequest,
        _timeout: Duration,
    ) -> Result<Decision, DecisionSourceError> {
        self.seen.lock().push(request.clone());
        let next = self.script.lock().pop_front();

        match next {
            Some(step) => {
                if let Some(delay) = step.delay {
                    tokio::time::sleep(delay).await;
                }
                step.answer
            }
            None => futures::future::pending().await,
        }
    }
}

/// A pending decision handed to a rendering surface
#[derive(Debug)]
pub struct DecisionTicket {
    /// What to decide
    pub request: DecisionRequest,
    /// Time the surface has to answer
    pub timeout: Duration,
    reply: oneshot::Sender<Decision>,
}

impl DecisionTicket {
    /// Answer with a decision
    ///
    /// # Errors
    /// Gives the decision back if the intervention stopped waiting.
    pub fn respond(self, decision: impl Into<Decision>) -> Result<(), Decision> {
        self.reply.send(decision.into())
    }

    /// Answer with raw operator text, parsed against the ticket's menu
    ///
    /// # Errors
    /// Gives the parsed decision back if the intervention stopped waiting.
    pub fn respond_raw(self, raw: &str) -> Result<(), Decision> {
        let decision = parse_raw_decision(raw, &self.request.menu);
        self.respond(decision)
    }

    /// Check if the coordinator is still waiting
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.reply.is_closed()
    }
}

/// Forwards requests to an external surface over a channel
#[derive(Debug, Clone)]
pub struct ChannelDecisionSource {
    tickets: mpsc::Sender<DecisionTicket>,
}

impl ChannelDecisionSource {
    /// Create source and the receiving end for the surface
    #[must_use]
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<DecisionTicket>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tickets: tx }, rx)
    }
}

#[async_trait]
impl DecisionSource for ChannelDecisionSource {
    async fn decide(
        &self,
        request: &DecisionRequest,
        timeout: Duration,
    ) -> Result<Decision, DecisionSourceError> {
        let (reply, answer) = oneshot::channel();
        let ticket = DecisionTicket {
            request: request.clone(),
            timeout,
            reply,
        };

        self.tickets
            .send(ticket)
            .await
            .map_err(|_| DecisionSourceError::Disconnected)?;

        match tokio::time::timeout(timeout, answer).await {
            Ok(Ok(decision)) => Ok(decision),
            Ok(Err(_)) => Err(DecisionSourceError::Disconnected),
            Err(_) => Ok(Decision::TimedOut),
        }
    }
}

/// Automated policy: take the top suggestion as the alternative approach
#[derive(Debug, Clone, Copy, Default)]
pub struct TopSuggestionPolicy;

#[async_trait]
impl DecisionSource for TopSuggestionPolicy {
    async fn decide(
        &self,
        request: &DecisionRequest,
        _timeout: Duration,
    ) -> Result<Decision, DecisionSourceError> {
        let action = match request.top_suggestion() {
            Some(top) => ResolutionAction::alternative(top.text.clone()),
            None => ResolutionAction::abort("no suggestions available"),
        };
        Ok(Decision::Action(action))
    }
}

/// Map raw operator text onto a decision
///
/// Accepts `<menu key or keyword>[:| ]<payload>`:
/// - `1: google_scholar_api`, `alternative use cached data`
/// - `2`, `skip`
/// - `retry`, `retry {"max_results": 5}`
/// - `4`, `abort: out of budget`
///
/// Anything else is [`Decision::Unrecognized`].
#[must_use]
pub fn parse_raw_decision(raw: &str, menu: &ActionMenu) -> Decision {
    let trimmed = raw.trim();
    let split_at = trimmed
        .find(|c: char| c.is_whitespace() || c == ':')
        .unwrap_or(trimmed.len());
    let (head, rest) = trimmed.split_at(split_at);
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ':').trim();

    let unrecognized = || Decision::Unrecognized {
        raw: raw.to_string(),
    };

    let Some(choice) = menu.lookup(head) else {
        return unrecognized();
    };

    let action = match choice {
        ActionChoice::Alternative => ResolutionAction::alternative(rest),
        ActionChoice::Skip => ResolutionAction::Skip,
        ActionChoice::Retry if rest.is_empty() => ResolutionAction::retry(),
        ActionChoice::Retry => match serde_json::from_str::<serde_json::Value>(rest) {
            Ok(serde_json::Value::Object(patch)) => ResolutionAction::retry_with(patch),
            _ => return unrecognized(),
        },
        ActionChoice::Abort if rest.is_empty() => ResolutionAction::Abort { reason: None },
        ActionChoice::Abort => ResolutionAction::abort(rest),
    };

    Decision::Action(action)
}
