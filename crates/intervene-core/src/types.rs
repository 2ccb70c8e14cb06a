//! Core types for intervention coordination
//!
//! Defines the data that describes one failure event:
//! - Intervention and session identifiers
//! - Intervention types and step kinds (open sets)
//! - The failed step and its optional parameters
//! - The immutable intervention context handed to the coordinator

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Unique intervention identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterventionId(pub Ulid);

impl InterventionId {
    /// Generate new intervention ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for InterventionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InterventionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque session correlation id
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a session id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank ids are rejected at validation
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of intervention (open set)
///
/// New kinds go through `Other` without touching the coordinator; they
/// get the generic suggestion playbook.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum InterventionType {
    /// A single tool invocation failed
    ToolFailure,
    /// The whole execution plan became unworkable
    PlanFailure,
    /// Any other intervention kind
    Other(String),
}

impl InterventionType {
    /// Stable string tag
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ToolFailure => "tool_failure",
            Self::PlanFailure => "plan_failure",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for InterventionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterventionType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "tool_failure" | "tool" => Self::ToolFailure,
            "plan_failure" | "plan" => Self::PlanFailure,
            _ => Self::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for InterventionType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<InterventionType> for String {
    fn from(kind: InterventionType) -> Self {
        kind.as_str().to_string()
    }
}

/// Kind of the step that failed (open set)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum StepKind {
    /// External tool invocation
    ToolCall,
    /// Code execution
    Code,
    /// Calculation
    Calculation,
    /// Remote API call
    ApiCall,
    /// Data processing / transformation
    DataProcessing,
    /// Generic computation
    Computation,
    /// Anything else
    Other(String),
}

impl StepKind {
    /// Executor tag (upper snake case)
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ToolCall => "TOOL_CALL",
            Self::Code => "CODE",
            Self::Calculation => "CALCULATION",
            Self::ApiCall => "API_CALL",
            Self::DataProcessing => "DATA_PROCESSING",
            Self::Computation => "COMPUTATION",
            Self::Other(name) => name,
        }
    }

    /// Steps that call out to an external provider
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::ToolCall | Self::ApiCall)
    }

    /// Steps that crunch numbers or data locally
    #[inline]
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Calculation | Self::Computation | Self::DataProcessing
        )
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TOOL_CALL" | "TOOL" => Self::ToolCall,
            "CODE" => Self::Code,
            "CALCULATION" => Self::Calculation,
            "API_CALL" | "API" => Self::ApiCall,
            "DATA_PROCESSING" => Self::DataProcessing,
            "COMPUTATION" => Self::Computation,
            _ => Self::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for StepKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<StepKind> for String {
    fn from(kind: StepKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Structured step parameters / retry patch
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// The step whose execution failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedStep {
    /// Human readable description
    pub description: String,
    /// Step kind
    pub kind: StepKind,
    /// Optional structured parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

impl FailedStep {
    /// Create new failed step
    #[inline]
    #[must_use]
    pub fn new(kind: StepKind, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind,
            parameters: None,
        }
    }

    /// With parameters
    #[inline]
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Everything known about one failure event
///
/// Built by the executor right after it classifies a failure. The
/// coordinator only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionContext {
    /// Kind of intervention
    pub intervention_type: InterventionType,
    /// The user query the session is working on
    pub original_query: String,
    /// Failed step (required for tool failures)
    pub failed_step: Option<FailedStep>,
    /// Error or failure reason as reported by the executor
    pub error_message: String,
    /// Ordered step descriptions of the current plan
    pub current_plan: Vec<String>,
    /// Ordered prefix of `current_plan` that already ran
    pub completed_steps: Vec<String>,
    /// Session correlation id
    pub session_id: SessionId,
    /// When the failure was observed
    pub created_at: DateTime<Utc>,
}

impl InterventionContext {
    /// Create a bare context of any type
    #[must_use]
    pub fn new(
        intervention_type: InterventionType,
        session_id: impl Into<SessionId>,
        original_query: impl Into<String>,
    ) -> Self {
        Self {
            intervention_type,
            original_query: original_query.into(),
            failed_step: None,
            error_message: String::new(),
            current_plan: Vec::new(),
            completed_steps: Vec::new(),
            session_id: session_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Context for a failed tool invocation
    #[must_use]
    pub fn tool_failure(
        session_id: impl Into<SessionId>,
        original_query: impl Into<String>,
        failed_step: FailedStep,
        error_message: impl Into<String>,
    ) -> Self {
        Self::new(InterventionType::ToolFailure, session_id, original_query)
            .with_failed_step(failed_step)
            .with_error(error_message)
    }

    /// Context for an unworkable plan
    #[must_use]
    pub fn plan_failure<S: Into<String>>(
        session_id: impl Into<SessionId>,
        original_query: impl Into<String>,
        current_plan: impl IntoIterator<Item = S>,
        completed: usize,
        failure_reason: impl Into<String>,
    ) -> Self {
        let plan: Vec<String> = current_plan.into_iter().map(Into::into).collect();
        let completed_steps = plan.iter().take(completed).cloned().collect();
        Self::new(InterventionType::PlanFailure, session_id, original_query)
            .with_plan(plan, completed_steps)
            .with_error(failure_reason)
    }

    /// With failed step
    #[inline]
    #[must_use]
    pub fn with_failed_step(mut self, step: FailedStep) -> Self {
        self.failed_step = Some(step);
        self
    }

    /// With error message / failure reason
    #[inline]
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// With plan and completed prefix
    #[inline]
    #[must_use]
    pub fn with_plan(mut self, plan: Vec<String>, completed_steps: Vec<String>) -> Self {
        self.current_plan = plan;
        self.completed_steps = completed_steps;
        self
    }

    /// With explicit creation timestamp
    #[inline]
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Fraction of the plan already completed (0.0 for an empty plan)
    #[must_use]
    pub fn completed_fraction(&self) -> f64 {
        if self.current_plan.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.completed_steps.len() as f64 / self.current_plan.len() as f64;
        fraction.min(1.0)
    }

    /// Steps of the plan that have not run yet
    #[must_use]
    pub fn remaining_steps(&self) -> &[String] {
        let done = self.completed_steps.len().min(self.current_plan.len());
        &self.current_plan[done..]
    }

    /// Check context invariants
    ///
    /// # Errors
    /// The first violated invariant, see [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_id.is_blank() {
            return Err(ValidationError::EmptySessionId);
        }

        match self.intervention_type {
            InterventionType::ToolFailure => {
                if self.failed_step.is_none() {
                    return Err(ValidationError::MissingFailedStep);
                }
            }
            InterventionType::PlanFailure => {
                if self.current_plan.is_empty() {
                    return Err(ValidationError::EmptyPlan);
                }
            }
            InterventionType::Other(_) => {}
        }

        if self.completed_steps.len() > self.current_plan.len() {
            return Err(ValidationError::CompletedStepsNotPrefix {
                index: self.current_plan.len(),
            });
        }
        if let Some(index) = self
            .completed_steps
            .iter()
            .zip(&self.current_plan)
            .position(|(done, planned)| done != planned)
        {
            return Err(ValidationError::CompletedStepsNotPrefix { index });
        }

        Ok(())
    }
}
