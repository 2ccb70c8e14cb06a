//! Canonical scenarios run against a scripted decision source

use anyhow::{bail, Context as _};
use intervene_core::{
    CoordinatorConfig, Decision, FailedStep, InterventionContext, InterventionCoordinator,
    InterventionRecord, Parameters, ResolutionAction, ScriptedDecisionSource, StatisticsLedger,
    StepKind,
};
use serde::Serialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const SCENARIOS: [&str; 4] = [
    "tool-failure",
    "plan-failure",
    "invalid-decision",
    "timeout",
];

/// Which canonical scenario to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scenario {
    ToolFailure,
    PlanFailure,
    InvalidDecision,
    Timeout,
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tool-failure" => Ok(Self::ToolFailure),
            "plan-failure" => Ok(Self::PlanFailure),
            "invalid-decision" => Ok(Self::InvalidDecision),
            "timeout" => Ok(Self::Timeout),
            other => bail!("unknown scenario {other:?}, expected one of {SCENARIOS:?}"),
        }
    }
}

/// What a scenario run produced
#[derive(Debug, Serialize)]
pub(crate) struct DemoOutcome {
    pub(crate) scenario: &'static str,
    pub(crate) action: ResolutionAction,
    pub(crate) record: InterventionRecord,
    pub(crate) summary: StatisticsLedger,
}

impl Scenario {
    fn name(self) -> &'static str {
        match self {
            Self::ToolFailure => SCENARIOS[0],
            Self::PlanFailure => SCENARIOS[1],
            Self::InvalidDecision => SCENARIOS[2],
            Self::Timeout => SCENARIOS[3],
        }
    }

    fn context(self) -> InterventionContext {
        match self {
            Self::PlanFailure => InterventionContext::plan_failure(
                "demo-plan-failure-001",
                "Analyze the correlation between weather patterns and tech stock prices",
                [
                    "Fetch historical weather data for major financial centers",
                    "Retrieve stock prices for tech companies",
                    "Perform correlation analysis",
                    "Generate statistical significance tests",
                    "Create visualization and report",
                ],
                2,
                "Data dimensionality mismatch - weather data is hourly, stock data is daily",
            ),
            _ => {
                let mut params = Parameters::new();
                params.insert("query".to_string(), json!("artificial intelligence"));
                params.insert("max_results".to_string(), json!(10));
                InterventionContext::tool_failure(
                    "demo-session-001",
                    "Find the latest research papers on artificial intelligence",
                    FailedStep::new(
                        StepKind::ToolCall,
                        "Search arXiv database for AI research papers",
                    )
                    .with_parameters(params),
                    "Network timeout: arxiv_search did not respond within 30s",
                )
            }
        }
    }

    fn script(self) -> Vec<Decision> {
        match self {
            Self::ToolFailure => vec![ResolutionAction::alternative("google_scholar_api").into()],
            Self::PlanFailure => vec![ResolutionAction::retry().into()],
            Self::InvalidDecision => vec![
                Decision::Unrecognized {
                    raw: "maybe later".to_string(),
                },
                ResolutionAction::alternative("").into(),
            ],
            Self::Timeout => Vec::new(),
        }
    }

    fn config(self, base: &CoordinatorConfig) -> CoordinatorConfig {
        match self {
            Self::Timeout => base.clone().with_decision_timeout(Duration::from_millis(200)),
            _ => base.clone(),
        }
    }

    /// Run the scenario on a fresh coordinator
    pub(crate) async fn run(self, base: &CoordinatorConfig) -> anyhow::Result<DemoOutcome> {
        let context = self.context();
        let session = context.session_id.clone();
        let source = Arc::new(ScriptedDecisionSource::with_decisions(self.script()));
        let coordinator = InterventionCoordinator::new(self.config(base), source);

        let action = coordinator.submit(context).await?;
        let record = coordinator
            .history()
            .last()
            .map(|record| record.as_ref().clone())
            .context("finished intervention left no record")?;

        Ok(DemoOutcome {
            scenario: self.name(),
            action,
            record,
            summary: coordinator.summary(&session),
        })
    }
}
