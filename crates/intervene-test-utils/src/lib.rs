//! Testing utilities for the intervene workspace
//!
//! Shared fixtures for the canonical failure scenarios and scripted
//! coordinators.

#![allow(missing_docs)]

use intervene_core::{
    CoordinatorConfig, Decision, FailedStep, InterventionContext, InterventionCoordinator,
    Parameters, ScriptedDecisionSource, StepKind,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const SCENARIO_A_SESSION: &str = "demo-session-001";
pub const SCENARIO_B_SESSION: &str = "demo-plan-failure-001";

pub const SCENARIO_B_PLAN: [&str; 5] = [
    "Fetch historical weather data for major financial centers",
    "Retrieve stock prices for tech companies",
    "Perform correlation analysis",
    "Generate statistical significance tests",
    "Create visualization and report",
];

/// arXiv search that timed out
pub fn scenario_a_context() -> InterventionContext {
    let mut params = Parameters::new();
    params.insert("query".to_string(), json!("artificial intelligence"));
    params.insert("max_results".to_string(), json!(10));
    params.insert("sort_by".to_string(), json!("submittedDate"));

    InterventionContext::tool_failure(
        SCENARIO_A_SESSION,
        "Find the latest research papers on artificial intelligence",
        FailedStep::new(
            StepKind::ToolCall,
            "Search arXiv database for AI research papers",
        )
        .with_parameters(params),
        "Network timeout: arxiv_search did not respond within 30s",
    )
    .with_plan(
        vec![
            "Search arXiv database for AI research papers".to_string(),
            "Filter results by relevance score".to_string(),
            "Extract paper titles and abstracts".to_string(),
            "Format results for presentation".to_string(),
        ],
        Vec::new(),
    )
}

/// Five step correlation plan that broke at step three
pub fn scenario_b_context() -> InterventionContext {
    InterventionContext::plan_failure(
        SCENARIO_B_SESSION,
        "Analyze the correlation between weather patterns and tech stock prices",
        SCENARIO_B_PLAN,
        2,
        "Data dimensionality mismatch - weather data is hourly, stock data is daily",
    )
}

pub fn tool_context(session: &str, kind: StepKind, error: &str) -> InterventionContext {
    InterventionContext::tool_failure(session, "test query", FailedStep::new(kind, "step"), error)
}

/// Config with a short deadline for tests
pub fn quick_config(timeout_ms: u64) -> CoordinatorConfig {
    CoordinatorConfig::new().with_decision_timeout(Duration::from_millis(timeout_ms))
}

pub fn scripted<I, D>(decisions: I) -> Arc<ScriptedDecisionSource>
where
    I: IntoIterator<Item = D>,
    D: Into<Decision>,
{
    Arc::new(ScriptedDecisionSource::with_decisions(decisions))
}

/// Coordinator answering from a script, plus the script for inspection
pub fn scripted_coordinator<I, D>(
    config: CoordinatorConfig,
    decisions: I,
) -> (InterventionCoordinator, Arc<ScriptedDecisionSource>)
where
    I: IntoIterator<Item = D>,
    D: Into<Decision>,
{
    let source = scripted(decisions);
    let coordinator = InterventionCoordinator::new(config, source.clone());
    (coordinator, source)
}
