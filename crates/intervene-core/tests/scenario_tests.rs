use intervene_core::prelude::*;
use intervene_core::{
    ChannelDecisionSource, FailureCategory, InterventionState, Outcome, SuggestionCategory,
    TopSuggestionPolicy,
};
use intervene_test_utils::{
    quick_config, scenario_a_context, scenario_b_context, scripted_coordinator, tool_context,
    SCENARIO_A_SESSION, SCENARIO_B_SESSION,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn scenario_a_tool_failure_alternative() {
    let (coordinator, source) = scripted_coordinator(
        quick_config(500),
        [ResolutionAction::alternative("google_scholar_api")],
    );
    let session = SessionId::new(SCENARIO_A_SESSION);
    let before = coordinator.summary(&session);

    let action = coordinator.submit(scenario_a_context()).await.unwrap();

    assert_eq!(action, ResolutionAction::alternative("google_scholar_api"));
    let after = coordinator.summary(&session);
    assert_eq!(after.total_interventions, before.total_interventions + 1);
    assert_eq!(
        after.count_of(&InterventionType::ToolFailure),
        before.count_of(&InterventionType::ToolFailure) + 1
    );

    // the operator saw timeout suggestions including a provider switch
    let requests = source.requests();
    let offered = &requests[0].suggestions;
    assert!(offered.len() >= 3);
    assert!(offered
        .iter()
        .all(|s| s.category == SuggestionCategory::Tool(FailureCategory::NetworkTimeout)));
    assert!(offered.iter().any(|s| s.rule == "alternative_provider"));
}

#[tokio::test]
async fn scenario_b_plan_failure_retry() {
    let (coordinator, source) =
        scripted_coordinator(quick_config(500), [ResolutionAction::retry()]);

    let action = coordinator.submit(scenario_b_context()).await.unwrap();

    assert_eq!(action, ResolutionAction::retry());
    let history = coordinator.history();
    let record = &history[0];
    assert_eq!(record.action, ResolutionAction::retry());
    assert_eq!(record.attempt_count, 1);
    assert_eq!(record.session_id().as_str(), SCENARIO_B_SESSION);
    assert_eq!(record.context.completed_steps.len(), 2);

    let requests = source.requests();
    let rules: Vec<_> = requests[0]
        .suggestions
        .iter()
        .map(|s| s.rule.as_str())
        .collect();
    for core in ["decompose", "reduce_scope", "reorder_remaining", "replan"] {
        assert!(rules.contains(&core), "missing {core}");
    }
    assert_eq!(
        requests[0].menu.options[0].label,
        "Provide completely new plan"
    );
}

#[tokio::test]
async fn scenario_c_invalid_decisions_force_abort() {
    let (coordinator, _source) = scripted_coordinator(
        quick_config(500),
        [
            ResolutionAction::alternative(""),
            ResolutionAction::alternative("   "),
        ],
    );

    let action = coordinator.submit(scenario_a_context()).await.unwrap();

    assert!(action.is_abort());
    assert_eq!(
        action.abort_reason(),
        Some("invalid decision exceeded retry bound")
    );
    let history = coordinator.history();
    assert_eq!(history[0].reason, "invalid decision exceeded retry bound");
    assert_eq!(history[0].outcome, Outcome::Failed);
}

#[tokio::test]
async fn never_answering_source_times_out() {
    let (coordinator, _source) =
        scripted_coordinator(quick_config(60), std::iter::empty::<Decision>());

    let started = Instant::now();
    let action = coordinator.submit(scenario_a_context()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(action.abort_reason(), Some("timeout"));
    assert!(elapsed >= Duration::from_millis(60));
    assert!(elapsed < Duration::from_secs(2));
    let history = coordinator.history();
    assert_eq!(history[0].reason, "timeout");
    assert_eq!(history[0].final_state, InterventionState::Escalated);
}

#[tokio::test]
async fn resubmission_is_not_deduplicated() {
    let (coordinator, _source) = scripted_coordinator(
        quick_config(500),
        [ResolutionAction::Skip, ResolutionAction::Skip],
    );
    let context = scenario_a_context();

    coordinator.submit(context.clone()).await.unwrap();
    coordinator.submit(context).await.unwrap();

    let history = coordinator.history();
    assert_eq!(history.len(), 2);
    assert_ne!(history[0].intervention_id, history[1].intervention_id);
}

#[tokio::test]
async fn success_rate_is_exact() {
    let decisions = [
        ResolutionAction::Skip,
        ResolutionAction::abort("no"),
        ResolutionAction::retry(),
        ResolutionAction::alternative("other tool"),
        ResolutionAction::alternative(""),
    ];
    let (coordinator, _source) = scripted_coordinator(quick_config(50), decisions);
    let session = "stats";

    for _ in 0..4 {
        coordinator
            .submit(tool_context(session, StepKind::ApiCall, "503 Service Unavailable"))
            .await
            .unwrap();
    }
    // last one: invalid decision then silence, ends on the deadline
    coordinator
        .submit(tool_context(session, StepKind::Code, "SyntaxError"))
        .await
        .unwrap();

    let ledger = coordinator.summary(&SessionId::new(session));
    assert_eq!(ledger.total_interventions, 5);
    assert_eq!(ledger.succeeded, 3);
    assert_eq!(ledger.success_rate, 3.0 / 5.0);
    assert_eq!(ledger.intervention_types.values().sum::<usize>(), 5);
    assert!(ledger.average_recovery_duration.is_some());
}

#[tokio::test]
async fn summary_reads_while_intervention_pending() {
    let (coordinator, source) = scripted_coordinator(
        CoordinatorConfig::new(),
        [ResolutionAction::Skip],
    );
    let coordinator = Arc::new(coordinator);
    coordinator.submit(scenario_a_context()).await.unwrap();
    assert_eq!(source.remaining(), 0);

    let pending = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.submit(scenario_b_context()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // reads do not wait for the pending intervention
    let ledger = tokio::time::timeout(Duration::from_millis(100), async {
        coordinator.summary_all()
    })
    .await
    .unwrap();
    assert_eq!(ledger.total_interventions, 1);

    coordinator.cancel_pending();
    let action = pending.await.unwrap().unwrap();
    assert_eq!(action.abort_reason(), Some("externally cancelled"));
    assert_eq!(coordinator.summary_all().total_interventions, 2);
    assert_eq!(coordinator.summary_all().aborted, 1);
}

#[tokio::test]
async fn aborting_the_surrounding_task_cancels() {
    let (coordinator, _source) =
        scripted_coordinator(CoordinatorConfig::new(), std::iter::empty::<Decision>());
    let coordinator = Arc::new(coordinator);
    let cancel = tokio_util::sync::CancellationToken::new();

    let pending = {
        let coordinator = Arc::clone(&coordinator);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            coordinator
                .submit_with_cancel(scenario_a_context(), cancel)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    let action = tokio::time::timeout(Duration::from_secs(1), pending)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(action.abort_reason(), Some("externally cancelled"));
}

#[tokio::test]
async fn operator_surface_over_channel() {
    let (source, mut tickets) = ChannelDecisionSource::new(8);
    let coordinator = InterventionCoordinator::new(quick_config(1_000), Arc::new(source));

    let surface = tokio::spawn(async move {
        let first = tickets.recv().await.unwrap();
        assert_eq!(first.request.attempt, 1);
        first.respond_raw("what now?").unwrap();

        let second = tickets.recv().await.unwrap();
        assert_eq!(second.request.attempt, 2);
        assert!(second
            .request
            .rejection
            .as_deref()
            .unwrap()
            .contains("unrecognized decision"));
        second.respond_raw("1: google_scholar_api").unwrap();
    });

    let action = coordinator.submit(scenario_a_context()).await.unwrap();
    surface.await.unwrap();

    assert_eq!(action, ResolutionAction::alternative("google_scholar_api"));
    assert_eq!(coordinator.history()[0].attempt_count, 2);
}

#[tokio::test]
async fn vanished_surface_escalates() {
    let (source, tickets) = ChannelDecisionSource::new(1);
    drop(tickets);
    let coordinator = InterventionCoordinator::new(quick_config(1_000), Arc::new(source));

    let action = coordinator.submit(scenario_a_context()).await.unwrap();

    assert!(action.is_abort());
    let history = coordinator.history();
    assert!(history[0]
        .reason
        .starts_with("decision source unavailable"));
    assert_eq!(history[0].final_state, InterventionState::Escalated);
}

#[tokio::test]
async fn automated_policy_takes_top_suggestion() {
    let coordinator =
        InterventionCoordinator::new(quick_config(500), Arc::new(TopSuggestionPolicy));

    let action = coordinator.submit(scenario_a_context()).await.unwrap();

    let history = coordinator.history();
    let top = &history[0].suggestions[0];
    assert_eq!(action, ResolutionAction::alternative(top.text.clone()));
}
