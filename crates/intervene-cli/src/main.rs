//! `intervene` - suggestions, canned scenarios and an interactive operator
//! prompt for the intervention coordinator

mod demo;
mod render;

use anyhow::{bail, Context as _};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use demo::{Scenario, SCENARIOS};
use intervene_core::{
    ChannelDecisionSource, CoordinatorConfig, DecisionTicket, FailedStep, InterventionContext,
    InterventionCoordinator, InterventionType, StepKind, SuggestionEngine,
};
use render::{ContextView, RecordView, RequestView, SuggestionsView, SummaryView};
use serde_json::json;
use std::io::{BufRead as _, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn context_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("type")
                .long("type")
                .default_value("tool")
                .help("Intervention type: tool, plan, or any custom tag"),
        )
        .arg(
            Arg::new("session")
                .long("session")
                .default_value("cli-session")
                .help("Session id"),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .default_value("")
                .help("The request the agent was working on"),
        )
        .arg(
            Arg::new("step")
                .long("step")
                .default_value("failed step")
                .help("Description of the failed step"),
        )
        .arg(
            Arg::new("step-kind")
                .long("step-kind")
                .default_value("TOOL_CALL")
                .help("Kind of the failed step (TOOL_CALL, CODE, CALCULATION, ...)"),
        )
        .arg(
            Arg::new("error")
                .long("error")
                .default_value("")
                .help("Error message or plan failure reason"),
        )
        .arg(
            Arg::new("plan")
                .long("plan")
                .help("Plan steps separated by ';'"),
        )
        .arg(
            Arg::new("completed")
                .long("completed")
                .default_value("0")
                .value_parser(value_parser!(usize))
                .help("Number of plan steps already completed"),
        )
}

fn cli() -> Command {
    Command::new("intervene")
        .version(intervene_core::VERSION)
        .about("Failure intervention coordinator for autonomous agents")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Coordinator configuration (TOML)"),
        )
        .subcommand(
            context_args(Command::new("suggest").about("Print ranked suggestions for a failure"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("demo")
                .about("Run a canonical scenario against a scripted decision source")
                .arg(
                    Arg::new("scenario")
                        .required(true)
                        .value_parser(SCENARIOS)
                        .help("Scenario to run"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            context_args(
                Command::new("interactive")
                    .about("Answer an intervention from stdin as the operator"),
            )
            .arg(
                Arg::new("timeout-secs")
                    .long("timeout-secs")
                    .value_parser(value_parser!(u64))
                    .help("Decision deadline in seconds (overrides the config)"),
            ),
        )
}

/// Build a context from the shared context arguments
fn build_context(args: &ArgMatches) -> anyhow::Result<InterventionContext> {
    let text = |name: &str| args.get_one::<String>(name).cloned().unwrap_or_default();

    let intervention_type: InterventionType = text("type").parse()?;
    let session = text("session");
    let query = text("query");
    let error = text("error");
    let plan: Vec<String> = args
        .get_one::<String>("plan")
        .map(|raw| {
            raw.split(';')
                .map(str::trim)
                .filter(|step| !step.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let completed = args.get_one::<usize>("completed").copied().unwrap_or(0);

    if completed > plan.len() {
        bail!(
            "--completed {completed} exceeds the {} plan step(s)",
            plan.len()
        );
    }

    let context = match intervention_type {
        InterventionType::PlanFailure => {
            InterventionContext::plan_failure(session, query, plan, completed, error)
        }
        other => {
            let kind: StepKind = text("step-kind").parse()?;
            let completed_steps = plan.iter().take(completed).cloned().collect();
            InterventionContext::new(other, session, query)
                .with_failed_step(FailedStep::new(kind, text("step")))
                .with_error(error)
                .with_plan(plan, completed_steps)
        }
    };

    context.validate()?;
    Ok(context)
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<CoordinatorConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => CoordinatorConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(CoordinatorConfig::new()),
    }
}

fn suggest(config: &CoordinatorConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let context = build_context(args)?;
    let suggestions = SuggestionEngine::new()
        .with_limit(config.suggestion_limit())
        .generate(&context);

    if args.get_flag("json") {
        let out = json!({ "context": context, "suggestions": suggestions });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", ContextView(&context));
        println!("Suggestions:");
        print!("{}", SuggestionsView(&suggestions));
    }
    Ok(())
}

async fn run_demo(config: &CoordinatorConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let name = args
        .get_one::<String>("scenario")
        .context("scenario is required")?;
    let outcome = name.parse::<Scenario>()?.run(config).await?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("Scenario: {}", outcome.scenario);
        print!("{}", ContextView(&outcome.record.context));
        println!("Suggestions offered:");
        print!("{}", SuggestionsView(&outcome.record.suggestions));
        print!("{}", RecordView(&outcome.record));
        print!("{}", SummaryView(&outcome.summary));
    }
    Ok(())
}

/// Read stdin lines on a detached thread
///
/// A blocked stdin read cannot be cancelled; keeping it off the runtime
/// lets the process exit while the operator is still typing.
fn stdin_lines() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// Render each decision request and answer it with the next operator line
async fn operator_surface(
    mut tickets: mpsc::Receiver<DecisionTicket>,
    mut lines: mpsc::UnboundedReceiver<std::io::Result<String>>,
) {
    while let Some(ticket) = tickets.recv().await {
        println!("{}", RequestView(&ticket.request));
        print!("> ");
        let _ = std::io::stdout().flush();
        let line = match lines.recv().await {
            Some(Ok(line)) => line,
            None => break,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "failed to read operator input");
                break;
            }
        };
        if ticket.respond_raw(&line).is_err() {
            println!("(too late, the intervention is no longer waiting)");
        }
    }
}

async fn interactive(config: CoordinatorConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let context = build_context(args)?;
    let session = context.session_id.clone();
    let config = match args.get_one::<u64>("timeout-secs") {
        Some(secs) => config.with_decision_timeout(Duration::from_secs(*secs)),
        None => config,
    };

    let (source, tickets) = ChannelDecisionSource::new(1);
    let coordinator = InterventionCoordinator::new(config, Arc::new(source));
    let surface = tokio::spawn(operator_surface(tickets, stdin_lines()));

    let action = coordinator.submit(context).await?;
    surface.abort();

    println!();
    println!("Resolution: {action}");
    print!("{}", SummaryView(&coordinator.summary(&session)));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    tracing::debug!(?config, "configuration loaded");

    match matches.subcommand() {
        Some(("suggest", args)) => suggest(&config, args),
        Some(("demo", args)) => run_demo(&config, args).await,
        Some(("interactive", args)) => interactive(config, args).await,
        _ => bail!("unknown command"),
    }
}
