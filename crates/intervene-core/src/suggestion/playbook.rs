//! Recovery playbooks
//!
//! Each failure category maps to a scored list of recovery moves. Step
//! rules add moves that only make sense for a given step kind. Scores
//! are estimated usefulness; higher ranks first.

use super::classify::{reported_line, FailureCategory, PlanCondition};
use crate::types::{InterventionContext, StepKind};

/// One scored recovery move
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Move {
    pub(crate) rule: &'static str,
    pub(crate) text: String,
    pub(crate) score: u8,
    /// Must survive truncation
    pub(crate) pinned: bool,
}

impl Move {
    fn new(rule: &'static str, text: impl Into<String>, score: u8) -> Self {
        Self {
            rule,
            text: text.into(),
            score,
            pinned: false,
        }
    }

    fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

const ALTERNATIVE_PROVIDER: &str =
    "Switch to an alternative provider or source (e.g. a fallback service or database)";
const SKIP_STEP: &str = "Skip this step and continue with the remaining plan";
const ABORT: &str = "Abort execution if this step's result is essential";

/// Which step kinds a step rule applies to
#[derive(Debug, Clone, Copy)]
enum StepMatch {
    Remote,
    Numeric,
    Code,
}

impl StepMatch {
    fn matches(self, kind: &StepKind) -> bool {
        match self {
            Self::Remote => kind.is_remote(),
            Self::Numeric => kind.is_numeric(),
            Self::Code => matches!(kind, StepKind::Code),
        }
    }
}

struct StepRule {
    applies_to: StepMatch,
    category: FailureCategory,
    rule: &'static str,
    text: &'static str,
    score: u8,
}

const STEP_RULES: &[StepRule] = &[
    StepRule {
        applies_to: StepMatch::Remote,
        category: FailureCategory::NetworkTimeout,
        rule: "adjust_endpoint",
        text: "Try different search terms or API endpoints",
        score: 80,
    },
    StepRule {
        applies_to: StepMatch::Remote,
        category: FailureCategory::RateLimit,
        rule: "stagger_calls",
        text: "Space out calls to this tool instead of issuing them in bursts",
        score: 70,
    },
    StepRule {
        applies_to: StepMatch::Code,
        category: FailureCategory::SyntaxFormat,
        rule: "inspect_code",
        text: "Inspect the code at the reported location and fix the syntax error",
        score: 95,
    },
    StepRule {
        applies_to: StepMatch::Code,
        category: FailureCategory::DataMismatch,
        rule: "check_types",
        text: "Check the types passed into the code against what it expects",
        score: 85,
    },
    StepRule {
        applies_to: StepMatch::Numeric,
        category: FailureCategory::DataMismatch,
        rule: "check_units",
        text: "Verify the input data types and units for the calculation",
        score: 85,
    },
    StepRule {
        applies_to: StepMatch::Numeric,
        category: FailureCategory::SyntaxFormat,
        rule: "check_expression",
        text: "Check the calculation expression for formatting errors",
        score: 85,
    },
];

/// Playbook for a failure category, before step rules
pub(crate) fn category_moves(category: FailureCategory) -> Vec<Move> {
    match category {
        FailureCategory::NetworkTimeout => vec![
            Move::new("alternative_provider", ALTERNATIVE_PROVIDER, 90),
            Move::new("adjust_search_terms", "Use broader or more specific search criteria", 75),
            Move::new("cached_data", "Use cached data if available", 70),
            Move::new("skip_step", SKIP_STEP, 40),
            Move::new("abort", ABORT, 10),
        ],
        FailureCategory::RateLimit => vec![
            Move::new("backoff_retry", "Wait for the rate limit window to reset, then retry", 90),
            Move::new("alternative_provider", ALTERNATIVE_PROVIDER, 85),
            Move::new("cached_data", "Use cached data if available", 80),
            Move::new(
                "reduce_requests",
                "Reduce request volume by batching or narrowing the query",
                65,
            ),
            Move::new("skip_step", SKIP_STEP, 40),
            Move::new("abort", ABORT, 10),
        ],
        FailureCategory::SyntaxFormat => vec![
            Move::new("fix_syntax", "Correct the syntax or format of the step input and retry", 90),
            Move::new(
                "simplify_step",
                "Simplify the step into smaller pieces that are easier to validate",
                75,
            ),
            Move::new(
                "alternative_approach",
                "Use a different approach or tool that accepts the current format",
                60,
            ),
            Move::new("skip_step", SKIP_STEP, 40),
            Move::new("abort", ABORT, 10),
        ],
        FailureCategory::DataMismatch => vec![
            Move::new(
                "validate_input",
                "Validate the input data and normalize it to the expected format",
                90,
            ),
            Move::new(
                "convert_format",
                "Convert the data to the expected types or units before retrying",
                80,
            ),
            Move::new(
                "alternative_source",
                "Fetch the data from a different source with a compatible schema",
                60,
            ),
            Move::new("skip_step", SKIP_STEP, 40),
            Move::new("abort", ABORT, 10),
        ],
        FailureCategory::Unrecognized => generic_moves(),
    }
}

/// The generic playbook, also used as the coordinator's fallback
pub(crate) fn generic_moves() -> Vec<Move> {
    vec![
        Move::new("retry", "Retry the step as is in case the failure was transient", 80),
        Move::new(
            "adjust_approach",
            "Broaden or narrow the approach (different parameters or search terms)",
            70,
        ),
        Move::new("alternative_provider", ALTERNATIVE_PROVIDER, 60),
        Move::new("skip_step", SKIP_STEP, 40),
        Move::new("abort", ABORT, 10),
    ]
    .into_iter()
    .map(Move::pinned)
    .collect()
}

/// Step-kind specific moves for a category
pub(crate) fn step_moves(kind: &StepKind, category: FailureCategory, error: &str) -> Vec<Move> {
    STEP_RULES
        .iter()
        .filter(|rule| rule.category == category && rule.applies_to.matches(kind))
        .map(|rule| {
            let text = match (rule.rule, reported_line(error)) {
                ("inspect_code", Some(line)) => {
                    format!("Inspect the code around line {line} and fix the syntax error")
                }
                _ => rule.text.to_string(),
            };
            Move::new(rule.rule, text, rule.score)
        })
        .collect()
}

/// Plan-failure moves conditioned on progress and failure shape
///
/// Decompose, reduce scope, reorder and replan are always pinned.
pub(crate) fn plan_moves(context: &InterventionContext, condition: PlanCondition) -> Vec<Move> {
    let completed = context.completed_steps.len();
    let remaining = context.remaining_steps().len();
    let fraction = context.completed_fraction();

    let mut decompose: i16 = 70;
    let mut reduce_scope: i16 = 60;
    let mut reorder: i16 = 50;
    let mut replan: i16 = 40;
    let mut gather: i16 = 45;
    let mut substitute: i16 = 30;
    let mut hybrid: i16 = 35;
    let mut keep_progress: Option<i16> = None;

    match condition {
        PlanCondition::GranularityMismatch => {
            decompose += 25;
            reorder += 10;
            replan -= 5;
        }
        PlanCondition::MissingCapability => {
            substitute += 60;
            hybrid += 25;
            replan += 20;
            decompose -= 20;
        }
        PlanCondition::Unclassified => {
            gather += 10;
        }
    }

    if completed == 0 {
        replan += 25;
        reorder -= 10;
    } else if fraction >= 0.5 {
        keep_progress = Some(80);
        reorder += 15;
        replan -= 20;
    } else {
        keep_progress = Some(50);
    }

    let reorder_text = if remaining == 0 {
        "Reorder the plan so prerequisite steps run first".to_string()
    } else {
        format!("Reorder the remaining {remaining} step(s) so prerequisites run first")
    };

    let mut moves = vec![
        Move::new(
            "decompose",
            "Break the problem into smaller, more manageable sub-plans",
            clamp_score(decompose),
        )
        .pinned(),
        Move::new(
            "reduce_scope",
            "Reduce the scope of the query to what the available tools can answer",
            clamp_score(reduce_scope),
        )
        .pinned(),
        Move::new("reorder_remaining", reorder_text, clamp_score(reorder)).pinned(),
        Move::new(
            "replan",
            "Discard the current plan and replan from scratch with simpler tools",
            clamp_score(replan),
        )
        .pinned(),
        Move::new(
            "gather_prerequisites",
            "Gather prerequisite information first, then proceed",
            clamp_score(gather),
        ),
        Move::new(
            "substitute_capability",
            "Substitute the missing capability with a different approach or simpler tools",
            clamp_score(substitute),
        ),
        Move::new(
            "hybrid_workflow",
            "Switch to a hybrid manual-automated workflow for the failing steps",
            clamp_score(hybrid),
        ),
    ];

    if let Some(score) = keep_progress {
        moves.push(Move::new(
            "keep_progress",
            format!("Keep the {completed} completed step(s) and replan only the remaining {remaining}"),
            clamp_score(score),
        ));
    }

    moves
}

fn clamp_score(score: i16) -> u8 {
    u8::try_from(score.clamp(0, i16::from(u8::MAX))).unwrap_or(u8::MAX)
}
