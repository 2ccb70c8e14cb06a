//! Failure classification
//!
//! Maps free-text error messages onto disjoint categories. The pattern
//! tables are compiled once and only ever read afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category of a tool failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Connection problems and timeouts
    NetworkTimeout,
    /// Provider refused because of request volume
    RateLimit,
    /// Input could not be parsed
    SyntaxFormat,
    /// Input parsed but has the wrong shape, type or units
    DataMismatch,
    /// None of the above
    Unrecognized,
}

/// What a plan failure looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanCondition {
    /// Steps are too coarse, too fine, or in the wrong format
    GranularityMismatch,
    /// A step needs a tool or capability that does not exist
    MissingCapability,
    /// Nothing recognizable in the failure reason
    Unclassified,
}

// First match wins. Rate limits are checked before network errors because
// providers often report them alongside timeouts.
static TOOL_PATTERNS: Lazy<Vec<(FailureCategory, Regex)>> = Lazy::new(|| {
    compile(&[
        (
            FailureCategory::RateLimit,
            r"(?i)rate[\s_-]?limit|too many requests|\b429\b|quota (exceeded|exhausted)|throttl",
        ),
        (
            FailureCategory::NetworkTimeout,
            r"(?i)time[sd]?[\s_-]?out|connection (refused|reset|closed|error|failed|lost)|network|unreachable|\bdns\b|socket|\b50[234]\b|service unavailable",
        ),
        (
            FailureCategory::SyntaxFormat,
            r"(?i)syntax|parse error|failed to parse|unexpected (token|character|eof)|malformed|invalid (json|yaml|xml|format|escape)|indentation",
        ),
        (
            FailureCategory::DataMismatch,
            r"(?i)mismatch|type ?error|value ?error|key ?error|invalid (value|input|type)|incompatible|dimension|shape|missing (field|column|key)|expected .+ (got|found)",
        ),
    ])
});

static PLAN_PATTERNS: Lazy<Vec<(PlanCondition, Regex)>> = Lazy::new(|| {
    compile(&[
        (
            PlanCondition::MissingCapability,
            r"(?i)not (available|supported|implemented)|unsupported|no (tool|capability|access|api)|missing (tool|capability|access|permission)|capabilit|permission denied|cannot (access|perform)",
        ),
        (
            PlanCondition::GranularityMismatch,
            r"(?i)granular|too (broad|complex|large|coarse|fine|vague)|format|mismatch|ambiguous|decompos|overly|scope",
        ),
    ])
});

static LINE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)\bline (\d+)").expect("line number pattern is valid")
});

#[allow(clippy::expect_used)]
fn compile<T: Copy>(table: &[(T, &str)]) -> Vec<(T, Regex)> {
    table
        .iter()
        .map(|&(tag, pattern)| (tag, Regex::new(pattern).expect("rule pattern is valid")))
        .collect()
}

/// Classify a tool error message
#[must_use]
pub fn classify_error(message: &str) -> FailureCategory {
    TOOL_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(message))
        .map_or(FailureCategory::Unrecognized, |(category, _)| *category)
}

/// Classify a plan failure reason
#[must_use]
pub fn classify_plan_failure(reason: &str) -> PlanCondition {
    PLAN_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(reason))
        .map_or(PlanCondition::Unclassified, |(condition, _)| *condition)
}

/// Line number reported in an error message, if any
#[must_use]
pub fn reported_line(message: &str) -> Option<u32> {
    LINE_NUMBER
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_timeouts_as_network() {
        for message in [
            "Network timeout while calling arxiv_search",
            "SearchError: Database connection timeout",
            "request timed out after 30s",
            "HTTP 503 Service Unavailable",
        ] {
            assert_eq!(classify_error(message), FailureCategory::NetworkTimeout, "{message}");
        }
    }

    #[test]
    fn rate_limit_wins_over_timeout() {
        assert_eq!(
            classify_error("API rate limit exceeded (request timed out)"),
            FailureCategory::RateLimit
        );
        assert_eq!(classify_error("HTTP 429 Too Many Requests"), FailureCategory::RateLimit);
    }

    #[test]
    fn classifies_syntax_and_data_errors() {
        assert_eq!(
            classify_error("SyntaxError: invalid syntax on line 42"),
            FailureCategory::SyntaxFormat
        );
        assert_eq!(
            classify_error("ValueError: Input data format mismatch"),
            FailureCategory::DataMismatch
        );
        assert_eq!(
            classify_error("expected float, got string"),
            FailureCategory::DataMismatch
        );
    }

    #[test]
    fn unknown_errors_are_unrecognized() {
        assert_eq!(classify_error("segfault in worker"), FailureCategory::Unrecognized);
        assert_eq!(classify_error(""), FailureCategory::Unrecognized);
    }

    #[test]
    fn classifies_plan_failures() {
        assert_eq!(
            classify_plan_failure("Statistical analysis tool not available"),
            PlanCondition::MissingCapability
        );
        assert_eq!(
            classify_plan_failure("Plan steps are too complex for single tool calls"),
            PlanCondition::GranularityMismatch
        );
        assert_eq!(
            classify_plan_failure("everything went sideways"),
            PlanCondition::Unclassified
        );
    }

    #[test]
    fn extracts_line_number() {
        assert_eq!(reported_line("SyntaxError: invalid syntax on line 42"), Some(42));
        assert_eq!(reported_line("SyntaxError: invalid syntax"), None);
    }
}
