//! Resolution actions and the operator action menu
//!
//! `ResolutionAction` is the binding decision that ends an intervention.
//! It is a closed enum, so every caller has to handle every variant.

use crate::error::InvalidDecision;
use crate::types::{InterventionType, Parameters};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binding decision for one intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResolutionAction {
    /// Re-invoke the failed step, optionally patched
    Retry {
        /// Parameter patch applied before retrying
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modifications: Option<Parameters>,
    },
    /// Advance past the failed step
    Skip,
    /// Substitute the named approach and continue
    Alternative {
        /// The approach to use instead
        alternative_approach: String,
    },
    /// Terminate the session
    Abort {
        /// Why the session was aborted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl ResolutionAction {
    /// Retry without modifications
    #[inline]
    #[must_use]
    pub fn retry() -> Self {
        Self::Retry {
            modifications: None,
        }
    }

    /// Retry with a parameter patch
    #[inline]
    #[must_use]
    pub fn retry_with(modifications: Parameters) -> Self {
        Self::Retry {
            modifications: Some(modifications),
        }
    }

    /// Use an alternative approach
    #[inline]
    #[must_use]
    pub fn alternative(approach: impl Into<String>) -> Self {
        Self::Alternative {
            alternative_approach: approach.into(),
        }
    }

    /// Abort with a reason
    #[inline]
    #[must_use]
    pub fn abort(reason: impl Into<String>) -> Self {
        Self::Abort {
            reason: Some(reason.into()),
        }
    }

    /// Menu entry this action belongs to
    #[must_use]
    pub fn choice(&self) -> ActionChoice {
        match self {
            Self::Retry { .. } => ActionChoice::Retry,
            Self::Skip => ActionChoice::Skip,
            Self::Alternative { .. } => ActionChoice::Alternative,
            Self::Abort { .. } => ActionChoice::Abort,
        }
    }

    /// Check if this action ends the session
    #[inline]
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort { .. })
    }

    /// Abort reason, if any
    #[must_use]
    pub fn abort_reason(&self) -> Option<&str> {
        match self {
            Self::Abort { reason } => reason.as_deref(),
            _ => None,
        }
    }

    /// Check the action is well formed for this intervention
    ///
    /// Every variant is allowed for every intervention type; what can be
    /// wrong is the payload.
    ///
    /// # Errors
    /// The rejection reason.
    pub fn validate(&self, _intervention_type: &InterventionType) -> Result<(), InvalidDecision> {
        match self {
            Self::Alternative {
                alternative_approach,
            } if alternative_approach.trim().is_empty() => Err(InvalidDecision::EmptyAlternative),
            Self::Retry {
                modifications: Some(patch),
            } if patch.is_empty() => Err(InvalidDecision::EmptyModifications),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ResolutionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry {
                modifications: None,
            } => f.write_str("retry"),
            Self::Retry {
                modifications: Some(patch),
            } => write!(f, "retry with {} modification(s)", patch.len()),
            Self::Skip => f.write_str("skip"),
            Self::Alternative {
                alternative_approach,
            } => write!(f, "alternative: {alternative_approach}"),
            Self::Abort { reason: None } => f.write_str("abort"),
            Self::Abort {
                reason: Some(reason),
            } => write!(f, "abort: {reason}"),
        }
    }
}

/// The four menu entries, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionChoice {
    /// Alternative approach / new plan
    Alternative,
    /// Skip step / modify plan
    Skip,
    /// Retry
    Retry,
    /// Abort
    Abort,
}

impl ActionChoice {
    /// Stable tag
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alternative => "alternative",
            Self::Skip => "skip",
            Self::Retry => "retry",
            Self::Abort => "abort",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().replace('-', "_").as_str() {
            "alternative" | "alt" | "new_plan" | "replan" => Some(Self::Alternative),
            "skip" | "modify" | "modify_plan" => Some(Self::Skip),
            "retry" => Some(Self::Retry),
            "abort" | "stop" | "cancel" => Some(Self::Abort),
            _ => None,
        }
    }
}

impl fmt::Display for ActionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One numbered menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    /// Number the operator types
    pub key: u8,
    /// Action family
    pub choice: ActionChoice,
    /// Label shown to the operator
    pub label: String,
}

/// Fixed action menu shown alongside the suggestions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMenu {
    /// Options in display order
    pub options: Vec<MenuOption>,
}

impl ActionMenu {
    /// Menu for an intervention type
    #[must_use]
    pub fn for_type(intervention_type: &InterventionType) -> Self {
        let labels: [(ActionChoice, &str); 4] = match intervention_type {
            InterventionType::PlanFailure => [
                (ActionChoice::Alternative, "Provide completely new plan"),
                (ActionChoice::Skip, "Modify current plan"),
                (ActionChoice::Retry, "Retry current plan"),
                (ActionChoice::Abort, "Abort execution"),
            ],
            _ => [
                (ActionChoice::Alternative, "Provide alternative approach"),
                (ActionChoice::Skip, "Skip this step and continue"),
                (ActionChoice::Retry, "Retry with modifications"),
                (ActionChoice::Abort, "Abort execution"),
            ],
        };

        let options = (1u8..)
            .zip(labels)
            .map(|(key, (choice, label))| MenuOption {
                key,
                choice,
                label: label.to_string(),
            })
            .collect();

        Self { options }
    }

    /// Resolve a menu token: either the option number or a keyword
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<ActionChoice> {
        let token = token.trim().trim_end_matches(['.', ')', ':']);
        if let Ok(key) = token.parse::<u8>() {
            return self
                .options
                .iter()
                .find(|option| option.key == key)
                .map(|option| option.choice);
        }
        ActionChoice::from_keyword(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alternative_requires_text() {
        let kind = InterventionType::ToolFailure;
        assert_eq!(
            ResolutionAction::alternative("  ").validate(&kind),
            Err(InvalidDecision::EmptyAlternative)
        );
        assert!(ResolutionAction::alternative("google_scholar_api")
            .validate(&kind)
            .is_ok());
    }

    #[test]
    fn retry_patch_must_not_be_empty() {
        let kind = InterventionType::PlanFailure;
        assert!(ResolutionAction::retry().validate(&kind).is_ok());
        assert_eq!(
            ResolutionAction::retry_with(Parameters::new()).validate(&kind),
            Err(InvalidDecision::EmptyModifications)
        );

        let mut patch = Parameters::new();
        patch.insert("max_results".to_string(), json!(10));
        assert!(ResolutionAction::retry_with(patch).validate(&kind).is_ok());
    }

    #[test]
    fn skip_and_abort_always_valid() {
        let kind = InterventionType::Other("custom".to_string());
        assert!(ResolutionAction::Skip.validate(&kind).is_ok());
        assert!(ResolutionAction::Abort { reason: None }.validate(&kind).is_ok());
    }

    #[test]
    fn action_serializes_tagged() {
        let value = serde_json::to_value(ResolutionAction::alternative("X")).unwrap();
        assert_eq!(
            value,
            json!({"action": "alternative", "alternative_approach": "X"})
        );
        let value = serde_json::to_value(ResolutionAction::retry()).unwrap();
        assert_eq!(value, json!({"action": "retry"}));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(ResolutionAction::abort("timeout").to_string(), "abort: timeout");
        assert_eq!(ResolutionAction::Skip.to_string(), "skip");
    }

    #[test]
    fn tool_menu_labels() {
        let menu = ActionMenu::for_type(&InterventionType::ToolFailure);
        assert_eq!(menu.options.len(), 4);
        assert_eq!(menu.options[0].label, "Provide alternative approach");
        assert_eq!(menu.options[3].choice, ActionChoice::Abort);
    }

    #[test]
    fn plan_menu_labels() {
        let menu = ActionMenu::for_type(&InterventionType::PlanFailure);
        assert_eq!(menu.options[0].label, "Provide completely new plan");
        assert_eq!(menu.options[1].label, "Modify current plan");
    }

    #[test]
    fn menu_lookup_by_key_and_keyword() {
        let menu = ActionMenu::for_type(&InterventionType::ToolFailure);
        assert_eq!(menu.lookup("1"), Some(ActionChoice::Alternative));
        assert_eq!(menu.lookup("2."), Some(ActionChoice::Skip));
        assert_eq!(menu.lookup("RETRY"), Some(ActionChoice::Retry));
        assert_eq!(menu.lookup("new-plan"), Some(ActionChoice::Alternative));
        assert_eq!(menu.lookup("7"), None);
        assert_eq!(menu.lookup("perhaps"), None);
    }
}
