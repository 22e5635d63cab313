use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of the two-stage approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    /// No form has been shown yet
    Initial,
    /// Package table shown, operator may tick "filter agents first"
    AwaitingAgentFilterChoice,
    /// Agent list shown for the current selection
    AwaitingAgentSelection,
    /// Final approval request produced
    Submitted,
}

impl FlowState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// Whether the agent list is part of the form in this state
    pub fn shows_agents(&self) -> bool {
        matches!(self, Self::AwaitingAgentSelection)
    }

    pub fn can_transition_to(&self, next: FlowState) -> bool {
        match self {
            Self::Initial => next != Self::Initial,
            Self::AwaitingAgentFilterChoice => matches!(
                next,
                Self::AwaitingAgentFilterChoice | Self::AwaitingAgentSelection | Self::Submitted
            ),
            Self::AwaitingAgentSelection => {
                matches!(next, Self::AwaitingAgentSelection | Self::Submitted)
            }
            Self::Submitted => false,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::AwaitingAgentFilterChoice => write!(f, "awaiting_agent_filter_choice"),
            Self::AwaitingAgentSelection => write!(f, "awaiting_agent_selection"),
            Self::Submitted => write!(f, "submitted"),
        }
    }
}

impl std::str::FromStr for FlowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(Self::Initial),
            "awaiting_agent_filter_choice" => Ok(Self::AwaitingAgentFilterChoice),
            "awaiting_agent_selection" => Ok(Self::AwaitingAgentSelection),
            "submitted" => Ok(Self::Submitted),
            _ => Err(format!("Invalid flow state: {s}")),
        }
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::Initial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_state_terminal_check() {
        assert!(FlowState::Submitted.is_terminal());
        assert!(!FlowState::Initial.is_terminal());
        assert!(!FlowState::AwaitingAgentFilterChoice.is_terminal());
        assert!(!FlowState::AwaitingAgentSelection.is_terminal());
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(FlowState::Initial.can_transition_to(FlowState::AwaitingAgentFilterChoice));
        assert!(FlowState::Initial.can_transition_to(FlowState::Submitted));
        assert!(FlowState::AwaitingAgentFilterChoice
            .can_transition_to(FlowState::AwaitingAgentSelection));
        assert!(FlowState::AwaitingAgentSelection.can_transition_to(FlowState::Submitted));
        assert!(!FlowState::AwaitingAgentSelection
            .can_transition_to(FlowState::AwaitingAgentFilterChoice));
        assert!(!FlowState::Submitted.can_transition_to(FlowState::Initial));
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(
            FlowState::AwaitingAgentSelection.to_string(),
            "awaiting_agent_selection"
        );
        assert_eq!(
            "submitted".parse::<FlowState>().unwrap(),
            FlowState::Submitted
        );
        assert!("done".parse::<FlowState>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&FlowState::AwaitingAgentFilterChoice).unwrap();
        assert_eq!(json, "\"awaiting_agent_filter_choice\"");
        let parsed: FlowState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, FlowState::AwaitingAgentFilterChoice);
    }
}
