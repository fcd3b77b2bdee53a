//! Flow stage machine — tracks which act of the onboarding the user is in.

use serde::{Deserialize, Serialize};

/// The four acts of the onboarding flow.
///
/// Progresses linearly: Identity → Skills → Mission → Debrief. The only
/// backward edge is `reset()`, which returns to Identity from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Identity,
    Skills,
    Mission,
    Debrief,
}

impl Stage {
    /// Check if a forward transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            (Identity, Skills) | (Skills, Mission) | (Mission, Debrief)
        )
    }

    /// The next stage in the linear progression, if any.
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            Identity => Some(Skills),
            Skills => Some(Mission),
            Mission => Some(Debrief),
            Debrief => None,
        }
    }

    /// Whether this stage is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Debrief)
    }

    /// Zero-based position in the four-act sequence, for progress display.
    pub fn index(&self) -> usize {
        match self {
            Self::Identity => 0,
            Self::Skills => 1,
            Self::Mission => 2,
            Self::Debrief => 3,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Identity
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Identity => "identity",
            Self::Skills => "skills",
            Self::Mission => "mission",
            Self::Debrief => "debrief",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progression_is_linear() {
        assert_eq!(Stage::Identity.next(), Some(Stage::Skills));
        assert_eq!(Stage::Skills.next(), Some(Stage::Mission));
        assert_eq!(Stage::Mission.next(), Some(Stage::Debrief));
        assert_eq!(Stage::Debrief.next(), None);
    }

    #[test]
    fn only_forward_neighbors_are_valid_transitions() {
        assert!(Stage::Identity.can_transition_to(Stage::Skills));
        assert!(!Stage::Identity.can_transition_to(Stage::Mission));
        assert!(!Stage::Skills.can_transition_to(Stage::Identity));
        assert!(!Stage::Debrief.can_transition_to(Stage::Identity));
    }

    #[test]
    fn debrief_is_terminal() {
        assert!(Stage::Debrief.is_terminal());
        assert!(!Stage::Mission.is_terminal());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::Skills).unwrap(), "\"skills\"");
        let s: Stage = serde_json::from_str("\"debrief\"").unwrap();
        assert_eq!(s, Stage::Debrief);
    }
}
