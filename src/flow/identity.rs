//! Identity stage (the tarmac): welcome acknowledgement, then the
//! name-and-role form.

use crate::error::FlowError;
use crate::flow::model::{AgentRole, BADGE_RECRUIT, ENROLLMENT_MILES, ProfileDelta};

/// Sub-phase of the Identity stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPhase {
    /// Pure acknowledgement screen with a single forward action.
    Welcome,
    /// The enrollment form: name plus role.
    Form,
}

/// Local state of the Identity stage.
#[derive(Debug)]
pub struct IdentityStage {
    phase: IdentityPhase,
}

impl IdentityStage {
    pub fn new() -> Self {
        Self {
            phase: IdentityPhase::Welcome,
        }
    }

    pub fn phase(&self) -> IdentityPhase {
        self.phase
    }

    /// Acknowledge the welcome screen and open the enrollment form.
    pub fn begin_identification(&mut self) -> Result<(), FlowError> {
        match self.phase {
            IdentityPhase::Welcome => {
                self.phase = IdentityPhase::Form;
                Ok(())
            }
            IdentityPhase::Form => Err(FlowError::WrongPhase {
                action: "begin_identification",
                phase: "form".to_string(),
            }),
        }
    }

    /// Validate the form and produce the enrollment delta.
    ///
    /// Requires a non-empty name; the role arrives already typed. This is
    /// the only place miles are seeded to a nonzero base and the starting
    /// badge is granted.
    pub fn submit(&self, name: &str, role: AgentRole) -> Result<ProfileDelta, FlowError> {
        if self.phase != IdentityPhase::Form {
            return Err(FlowError::WrongPhase {
                action: "submit_identity",
                phase: "welcome".to_string(),
            });
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(FlowError::MissingField { field: "name" });
        }
        Ok(ProfileDelta {
            name: Some(name.to_string()),
            role: Some(role),
            add_miles: ENROLLMENT_MILES,
            add_badges: vec![BADGE_RECRUIT.to_string()],
            ..ProfileDelta::default()
        })
    }
}

impl Default for IdentityStage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_welcome_screen() {
        let stage = IdentityStage::new();
        assert_eq!(stage.phase(), IdentityPhase::Welcome);
    }

    #[test]
    fn submit_before_acknowledging_welcome_is_rejected() {
        let stage = IdentityStage::new();
        let err = stage.submit("AGENT SMITH", AgentRole::Coordinator).unwrap_err();
        assert!(matches!(err, FlowError::WrongPhase { .. }));
    }

    #[test]
    fn valid_submission_seeds_miles_and_recruit_badge() {
        let mut stage = IdentityStage::new();
        stage.begin_identification().unwrap();
        let delta = stage.submit("AGENT SMITH", AgentRole::Coordinator).unwrap();
        assert_eq!(delta.name.as_deref(), Some("AGENT SMITH"));
        assert_eq!(delta.role, Some(AgentRole::Coordinator));
        assert_eq!(delta.add_miles, 100);
        assert_eq!(delta.add_badges, vec!["RECRUE"]);
        assert!(delta.skills.is_none());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut stage = IdentityStage::new();
        stage.begin_identification().unwrap();
        let err = stage.submit("   ", AgentRole::Expert).unwrap_err();
        assert!(matches!(err, FlowError::MissingField { field: "name" }));
    }

    #[test]
    fn name_is_trimmed() {
        let mut stage = IdentityStage::new();
        stage.begin_identification().unwrap();
        let delta = stage.submit("  NEO  ", AgentRole::Mediator).unwrap();
        assert_eq!(delta.name.as_deref(), Some("NEO"));
    }

    #[test]
    fn welcome_cannot_be_acknowledged_twice() {
        let mut stage = IdentityStage::new();
        stage.begin_identification().unwrap();
        assert!(stage.begin_identification().is_err());
    }
}
