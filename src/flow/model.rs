//! Data model for the onboarding flow.
//!
//! The cross-stage aggregate is [`UserProfile`]; stages never mutate it
//! directly. They emit a [`ProfileDelta`] and the controller merges it. The
//! delta is additive for miles and badges, so a decrease or a removal is
//! unrepresentable rather than merely checked.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// The fixed catalog of skill modules offered during the Skills stage.
pub const SKILL_OPTIONS: [&str; 7] = [
    "Accompagnement agents",
    "Conduite de projet IA",
    "Éthique & RGPD",
    "Traitement du Langage (NLP)",
    "RAG & Bases de Connaissances",
    "Computer Vision",
    "Prompt Engineering",
];

/// Maximum number of skills a profile can carry.
pub const MAX_SKILLS: usize = 5;

/// Miles seeded when identity is validated.
pub const ENROLLMENT_MILES: u32 = 100;
/// Miles per correct quiz answer.
pub const MILES_PER_CORRECT: u32 = 50;
/// Flat bonus for finishing the quiz, regardless of score.
pub const QUIZ_COMPLETION_BONUS: u32 = 50;
/// Miles awarded for submitting the first mission.
pub const MISSION_MILES: u32 = 200;

/// Badge granted at identity validation.
pub const BADGE_RECRUIT: &str = "RECRUE";
/// Badge granted at quiz completion.
pub const BADGE_CALIBRATED: &str = "CALIBRÉ";
/// Badge granted at first mission submission.
pub const BADGE_FIRST_MISSION: &str = "MISSION 1";

/// The role chosen at the Identity stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Mediator,
    Coordinator,
    Expert,
}

/// Cosmetic stat weights shown alongside each role. Not used in scoring.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RoleStats {
    pub tech: u8,
    pub comm: u8,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [Self::Mediator, Self::Coordinator, Self::Expert];

    /// Display label, as shown on the boarding pass.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mediator => "Médiateur (Chef de Cabine)",
            Self::Coordinator => "Coordinateur (Pilote)",
            Self::Expert => "Expert (Technicien)",
        }
    }

    /// One-line description of the role.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Mediator => {
                "Vous faites le lien entre les experts techniques et les métiers. \
                 Diplomatie et pédagogie sont vos armes."
            }
            Self::Coordinator => {
                "Vous pilotez la stratégie et veillez à la conformité (RGPD, Éthique). \
                 Vous gardez le cap."
            }
            Self::Expert => {
                "Vous maîtrisez la technique. Vous formez les équipes et déployez les modèles."
            }
        }
    }

    pub fn stats(&self) -> RoleStats {
        match self {
            Self::Mediator => RoleStats { tech: 2, comm: 5 },
            Self::Coordinator => RoleStats { tech: 3, comm: 4 },
            Self::Expert => RoleStats { tech: 5, comm: 2 },
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The cross-stage user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub role: Option<AgentRole>,
    pub miles: u32,
    pub skills: Vec<String>,
    pub badges: Vec<String>,
}

impl UserProfile {
    /// Merge a delta into the profile.
    ///
    /// `name` and `role` are write-once; miles and badges are additive by
    /// construction; skills may be rewritten (the Skills stage re-submits
    /// them on the empty-quiz recovery path, before calibration completes).
    pub fn apply(&mut self, delta: ProfileDelta) -> Result<(), FlowError> {
        if let Some(name) = delta.name {
            if !self.name.is_empty() {
                return Err(FlowError::FieldAlreadySet { field: "name" });
            }
            self.name = name;
        }
        if let Some(role) = delta.role {
            if self.role.is_some() {
                return Err(FlowError::FieldAlreadySet { field: "role" });
            }
            self.role = Some(role);
        }
        if let Some(skills) = delta.skills {
            self.skills = skills;
        }
        self.miles += delta.add_miles;
        self.badges.extend(delta.add_badges);
        Ok(())
    }
}

/// A profile mutation emitted by a stage and merged by the controller.
#[derive(Debug, Clone, Default)]
pub struct ProfileDelta {
    pub name: Option<String>,
    pub role: Option<AgentRole>,
    pub skills: Option<Vec<String>>,
    pub add_miles: u32,
    pub add_badges: Vec<String>,
}

impl ProfileDelta {
    /// A pure award: miles plus one badge.
    pub fn award(miles: u32, badge: &str) -> Self {
        Self {
            add_miles: miles,
            add_badges: vec![badge.to_string()],
            ..Self::default()
        }
    }
}

/// The mission description filed at the Mission stage. Ephemeral: part of
/// the session output, never merged into the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightPlan {
    pub title: String,
    pub context: String,
    #[serde(default)]
    pub constraints: String,
}

/// Verdict returned by the control tower for a flight plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionAnalysis {
    /// 0–3.
    pub urgency: u8,
    /// 0–3.
    pub difficulty: u8,
    pub weather_report: String,
    pub approved: bool,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl MissionAnalysis {
    /// Check the declared shape: scores in 0–3, non-empty report.
    pub fn validate(&self) -> Result<(), String> {
        if self.urgency > 3 {
            return Err(format!("urgency {} out of range 0-3", self.urgency));
        }
        if self.difficulty > 3 {
            return Err(format!("difficulty {} out of range 0-3", self.difficulty));
        }
        if self.weather_report.trim().is_empty() {
            return Err("empty weatherReport".to_string());
        }
        Ok(())
    }
}

/// One calibration quiz question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    /// Exactly 3 options.
    pub options: Vec<String>,
    /// Index into `options`, in 0–2.
    pub correct_index: usize,
    pub explanation: String,
}

impl QuizQuestion {
    /// Check the declared shape: exactly 3 options, index in range.
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("empty question".to_string());
        }
        if self.options.len() != 3 {
            return Err(format!("expected 3 options, got {}", self.options.len()));
        }
        if self.correct_index > 2 {
            return Err(format!("correctIndex {} out of range 0-2", self.correct_index));
        }
        Ok(())
    }
}
