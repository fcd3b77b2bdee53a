//! Flow controller — sequences the four stages, owns the shared profile,
//! and merges the deltas stages emit.
//!
//! Stages never hold a profile copy that can drift: they read a snapshot
//! and hand back a [`ProfileDelta`]. Local stage state lives inside
//! [`ActiveStage`] and is discarded on every transition, so a stage is
//! stateless across re-entry except through the profile.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::FlowError;
use crate::flow::debrief::DebriefView;
use crate::flow::identity::{IdentityPhase, IdentityStage};
use crate::flow::mission::MissionStage;
use crate::flow::model::{
    AgentRole, BADGE_FIRST_MISSION, FlightPlan, MISSION_MILES, MissionAnalysis, ProfileDelta,
    QuizQuestion, UserProfile,
};
use crate::flow::skills::{
    AnswerFeedback, QuestionView, QuizAdvance, ResultsSummary, SkillsStage,
};
use crate::flow::stage::Stage;

/// Local state of whichever stage is currently rendered.
#[derive(Debug)]
pub enum ActiveStage {
    Identity(IdentityStage),
    Skills(SkillsStage),
    Mission(MissionStage),
    Debrief,
}

impl ActiveStage {
    fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Identity => Self::Identity(IdentityStage::new()),
            Stage::Skills => Self::Skills(SkillsStage::new()),
            Stage::Mission => Self::Mission(MissionStage::new()),
            Stage::Debrief => Self::Debrief,
        }
    }

    fn stage(&self) -> Stage {
        match self {
            Self::Identity(_) => Stage::Identity,
            Self::Skills(_) => Stage::Skills,
            Self::Mission(_) => Stage::Mission,
            Self::Debrief => Stage::Debrief,
        }
    }
}

/// Parameters for a quiz-generation gateway call.
#[derive(Debug, Clone)]
pub struct QuizRequest {
    pub role: String,
    pub skills: Vec<String>,
}

/// Parameters for a mission-analysis gateway call.
#[derive(Debug, Clone)]
pub struct MissionRequest {
    pub plan: FlightPlan,
    pub profile: UserProfile,
}

/// Result of advancing the quiz, after any award has been merged.
#[derive(Debug)]
pub enum AdvanceOutcome {
    Next(QuestionView),
    Finished(ResultsSummary),
}

/// Serializable snapshot of the whole session, for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FlowStatus {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stage: Stage,
    pub stage_index: usize,
    pub phase: &'static str,
    pub profile: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsSummary>,
}

/// The onboarding flow controller.
#[derive(Debug)]
pub struct FlowController {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    profile: UserProfile,
    flight_plan: Option<FlightPlan>,
    analysis: Option<MissionAnalysis>,
    active: ActiveStage,
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            profile: UserProfile::default(),
            flight_plan: None,
            analysis: None,
            active: ActiveStage::Identity(IdentityStage::new()),
        }
    }

    pub fn stage(&self) -> Stage {
        self.active.stage()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    fn transition(&mut self, to: Stage) -> Result<(), FlowError> {
        let from = self.active.stage();
        if !from.can_transition_to(to) {
            return Err(FlowError::InvalidTransition { from, to });
        }
        // Debrief must never be rendered without its inputs.
        if to == Stage::Debrief && (self.flight_plan.is_none() || self.analysis.is_none()) {
            return Err(FlowError::DebriefIncomplete);
        }
        tracing::info!(session = %self.session_id, %from, %to, "stage transition");
        self.active = ActiveStage::for_stage(to);
        Ok(())
    }

    fn wrong_stage(&self, action: &'static str) -> FlowError {
        FlowError::WrongStage {
            action,
            stage: self.active.stage(),
        }
    }

    // ── Controller operations ───────────────────────────────────────────

    /// Merge the identity delta and advance to the Skills stage.
    pub fn complete_identity(&mut self, delta: ProfileDelta) -> Result<(), FlowError> {
        if !matches!(self.active, ActiveStage::Identity(_)) {
            return Err(self.wrong_stage("complete_identity"));
        }
        self.profile.apply(delta)?;
        self.transition(Stage::Skills)
    }

    /// Merge a delta without changing stage. Used by the Skills stage for
    /// its incremental writes.
    pub fn update_profile(&mut self, delta: ProfileDelta) -> Result<(), FlowError> {
        self.profile.apply(delta)
    }

    /// Advance from Skills to Mission. All skills-stage data has already
    /// been merged through `update_profile`.
    pub fn complete_skills(&mut self) -> Result<(), FlowError> {
        if !matches!(self.active, ActiveStage::Skills(_)) {
            return Err(self.wrong_stage("complete_skills"));
        }
        self.transition(Stage::Mission)
    }

    /// Store the session output, merge the fixed mission award, and advance
    /// to the Debrief stage.
    pub fn complete_mission(
        &mut self,
        plan: FlightPlan,
        analysis: MissionAnalysis,
    ) -> Result<(), FlowError> {
        if !matches!(self.active, ActiveStage::Mission(_)) {
            return Err(self.wrong_stage("complete_mission"));
        }
        self.flight_plan = Some(plan);
        self.analysis = Some(analysis);
        self.profile
            .apply(ProfileDelta::award(MISSION_MILES, BADGE_FIRST_MISSION))?;
        self.transition(Stage::Debrief)
    }

    /// Discard everything and return to the Identity stage.
    pub fn reset(&mut self) {
        tracing::info!(session = %self.session_id, "flow reset");
        self.profile = UserProfile::default();
        self.flight_plan = None;
        self.analysis = None;
        self.started_at = Utc::now();
        self.active = ActiveStage::Identity(IdentityStage::new());
    }

    // ── Identity stage events ───────────────────────────────────────────

    pub fn begin_identification(&mut self) -> Result<(), FlowError> {
        match &mut self.active {
            ActiveStage::Identity(stage) => stage.begin_identification(),
            _ => Err(self.wrong_stage("begin_identification")),
        }
    }

    pub fn submit_identity(&mut self, name: &str, role: AgentRole) -> Result<(), FlowError> {
        let delta = match &self.active {
            ActiveStage::Identity(stage) => stage.submit(name, role)?,
            _ => return Err(self.wrong_stage("submit_identity")),
        };
        self.complete_identity(delta)
    }

    // ── Skills stage events ─────────────────────────────────────────────

    /// Toggle one skill in the selection. Returns whether it is selected
    /// afterwards.
    pub fn toggle_skill(&mut self, label: &str) -> Result<bool, FlowError> {
        match &mut self.active {
            ActiveStage::Skills(stage) => stage.toggle_skill(label),
            _ => Err(self.wrong_stage("toggle_skill")),
        }
    }

    /// Ensure each listed catalog skill is selected, in order. Selections
    /// beyond the cap are silently ignored, matching the toggle semantics.
    pub fn select_skills(&mut self, labels: &[String]) -> Result<(), FlowError> {
        match &mut self.active {
            ActiveStage::Skills(stage) => {
                for label in labels {
                    if !stage.selected().iter().any(|s| s == label) {
                        stage.toggle_skill(label)?;
                    }
                }
                Ok(())
            }
            _ => Err(self.wrong_stage("select_skills")),
        }
    }

    /// Confirm the selection: merge the skills into the profile and return
    /// the parameters for the quiz-generation call. The stage stays in its
    /// loading sub-state until `install_quiz` lands.
    pub fn start_calibration(&mut self) -> Result<QuizRequest, FlowError> {
        let (delta, skills) = match &mut self.active {
            ActiveStage::Skills(stage) => stage.confirm_selection()?,
            _ => return Err(self.wrong_stage("start_calibration")),
        };
        self.update_profile(delta)?;
        let role = self
            .profile
            .role
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| "Agent".to_string());
        Ok(QuizRequest { role, skills })
    }

    /// Land the generated quiz. Returns whether calibration actually
    /// started (false means the sequence was empty and the stage moved to
    /// its recoverable failed phase).
    pub fn install_quiz(&mut self, questions: Vec<QuizQuestion>) -> Result<bool, FlowError> {
        match &mut self.active {
            ActiveStage::Skills(stage) => {
                let started = stage.install_quiz(questions)?;
                if !started {
                    tracing::warn!(session = %self.session_id, "calibration quiz came back empty");
                }
                Ok(started)
            }
            _ => Err(self.wrong_stage("install_quiz")),
        }
    }

    /// Recovery path after an empty quiz: back to skill selection.
    pub fn retry_skill_selection(&mut self) -> Result<(), FlowError> {
        match &mut self.active {
            ActiveStage::Skills(stage) => stage.retry_selection(),
            _ => Err(self.wrong_stage("retry_skill_selection")),
        }
    }

    pub fn answer_question(&mut self, choice: usize) -> Result<AnswerFeedback, FlowError> {
        match &mut self.active {
            ActiveStage::Skills(stage) => stage.answer(choice),
            _ => Err(self.wrong_stage("answer_question")),
        }
    }

    /// Advance the quiz; when it finishes, merge the calibration award.
    pub fn advance_question(&mut self) -> Result<AdvanceOutcome, FlowError> {
        let advance = match &mut self.active {
            ActiveStage::Skills(stage) => stage.advance()?,
            _ => return Err(self.wrong_stage("advance_question")),
        };
        match advance {
            QuizAdvance::Next(view) => Ok(AdvanceOutcome::Next(view)),
            QuizAdvance::Finished { summary, delta } => {
                self.update_profile(delta)?;
                Ok(AdvanceOutcome::Finished(summary))
            }
        }
    }

    /// Leave the results screen and board the aircraft.
    pub fn board_aircraft(&mut self) -> Result<(), FlowError> {
        match &self.active {
            ActiveStage::Skills(stage) => {
                if stage.results().is_none() {
                    return Err(FlowError::WrongPhase {
                        action: "board_aircraft",
                        phase: stage.phase_name().to_string(),
                    });
                }
            }
            _ => return Err(self.wrong_stage("board_aircraft")),
        }
        self.complete_skills()
    }

    // ── Mission stage events ────────────────────────────────────────────

    /// Validate and file the flight plan, entering the analyzing sub-state.
    /// Returns the parameters for the mission-analysis call.
    pub fn file_flight_plan(&mut self, plan: FlightPlan) -> Result<MissionRequest, FlowError> {
        let accepted = match &mut self.active {
            ActiveStage::Mission(stage) => stage.submit(plan)?,
            _ => return Err(self.wrong_stage("file_flight_plan")),
        };
        Ok(MissionRequest {
            plan: accepted,
            profile: self.profile.clone(),
        })
    }

    /// Land the control-tower analysis and complete the mission. The flow
    /// advances regardless of the verdict: approval is narrative feedback,
    /// not a gate.
    pub fn install_analysis(
        &mut self,
        plan: FlightPlan,
        analysis: MissionAnalysis,
    ) -> Result<(), FlowError> {
        match &self.active {
            ActiveStage::Mission(stage) => {
                if !stage.is_analyzing() {
                    return Err(FlowError::WrongPhase {
                        action: "install_analysis",
                        phase: "planning".to_string(),
                    });
                }
            }
            _ => return Err(self.wrong_stage("install_analysis")),
        }
        self.complete_mission(plan, analysis)
    }

    // ── Read-only views ─────────────────────────────────────────────────

    /// The debrief view. Only available at the Debrief stage, which is only
    /// reachable with both the plan and the analysis present.
    pub fn debrief(&self) -> Result<DebriefView, FlowError> {
        if !matches!(self.active, ActiveStage::Debrief) {
            return Err(self.wrong_stage("debrief"));
        }
        match (&self.flight_plan, &self.analysis) {
            (Some(plan), Some(analysis)) => {
                Ok(DebriefView::compose(&self.profile, plan, analysis))
            }
            _ => Err(FlowError::DebriefIncomplete),
        }
    }

    /// Snapshot of the session for the status endpoint.
    pub fn status(&self) -> FlowStatus {
        let phase = match &self.active {
            ActiveStage::Identity(stage) => match stage.phase() {
                IdentityPhase::Welcome => "welcome",
                IdentityPhase::Form => "form",
            },
            ActiveStage::Skills(stage) => stage.phase_name(),
            ActiveStage::Mission(stage) => {
                if stage.is_analyzing() {
                    "analyzing"
                } else {
                    "planning"
                }
            }
            ActiveStage::Debrief => "complete",
        };
        let (question, results) = match &self.active {
            ActiveStage::Skills(stage) => {
                (stage.current_question(), stage.results().cloned())
            }
            _ => (None, None),
        };
        FlowStatus {
            session_id: self.session_id,
            started_at: self.started_at,
            stage: self.active.stage(),
            stage_index: self.active.stage().index(),
            phase,
            profile: self.profile.clone(),
            question,
            results,
        }
    }
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}
