//! Debrief stage (the cockpit): read-only presentation of the completed
//! session.

use serde::Serialize;

use crate::flow::model::{FlightPlan, MissionAnalysis, UserProfile};

/// Severity band for a 0–3 score gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Map a 0–3 score to its severity band: ≤1 low, 2 medium, ≥3 high.
pub fn severity(score: u8) -> Severity {
    match score {
        0 | 1 => Severity::Low,
        2 => Severity::Medium,
        _ => Severity::High,
    }
}

/// Everything the debrief screen shows, composed from the session output.
#[derive(Debug, Clone, Serialize)]
pub struct DebriefView {
    pub profile: UserProfile,
    pub plan: FlightPlan,
    pub analysis: MissionAnalysis,
    pub urgency_severity: Severity,
    pub difficulty_severity: Severity,
    /// Control-tower verdict label; narrative feedback, not a gate.
    pub verdict: &'static str,
    pub first_suggestion: Option<String>,
}

impl DebriefView {
    pub fn compose(profile: &UserProfile, plan: &FlightPlan, analysis: &MissionAnalysis) -> Self {
        Self {
            profile: profile.clone(),
            plan: plan.clone(),
            analysis: analysis.clone(),
            urgency_severity: severity(analysis.urgency),
            difficulty_severity: severity(analysis.difficulty),
            verdict: if analysis.approved {
                "VOL AUTORISÉ"
            } else {
                "RÉVISION REQUISE"
            },
            first_suggestion: analysis.suggestions.first().cloned(),
        }
    }
}
