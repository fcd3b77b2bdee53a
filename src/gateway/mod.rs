//! Generation gateway — the boundary to the remote content generator.
//!
//! Two operations, both total from the caller's point of view: a transport
//! or shape failure never crosses this boundary, it is absorbed into a
//! fixed deterministic fallback (see [`fallback`]). Single attempt, no
//! retry, no timeout.

pub mod fallback;
mod llm;
mod prompts;

pub use llm::LlmGateway;

use async_trait::async_trait;

use crate::flow::model::{FlightPlan, MissionAnalysis, QuizQuestion, UserProfile};

/// Content generation consumed by the Skills and Mission stages.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Generate a calibration quiz for the given role and skill selection.
    ///
    /// An empty sequence is a valid (degraded) result and routes the caller
    /// to its recovery path; a failed call yields the fallback quiz instead.
    async fn generate_quiz(&self, role: &str, skills: &[String]) -> Vec<QuizQuestion>;

    /// Ask the control tower to analyze a flight plan against the pilot's
    /// profile. A failed call yields the fallback analysis.
    async fn analyze_mission(&self, plan: &FlightPlan, profile: &UserProfile) -> MissionAnalysis;
}
