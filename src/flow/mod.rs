//! The onboarding flow: four ordered stages accumulating one shared
//! profile.
//!
//! The [`controller::FlowController`] sequences the stages and owns the
//! [`model::UserProfile`]; each stage is its own sub-state machine emitting
//! profile deltas and a completion signal. Two stages delegate content
//! generation to the [`crate::gateway`].

pub mod controller;
pub mod debrief;
pub mod identity;
pub mod mission;
pub mod model;
pub mod routes;
pub mod skills;
pub mod stage;

pub use controller::{AdvanceOutcome, FlowController, FlowStatus, MissionRequest, QuizRequest};
pub use model::{AgentRole, FlightPlan, MissionAnalysis, ProfileDelta, QuizQuestion, UserProfile};
pub use routes::{FlowRouteState, flow_routes};
pub use stage::Stage;
