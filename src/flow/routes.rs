//! REST endpoints driving the onboarding flow.
//!
//! One shared session behind an `RwLock`. The two gateway calls run
//! outside the lock; the stage machines hold a loading latch while a call
//! is outstanding, so a duplicate request gets a conflict instead of a
//! second remote call.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use crate::error::FlowError;
use crate::flow::controller::{AdvanceOutcome, FlowController};
use crate::flow::model::{AgentRole, FlightPlan, MAX_SKILLS, RoleStats, SKILL_OPTIONS};
use crate::gateway::GenerationGateway;

/// Shared state for the flow routes.
#[derive(Clone)]
pub struct FlowRouteState {
    pub session: Arc<RwLock<FlowController>>,
    pub gateway: Arc<dyn GenerationGateway>,
}

impl FlowRouteState {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self {
            session: Arc::new(RwLock::new(FlowController::new())),
            gateway,
        }
    }
}

fn error_response(e: &FlowError) -> Response {
    let status = match e {
        FlowError::MissingField { .. }
        | FlowError::UnknownSkill { .. }
        | FlowError::NoSkillsSelected
        | FlowError::AnswerOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::CONFLICT,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

/// GET /api/flow/status
async fn get_status(State(state): State<FlowRouteState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(session.status())
}

#[derive(serde::Serialize)]
struct RoleEntry {
    role: AgentRole,
    label: &'static str,
    description: &'static str,
    stats: RoleStats,
}

/// GET /api/flow/catalog
///
/// The role catalog (with its cosmetic stat weights) and the skill catalog.
async fn get_catalog() -> impl IntoResponse {
    let roles: Vec<RoleEntry> = AgentRole::ALL
        .iter()
        .map(|role| RoleEntry {
            role: *role,
            label: role.label(),
            description: role.description(),
            stats: role.stats(),
        })
        .collect();
    Json(json!({
        "roles": roles,
        "skills": SKILL_OPTIONS,
        "max_skills": MAX_SKILLS,
    }))
}

/// POST /api/flow/begin — acknowledge the welcome screen.
async fn begin(State(state): State<FlowRouteState>) -> Response {
    let mut session = state.session.write().await;
    match session.begin_identification() {
        Ok(()) => Json(session.status()).into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct IdentityPayload {
    name: String,
    role: AgentRole,
}

/// POST /api/flow/identity — validate the enrollment form.
async fn submit_identity(
    State(state): State<FlowRouteState>,
    Json(payload): Json<IdentityPayload>,
) -> Response {
    let mut session = state.session.write().await;
    match session.submit_identity(&payload.name, payload.role) {
        Ok(()) => Json(session.status()).into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct SkillsPayload {
    skills: Vec<String>,
}

/// POST /api/flow/skills — confirm the skill selection and generate the
/// calibration quiz.
async fn submit_skills(
    State(state): State<FlowRouteState>,
    Json(payload): Json<SkillsPayload>,
) -> Response {
    // Validate and latch under the lock, then call the gateway without it.
    let request = {
        let mut session = state.session.write().await;
        if let Err(e) = session.select_skills(&payload.skills) {
            return error_response(&e);
        }
        match session.start_calibration() {
            Ok(request) => request,
            Err(e) => return error_response(&e),
        }
    };

    let questions = state
        .gateway
        .generate_quiz(&request.role, &request.skills)
        .await;

    let mut session = state.session.write().await;
    match session.install_quiz(questions) {
        Ok(_started) => Json(session.status()).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/flow/skills/retry — recover from an empty quiz.
async fn retry_skills(State(state): State<FlowRouteState>) -> Response {
    let mut session = state.session.write().await;
    match session.retry_skill_selection() {
        Ok(()) => Json(session.status()).into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct AnswerPayload {
    choice: usize,
}

/// POST /api/flow/quiz/answer — answer the current question.
async fn answer_question(
    State(state): State<FlowRouteState>,
    Json(payload): Json<AnswerPayload>,
) -> Response {
    let mut session = state.session.write().await;
    match session.answer_question(payload.choice) {
        Ok(feedback) => Json(feedback).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/flow/quiz/next — advance past an answered question.
async fn advance_question(State(state): State<FlowRouteState>) -> Response {
    let mut session = state.session.write().await;
    match session.advance_question() {
        Ok(AdvanceOutcome::Next(view)) => Json(json!({ "question": view })).into_response(),
        Ok(AdvanceOutcome::Finished(summary)) => {
            Json(json!({ "results": summary, "profile": session.profile() })).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST /api/flow/board — leave the results screen, board the aircraft.
async fn board(State(state): State<FlowRouteState>) -> Response {
    let mut session = state.session.write().await;
    match session.board_aircraft() {
        Ok(()) => Json(session.status()).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/flow/mission — file the flight plan and request clearance.
async fn submit_mission(
    State(state): State<FlowRouteState>,
    Json(plan): Json<FlightPlan>,
) -> Response {
    let request = {
        let mut session = state.session.write().await;
        match session.file_flight_plan(plan) {
            Ok(request) => request,
            Err(e) => return error_response(&e),
        }
    };

    let analysis = state
        .gateway
        .analyze_mission(&request.plan, &request.profile)
        .await;

    let mut session = state.session.write().await;
    match session.install_analysis(request.plan, analysis) {
        Ok(()) => Json(session.status()).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/flow/debrief
async fn get_debrief(State(state): State<FlowRouteState>) -> Response {
    let session = state.session.read().await;
    match session.debrief() {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/flow/reset
async fn reset(State(state): State<FlowRouteState>) -> Response {
    let mut session = state.session.write().await;
    session.reset();
    Json(session.status()).into_response()
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Build the flow REST routes.
pub fn flow_routes(state: FlowRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/flow/status", get(get_status))
        .route("/api/flow/catalog", get(get_catalog))
        .route("/api/flow/begin", post(begin))
        .route("/api/flow/identity", post(submit_identity))
        .route("/api/flow/skills", post(submit_skills))
        .route("/api/flow/skills/retry", post(retry_skills))
        .route("/api/flow/quiz/answer", post(answer_question))
        .route("/api/flow/quiz/next", post(advance_question))
        .route("/api/flow/board", post(board))
        .route("/api/flow/mission", post(submit_mission))
        .route("/api/flow/debrief", get(get_debrief))
        .route("/api/flow/reset", post(reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
