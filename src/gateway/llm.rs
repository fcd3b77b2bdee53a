//! LLM-backed generation gateway.
//!
//! Each operation is one temperature-0 completion that must come back as
//! JSON. The payload is validated against the declared shapes before it is
//! trusted; anything else — transport error, unparseable text, shape
//! mismatch — degrades to the fixed fallback and is logged, never
//! propagated.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::flow::model::{FlightPlan, MissionAnalysis, QuizQuestion, UserProfile};
use crate::gateway::fallback::{fallback_analysis, fallback_quiz};
use crate::gateway::prompts::{JSON_SYSTEM_PROMPT, mission_prompt, quiz_prompt};
use crate::gateway::GenerationGateway;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

const MAX_GENERATION_TOKENS: u32 = 2048;

/// Generation gateway backed by an [`LlmProvider`].
pub struct LlmGateway {
    llm: Arc<dyn LlmProvider>,
}

impl LlmGateway {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// One JSON completion, single attempt.
    async fn request_json(&self, prompt: String) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(JSON_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_max_tokens(MAX_GENERATION_TOKENS)
        .with_temperature(0.0);
        let response = self.llm.complete(request).await?;
        Ok(strip_code_fences(&response.content).to_string())
    }

    async fn try_generate_quiz(
        &self,
        role: &str,
        skills: &[String],
    ) -> Result<Vec<QuizQuestion>, LlmError> {
        let text = self.request_json(quiz_prompt(role, skills)).await?;
        let questions: Vec<QuizQuestion> = serde_json::from_str(&text)?;
        for question in &questions {
            question.validate().map_err(|reason| LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason,
            })?;
        }
        Ok(questions)
    }

    async fn try_analyze_mission(
        &self,
        plan: &FlightPlan,
        profile: &UserProfile,
    ) -> Result<MissionAnalysis, LlmError> {
        let text = self.request_json(mission_prompt(plan, profile)).await?;
        let analysis: MissionAnalysis = serde_json::from_str(&text)?;
        analysis.validate().map_err(|reason| LlmError::InvalidResponse {
            provider: self.llm.model_name().to_string(),
            reason,
        })?;
        Ok(analysis)
    }
}

#[async_trait]
impl GenerationGateway for LlmGateway {
    async fn generate_quiz(&self, role: &str, skills: &[String]) -> Vec<QuizQuestion> {
        match self.try_generate_quiz(role, skills).await {
            Ok(questions) => questions,
            Err(e) => {
                tracing::warn!("quiz generation degraded to fallback: {e}");
                fallback_quiz()
            }
        }
    }

    async fn analyze_mission(&self, plan: &FlightPlan, profile: &UserProfile) -> MissionAnalysis {
        match self.try_analyze_mission(plan, profile).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("mission analysis degraded to fallback: {e}");
                fallback_analysis()
            }
        }
    }
}

/// Strip a leading/trailing markdown code fence, if present. Models
/// occasionally wrap JSON payloads in ```json fences despite instructions.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, FinishReason};

    /// Provider stub returning a canned outcome.
    struct CannedLlm {
        outcome: Result<String, ()>,
    }

    impl CannedLlm {
        fn ok(content: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(content.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { outcome: Err(()) })
        }
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            match &self.outcome {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                    input_tokens: 0,
                    output_tokens: 0,
                    finish_reason: FinishReason::Stop,
                }),
                Err(()) => Err(LlmError::RequestFailed {
                    provider: "canned".to_string(),
                    reason: "link down".to_string(),
                }),
            }
        }
    }

    const VALID_QUIZ: &str = r#"[
        {"question": "Q1?", "options": ["a", "b", "c"], "correctIndex": 0, "explanation": "e1"},
        {"question": "Q2?", "options": ["a", "b", "c"], "correctIndex": 2, "explanation": "e2"}
    ]"#;

    const VALID_ANALYSIS: &str = r#"{
        "urgency": 2, "difficulty": 3,
        "weatherReport": "Turbulences juridiques en vue",
        "approved": false,
        "suggestions": ["Cadrer le périmètre"]
    }"#;

    fn plan() -> FlightPlan {
        FlightPlan {
            title: "Chatbot RH".to_string(),
            context: "contexte".to_string(),
            constraints: String::new(),
        }
    }

    #[tokio::test]
    async fn well_formed_quiz_passes_through() {
        let gateway = LlmGateway::new(CannedLlm::ok(VALID_QUIZ));
        let quiz = gateway.generate_quiz("Expert", &[]).await;
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz[1].correct_index, 2);
    }

    #[tokio::test]
    async fn fenced_payloads_are_unwrapped() {
        let fenced = format!("```json\n{VALID_QUIZ}\n```");
        let gateway = LlmGateway::new(CannedLlm::ok(&fenced));
        let quiz = gateway.generate_quiz("Expert", &[]).await;
        assert_eq!(quiz.len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_yields_fallback_quiz_every_time() {
        let gateway = LlmGateway::new(CannedLlm::failing());
        let first = gateway.generate_quiz("Expert", &[]).await;
        let second = gateway.generate_quiz("Expert", &[]).await;
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].correct_index, 1);
    }

    #[tokio::test]
    async fn unparseable_quiz_yields_fallback() {
        let gateway = LlmGateway::new(CannedLlm::ok("sorry, I cannot do that"));
        let quiz = gateway.generate_quiz("Expert", &[]).await;
        assert_eq!(quiz.len(), 3);
        assert_eq!(
            quiz[0].question,
            "Quelle est la priorité absolue d'un projet IA public ?"
        );
    }

    #[tokio::test]
    async fn out_of_shape_quiz_yields_fallback() {
        // Four options on the first question.
        let bad = r#"[{"question": "Q?", "options": ["a","b","c","d"], "correctIndex": 0, "explanation": "e"}]"#;
        let gateway = LlmGateway::new(CannedLlm::ok(bad));
        let quiz = gateway.generate_quiz("Expert", &[]).await;
        assert_eq!(quiz.len(), 3);
    }

    #[tokio::test]
    async fn empty_quiz_array_is_passed_through_not_replaced() {
        // A valid-but-empty payload is the degraded case the Skills stage
        // recovers from; the gateway must not mask it with the fallback.
        let gateway = LlmGateway::new(CannedLlm::ok("[]"));
        let quiz = gateway.generate_quiz("Expert", &[]).await;
        assert!(quiz.is_empty());
    }

    #[tokio::test]
    async fn well_formed_analysis_passes_through() {
        let gateway = LlmGateway::new(CannedLlm::ok(VALID_ANALYSIS));
        let analysis = gateway.analyze_mission(&plan(), &UserProfile::default()).await;
        assert_eq!(analysis.urgency, 2);
        assert!(!analysis.approved);
    }

    #[tokio::test]
    async fn failed_analysis_yields_deterministic_fallback() {
        let gateway = LlmGateway::new(CannedLlm::failing());
        let first = gateway.analyze_mission(&plan(), &UserProfile::default()).await;
        let second = gateway.analyze_mission(&plan(), &UserProfile::default()).await;
        assert!(first.approved);
        assert_eq!(first.weather_report, "Liaison radio perturbée. Vol à vue autorisé.");
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn out_of_range_analysis_yields_fallback() {
        let bad = r#"{"urgency": 9, "difficulty": 1, "weatherReport": "x", "approved": true}"#;
        let gateway = LlmGateway::new(CannedLlm::ok(bad));
        let analysis = gateway.analyze_mission(&plan(), &UserProfile::default()).await;
        assert_eq!(analysis.urgency, 1);
        assert!(analysis.approved);
    }

    #[test]
    fn strip_code_fences_handles_plain_and_fenced() {
        assert_eq!(strip_code_fences("[1]"), "[1]");
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  [1]  "), "[1]");
    }
}
