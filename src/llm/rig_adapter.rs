//! Adapter bridging rig's `CompletionModel` trait to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::message::AssistantContent;
use rig::completion::{CompletionModel, Message};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

/// Wraps a rig completion model behind the provider-agnostic interface.
pub struct RigAdapter<M: CompletionModel> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

#[async_trait]
impl<M: CompletionModel> LlmProvider for RigAdapter<M> {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (preamble, history, prompt) = split_messages(request.messages);

        let prompt = prompt.ok_or_else(|| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: "completion request contains no user message".to_string(),
        })?;

        let mut builder = self.model.completion_request(prompt);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if !history.is_empty() {
            builder = builder.messages(history);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(max_tokens as u64);
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: e.to_string(),
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|part| match part {
                AssistantContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if content.is_empty() {
            return Err(LlmError::EmptyCompletion {
                provider: self.model_name.clone(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: response.usage.input_tokens as u32,
            output_tokens: response.usage.output_tokens as u32,
            finish_reason: FinishReason::Stop,
        })
    }
}

/// Split a flat message list into rig's (preamble, history, prompt) shape.
///
/// rig wants system text as a preamble, the final user message as the
/// prompt, and everything in between as chat history.
fn split_messages(messages: Vec<ChatMessage>) -> (Option<String>, Vec<Message>, Option<Message>) {
    let mut preamble: Option<String> = None;
    let mut history: Vec<Message> = Vec::new();
    let mut prompt: Option<Message> = None;

    for message in messages {
        match message.role {
            Role::System => {
                preamble = Some(match preamble.take() {
                    Some(existing) => format!("{existing}\n\n{}", message.content),
                    None => message.content,
                });
            }
            Role::User => {
                if let Some(previous) = prompt.take() {
                    history.push(previous);
                }
                prompt = Some(Message::user(message.content));
            }
            Role::Assistant => {
                if let Some(previous) = prompt.take() {
                    history.push(previous);
                }
                history.push(Message::assistant(message.content));
            }
        }
    }

    (preamble, history, prompt)
}
