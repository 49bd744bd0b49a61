//! OpenAI-compatible chat-completions client.
//!
//! Speaks the `/v1/chat/completions` wire format. The instruction tiers
//! of an [`LlmRequest`] are emitted as ordered `system` messages, world
//! layer first - the wire has no priority concept, so ordering is the
//! best-effort encoding of "world outranks behavior".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use talemap_domain::MessageRole;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};
use crate::infrastructure::settings::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, Settings};

/// Client for an OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct OpenAiChatClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut client = Self::new(
            &settings.openai_base_url,
            settings.openai_api_key.clone(),
            &settings.openai_model,
            settings.llm_timeout,
        );
        client.temperature = settings.llm_temperature;
        client.max_tokens = settings.llm_max_tokens;
        client
    }
}

#[async_trait]
impl LlmPort for OpenAiChatClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let api_request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_messages(&request),
            temperature: request.temperature.unwrap_or(self.temperature),
            max_completion_tokens: request.max_tokens.unwrap_or(self.max_tokens),
        };

        let mut http_request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&api_request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::RequestFailed(error_text));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        Ok(LlmResponse { content })
    }
}

/// Flatten instruction tiers and transcript into wire messages.
fn build_messages(request: &LlmRequest) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(request.instructions.len() + request.messages.len());

    for instruction in &request.instructions {
        messages.push(WireMessage {
            role: "system".to_string(),
            content: instruction.clone(),
        });
    }

    for msg in &request.messages {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Ai => "assistant",
        };
        messages.push(WireMessage {
            role: role.to_string(),
            content: msg.content.clone(),
        });
    }

    messages
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
