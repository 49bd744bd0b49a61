//! Single-character chat turn.
//!
//! Resolves the character, builds the layered persona prompt, and asks
//! the generation collaborator for exactly one reply. Upstream trouble
//! of any kind (unreachable, errored, empty) becomes `Upstream`; the
//! HTTP layer converts that to the fixed fallback utterance with a 500
//! so the transcript always receives a renderable message.

use std::sync::Arc;

use talemap_domain::{build_prompt, CharacterId, CharacterRegistry, ChatMessage};

use crate::error::GatewayError;
use crate::infrastructure::ports::{LlmPort, LlmRequest, TurnMessage};

/// Fixed reply shown when the generation service fails mid-conversation.
pub const SINGLE_FALLBACK_REPLY: &str =
    "...Something feels off today. Give me a moment and ask again.";

pub struct ChatTurn {
    characters: Arc<CharacterRegistry>,
    llm: Arc<dyn LlmPort>,
}

impl ChatTurn {
    pub fn new(characters: Arc<CharacterRegistry>, llm: Arc<dyn LlmPort>) -> Self {
        Self { characters, llm }
    }

    /// Produce the next reply for a single-character conversation.
    ///
    /// `messages` is the full transcript including the newest user
    /// message, oldest first.
    pub async fn execute(
        &self,
        character_id: &CharacterId,
        messages: &[ChatMessage],
    ) -> Result<String, GatewayError> {
        let character = self
            .characters
            .get(character_id)
            .ok_or_else(|| GatewayError::not_found("character", character_id.to_string()))?;

        let prompt = build_prompt(character);
        let request = LlmRequest::new(
            prompt.layers().map(str::to_string).to_vec(),
            messages.iter().map(TurnMessage::from).collect(),
        );

        let response = self.llm.generate(request).await.map_err(|e| {
            tracing::error!(character_id = %character_id, error = %e, "generation failed");
            GatewayError::Upstream(e.to_string())
        })?;

        Ok(response.content)
    }
}
