//! Port traits for external collaborators.
//!
//! The generation service and the speaker-selection service are opaque
//! collaborators: the engine hands them structured context and receives
//! back exactly one utterance (or none). Adapters live next to this
//! module; use cases depend only on the traits.

use async_trait::async_trait;
use thiserror::Error;

use talemap_domain::{CharacterId, ChatMessage, GroupId, MessageRole};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Empty completion")]
    EmptyCompletion,
}

#[derive(Debug, Error)]
pub enum SpeakerError {
    #[error("Speaker service request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One transcript entry as the generation service sees it.
#[derive(Debug, Clone)]
pub struct TurnMessage {
    pub role: MessageRole,
    pub content: String,
}

impl From<&ChatMessage> for TurnMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// Request to the text-generation collaborator.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Instruction tiers in priority order, highest first. The transport
    /// emits them in this order when it has no native priority concept.
    pub instructions: Vec<String>,
    /// The conversation so far, newest last.
    pub messages: Vec<TurnMessage>,
    /// Temperature override; adapters fall back to their configured
    /// default when absent.
    pub temperature: Option<f32>,
    /// Completion-length bound override.
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(instructions: Vec<String>, messages: Vec<TurnMessage>) -> Self {
        Self {
            instructions,
            messages,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
}

/// Text-generation collaborator (single-character mode).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

/// Request to the group turn-selection collaborator.
#[derive(Debug, Clone)]
pub struct SpeakerRequest {
    /// Opaque session marker forwarded to the collaborator.
    pub session_id: String,
    pub group_id: GroupId,
    /// Realized participant ids, declared order.
    pub participants: Vec<CharacterId>,
    /// Full transcript including the seed message, newest last. The
    /// just-submitted user text is NOT in here; it travels separately.
    pub history: Vec<ChatMessage>,
    pub user_text: String,
}

/// One group utterance: who spoke and what they said.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub speaker_id: CharacterId,
    pub content: String,
}

/// Group turn-selection + generation collaborator.
///
/// Returns at most one utterance per call; `Ok(None)` means the
/// collaborator declined to produce one (e.g. empty candidate set). The
/// speaker choice is entirely the collaborator's - the engine records it
/// without second-guessing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeakerPort: Send + Sync {
    async fn next_utterance(
        &self,
        request: SpeakerRequest,
    ) -> Result<Option<Utterance>, SpeakerError>;
}

/// Injectable randomness for speaker initialization.
pub trait RandomPort: Send + Sync {
    /// Pick an index in `0..len`. `len` is always >= 1 when called.
    fn pick_index(&self, len: usize) -> usize;
}
