//! Chat transcript messages.
//!
//! The history is the literal transcript: insertion order is significant
//! and messages are immutable once appended. Ids exist for UI
//! reconciliation only, so a random uuid is sufficient.

use serde::{Deserialize, Serialize};

use crate::ids::CharacterId;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Ai,
}

/// One entry in a conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Opaque unique token for UI reconciliation.
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Present only on AI messages produced under a group context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<CharacterId>,
}

impl ChatMessage {
    fn next_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// A user utterance. Never carries a speaker id.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Self::next_id(),
            role: MessageRole::User,
            content: content.into(),
            speaker_id: None,
        }
    }

    /// An AI utterance in single-character mode.
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            id: Self::next_id(),
            role: MessageRole::Ai,
            content: content.into(),
            speaker_id: None,
        }
    }

    /// An AI utterance attributed to a group participant.
    pub fn group_ai(speaker_id: CharacterId, content: impl Into<String>) -> Self {
        Self {
            id: Self::next_id(),
            role: MessageRole::Ai,
            content: content.into(),
            speaker_id: Some(speaker_id),
        }
    }
}
