//! Client for the external persona-core speaker-selection service.
//!
//! In remote authority mode this service is the single source of truth
//! for who speaks next in a group: the engine forwards the roster,
//! transcript, and new user text, and trusts the returned speaker id.
//! An empty utterance list is a valid answer meaning "nobody responded".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use talemap_domain::{CharacterId, ChatMessage};

use crate::infrastructure::ports::{SpeakerError, SpeakerPort, SpeakerRequest, Utterance};

/// Client for the persona-core group-chat endpoint.
#[derive(Clone)]
pub struct PersonaCoreClient {
    client: Client,
    group_url: String,
}

impl PersonaCoreClient {
    pub fn new(group_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            group_url: group_url.to_string(),
        }
    }
}

#[async_trait]
impl SpeakerPort for PersonaCoreClient {
    async fn next_utterance(
        &self,
        request: SpeakerRequest,
    ) -> Result<Option<Utterance>, SpeakerError> {
        let payload = GroupTurnPayload::from(&request);

        let response = self
            .client
            .post(&self.group_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SpeakerError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| SpeakerError::RequestFailed(e.to_string()))?;
            return Err(SpeakerError::RequestFailed(error_text));
        }

        let body: GroupTurnResponse = response
            .json()
            .await
            .map_err(|e| SpeakerError::InvalidResponse(e.to_string()))?;

        // One utterance per turn; anything past the first is ignored.
        Ok(body.utterances.into_iter().next().map(|u| Utterance {
            speaker_id: CharacterId::new(u.speaker_id),
            content: u.content,
        }))
    }
}

#[derive(Debug, Serialize)]
struct GroupTurnPayload {
    session_id: String,
    group_id: String,
    participants: Vec<String>,
    user_text: String,
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
struct HistoryEntry {
    role: talemap_domain::MessageRole,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_id: Option<String>,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
            speaker_id: msg.speaker_id.as_ref().map(|id| id.to_string()),
        }
    }
}

impl From<&SpeakerRequest> for GroupTurnPayload {
    fn from(request: &SpeakerRequest) -> Self {
        Self {
            session_id: request.session_id.clone(),
            group_id: request.group_id.to_string(),
            participants: request
                .participants
                .iter()
                .map(|id| id.to_string())
                .collect(),
            user_text: request.user_text.clone(),
            history: request.history.iter().map(HistoryEntry::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GroupTurnResponse {
    #[serde(default)]
    utterances: Vec<WireUtterance>,
}

#[derive(Debug, Deserialize)]
struct WireUtterance {
    speaker_id: String,
    content: String,
}
