//! Chat-turn endpoints.
//!
//! Single conversion point from the gateway error taxonomy to HTTP:
//! validation problems become 400 with the offending field named,
//! unknown ids become 404, and upstream failure becomes 500 carrying a
//! renderable fallback reply so the transcript never ends on a blank
//! turn.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use talemap_domain::{
    CharacterId, ChatMessage, GroupContext, GroupContextError, SYSTEM_SPEAKER_ID,
};

use crate::app::App;
use crate::error::GatewayError;
use crate::use_cases::{GROUP_FALLBACK_REPLY, SINGLE_FALLBACK_REPLY};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    character_id: Option<CharacterId>,
    messages: Option<Vec<WireMessage>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    role: Option<String>,
    content: Option<String>,
    #[serde(default)]
    speaker_id: Option<CharacterId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTurnRequest {
    /// The client-held context, taken as loose JSON so a malformed one
    /// maps to a 400 rather than a deserialization rejection.
    context: Option<Value>,
    user_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupContextRequest {
    map: Option<String>,
    location: Option<String>,
    #[serde(default)]
    history: Option<Vec<WireMessage>>,
}

/// The single AI reply for a turn. `speakerId` is present in group mode
/// only.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_id: Option<CharacterId>,
    content: String,
}

impl TurnReply {
    fn ai(content: String) -> Self {
        Self {
            role: "ai",
            speaker_id: None,
            content,
        }
    }

    fn group_ai(speaker_id: Option<CharacterId>, content: String) -> Self {
        Self {
            role: "ai",
            speaker_id,
            content,
        }
    }
}

fn to_history(wire: Vec<WireMessage>) -> Result<Vec<ChatMessage>, GatewayError> {
    wire.into_iter()
        .map(|msg| {
            let content = msg.content.ok_or(GatewayError::Validation("content"))?;
            match msg.role.as_deref() {
                Some("user") => Ok(ChatMessage::user(content)),
                Some("ai") => Ok(match msg.speaker_id {
                    Some(speaker) => ChatMessage::group_ai(speaker, content),
                    None => ChatMessage::ai(content),
                }),
                _ => Err(GatewayError::Validation("role")),
            }
        })
        .collect()
}

fn single_error(err: GatewayError) -> Response {
    match err {
        GatewayError::Validation(_) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        GatewayError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        GatewayError::Upstream(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TurnReply::ai(SINGLE_FALLBACK_REPLY.to_string())),
        )
            .into_response(),
    }
}

fn group_error(err: GatewayError) -> Response {
    match err {
        GatewayError::Validation(_) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        GatewayError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        GatewayError::Upstream(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TurnReply::group_ai(
                Some(CharacterId::new(SYSTEM_SPEAKER_ID)),
                GROUP_FALLBACK_REPLY.to_string(),
            )),
        )
            .into_response(),
    }
}

/// POST /api/chat
pub async fn chat_turn(State(app): State<Arc<App>>, Json(req): Json<ChatRequest>) -> Response {
    let Some(character_id) = req.character_id else {
        return single_error(GatewayError::Validation("characterId"));
    };
    let Some(wire) = req.messages else {
        return single_error(GatewayError::Validation("messages"));
    };
    let messages = match to_history(wire) {
        Ok(messages) => messages,
        Err(err) => return single_error(err),
    };

    match app.chat.execute(&character_id, &messages).await {
        Ok(content) => Json(TurnReply::ai(content)).into_response(),
        Err(err) => single_error(err),
    }
}

/// POST /api/group-chat
pub async fn group_turn(
    State(app): State<Arc<App>>,
    Json(req): Json<GroupTurnRequest>,
) -> Response {
    let Some(raw_context) = req.context else {
        return group_error(GatewayError::Validation("context"));
    };
    let Ok(context) = serde_json::from_value::<GroupContext>(raw_context) else {
        return group_error(GatewayError::Validation("context"));
    };
    let Some(user_message) = req.user_message else {
        return group_error(GatewayError::Validation("userMessage"));
    };

    match app.group_chat.submit_turn(context, user_message).await {
        Ok(output) => Json(TurnReply::group_ai(
            output.reply.speaker_id.clone(),
            output.reply.content.clone(),
        ))
        .into_response(),
        Err(err) => group_error(err),
    }
}

/// POST /api/group-context
pub async fn group_context(
    State(app): State<Arc<App>>,
    Json(req): Json<GroupContextRequest>,
) -> Result<Json<GroupContext>, (StatusCode, String)> {
    let map = req
        .map
        .ok_or((StatusCode::BAD_REQUEST, "missing or invalid field: map".to_string()))?;
    let location = req.location.ok_or((
        StatusCode::BAD_REQUEST,
        "missing or invalid field: location".to_string(),
    ))?;
    let history = match req.history {
        Some(wire) => to_history(wire)
            .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?,
        None => Vec::new(),
    };

    match app.group_chat.resolve_context(&map, &location, history) {
        Ok(Some(context)) => Ok(Json(context)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            format!("group chat not available at {map}/{location}"),
        )),
        Err(err @ GroupContextError::AmbiguousLocation { .. }) => {
            Err((StatusCode::CONFLICT, err.to_string()))
        }
    }
}
