//! Group chat turns.
//!
//! Orchestrates the group-context engine against the speaker-selection
//! collaborator. Policy: at most one AI utterance per user turn, and
//! never zero - a turn the collaborator declines gets the neutral
//! fallback reply attributed to the `system` sentinel.

use std::sync::Arc;

use talemap_domain::{
    CharacterId, CharacterRegistry, ChatMessage, GroupContext, GroupContextError, GroupRegistry,
    SelectionPolicy,
};

use crate::error::GatewayError;
use crate::infrastructure::ports::{RandomPort, SpeakerPort, SpeakerRequest};

/// Fixed group-flavored reply for upstream failure. Attributed to the
/// `system` sentinel speaker by the HTTP layer.
pub const GROUP_FALLBACK_REPLY: &str =
    "...The air of the gathering is unsettled. Wait a moment and try again.";

/// Session marker forwarded to the speaker-selection service. Chat state
/// is client-held, so there is nothing session-specific to send yet.
const SESSION_ID: &str = "ui-group-session";

/// Result of one group turn.
#[derive(Debug)]
pub struct GroupTurnOutput {
    pub context: GroupContext,
    /// The single AI utterance appended this turn.
    pub reply: ChatMessage,
    /// True when the collaborator declined and the neutral fallback was
    /// used instead. Still a successful (200) turn.
    pub no_response: bool,
}

pub struct GroupChat {
    characters: Arc<CharacterRegistry>,
    groups: Arc<GroupRegistry>,
    speaker: Arc<dyn SpeakerPort>,
    random: Arc<dyn RandomPort>,
    policy: SelectionPolicy,
}

impl GroupChat {
    pub fn new(
        characters: Arc<CharacterRegistry>,
        groups: Arc<GroupRegistry>,
        speaker: Arc<dyn SpeakerPort>,
        random: Arc<dyn RandomPort>,
        policy: SelectionPolicy,
    ) -> Self {
        Self {
            characters,
            groups,
            speaker,
            random,
            policy,
        }
    }

    /// Resolve and initialize the group context for a location.
    ///
    /// `history` restores a transcript the client already holds;
    /// initialization then sets a speaker without re-seeding. Returns
    /// `Ok(None)` when group chat is unavailable at the location.
    pub fn resolve_context(
        &self,
        map: &str,
        location: &str,
        history: Vec<ChatMessage>,
    ) -> Result<Option<GroupContext>, GroupContextError> {
        let resolved =
            GroupContext::resolve(map, location, &self.characters, &self.groups, self.policy)?;
        Ok(resolved.map(|mut ctx| {
            ctx.history = history;
            ctx.initialize(|len| self.random.pick_index(len));
            ctx
        }))
    }

    /// Run one group turn: append the user message, obtain exactly one
    /// utterance from the collaborator, and append it.
    pub async fn submit_turn(
        &self,
        mut context: GroupContext,
        user_text: String,
    ) -> Result<GroupTurnOutput, GatewayError> {
        if !context.enabled {
            return Err(GatewayError::Validation("context"));
        }

        // Re-validate the client-held roster against the registry; ids
        // that no longer resolve are dropped, and an empty result is a
        // caller error, not an upstream one.
        let participants: Vec<CharacterId> = context
            .participant_ids()
            .into_iter()
            .filter(|id| self.characters.get(id).is_some())
            .collect();
        if participants.is_empty() {
            return Err(GatewayError::Validation("participants"));
        }

        context.initialize(|len| self.random.pick_index(len));
        let history = context.history.clone();
        context.push_user(user_text.clone());

        let request = SpeakerRequest {
            session_id: SESSION_ID.to_string(),
            group_id: context.group_id.clone(),
            participants,
            history,
            user_text,
        };

        let utterance = self.speaker.next_utterance(request).await.map_err(|e| {
            tracing::error!(group_id = %context.group_id, error = %e, "group turn failed");
            GatewayError::Upstream(e.to_string())
        })?;

        let (reply, no_response) = match utterance {
            Some(u) => (context.push_reply(u.speaker_id, u.content).clone(), false),
            None => (context.fallback_reply().clone(), true),
        };

        Ok(GroupTurnOutput {
            context,
            reply,
            no_response,
        })
    }
}
