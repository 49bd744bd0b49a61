//! Local speaker-selection engine.
//!
//! Offline implementation of [`SpeakerPort`] for running without the
//! persona-core service: picks the next speaker uniformly at random from
//! the participants that resolve against the registry, then generates
//! the utterance through the LLM port using that character's layered
//! prompt plus a roster preamble. Selected only by explicit
//! configuration (`GROUP_AUTHORITY=local`).

use std::sync::Arc;

use async_trait::async_trait;

use talemap_domain::{build_prompt, Character, CharacterRegistry};

use crate::infrastructure::ports::{
    LlmPort, LlmRequest, RandomPort, SpeakerError, SpeakerPort, SpeakerRequest, TurnMessage,
    Utterance,
};

pub struct LocalSpeakerEngine {
    llm: Arc<dyn LlmPort>,
    random: Arc<dyn RandomPort>,
    characters: Arc<CharacterRegistry>,
}

impl LocalSpeakerEngine {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        random: Arc<dyn RandomPort>,
        characters: Arc<CharacterRegistry>,
    ) -> Self {
        Self {
            llm,
            random,
            characters,
        }
    }
}

/// Extra instruction tier describing the group scene to the speaker.
fn roster_preamble(speaker: &Character, roster: &[&Character]) -> String {
    let names: Vec<&str> = roster.iter().map(|ch| ch.name.as_str()).collect();
    format!(
        "This is a group conversation. Present: {}. \
         You speak only as {}; never write lines for anyone else. \
         Lines from other participants appear prefixed with their name.",
        names.join(", "),
        speaker.name
    )
}

#[async_trait]
impl SpeakerPort for LocalSpeakerEngine {
    async fn next_utterance(
        &self,
        request: SpeakerRequest,
    ) -> Result<Option<Utterance>, SpeakerError> {
        let roster: Vec<&Character> = request
            .participants
            .iter()
            .filter_map(|id| self.characters.get(id))
            .collect();
        if roster.is_empty() {
            return Ok(None);
        }

        let speaker = roster[self.random.pick_index(roster.len())];
        let prompt = build_prompt(speaker);

        // Other speakers' lines get a name prefix so the model can track
        // who said what in a single assistant stream.
        let messages: Vec<TurnMessage> = request
            .history
            .iter()
            .map(|msg| {
                let content = match &msg.speaker_id {
                    Some(id) if *id != speaker.id => {
                        let name = self
                            .characters
                            .get(id)
                            .map(|ch| ch.name.as_str())
                            .unwrap_or(id.as_str());
                        format!("{name}: {}", msg.content)
                    }
                    _ => msg.content.clone(),
                };
                TurnMessage {
                    role: msg.role,
                    content,
                }
            })
            .chain(std::iter::once(TurnMessage {
                role: talemap_domain::MessageRole::User,
                content: request.user_text.clone(),
            }))
            .collect();

        let instructions = vec![
            prompt.world_layer,
            prompt.behavior_layer,
            roster_preamble(speaker, &roster),
        ];

        let response = self
            .llm
            .generate(LlmRequest::new(instructions, messages))
            .await
            .map_err(|e| SpeakerError::RequestFailed(e.to_string()))?;

        Ok(Some(Utterance {
            speaker_id: speaker.id.clone(),
            content: response.content,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmResponse, MockLlmPort};
    use crate::infrastructure::random::FixedRandom;
    use talemap_domain::{CharacterId, ChatMessage, GroupId, Identity, WorldPlacement};

    fn character(id: &str, name: &str) -> Character {
        Character::new(
            id,
            name,
            "Somebody",
            Identity {
                world_name: "Gensokyo".to_string(),
                self_description: format!("{name} of Gensokyo"),
            },
        )
        .with_world(WorldPlacement::new("gensokyo", "hakurei_shrine"))
    }

    fn registry() -> Arc<CharacterRegistry> {
        Arc::new(
            CharacterRegistry::from_characters(vec![
                character("reimu", "Reimu Hakurei"),
                character("marisa", "Marisa Kirisame"),
            ])
            .expect("registry"),
        )
    }

    fn request(participants: &[&str]) -> SpeakerRequest {
        SpeakerRequest {
            session_id: "test".to_string(),
            group_id: GroupId::new("g_shrine"),
            participants: participants.iter().map(|&p| CharacterId::new(p)).collect(),
            history: vec![ChatMessage::group_ai(CharacterId::new("reimu"), "hm?")],
            user_text: "hello".to_string(),
        }
    }

    #[tokio::test]
    async fn picks_a_resolvable_speaker_and_generates() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(|req| {
            // World layer first, then behavior, then the roster preamble.
            assert_eq!(req.instructions.len(), 3);
            assert!(req.instructions[2].contains("Marisa Kirisame"));
            Ok(LlmResponse {
                content: "yo!".to_string(),
            })
        });

        let engine = LocalSpeakerEngine::new(
            Arc::new(llm),
            Arc::new(FixedRandom(1)),
            registry(),
        );
        let utterance = engine
            .next_utterance(request(&["reimu", "marisa"]))
            .await
            .expect("ok")
            .expect("some");

        assert_eq!(utterance.speaker_id, CharacterId::new("marisa"));
        assert_eq!(utterance.content, "yo!");
    }

    #[tokio::test]
    async fn dangling_participants_are_skipped() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(|_| {
            Ok(LlmResponse {
                content: "hm.".to_string(),
            })
        });

        let engine = LocalSpeakerEngine::new(
            Arc::new(llm),
            Arc::new(FixedRandom(99)),
            registry(),
        );
        // Only one of these resolves; the pick must land on it.
        let utterance = engine
            .next_utterance(request(&["phantom", "reimu"]))
            .await
            .expect("ok")
            .expect("some");
        assert_eq!(utterance.speaker_id, CharacterId::new("reimu"));
    }

    #[tokio::test]
    async fn empty_realized_roster_yields_none() {
        let engine = LocalSpeakerEngine::new(
            Arc::new(MockLlmPort::new()),
            Arc::new(FixedRandom(0)),
            registry(),
        );
        let utterance = engine
            .next_utterance(request(&["phantom", "wraith"]))
            .await
            .expect("ok");
        assert!(utterance.is_none());
    }

    #[tokio::test]
    async fn llm_failure_propagates_as_speaker_error() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(crate::infrastructure::ports::LlmError::RequestFailed("down".to_string())));

        let engine = LocalSpeakerEngine::new(
            Arc::new(llm),
            Arc::new(FixedRandom(0)),
            registry(),
        );
        let err = engine
            .next_utterance(request(&["reimu", "marisa"]))
            .await
            .expect_err("must fail");
        assert!(matches!(err, SpeakerError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn other_speakers_lines_get_name_prefixes() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(|req| {
            // Reimu's line, seen from Marisa's perspective.
            assert!(req.messages[0].content.starts_with("Reimu Hakurei: "));
            Ok(LlmResponse {
                content: "ok".to_string(),
            })
        });

        let engine = LocalSpeakerEngine::new(
            Arc::new(llm),
            Arc::new(FixedRandom(1)),
            registry(),
        );
        engine
            .next_utterance(request(&["reimu", "marisa"]))
            .await
            .expect("ok")
            .expect("some");
    }
}
