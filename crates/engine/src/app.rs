//! Application state: registries plus the wired use cases.
//!
//! Everything here is constructed once at startup and shared behind an
//! `Arc`. The collaborator clients arrive as port trait objects so the
//! composition root (and the tests) decide the concrete adapters.

use std::sync::Arc;

use talemap_domain::{CharacterRegistry, GroupRegistry, SelectionPolicy};

use crate::infrastructure::ports::{LlmPort, RandomPort, SpeakerPort};
use crate::use_cases::{ChatTurn, GroupChat};

pub struct App {
    pub characters: Arc<CharacterRegistry>,
    pub groups: Arc<GroupRegistry>,
    pub chat: ChatTurn,
    pub group_chat: GroupChat,
}

impl App {
    pub fn new(
        characters: Arc<CharacterRegistry>,
        groups: Arc<GroupRegistry>,
        llm: Arc<dyn LlmPort>,
        speaker: Arc<dyn SpeakerPort>,
        random: Arc<dyn RandomPort>,
        policy: SelectionPolicy,
    ) -> Self {
        let chat = ChatTurn::new(Arc::clone(&characters), llm);
        let group_chat = GroupChat::new(
            Arc::clone(&characters),
            Arc::clone(&groups),
            speaker,
            random,
            policy,
        );
        Self {
            characters,
            groups,
            chat,
            group_chat,
        }
    }
}
