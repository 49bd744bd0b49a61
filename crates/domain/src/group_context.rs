//! Group conversation context engine.
//!
//! A `GroupContext` is the live state of one location-scoped group
//! session: realized participants, transcript, and the current speaker.
//! It moves through three informal states:
//!
//! - unresolved: no group at the location, or the group is disabled
//!   (`resolve` returns `None`);
//! - ready: resolved, `current_speaker` not yet set, history possibly
//!   empty;
//! - active: speaker set and history seeded.
//!
//! There is no close transition - the caller simply drops the context
//! when leaving group mode. Nothing is persisted.
//!
//! Speaker policy: the initial speaker is picked uniformly at random over
//! realized participants via an injected picker closure (this crate owns
//! no RNG). Per-turn speakers are chosen by the external collaborator
//! the engine crate talks to; this type only records the outcome.

use serde::{Deserialize, Serialize};

use crate::entities::{Character, ChatMessage};
use crate::error::GroupContextError;
use crate::ids::{CharacterId, GroupId};
use crate::registry::{CharacterRegistry, GroupRegistry};

/// Sentinel speaker id for messages no participant produced (fallbacks).
pub const SYSTEM_SPEAKER_ID: &str = "system";

/// Flavor text seeding a freshly initialized group session.
pub const SEED_MESSAGE: &str = "...The air of the gathering quietly begins to stir.";

/// Neutral reply used when no participant responds to a turn.
pub const NO_RESPONSE_MESSAGE: &str = "...No one responded.";

/// How to choose among multiple groups registered at one location.
///
/// The data model permits several groups per location but the engine
/// holds one conversation at a time, so the pick must be a stated policy
/// rather than a silent index-0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// First group in registry order wins.
    #[default]
    First,
    /// Refuse to resolve when the location is ambiguous.
    ErrorOnAmbiguous,
}

/// Live conversational state for one group session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupContext {
    /// Always true for a resolved context; carried so a serialized
    /// context can be checked by the gateway without re-resolving.
    pub enabled: bool,
    /// Display label for the conversation header.
    pub label: String,
    pub group_id: GroupId,
    /// Realized participants in declared order.
    pub participants: Vec<Character>,
    /// The transcript, in insertion order.
    pub history: Vec<ChatMessage>,
    /// Current speaker; `None` until the first turn is initialized.
    #[serde(default)]
    pub current_speaker_id: Option<CharacterId>,
}

impl GroupContext {
    /// Resolve the group context for a map location.
    ///
    /// Returns `Ok(None)` when no group exists there or the group is
    /// disabled (fewer than two realized participants) - the caller must
    /// treat that as "group chat unavailable here".
    pub fn resolve(
        map: &str,
        location: &str,
        characters: &CharacterRegistry,
        groups: &GroupRegistry,
        policy: SelectionPolicy,
    ) -> Result<Option<GroupContext>, GroupContextError> {
        let mut at_location = groups.by_location(map, location);
        let Some(group) = at_location.next() else {
            return Ok(None);
        };
        if policy == SelectionPolicy::ErrorOnAmbiguous && at_location.next().is_some() {
            return Err(GroupContextError::AmbiguousLocation {
                map: map.to_string(),
                location: location.to_string(),
            });
        }

        if !groups.is_enabled(&group.id, characters) {
            return Ok(None);
        }

        let participants = groups
            .realized_participants(&group.id, characters)
            .into_iter()
            .cloned()
            .collect();

        Ok(Some(GroupContext {
            enabled: true,
            label: group.label.clone(),
            group_id: group.id.clone(),
            participants,
            history: Vec::new(),
            current_speaker_id: None,
        }))
    }

    /// Whether the first turn has been initialized.
    pub fn is_active(&self) -> bool {
        self.current_speaker_id.is_some()
    }

    pub fn participant_ids(&self) -> Vec<CharacterId> {
        self.participants.iter().map(|ch| ch.id.clone()).collect()
    }

    /// Initialize the session: pick the first speaker and seed the
    /// transcript.
    ///
    /// Idempotent by design - a context with a speaker already set is
    /// returned untouched, so repeated calls never re-randomize. The
    /// picker receives the participant count and must return an index
    /// below it (out-of-range picks are clamped). The seed message is
    /// appended only when the history is empty, so a context restored
    /// from an existing transcript gains a speaker but no duplicate
    /// seed.
    pub fn initialize(&mut self, pick: impl FnOnce(usize) -> usize) {
        if self.current_speaker_id.is_some() {
            return;
        }
        if self.participants.is_empty() {
            return;
        }

        let index = pick(self.participants.len()).min(self.participants.len() - 1);
        let speaker_id = self.participants[index].id.clone();

        if self.history.is_empty() {
            self.history
                .push(ChatMessage::group_ai(speaker_id.clone(), SEED_MESSAGE));
        }
        self.current_speaker_id = Some(speaker_id);
    }

    /// Append the user's utterance for this turn.
    pub fn push_user(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.history.push(ChatMessage::user(text));
        // Just pushed, so the vec is non-empty.
        &self.history[self.history.len() - 1]
    }

    /// Append the single AI utterance for this turn and advance the
    /// current speaker.
    pub fn push_reply(
        &mut self,
        speaker_id: CharacterId,
        content: impl Into<String>,
    ) -> &ChatMessage {
        self.current_speaker_id = Some(speaker_id.clone());
        self.history.push(ChatMessage::group_ai(speaker_id, content));
        &self.history[self.history.len() - 1]
    }

    /// Append the neutral fallback utterance for a turn nobody answered.
    ///
    /// Attributed to the [`SYSTEM_SPEAKER_ID`] sentinel and does not
    /// advance `current_speaker_id`. Guarantees every turn ends with a
    /// renderable AI message.
    pub fn fallback_reply(&mut self) -> &ChatMessage {
        self.history.push(ChatMessage::group_ai(
            CharacterId::new(SYSTEM_SPEAKER_ID),
            NO_RESPONSE_MESSAGE,
        ));
        &self.history[self.history.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{group::GROUP_KIND, GroupDef, Identity, MessageRole, WorldPlacement};

    fn character(id: &str, map: &str, location: &str) -> Character {
        Character::new(
            id,
            id.to_string(),
            "Somebody",
            Identity {
                world_name: "Gensokyo".to_string(),
                self_description: format!("{id} of Gensokyo"),
            },
        )
        .with_world(WorldPlacement::new(map, location))
    }

    fn group(id: &str, location: &str, participants: &[&str]) -> GroupDef {
        GroupDef {
            id: GroupId::new(id),
            kind: GROUP_KIND.to_string(),
            name: id.to_string(),
            title: None,
            world: WorldPlacement::new("gensokyo", location),
            participants: participants.iter().map(|&p| CharacterId::new(p)).collect(),
            label: location.to_string(),
            accent: None,
        }
    }

    fn registries(
        character_ids: &[&str],
        groups: Vec<GroupDef>,
    ) -> (CharacterRegistry, GroupRegistry) {
        let characters = CharacterRegistry::from_characters(
            character_ids
                .iter()
                .map(|&id| character(id, "gensokyo", "hakurei_shrine"))
                .collect(),
        )
        .expect("character registry");
        let groups = GroupRegistry::from_groups(groups).expect("group registry");
        (characters, groups)
    }

    fn shrine_context() -> GroupContext {
        let (characters, groups) = registries(
            &["reimu", "marisa"],
            vec![group("g_shrine", "hakurei_shrine", &["reimu", "marisa"])],
        );
        GroupContext::resolve(
            "gensokyo",
            "hakurei_shrine",
            &characters,
            &groups,
            SelectionPolicy::First,
        )
        .expect("resolve")
        .expect("enabled context")
    }

    #[test]
    fn resolve_returns_enabled_context_for_two_participant_group() {
        let ctx = shrine_context();
        assert!(ctx.enabled);
        assert!(ctx.history.is_empty());
        assert!(ctx.current_speaker_id.is_none());
        assert_eq!(ctx.participants.len(), 2);
    }

    #[test]
    fn resolve_returns_none_when_no_group_at_location() {
        let (characters, groups) = registries(&["reimu", "marisa"], vec![]);
        let resolved = GroupContext::resolve(
            "gensokyo",
            "hakurei_shrine",
            &characters,
            &groups,
            SelectionPolicy::First,
        )
        .expect("resolve");
        assert!(resolved.is_none());
    }

    #[test]
    fn resolve_returns_none_for_disabled_group() {
        // Two declared, one dangling: realized count 1, disabled.
        let (characters, groups) = registries(
            &["reimu"],
            vec![group("g_shrine", "hakurei_shrine", &["reimu", "phantom"])],
        );
        let resolved = GroupContext::resolve(
            "gensokyo",
            "hakurei_shrine",
            &characters,
            &groups,
            SelectionPolicy::First,
        )
        .expect("resolve");
        assert!(resolved.is_none());
    }

    #[test]
    fn resolve_first_policy_takes_registry_order() {
        let (characters, groups) = registries(
            &["reimu", "marisa"],
            vec![
                group("g_first", "hakurei_shrine", &["reimu", "marisa"]),
                group("g_second", "hakurei_shrine", &["marisa", "reimu"]),
            ],
        );
        let ctx = GroupContext::resolve(
            "gensokyo",
            "hakurei_shrine",
            &characters,
            &groups,
            SelectionPolicy::First,
        )
        .expect("resolve")
        .expect("context");
        assert_eq!(ctx.group_id, GroupId::new("g_first"));
    }

    #[test]
    fn resolve_errors_on_ambiguous_location_when_asked_to() {
        let (characters, groups) = registries(
            &["reimu", "marisa"],
            vec![
                group("g_first", "hakurei_shrine", &["reimu", "marisa"]),
                group("g_second", "hakurei_shrine", &["marisa", "reimu"]),
            ],
        );
        let err = GroupContext::resolve(
            "gensokyo",
            "hakurei_shrine",
            &characters,
            &groups,
            SelectionPolicy::ErrorOnAmbiguous,
        )
        .expect_err("must be ambiguous");
        assert!(matches!(err, GroupContextError::AmbiguousLocation { .. }));
    }

    #[test]
    fn initialize_sets_speaker_and_seeds_empty_history() {
        let mut ctx = shrine_context();
        ctx.initialize(|_| 0);

        assert!(ctx.is_active());
        assert_eq!(ctx.current_speaker_id, Some(CharacterId::new("reimu")));
        assert_eq!(ctx.history.len(), 1);
        assert_eq!(ctx.history[0].role, MessageRole::Ai);
        assert_eq!(ctx.history[0].speaker_id, Some(CharacterId::new("reimu")));
        assert_eq!(ctx.history[0].content, SEED_MESSAGE);
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut ctx = shrine_context();
        ctx.initialize(|_| 1);
        let speaker = ctx.current_speaker_id.clone();

        // Second call with a picker that would choose differently.
        ctx.initialize(|_| 0);
        assert_eq!(ctx.current_speaker_id, speaker);
        assert_eq!(ctx.history.len(), 1, "seed message must not duplicate");
    }

    #[test]
    fn initialize_does_not_seed_over_existing_history() {
        let mut ctx = shrine_context();
        ctx.push_user("anyone here?");
        ctx.initialize(|_| 0);

        assert!(ctx.is_active());
        assert_eq!(ctx.history.len(), 1);
        assert_eq!(ctx.history[0].role, MessageRole::User);
    }

    #[test]
    fn initialize_never_picks_outside_the_realized_set() {
        let mut ctx = shrine_context();
        // A picker misbehaving with an out-of-range index gets clamped.
        ctx.initialize(|_| 99);
        let speaker = ctx.current_speaker_id.expect("speaker");
        assert!(ctx.participants.iter().any(|ch| ch.id == speaker));
    }

    #[test]
    fn random_initialization_reaches_both_participants() {
        use rand::Rng;

        let mut seen = std::collections::HashSet::new();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut ctx = shrine_context();
            ctx.initialize(|len| rng.gen_range(0..len));
            seen.insert(ctx.current_speaker_id.expect("speaker"));
        }
        // Sanity, not exact uniformity: both must show up with 200 draws.
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn turn_round_trip_preserves_position_content_and_speaker() {
        let mut ctx = shrine_context();
        ctx.initialize(|_| 0);
        ctx.push_user("hello you two");
        ctx.push_reply(CharacterId::new("marisa"), "yo!");

        assert_eq!(ctx.history.len(), 3);
        assert_eq!(ctx.history[1].content, "hello you two");
        assert!(ctx.history[1].speaker_id.is_none());
        assert_eq!(ctx.history[2].content, "yo!");
        assert_eq!(ctx.history[2].speaker_id, Some(CharacterId::new("marisa")));
        assert_eq!(ctx.current_speaker_id, Some(CharacterId::new("marisa")));
    }

    #[test]
    fn fallback_reply_is_renderable_and_keeps_the_speaker() {
        let mut ctx = shrine_context();
        ctx.initialize(|_| 0);
        let before = ctx.current_speaker_id.clone();
        ctx.push_user("...");
        let msg = ctx.fallback_reply();

        assert_eq!(msg.role, MessageRole::Ai);
        assert!(!msg.content.is_empty());
        assert_eq!(msg.speaker_id, Some(CharacterId::new(SYSTEM_SPEAKER_ID)));
        assert_eq!(ctx.current_speaker_id, before);
    }

    #[test]
    fn context_round_trips_through_serde() {
        let mut ctx = shrine_context();
        ctx.initialize(|_| 0);
        let json = serde_json::to_string(&ctx).expect("serialize");
        let back: GroupContext = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.group_id, ctx.group_id);
        assert_eq!(back.history.len(), ctx.history.len());
        assert_eq!(back.current_speaker_id, ctx.current_speaker_id);
    }
}
