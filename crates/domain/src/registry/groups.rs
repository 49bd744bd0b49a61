//! Group registry.
//!
//! Groups declare participant ids; whether those ids resolve is a
//! property of the character registry, so every "realized" accessor
//! cross-references one. Dangling ids are tolerated and silently
//! excluded - a group is judged by who actually exists.

use std::collections::HashMap;

use crate::entities::{group::GROUP_KIND, Character, GroupDef};
use crate::error::RegistryError;
use crate::ids::{CharacterId, GroupId};
use crate::registry::CharacterRegistry;

/// A group needs at least this many resolvable participants to hold a
/// conversation.
pub const MIN_GROUP_PARTICIPANTS: usize = 2;

/// All known groups, loaded once at startup.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: Vec<GroupDef>,
    by_id: HashMap<GroupId, usize>,
}

impl GroupRegistry {
    /// Build a registry, rejecting the whole load on duplicate ids or a
    /// bad `kind` tag. Dangling participant ids are NOT rejected here;
    /// they are excluded at realization time.
    pub fn from_groups(groups: Vec<GroupDef>) -> Result<Self, RegistryError> {
        let mut by_id = HashMap::with_capacity(groups.len());
        for (index, group) in groups.iter().enumerate() {
            if group.kind != GROUP_KIND {
                return Err(RegistryError::InvalidGroupKind {
                    id: group.id.to_string(),
                    kind: group.kind.clone(),
                });
            }
            if by_id.insert(group.id.clone(), index).is_some() {
                return Err(RegistryError::DuplicateGroup(group.id.to_string()));
            }
        }
        Ok(Self { groups, by_id })
    }

    pub fn get(&self, id: &GroupId) -> Option<&GroupDef> {
        self.by_id.get(id).map(|&index| &self.groups[index])
    }

    /// All groups in source order.
    pub fn list(&self) -> impl Iterator<Item = &GroupDef> {
        self.groups.iter()
    }

    /// Groups registered at a map location, in registry order.
    pub fn by_location<'a>(
        &'a self,
        map: &'a str,
        location: &'a str,
    ) -> impl Iterator<Item = &'a GroupDef> {
        self.groups.iter().filter(move |g| g.is_at(map, location))
    }

    /// Declared participant ids in authored order, unfiltered. Callers
    /// that need declared-vs-realized distinction start here.
    pub fn participant_ids(&self, id: &GroupId) -> &[CharacterId] {
        self.get(id).map(|g| g.participants.as_slice()).unwrap_or(&[])
    }

    /// Declared participants filtered to characters that actually exist,
    /// in declared order.
    pub fn realized_participants<'a>(
        &'a self,
        id: &GroupId,
        characters: &'a CharacterRegistry,
    ) -> Vec<&'a Character> {
        self.participant_ids(id)
            .iter()
            .filter_map(|pid| characters.get(pid))
            .collect()
    }

    /// Declared participant ids that do not resolve against the character
    /// registry. Used for load-time diagnostics.
    pub fn dangling_participants(
        &self,
        id: &GroupId,
        characters: &CharacterRegistry,
    ) -> Vec<CharacterId> {
        self.participant_ids(id)
            .iter()
            .filter(|pid| characters.get(pid).is_none())
            .cloned()
            .collect()
    }

    /// A group is conversation-enabled iff its realized participant count
    /// meets [`MIN_GROUP_PARTICIPANTS`]. The declared count is irrelevant.
    pub fn is_enabled(&self, id: &GroupId, characters: &CharacterRegistry) -> bool {
        self.realized_participants(id, characters).len() >= MIN_GROUP_PARTICIPANTS
    }
}
