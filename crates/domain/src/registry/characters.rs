//! Character registry.

use std::collections::HashMap;

use crate::entities::Character;
use crate::error::RegistryError;
use crate::ids::CharacterId;

/// All known characters, loaded once at startup.
///
/// Iteration preserves source order (stable, not semantically meaningful).
#[derive(Debug, Clone)]
pub struct CharacterRegistry {
    characters: Vec<Character>,
    by_id: HashMap<CharacterId, usize>,
}

impl CharacterRegistry {
    /// Build a registry, rejecting the whole load on duplicate ids.
    pub fn from_characters(characters: Vec<Character>) -> Result<Self, RegistryError> {
        let mut by_id = HashMap::with_capacity(characters.len());
        for (index, character) in characters.iter().enumerate() {
            if by_id.insert(character.id.clone(), index).is_some() {
                return Err(RegistryError::DuplicateCharacter(character.id.to_string()));
            }
        }
        Ok(Self { characters, by_id })
    }

    /// Look up a character by exact id. Absence is not an error.
    pub fn get(&self, id: &CharacterId) -> Option<&Character> {
        self.by_id.get(id).map(|&index| &self.characters[index])
    }

    /// All characters in source order.
    pub fn list(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    /// Characters currently placed at a map location, in registry order.
    pub fn by_location<'a>(
        &'a self,
        map: &'a str,
        location: &'a str,
    ) -> impl Iterator<Item = &'a Character> {
        self.characters.iter().filter(move |ch| ch.is_at(map, location))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Identity, WorldPlacement};

    fn character(id: &str, placement: Option<(&str, &str)>) -> Character {
        let mut ch = Character::new(
            id,
            id.to_string(),
            "Somebody",
            Identity {
                world_name: "Gensokyo".to_string(),
                self_description: format!("{id} of Gensokyo"),
            },
        );
        if let Some((map, location)) = placement {
            ch = ch.with_world(WorldPlacement::new(map, location));
        }
        ch
    }

    #[test]
    fn get_returns_none_for_unknown_id() {
        let registry = CharacterRegistry::from_characters(vec![character("reimu", None)])
            .expect("registry");
        assert!(registry.get(&CharacterId::new("nonexistent")).is_none());
        assert!(registry.get(&CharacterId::new("reimu")).is_some());
    }

    #[test]
    fn duplicate_ids_reject_the_whole_load() {
        let err = CharacterRegistry::from_characters(vec![
            character("reimu", None),
            character("reimu", None),
        ])
        .expect_err("duplicate must fail");
        assert_eq!(err, RegistryError::DuplicateCharacter("reimu".to_string()));
    }

    #[test]
    fn by_location_filters_and_preserves_order() {
        let registry = CharacterRegistry::from_characters(vec![
            character("reimu", Some(("gensokyo", "hakurei_shrine"))),
            character("sakuya", Some(("gensokyo", "scarlet_mansion"))),
            character("marisa", Some(("gensokyo", "hakurei_shrine"))),
            character("unplaced", None),
        ])
        .expect("registry");

        let at_shrine: Vec<_> = registry
            .by_location("gensokyo", "hakurei_shrine")
            .map(|ch| ch.id.as_str())
            .collect();
        assert_eq!(at_shrine, vec!["reimu", "marisa"]);
    }

    #[test]
    fn unplaced_characters_match_no_location() {
        let registry = CharacterRegistry::from_characters(vec![character("koakuma", None)])
            .expect("registry");
        assert_eq!(registry.by_location("gensokyo", "scarlet_mansion").count(), 0);
    }
}
