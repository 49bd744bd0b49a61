//! Character entity - a fictional persona the user can talk to.
//!
//! Characters are declarative data: identity (who they are inside their
//! world), persona (how they behave), and an optional world placement.
//! A character without a placement exists in the registry but cannot
//! appear at any map location, and therefore in any group.

use serde::{Deserialize, Serialize};

use crate::ids::CharacterId;

/// Where in the world a character (or group) lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldPlacement {
    /// Map layer, e.g. `gensokyo`, `deep`, `higan`.
    pub map: String,
    /// Location id within the layer, e.g. `hakurei_shrine`.
    pub location: String,
}

impl WorldPlacement {
    pub fn new(map: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            location: location.into(),
        }
    }

    /// Whether this placement matches a `(map, location)` pair.
    pub fn is_at(&self, map: &str, location: &str) -> bool {
        self.map == map && self.location == location
    }
}

/// Behavioral persona data rendered into the prompt's behavior layer.
///
/// Empty lists are valid - the prompt builder renders an empty bullet
/// section rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Personality, values, standing.
    #[serde(default, rename = "traits")]
    pub traits_: Vec<String>,
    /// Tendencies of speech and tone.
    #[serde(default)]
    pub speech_patterns: Vec<String>,
    /// Hard prohibitions.
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// World-level identity rendered into the prompt's world layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// The fictional world the conversation occurs in.
    pub world_name: String,
    /// How the character recognizes themselves.
    pub self_description: String,
}

/// A fictional character the user can chat with.
///
/// Immutable after registry load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub title: String,
    /// Absent means the character is not placeable on any map.
    #[serde(default)]
    pub world: Option<WorldPlacement>,
    pub persona: Persona,
    pub identity: Identity,
}

impl Character {
    pub fn new(
        id: impl Into<CharacterId>,
        name: impl Into<String>,
        title: impl Into<String>,
        identity: Identity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: title.into(),
            world: None,
            persona: Persona::default(),
            identity,
        }
    }

    pub fn with_world(mut self, placement: WorldPlacement) -> Self {
        self.world = Some(placement);
        self
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// Whether this character is present at the given map location.
    pub fn is_at(&self, map: &str, location: &str) -> bool {
        self.world
            .as_ref()
            .is_some_and(|w| w.is_at(map, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            world_name: "Gensokyo".to_string(),
            self_description: "Shrine maiden of the border".to_string(),
        }
    }

    #[test]
    fn character_without_world_is_nowhere() {
        let ch = Character::new("reimu", "Reimu Hakurei", "Shrine Maiden", identity());
        assert!(!ch.is_at("gensokyo", "hakurei_shrine"));
    }

    #[test]
    fn character_with_world_matches_its_placement_only() {
        let ch = Character::new("reimu", "Reimu Hakurei", "Shrine Maiden", identity())
            .with_world(WorldPlacement::new("gensokyo", "hakurei_shrine"));
        assert!(ch.is_at("gensokyo", "hakurei_shrine"));
        assert!(!ch.is_at("gensokyo", "scarlet_mansion"));
        assert!(!ch.is_at("deep", "hakurei_shrine"));
    }

    #[test]
    fn persona_deserializes_with_missing_lists() {
        let persona: Persona = serde_json::from_str("{}").expect("empty persona");
        assert!(persona.traits_.is_empty());
        assert!(persona.speech_patterns.is_empty());
        assert!(persona.constraints.is_empty());
    }

    #[test]
    fn character_deserializes_from_registry_json() {
        let json = r#"{
            "id": "marisa",
            "name": "Marisa Kirisame",
            "title": "Ordinary Magician",
            "world": { "map": "gensokyo", "location": "hakurei_shrine" },
            "persona": {
                "traits": ["curious", "competitive"],
                "speechPatterns": ["casual, energetic"],
                "constraints": ["never reveals where books came from"]
            },
            "identity": {
                "worldName": "Gensokyo",
                "selfDescription": "A human magician living in the forest"
            }
        }"#;
        let ch: Character = serde_json::from_str(json).expect("character json");
        assert_eq!(ch.id, CharacterId::new("marisa"));
        assert_eq!(ch.persona.traits_.len(), 2);
        assert!(ch.is_at("gensokyo", "hakurei_shrine"));
    }
}
