//! Group definition - a conversational "place", not a character.
//!
//! Groups carry no persona of their own. They only declare who may
//! participate and where the group exists; speaker decisions live in the
//! group-context engine.

use serde::{Deserialize, Serialize};

use crate::entities::WorldPlacement;
use crate::ids::{CharacterId, GroupId};

/// Tag value every group definition must carry.
pub const GROUP_KIND: &str = "group";

fn default_kind() -> String {
    GROUP_KIND.to_string()
}

/// A group of characters tied to one map location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDef {
    pub id: GroupId,
    /// Data-validation tag; must be `"group"`. Not used for dispatch.
    #[serde(default = "default_kind")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub world: WorldPlacement,
    /// Declared participant ids, in authored order. May reference
    /// characters that do not exist; realization filters those out.
    pub participants: Vec<CharacterId>,
    /// Display label for the conversation header.
    pub label: String,
    /// Optional accent style hint for the UI.
    #[serde(default)]
    pub accent: Option<String>,
}

impl GroupDef {
    /// Whether this group lives at the given map location.
    pub fn is_at(&self, map: &str, location: &str) -> bool {
        self.world.is_at(map, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_deserializes_with_defaulted_kind() {
        let json = r#"{
            "id": "group_hakurei_shrine",
            "name": "Shrine Gathering",
            "world": { "map": "gensokyo", "location": "hakurei_shrine" },
            "participants": ["reimu", "marisa"],
            "label": "Hakurei Shrine"
        }"#;
        let group: GroupDef = serde_json::from_str(json).expect("group json");
        assert_eq!(group.kind, GROUP_KIND);
        assert_eq!(group.participants.len(), 2);
        assert!(group.is_at("gensokyo", "hakurei_shrine"));
    }
}
