//! Registry loading.
//!
//! The registries are plain JSON files validated once, in full, at
//! startup. A schema violation aborts the boot - nothing is re-checked
//! per request. Dangling group participants are legal data (they are
//! excluded at realization time) but each one is logged so authoring
//! mistakes surface early.

use std::path::Path;

use anyhow::Context;

use talemap_domain::{Character, CharacterRegistry, GroupDef, GroupRegistry};

/// Load and validate both registries from `characters.json` and
/// `groups.json` in the data directory.
pub fn load_registries(
    data_dir: &Path,
) -> anyhow::Result<(CharacterRegistry, GroupRegistry)> {
    let characters_path = data_dir.join("characters.json");
    let characters_json = std::fs::read_to_string(&characters_path)
        .with_context(|| format!("reading {}", characters_path.display()))?;
    let characters = parse_characters(&characters_json)
        .with_context(|| format!("loading {}", characters_path.display()))?;

    let groups_path = data_dir.join("groups.json");
    let groups_json = std::fs::read_to_string(&groups_path)
        .with_context(|| format!("reading {}", groups_path.display()))?;
    let groups = parse_groups(&groups_json)
        .with_context(|| format!("loading {}", groups_path.display()))?;

    for group in groups.list() {
        for dangling in groups.dangling_participants(&group.id, &characters) {
            tracing::warn!(
                group_id = %group.id,
                participant = %dangling,
                "group references a character that does not exist; it will be excluded"
            );
        }
        if !groups.is_enabled(&group.id, &characters) {
            tracing::info!(
                group_id = %group.id,
                "group has fewer than two realized participants and is disabled"
            );
        }
    }

    tracing::info!(
        characters = characters.len(),
        groups = groups.list().count(),
        "registries loaded"
    );

    Ok((characters, groups))
}

fn parse_characters(json: &str) -> anyhow::Result<CharacterRegistry> {
    let characters: Vec<Character> =
        serde_json::from_str(json).context("characters.json schema")?;
    CharacterRegistry::from_characters(characters).context("character registry validation")
}

fn parse_groups(json: &str) -> anyhow::Result<GroupRegistry> {
    let groups: Vec<GroupDef> = serde_json::from_str(json).context("groups.json schema")?;
    GroupRegistry::from_groups(groups).context("group registry validation")
}
