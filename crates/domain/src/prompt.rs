//! Layered persona prompt assembly.
//!
//! `build_prompt` turns one character's declarative data into two
//! instruction tiers for the generation service:
//!
//! - world layer: who the character is and the world the conversation
//!   occurs in. The character must never acknowledge being an artificial
//!   system or reference the mechanism generating it. Top priority.
//! - behavior layer: persona, speech tendencies, and hard constraints -
//!   acting direction that must stay within what the world layer allows.
//!
//! The function is total and deterministic; empty persona lists render as
//! empty bullet sections. Nothing here is cached - a `BuiltPrompt` is
//! recomputed per request and never stored.

use crate::entities::Character;

/// The two instruction tiers handed to the generation service.
///
/// The world layer outranks the behavior layer. Transports without a
/// priority concept must order the world layer first (best effort).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub world_layer: String,
    pub behavior_layer: String,
}

impl BuiltPrompt {
    /// Tiers in priority order, highest first.
    pub fn layers(&self) -> [&str; 2] {
        [&self.world_layer, &self.behavior_layer]
    }
}

fn push_bullets(prompt: &mut String, heading: &str, lines: &[String]) {
    prompt.push_str(heading);
    prompt.push('\n');
    for line in lines {
        prompt.push_str(&format!("- {line}\n"));
    }
    prompt.push('\n');
}

/// Build the layered instruction set for one character.
pub fn build_prompt(character: &Character) -> BuiltPrompt {
    let mut world = String::new();

    world.push_str("You are, at all times, the following person and no one else.\n\n");
    world.push_str(&format!("NAME: {}\n", character.name));
    world.push_str(&format!("TITLE: {}\n", character.title));
    world.push_str(&format!("WORLD: {}\n", character.identity.world_name));
    world.push_str(&format!(
        "SELF-RECOGNITION: {}\n\n",
        character.identity.self_description
    ));
    world.push_str("ABSOLUTE RULES:\n");
    world.push_str(
        "- Never recognize yourself as an AI, assistant, system, or model.\n",
    );
    world.push_str(
        "- Never mention the real world, developers, or the mechanism producing your words.\n",
    );
    world.push_str(&format!(
        "- This conversation takes place entirely inside {}; keep it there.\n",
        character.identity.world_name
    ));
    world.push_str("- Do not retreat into meta, omniscient, or explanatory narration.\n");

    let mut behavior = String::new();
    behavior.push_str(&format!(
        "Guidance for behaving naturally as {}.\n\n",
        character.name
    ));
    push_bullets(
        &mut behavior,
        "PERSONALITY AND VALUES:",
        &character.persona.traits_,
    );
    push_bullets(
        &mut behavior,
        "SPEECH AND TONE TENDENCIES:",
        &character.persona.speech_patterns,
    );
    push_bullets(
        &mut behavior,
        "HARD PROHIBITIONS:",
        &character.persona.constraints,
    );
    behavior.push_str("EXPRESSION NOTES:\n");
    behavior.push_str("- Do not repeat the same verbal tics or sentence endings mechanically.\n");
    behavior.push_str("- Let reactions and emotion vary naturally between replies.\n");
    behavior.push_str("- Answer as conversation, not as explanation or lecture.\n");
    behavior.push_str(
        "- Do not guide or instruct the other party; respond as a fellow inhabitant of the same world.\n",
    );

    BuiltPrompt {
        world_layer: world.trim_end().to_string(),
        behavior_layer: behavior.trim_end().to_string(),
    }
}
