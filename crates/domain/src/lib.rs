//! Talemap domain layer.
//!
//! Everything a chat turn needs before any I/O happens: the character and
//! group registries, the layered persona prompt builder, and the
//! group-conversation context engine. This crate is deliberately free of
//! HTTP, clients, and ambient randomness - the engine crate injects all
//! of those at the edges.

pub mod entities;
pub mod error;
pub mod group_context;
pub mod ids;
pub mod prompt;
pub mod registry;

pub use entities::{
    Character, ChatMessage, GroupDef, Identity, MessageRole, Persona, WorldPlacement,
};
pub use error::{GroupContextError, RegistryError};
pub use group_context::{
    GroupContext, SelectionPolicy, NO_RESPONSE_MESSAGE, SEED_MESSAGE, SYSTEM_SPEAKER_ID,
};
pub use ids::{CharacterId, GroupId};
pub use prompt::{build_prompt, BuiltPrompt};
pub use registry::{CharacterRegistry, GroupRegistry, MIN_GROUP_PARTICIPANTS};
