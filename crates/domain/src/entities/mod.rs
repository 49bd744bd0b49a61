//! Domain entities.

pub mod character;
pub mod group;
pub mod message;

pub use character::{Character, Identity, Persona, WorldPlacement};
pub use group::GroupDef;
pub use message::{ChatMessage, MessageRole};
