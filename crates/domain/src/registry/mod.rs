//! Read-only registries for characters and groups.
//!
//! Both registries are built once from validated data and shared freely
//! afterwards - lookups return `Option`, never errors.

mod characters;
mod groups;

pub use characters::CharacterRegistry;
pub use groups::{GroupRegistry, MIN_GROUP_PARTICIPANTS};
