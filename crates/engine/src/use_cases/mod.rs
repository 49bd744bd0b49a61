//! Use cases: one chat turn per call, single or group mode.

pub mod chat;
pub mod group_chat;

pub use chat::{ChatTurn, SINGLE_FALLBACK_REPLY};
pub use group_chat::{GroupChat, GroupTurnOutput, GROUP_FALLBACK_REPLY};
