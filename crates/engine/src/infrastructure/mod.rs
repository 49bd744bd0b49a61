//! Infrastructure: ports and adapters for everything outside the process.

pub mod data;
pub mod local_speaker;
pub mod openai_chat;
pub mod persona_core;
pub mod ports;
pub mod random;
pub mod settings;
