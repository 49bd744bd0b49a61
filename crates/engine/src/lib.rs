//! Talemap Engine - the HTTP chat-turn gateway.
//!
//! Thin server over `talemap-domain`: it loads the registries once at
//! startup, owns the clients for the external generation and
//! speaker-selection collaborators, and exposes one chat turn per
//! request. All chat state travels with the client; nothing is persisted
//! between requests.

pub mod api;
pub mod app;
pub mod error;
pub mod infrastructure;
pub mod use_cases;
