//! Domain error types.
//!
//! Registry lookups never fail - absence is an `Option`, and callers treat
//! it as "not placeable / not chattable". Errors here are reserved for
//! load-time schema violations and explicit policy violations.

use thiserror::Error;

/// Raised while constructing a registry from loaded data.
///
/// Any of these rejects the whole registry: data problems fail fast at
/// startup instead of surfacing per-request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two characters share an id.
    #[error("duplicate character id: {0}")]
    DuplicateCharacter(String),

    /// Two groups share an id.
    #[error("duplicate group id: {0}")]
    DuplicateGroup(String),

    /// A group's `kind` tag is not `"group"`.
    #[error("group {id} has invalid kind {kind:?} (expected \"group\")")]
    InvalidGroupKind { id: String, kind: String },
}

/// Raised by group-context resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupContextError {
    /// More than one group is registered at a location while the
    /// `ErrorOnAmbiguous` selection policy is active.
    #[error("multiple groups registered at {map}/{location}")]
    AmbiguousLocation { map: String, location: String },
}
