//! Gateway error taxonomy.
//!
//! The HTTP layer is the single place where absence and upstream failure
//! become status codes. Registry lookups below this layer return
//! `Option`; collaborator failures arrive as port errors and leave as a
//! renderable fallback reply plus a 500.

use thiserror::Error;

/// Errors a chat-turn use case can surface to the HTTP layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or missing request field. Maps to 400; the message
    /// names the offending field.
    #[error("missing or invalid field: {0}")]
    Validation(&'static str),

    /// Unknown character or group id. Maps to 404.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The external collaborator was unavailable, errored, or returned
    /// nothing usable. Never surfaced raw - the HTTP layer converts it
    /// to a fixed fallback utterance with status 500.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl GatewayError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_id() {
        let err = GatewayError::not_found("character", "reimu");
        assert_eq!(err.to_string(), "character not found: reimu");
    }

    #[test]
    fn validation_names_the_field() {
        assert_eq!(
            GatewayError::Validation("characterId").to_string(),
            "missing or invalid field: characterId"
        );
    }
}
