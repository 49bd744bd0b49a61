//! Engine configuration.
//!
//! Environment-backed, collected once at startup. Every knob has a
//! default so a bare `talemap-engine` starts against local services.

use std::path::PathBuf;
use std::time::Duration;

/// Which implementation of the speaker-selection port to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupAuthority {
    /// The external persona-core service decides every per-turn speaker.
    /// This is the authoritative mode.
    #[default]
    Remote,
    /// Offline mode: the engine picks a random speaker locally and
    /// generates through the LLM port. Selected only by explicit
    /// configuration, never as a silent failover.
    Local,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_host: String,
    pub server_port: u16,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub persona_core_group_url: String,
    pub group_authority: GroupAuthority,
    pub data_dir: PathBuf,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub llm_timeout: Duration,
}

/// Default sampling temperature: tuned for character acting variability.
pub const DEFAULT_TEMPERATURE: f32 = 0.85;

/// Default completion bound, guarding against runaway generation.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Default upstream timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Settings {
    /// Read settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let group_authority = match env_or("GROUP_AUTHORITY", "remote").to_lowercase().as_str() {
            "local" => GroupAuthority::Local,
            _ => GroupAuthority::Remote,
        };

        Self {
            server_host: env_or("SERVER_HOST", "0.0.0.0"),
            server_port: env_or("SERVER_PORT", "3000").parse().unwrap_or(3000),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com"),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_model: env_or("OPENAI_MODEL", "gpt-5.2"),
            persona_core_group_url: env_or(
                "PERSONA_CORE_GROUP_URL",
                "https://touhou-talk-core.fly.dev/group-chat",
            ),
            group_authority,
            data_dir: PathBuf::from(env_or("TALEMAP_DATA_DIR", "data")),
            llm_temperature: env_or("LLM_TEMPERATURE", "")
                .parse()
                .unwrap_or(DEFAULT_TEMPERATURE),
            llm_max_tokens: env_or("LLM_MAX_TOKENS", "")
                .parse()
                .unwrap_or(DEFAULT_MAX_TOKENS),
            llm_timeout: Duration::from_secs(
                env_or("LLM_TIMEOUT_SECS", "")
                    .parse()
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}
