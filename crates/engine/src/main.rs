//! Talemap Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use talemap_domain::SelectionPolicy;
use talemap_engine::api;
use talemap_engine::app::App;
use talemap_engine::infrastructure::{
    data::load_registries,
    local_speaker::LocalSpeakerEngine,
    openai_chat::OpenAiChatClient,
    persona_core::PersonaCoreClient,
    ports::{LlmPort, RandomPort, SpeakerPort},
    random::SystemRandom,
    settings::{GroupAuthority, Settings},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talemap_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Talemap Engine");

    let settings = Settings::from_env();

    // Registries are validated in full here; a schema problem is a boot
    // failure, not a per-request surprise.
    let (characters, groups) = load_registries(&settings.data_dir)?;
    let characters = Arc::new(characters);
    let groups = Arc::new(groups);

    let llm: Arc<dyn LlmPort> = Arc::new(OpenAiChatClient::from_settings(&settings));
    let random: Arc<dyn RandomPort> = Arc::new(SystemRandom);

    let speaker: Arc<dyn SpeakerPort> = match settings.group_authority {
        GroupAuthority::Remote => {
            tracing::info!(url = %settings.persona_core_group_url, "group speaker authority: remote");
            Arc::new(PersonaCoreClient::new(
                &settings.persona_core_group_url,
                settings.llm_timeout,
            ))
        }
        GroupAuthority::Local => {
            tracing::info!("group speaker authority: local");
            Arc::new(LocalSpeakerEngine::new(
                Arc::clone(&llm),
                Arc::clone(&random),
                Arc::clone(&characters),
            ))
        }
    };

    let app = Arc::new(App::new(
        characters,
        groups,
        llm,
        speaker,
        random,
        SelectionPolicy::First,
    ));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    let addr: SocketAddr = format!("{}:{}", settings.server_host, settings.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // In-flight generation calls drain before the process exits.
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
