//! HMO assistant server binary.
//!
//! Loads configuration, validates it, loads the corpus (refusing to serve if
//! it cannot), and serves the chat API.

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use hmo_assistant::adapters::ai::{OpenAIConfig, OpenAIEmbedder, OpenAIProvider};
use hmo_assistant::adapters::http::{router, ChatAppState};
use hmo_assistant::application::PhaseOrchestrator;
use hmo_assistant::config::{AiConfig, AppConfig, ConfigError, ValidationError};
use hmo_assistant::domain::metrics::MetricsAggregator;
use hmo_assistant::domain::retrieval::{EmbeddingStore, LoadError, SharedEmbeddingStore};
use hmo_assistant::ports::{AIError, EmbeddingError};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to load corpus: {0}")]
    Corpus(#[from] LoadError),

    #[error("failed to build chat client: {0}")]
    ChatClient(#[from] AIError),

    #[error("failed to build embedding client: {0}")]
    EmbeddingClient(#[from] EmbeddingError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true),
        )
        .try_init();
}

fn openai_config(ai: &AiConfig, model: &str) -> OpenAIConfig {
    let mut config = OpenAIConfig::new(
        ai.api_key.clone().unwrap_or_default(),
        ai.endpoint.clone().unwrap_or_default(),
    )
    .with_model(model)
    .with_timeout(ai.timeout());
    if let Some(version) = ai.api_version.as_deref().filter(|v| !v.is_empty()) {
        config = config.with_api_version(version);
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server.log_level);

    tracing::info!(
        chat_model = %config.ai.chat_model,
        embedding_model = %config.ai.embedding_model,
        api_version = config.ai.api_version.as_deref().unwrap_or("openai"),
        "Starting HMO assistant"
    );

    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "Configuration validation failed");
        return Err(err.into());
    }
    tracing::info!("Configuration validated");

    let corpus_path = config.corpus.embeddings_file();
    let store = match EmbeddingStore::load(corpus_path) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, file = %corpus_path.display(), "Corpus load failed");
            return Err(err.into());
        }
    };
    tracing::info!(
        count = store.len(),
        dimensions = store.dimensions(),
        file = %corpus_path.display(),
        "Corpus loaded"
    );

    let provider = OpenAIProvider::new(openai_config(&config.ai, &config.ai.chat_model))?;
    let embedder = OpenAIEmbedder::new(openai_config(&config.ai, &config.ai.embedding_model))?;
    let metrics = Arc::new(MetricsAggregator::new());

    let store = Arc::new(SharedEmbeddingStore::new(store));
    let orchestrator = Arc::new(PhaseOrchestrator::new(
        Arc::new(provider),
        Arc::new(embedder),
        store.clone(),
        metrics,
        config.chat.orchestrator_settings(),
    ));

    let state = ChatAppState::new(orchestrator, store, corpus_path);
    let app = router(state, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app).await?;
    Ok(())
}
