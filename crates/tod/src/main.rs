//! tod
//!
//! Interactive assistant shell. Talks to a local Ollama server and hands
//! math questions to a specialist model through tool calls.
//!
//! Configuration comes from the environment (or a `.env` file):
//! `OLLAMA_HOST`, `OLLAMA_PORT`, `OLLAMA_TIMEOUT_SECS`, `TOD_MAIN_MODEL`,
//! `TOD_MATH_MODEL`, `TOD_TEMPERATURE` and `RUST_LOG`.

mod config;
mod shell;

use std::sync::Arc;

use tod_core::{LlmProvider, ModelSet, Orchestrator};
use tod_runtime::OllamaProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::from_env()?;
    let provider = Arc::new(OllamaProvider::from_config(settings.ollama.clone())?);

    report_connectivity(provider.as_ref(), &settings.models).await;

    let orchestrator = Orchestrator::with_defaults(provider, &settings.models);
    tracing::info!(
        model = %settings.models.main.model,
        tools = ?orchestrator.tools().names(),
        "Tod is ready"
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    shell::run(&orchestrator, stdin, &mut stdout, &mut stderr).await?;

    Ok(())
}

/// Warn early if Ollama is down or a configured model is not pulled. The
/// shell still starts; turns will fail until the server is reachable.
async fn report_connectivity(provider: &dyn LlmProvider, models: &ModelSet) {
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Ollama");
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - turns will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
            return;
        }
    }

    let Ok(available) = provider.list_models().await else {
        return;
    };

    for wanted in [&models.main.model, &models.math.model] {
        if !available.iter().any(|m| &m.name == wanted) {
            tracing::warn!(model = %wanted, "Model not found locally, try: ollama pull {}", wanted);
        }
    }
}
