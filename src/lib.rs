pub mod advisory;
pub mod api;
pub mod catalog;
pub mod config;
pub mod models;
pub mod recommend;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::advisory::{AdvisoryClient, OllamaAdvisor};
use crate::config::AppConfig;
use crate::recommend::RecommendationEngine;

/// Build the engine, attaching the advisor when enabled. Advisor
/// construction failures leave the engine rule-only.
fn build_engine(config: &AppConfig) -> (RecommendationEngine, Option<Arc<dyn AdvisoryClient>>) {
    let engine = RecommendationEngine::default();
    if !config.advisory.enabled {
        return (engine, None);
    }

    match OllamaAdvisor::from_config(&config.advisory) {
        Ok(advisor) => {
            tracing::info!(
                model = %config.advisory.model,
                url = %config.advisory.base_url,
                timeout_secs = config.advisory.timeout.as_secs(),
                "Advisory enabled"
            );
            let advisor: Arc<dyn AdvisoryClient> = Arc::new(advisor);
            (engine.with_advisor(advisor.clone()), Some(advisor))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Advisory client unavailable, continuing rule-only");
            (engine, None)
        }
    }
}

pub fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env();

    // The blocking advisory client must be created, and finally dropped,
    // outside the async runtime.
    let (engine, _advisor) = build_engine(&config);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    let result = runtime.block_on(async move {
        let mut server = api::start_server_on(engine, config.bind_addr).await?;
        tracing::info!(addr = %server.session.server_addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {e}");
        }
        server.shutdown();
        Ok::<(), String>(())
    });

    drop(runtime);
    result
}
