//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{MemoryStore, OpenAiReportAdapter},
    config::Config,
    error::ApiError,
    web::{app_router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use campify_core::ports::{EntityStore, ReportTextService};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Build the Entity Store from the Seed Dataset ---
    info!("Generating seed dataset (seed {})...", config.seed);
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::seeded(config.seed, Utc::now()));

    // --- 3. Initialize the Report-Text Adapter ---
    let openai_config = OpenAIConfig::new().with_api_key(config.require_openai_api_key()?);
    let openai_client = Client::with_config(openai_config);
    let report_text: Arc<dyn ReportTextService> = Arc::new(OpenAiReportAdapter::new(
        openai_client,
        config.report_model.clone(),
        config.helpdesk_model.clone(),
        config.generation_timeout,
        store.clone(),
    ));

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(store, config.clone(), report_text));
    let app = app_router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
