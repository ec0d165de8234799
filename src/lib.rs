pub mod api;
pub mod assistant;
pub mod config;
pub mod crypto;
pub mod db;
pub mod generation;
pub mod models;
pub mod store;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::assistant::MedicalAssistant;
use crate::config::{AppConfig, ConfigError};
use crate::generation::{GenerationError, OllamaGenerator, TextGenerator};
use crate::store::{RecordStore, StoreError};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Record store failed to start: {0}")]
    Store(#[from] StoreError),

    #[error("Text generator failed to start: {0}")]
    Generation(#[from] GenerationError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = AppConfig::from_env()?;

    // The blocking HTTP client owns its own runtime thread, so it is built
    // and dropped outside the tokio runtime.
    let generator: Arc<dyn TextGenerator> = Arc::new(OllamaGenerator::new(&app_config.generator)?);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(serve(app_config, Arc::clone(&generator)));
    drop(runtime);
    drop(generator);

    if let Err(e) = &result {
        tracing::error!(error = %e, "{} stopped with an error", config::APP_NAME);
    }
    result
}

async fn serve(config: AppConfig, generator: Arc<dyn TextGenerator>) -> Result<(), StartupError> {
    let store = RecordStore::init(&config.store).await?;

    let assistant = Arc::new(MedicalAssistant::new(
        store.clone(),
        generator,
        config.generator.temperature,
        config.generator.timeout,
    ));
    tracing::info!(model = assistant.model(), "Assistant ready");

    let ctx = ApiContext::new(store.clone(), assistant);
    let mut server = api::start_api_server_on(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    server.shutdown();
    server.wait().await;
    store.close().await;
    Ok(())
}
