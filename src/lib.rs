pub mod api; // HTTP surface: router, handlers, server lifecycle
pub mod config;
pub mod models;
pub mod pipeline; // Rule-based and service-backed report parsing

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api::{start_api_server, ApiContext, ServerError};
use crate::config::{AppConfig, ConfigError};
use crate::pipeline::structuring::StructuringError;

/// Failures that stop the service from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Service setup failed: {0}")]
    Service(#[from] StructuringError),
    #[error("Async runtime failed to start: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Server(#[from] ServerError),
}

pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = AppConfig::from_env()?;

    // Blocking HTTP clients must be built and dropped outside the runtime,
    // so the parsers are created here and this handle outlives it.
    let parsers = Arc::new(app_config.build_parsers()?);
    let ctx = ApiContext::new(Arc::clone(&parsers), app_config.default_strategy);

    tracing::info!(
        strategy = %app_config.default_strategy,
        service = parsers.service_backend().unwrap_or("none"),
        "Report parsers ready"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;

    runtime.block_on(async {
        let mut server = start_api_server(ctx, app_config.bind, app_config.max_body_bytes).await?;
        tracing::info!(addr = %server.session.server_addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
        server.shutdown();
        server.stopped().await;
        Ok::<(), StartupError>(())
    })?;

    drop(runtime);
    drop(parsers);
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
