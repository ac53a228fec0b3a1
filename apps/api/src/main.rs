use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cv_converter::config::Config;
use cv_converter::routes::build_router;
use cv_converter::state::AppState;
use cv_converter::structuring::LlmStructurer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV converter API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the structuring backend
    let structurer = LlmStructurer::new(
        config.nvidia_api_key.clone(),
        config.llm_settings(),
        config.truncation(),
    )
    .context("Failed to build the structuring client")?;
    if structurer.is_configured() {
        info!("Structuring client initialized (model: {})", config.llm_model);
    } else {
        warn!("NVIDIA_API_KEY is not set; conversions will fail until it is configured");
    }

    if !config.assets_dir.is_dir() {
        warn!(
            "Assets directory {} not found; documents will use text fallbacks",
            config.assets_dir.display()
        );
    }
    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!("Failed to create upload dir {}", config.upload_dir.display())
    })?;

    // Build app state
    let state = AppState::new(config.clone(), Arc::new(structurer));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
