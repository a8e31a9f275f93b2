mod config;
mod models;
mod routes;
mod services;
mod validation;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Settings;
use routes::{create_router, AppState};
use services::{FoodAnalysisService, GeminiClient, VisionModel};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Prompted Plate API...");

    let settings = Settings::from_env()?;
    settings.validate()?;
    let settings = Arc::new(settings);

    let gemini = GeminiClient::new(&settings)?;
    log::info!("✅ Gemini client initialized with model: {}", gemini.model());

    let model: Arc<dyn VisionModel> = Arc::new(gemini);
    let food_service = Arc::new(FoodAnalysisService::new(model, settings.max_file_size));

    let app = create_router(AppState {
        food_service,
        settings: settings.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;

    log::info!("🌐 {} v{} listening on {}", settings.project_name, settings.version, settings.bind_addr);
    log::info!("🔓 CORS origins: {}", settings.cors_origins.join(", "));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    log::info!("🛑 Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for shutdown signal: {}", e);
    }
}
