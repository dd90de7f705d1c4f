// src/main.rs
use dotenv::dotenv;
use reqwest::Client;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod app;
mod auth;
mod common;
mod conversion;
mod host_middleware;
mod logging_middleware;
mod profile;
mod resume;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::providers::ProviderRegistry;
use common::config::INSECURE_SECRET_KEY;
use common::{AppConfig, AppState};
use conversion::ConversionService;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();

    if !config.debug && config.secret_key == INSECURE_SECRET_KEY {
        warn!("Running with DEBUG off and the development SECRET_KEY, tokens are forgeable");
    }
    info!(
        debug = config.debug,
        allowed_hosts = ?config.allowed_hosts,
        llm_provider = config.llm.provider.as_str(),
        s3_configured = config.storage.is_configured(),
        "Configuration loaded"
    );

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let pool =
        common::db::connect_pool(&config.database_url, config.database_max_connections).await?;
    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().no_proxy().build()?;

    let providers = ProviderRegistry::from_config(&config, http_client);
    info!("Identity providers initialized");

    let conversion = ConversionService::from_config(&config).await;
    info!(default_key = %conversion.default_key(), "ConversionService initialized");

    // ========================================================================
    // APPLICATION STATE AND ROUTER
    // ========================================================================

    let shared = AppState::new(pool, &config, providers, conversion).into_shared();
    let app = app::build_router(shared, &config);

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
