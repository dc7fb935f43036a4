//! Rovia API Server
//!
//! Main entry point for the Rovia settlement backend.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rovia_api::clients::{HttpNotifier, HttpPaymentProcessor};
use rovia_api::{AppState, create_router};
use rovia_db::{SettlementService, connect};
use rovia_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rovia=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; fails fast if a required secret is missing
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // External service clients
    let processor = Arc::new(HttpPaymentProcessor::new(&config.processor)?);
    let notifier = Arc::new(HttpNotifier::new(&config.notifier)?);
    info!(
        processor = %config.processor.base_url,
        notifier = %config.notifier.base_url,
        "External service clients configured"
    );

    let settlement = SettlementService::new(db.clone(), processor, notifier.clone());

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        settlement: Arc::new(settlement),
        notifier,
        jobs: Arc::new(config.jobs.clone()),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
