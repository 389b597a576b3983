mod api;
mod app;
mod config;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;

use anyhow::{Context, Result};

use services::{RateCard, RateCardStore, WorkflowPublisher};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting print estimator"
    );

    // Load the rate card; a present but broken file stops startup
    let card = RateCard::load_or_builtin(&settings.rate_card_path).with_context(|| {
        format!(
            "Failed to load rate card from {}",
            settings.rate_card_path.display()
        )
    })?;
    tracing::info!(
        version = %card.version,
        products = card.products.len(),
        "Rate card loaded"
    );
    let rate_cards = RateCardStore::new(card);

    // Workflow webhook publisher
    let publisher = WorkflowPublisher::new(
        settings.workflow_webhook_url.clone(),
        settings.workflow_webhook_timeout_seconds,
        settings.workflow_webhook_max_elapsed_seconds,
    )?;

    // Create application state
    let state = app::AppState::new(settings.clone(), rate_cards, publisher);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
