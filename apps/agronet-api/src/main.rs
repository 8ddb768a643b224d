use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let mongo_client = database::mongodb::connect_with_retry(&config.mongodb, None).await?;
    let state = AppState::new(config, mongo_client);
    info!(
        database = %state.config.mongodb.database(),
        "Connected to MongoDB"
    );

    api::init_indexes(&state.db).await?;

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state))?;
    let app = router.merge(health_router(state.config.app));

    info!("Starting AgroNet API");

    let server_config = state.config.server.clone();
    let mongo_client = state.mongo_client.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        info!("Closing MongoDB connections");
        mongo_client.shutdown().await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("AgroNet API shutdown complete");
    Ok(())
}
