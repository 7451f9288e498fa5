use bike_finder::bikes::BikeClient;
use bike_finder::config::AppConfig;
use bike_finder::finder::Finder;
use bike_finder::permission::RestPermissionStore;
use bike_finder::web::{AppState, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bike_finder=info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let bikes = BikeClient::new(config.bikes).expect("Failed to create bike API client");
    let permissions =
        RestPermissionStore::new(config.store).expect("Failed to create permission store client");

    let state = AppState::new(Finder::new(bikes, permissions));
    let app = create_router(state);

    let addr = config.bind_addr;
    info!(%addr, "Bike finder listening");
    info!("  GET  /health   - Health check");
    info!("  POST /webhook  - Fulfillment webhook");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
