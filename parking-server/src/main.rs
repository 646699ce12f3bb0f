use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use parking_server::catalog::CachedCatalog;
use parking_server::config::AppConfig;
use parking_server::routing::OsrmClient;
use parking_server::search::RankedSearch;
use parking_server::session::SessionStore;
use parking_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("parking_server=info,tower_http=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Catalog, cached so each search does not hit storage
    let catalog = CachedCatalog::new(config.catalog_backend(), &config.catalog_cache);
    info!(source = ?config.catalog, ttl = ?config.catalog_cache.ttl, "Facility catalog configured");

    // Routing service client
    let osrm = OsrmClient::new(config.osrm_config())?;
    info!(base_url = %config.osrm_base_url, "Routing service configured");

    let search = RankedSearch::new(catalog, osrm, config.search.clone());
    let sessions = SessionStore::new(&config.session);
    let app = create_router(AppState::new(search, sessions));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Parking finder listening");
    info!("  GET  /health");
    info!("  PUT  /users/:user_id/location   - share a location");
    info!("  POST /users/:user_id/location   - share a location and search nearby");
    info!("  GET  /users/:user_id/nearby     - ranked parking near the shared location");
    info!("  GET  /users/:user_id/nearest    - nearest parking to the shared location");
    info!("  GET  /search/nearby?lat=&lon=   - stateless nearby search");
    info!("  GET  /search/nearest?lat=&lon=  - stateless nearest search");

    axum::serve(listener, app).await?;
    Ok(())
}
