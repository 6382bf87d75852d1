use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};
use warp::Filter;

use corona_dashboard_api::routes;
use corona_dashboard_api::services::orchestrator::Orchestrator;
use corona_dashboard_api::services::provider::{ProviderClient, DEFAULT_BASE_URL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 3030");
        "3030".to_string()
    });
    let port: u16 = port_str.parse().context("PORT must be a number")?;
    info!("Using PORT: {}", port);

    let base_url = env::var("PROVIDER_BASE_URL").unwrap_or_else(|_| {
        info!("$PROVIDER_BASE_URL not set, using {}", DEFAULT_BASE_URL);
        DEFAULT_BASE_URL.to_string()
    });

    let provider = ProviderClient::with_base_url(base_url).context("building provider client")?;
    let orchestrator = Arc::new(Orchestrator::new(provider));

    // Initial mount: kick off the combined load without blocking the server.
    let loader = orchestrator.clone();
    tokio::spawn(async move {
        loader.initial_load().await;
    });

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(orchestrator).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;

    Ok(())
}
