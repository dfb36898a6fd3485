use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod config;
mod error;
mod league;
mod models;
mod site;
mod sportsdb;

use config::Config;
use league::LeagueService;
use site::AppState;
use sportsdb::SportsDbClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let client = SportsDbClient::new(&config.provider())?;
    let league = config.league();
    info!(
        "🏀 Serving {} (league {}, season {}) from {}",
        league.league_name, league.league_id, league.season, config.sportsdb_base_url
    );

    let service = LeagueService::new(Arc::new(client), league);
    let app = site::router(AppState { service });

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Site listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
