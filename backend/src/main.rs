//! Aphid Risk Prediction Service - Backend Server

use std::net::SocketAddr;

use aphid_risk_backend::{build_state, create_app, load_engine, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aphid_server=debug,aphid_risk_backend=debug,shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Aphid Risk Prediction Server");
    tracing::info!("Environment: {}", config.environment);

    let engine = load_engine(&config)?;
    tracing::info!("Risk engine ready: {:?}", engine);

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    let state = build_state(config, engine);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
