use anyhow::Result;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stableman::{Stableman, StablemanConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stableman=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting stableman MCP server");

    for (name, description) in StablemanConfig::missing_variables(|name| std::env::var(name).ok()) {
        tracing::warn!("{} is not set ({})", name, description);
    }

    let config = StablemanConfig::from_env()?;
    tracing::info!(
        "Stable location: {}, {}",
        config.location.latitude,
        config.location.longitude
    );

    let stableman = Stableman::new(config)?;
    let server = stableman.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
