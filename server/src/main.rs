use anyhow::Result;
use axum::Router;
use clap::Parser;
use paragraph_server::build_app;
use paragraph_server::config::Settings;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let settings = Settings::parse();
    let app: Router = build_app(&settings)?;

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, model = %settings.model_name, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
