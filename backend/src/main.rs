use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backend::matchmaker::Matchmaker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let addr = std::env::var("NETCHESS_ADDR").unwrap_or_else(|_| "0.0.0.0:6000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("[SERVER] chess server started on {addr}");

    let matchmaker = Arc::new(Matchmaker::new());

    tokio::select! {
        _ = backend::serve(listener, matchmaker.clone()) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("[SERVER] shutdown requested");
            matchmaker.shutdown();
        }
    }

    Ok(())
}
