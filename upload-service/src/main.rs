//! Service entry point: wires the production stack and serves the HTTP
//! surface. Runs are triggered externally (scheduler or manual call).

mod logsink;
mod routes;
mod state;

use anyhow::Context;
use core_runtime::logging::{init_logging, LoggingConfig};
use tracing::info;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default())?;

    let state = AppState::from_env()?;

    let addr = std::env::var("YTBULK_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "Upload service listening");
    axum::serve(listener, routes::build_router(state)).await?;
    Ok(())
}
