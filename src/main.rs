mod core;
mod llm;
mod mail;
mod rag;
mod server;
mod state;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::core::config::AppPaths;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = AppPaths::new();
    core::logging::init(&paths);

    let state = AppState::initialize(&paths).await?;

    let bind_addr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    );
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    let addr = listener.local_addr()?;

    tracing::info!("listening on {}", addr);

    let app = server::router::router(state);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
