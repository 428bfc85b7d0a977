//! cairn server entry point.
//!
//! Serves either the HTTP surface (cache admin and note routes) or the MCP
//! tools on stdio, as configured by `transport`.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use cairn_core::config::{AppConfig, Transport};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod http;
mod service;
mod state;
mod tools;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let state = AppState::open(&config).await?;

    match config.transport {
        Transport::Http => serve_http(&config, state).await,
        Transport::Stdio => serve_stdio(state).await,
    }
}

async fn serve_http(config: &AppConfig, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        instance = %config.instance_id,
        "Starting cairn server on HTTP transport"
    );

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn serve_stdio(state: AppState) -> Result<()> {
    tracing::info!(operator = %state.operator_id, "Starting cairn server on stdio transport");

    let handler = handler::CairnServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
