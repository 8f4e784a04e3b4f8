use std::io;
use std::sync::Arc;

use maxprice::Config;
use maxprice_mcp::McpServer;
use rmcp::transport::{
    StreamableHttpServerConfig, StreamableHttpService,
    streamable_http_server::session::local::LocalSessionManager,
};
use tower_http::cors::CorsLayer;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8056";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    maxprice_mcp::init_logging();

    let config = Arc::new(Config::from_env()?);
    let ct = tokio_util::sync::CancellationToken::new();

    let service = StreamableHttpService::new(
        move || Ok::<_, io::Error>(McpServer::with_config(&config)),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            cancellation_token: ct.child_token(),
            ..Default::default()
        },
    );

    let address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.into());
    let router = axum::Router::new()
        .nest_service("/mcp", service)
        .layer(CorsLayer::permissive());
    let tcp_listener = tokio::net::TcpListener::bind(&address).await?;

    log::info!("Starting max-price MCP server on address: {}", address);

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {e}");
            }
            log::info!("Shutting down");
            ct.cancel();
        })
        .await?;

    Ok(())
}
