use maxprice_mcp::McpServer;
use rmcp::{ServiceExt, transport::stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    maxprice_mcp::init_logging();

    log::info!("Starting max-price MCP server (stdio)");

    let service = McpServer::new()?.serve(stdio()).await.inspect_err(|e| {
        log::error!("Serve error: {e:?}");
    })?;

    service.waiting().await?;
    log::info!("max-price MCP server stopped");

    Ok(())
}
