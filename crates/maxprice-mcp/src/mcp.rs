use maxprice::{Config, CountryCode, PricePipeline, PriceQueryResult};
use rmcp::{
    ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ErrorData as McpError, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct McpServer {
    pipeline: PricePipeline,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl McpServer {
    pub fn new() -> Result<Self, anyhow::Error> {
        let config = Config::from_env()?;
        Ok(Self::with_config(&config))
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            pipeline: PricePipeline::new(config),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "get-max-price",
        description = "Get Max subscription prices by country code. Returns a text summary and, when prices were found, structured plan data (plan group, label, name, price)."
    )]
    pub async fn get_max_price(
        &self,
        Parameters(params): Parameters<GetMaxPriceParams>,
    ) -> Result<CallToolResult, McpError> {
        let country = params
            .validate()
            .inspect_err(|e| log::error!("Invalid params: {e}"))
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        log::info!("Handling get-max-price for {country}");
        let result = self.pipeline.get_max_price(&country).await;

        to_call_tool_result(result)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetMaxPriceParams {
    /// Two-letter country code (e.g., SG, US, HK)
    #[schemars(length(min = 2, max = 2))]
    pub country_code: String,
}

impl GetMaxPriceParams {
    pub fn validate(&self) -> Result<CountryCode, maxprice::types::CountryCodeError> {
        self.country_code.parse()
    }
}

/// Text block with the summary, plus the plan data as structured content on success.
fn to_call_tool_result(result: PriceQueryResult) -> Result<CallToolResult, McpError> {
    let structured = result
        .data
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .inspect_err(|e| log::error!("Serialization error: {e:?}"))
        .map_err(|e| {
            McpError::internal_error(format!("Failed to serialize price data: {e:?}"), None)
        })?;

    let mut call_result = CallToolResult::success(vec![Content::text(result.message)]);
    call_result.structured_content = structured;
    Ok(call_result)
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(include_str!("./instructions.md").to_string()),
            ..Default::default()
        }
    }
}
