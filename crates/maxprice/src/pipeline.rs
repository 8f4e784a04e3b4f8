use std::sync::Arc;

use chrono::Utc;

use crate::config::Config;
use crate::fetcher::{FetchError, PageFetcher, PageSource};
use crate::headers::{HeaderProvider, RandomUserAgent};
use crate::parser::extract_prices;
use crate::proxy::ProxyResolver;
use crate::types::{CountryCode, PriceQueryResult};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Page fetcher failed: {0}")]
    Fetcher(#[from] FetchError),
}

/// Resolver, fetcher and extractor run in sequence for each query.
#[derive(Debug, Clone)]
pub struct PricePipeline<S = PageFetcher> {
    resolver: ProxyResolver,
    source: S,
    proxy_required: bool,
}

impl PricePipeline<PageFetcher> {
    pub fn new(config: &Config) -> Self {
        Self::with_headers(config, Arc::new(RandomUserAgent))
    }

    pub fn with_headers(config: &Config, headers: Arc<dyn HeaderProvider>) -> Self {
        let resolver = ProxyResolver::new(
            config.proxy_api.clone(),
            config.proxy_timeout,
            headers.clone(),
        );
        let source = PageFetcher::new(config, headers);
        Self::with_source(config, resolver, source)
    }
}

impl<S: PageSource> PricePipeline<S> {
    pub fn with_source(config: &Config, resolver: ProxyResolver, source: S) -> Self {
        if config.proxy_required && !resolver.is_enabled() {
            log::warn!("A proxy is required but no proxy endpoint is configured");
        }
        Self {
            resolver,
            source,
            proxy_required: config.proxy_required,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Always produces a well-formed result; failures are described in `message`.
    pub async fn get_max_price(&self, country: &CountryCode) -> PriceQueryResult {
        log::info!("Fetching Max prices for {country}...");
        self.run(country).await.unwrap_or_else(|e| {
            log::error!("Pipeline error for {country}: {e}");
            PriceQueryResult::failure(format!("❌ Internal error: {e}"))
        })
    }

    async fn run(&self, country: &CountryCode) -> Result<PriceQueryResult, PipelineError> {
        let timestamp = Utc::now();

        let proxy = self.resolver.resolve(country).await;
        match &proxy {
            Some(proxy) => log::info!("Using proxy {proxy}"),
            None if self.proxy_required => {
                return Ok(PriceQueryResult::failure(format!(
                    "❌ Unable to obtain a proxy for Max ({country})"
                )));
            }
            None => log::warn!("No proxy available, fetching {country} directly"),
        }

        log::info!("Requesting Max ({country})...");
        let Some(html) = self.source.fetch_page(country, proxy.as_ref()).await? else {
            return Ok(PriceQueryResult::failure(format!(
                "❌ Unable to access Max ({country})"
            )));
        };

        log::info!("Fetched page for {country}, parsing...");
        let (plans, message) = extract_prices(Some(&html), country);
        log::info!("Parsed {} plan(s) for {country}", plans.len());

        Ok(PriceQueryResult::from_plans(
            country, plans, message, timestamp,
        ))
    }
}
