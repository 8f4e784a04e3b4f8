use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode, redirect};

use crate::config::Config;
use crate::headers::{HeaderProvider, browser_headers};
use crate::locales::LocaleTable;
use crate::types::{CountryCode, ProxyCredential};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: StatusCode },
}

/// Anything that can produce the plan page for a market.
///
/// `Ok(None)` means every candidate failed. `Err` is reserved for setup
/// defects such as a client that cannot be built.
pub trait PageSource: Send + Sync {
    fn fetch_page(
        &self,
        country: &CountryCode,
        proxy: Option<&ProxyCredential>,
    ) -> impl Future<Output = Result<Option<String>, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    base_url: String,
    locales: LocaleTable,
    page_timeout: Duration,
    fallback_timeout: Duration,
    headers: Arc<dyn HeaderProvider>,
}

impl PageFetcher {
    pub fn new(config: &Config, headers: Arc<dyn HeaderProvider>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            locales: config.locales.clone(),
            page_timeout: config.page_timeout,
            fallback_timeout: config.fallback_timeout,
            headers,
        }
    }

    /// URLs tried for `country` before any 404 fallback, in order.
    pub fn candidates(&self, country: &CountryCode) -> Vec<String> {
        let cc = country.lower();
        match self.locales.get(&cc) {
            Some(paths) => paths
                .iter()
                .map(|path| format!("{}{}", self.base_url, path))
                .collect(),
            None => vec![format!("{}/{}/", self.base_url, cc)],
        }
    }

    fn build_client(&self, proxy: Option<&ProxyCredential>) -> Result<Client, FetchError> {
        let mut builder = Client::builder()
            .default_headers(browser_headers())
            .user_agent(self.headers.user_agent())
            .redirect(redirect::Policy::limited(10));

        if let Some(proxy) = proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy.endpoint())?.basic_auth(&proxy.user, &proxy.password),
            );
        }

        Ok(builder.build()?)
    }

    async fn get_html(
        &self,
        client: &Client,
        url: &str,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let response = client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error for {url}: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error for {url}: {e:?}"))?)
    }

    async fn fetch_listed(&self, client: &Client, paths: &[String]) -> Option<String> {
        for path in paths {
            let url = format!("{}{}", self.base_url, path);
            log::info!("Trying {url}");
            match self.get_html(client, &url, self.page_timeout).await {
                Ok(html) => {
                    log::info!("Fetched {url}");
                    return Some(html);
                }
                Err(e) => log::warn!("Failed to fetch {path}: {e}"),
            }
        }
        None
    }

    async fn fetch_unlisted(&self, client: &Client, cc: &str) -> Option<String> {
        let url = format!("{}/{}/", self.base_url, cc);
        log::info!("Trying default URL {url}");

        match self.get_html(client, &url, self.page_timeout).await {
            Ok(html) => Some(html),
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                let fallback = format!("{}/{}/es", self.base_url, cc);
                log::info!("{url} not found, trying Spanish fallback {fallback}");
                self.get_html(client, &fallback, self.fallback_timeout)
                    .await
                    .inspect_err(|e| log::warn!("Spanish fallback failed: {e}"))
                    .ok()
            }
            Err(e) => {
                log::warn!("Failed to fetch default URL: {e}");
                None
            }
        }
    }
}

impl PageSource for PageFetcher {
    /// Returns the body of the first candidate answering 2xx.
    ///
    /// Markets listed in the locale table only try their listed paths. Other
    /// markets try `/{cc}/` and, on a 404 only, `/{cc}/es`.
    async fn fetch_page(
        &self,
        country: &CountryCode,
        proxy: Option<&ProxyCredential>,
    ) -> Result<Option<String>, FetchError> {
        let client = self
            .build_client(proxy)
            .inspect_err(|e| log::error!("Failed to build HTTP client: {e}"))?;

        if let Some(proxy) = proxy {
            log::debug!("Routing requests for {country} through {proxy}");
        }

        let cc = country.lower();
        Ok(match self.locales.get(&cc) {
            Some(paths) => self.fetch_listed(&client, paths).await,
            None => self.fetch_unlisted(&client, &cc).await,
        })
    }
}
