use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::headers::HeaderProvider;
use crate::types::{CountryCode, ProxyCredential, ProxyParseError};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Provisioning endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed provisioning response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Provisioning response contained no proxies")]
    Empty,
    #[error("Invalid proxy string: {0}")]
    Invalid(#[from] ProxyParseError),
}

#[derive(Debug, Deserialize)]
struct ProvisioningResponse {
    #[serde(default)]
    proxies: Vec<String>,
}

/// Asks a proxy provisioning endpoint for an egress proxy in the target market.
#[derive(Debug, Clone)]
pub struct ProxyResolver {
    api_template: Option<String>,
    timeout: Duration,
    headers: Arc<dyn HeaderProvider>,
}

impl ProxyResolver {
    /// `api_template` must contain a `{country}` placeholder. `None` disables the resolver.
    pub fn new(
        api_template: Option<String>,
        timeout: Duration,
        headers: Arc<dyn HeaderProvider>,
    ) -> Self {
        Self {
            api_template,
            timeout,
            headers,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_template.is_some()
    }

    /// Never fails: every provisioning problem is logged and yields `None`.
    pub async fn resolve(&self, country: &CountryCode) -> Option<ProxyCredential> {
        let Some(template) = &self.api_template else {
            log::info!("No proxy endpoint configured, fetching {country} directly");
            return None;
        };

        match self.try_resolve(template, country).await {
            Ok(proxy) => {
                log::info!("Resolved proxy {proxy} for {country}");
                Some(proxy)
            }
            Err(e) => {
                log::error!("Failed to resolve proxy for {country}: {e}");
                None
            }
        }
    }

    async fn try_resolve(
        &self,
        template: &str,
        country: &CountryCode,
    ) -> Result<ProxyCredential, ProxyError> {
        let url = template.replace("{country}", country.upper());
        log::debug!("Requesting proxy for {country}");

        let client = Client::builder().timeout(self.timeout).build()?;
        let response = client
            .get(&url)
            .header(USER_AGENT, self.headers.user_agent())
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        log::info!("Proxy endpoint status: {status}");
        if !status.is_success() {
            return Err(ProxyError::Status(status));
        }

        let body = response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?;

        parse_provisioning_response(&body)
    }
}

/// Takes the first proxy string from a `{"proxies": [...]}` body.
pub fn parse_provisioning_response(body: &str) -> Result<ProxyCredential, ProxyError> {
    let response: ProvisioningResponse = serde_json::from_str(body)?;
    let first = response.proxies.first().ok_or(ProxyError::Empty)?;
    Ok(first.parse()?)
}
