use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("Invalid country code '{0}'. Expected two ASCII letters, e.g. 'SG', 'US', 'HK'")]
pub struct CountryCodeError(String);

/// Two-letter market identifier, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Lowercase form used when building URLs.
    pub fn lower(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn upper(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CountryCode(s.to_ascii_uppercase()))
        } else {
            Err(CountryCodeError(s.to_string()))
        }
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CountryCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProxyParseError {
    #[error("Expected at least 4 colon-delimited fields, got {0}")]
    TooFewFields(usize),
    #[error("Invalid proxy port: {0}")]
    InvalidPort(String),
}

/// Connection details for an egress proxy, parsed from `host:port:user:password`.
///
/// The password is everything after the third colon, so it may contain colons
/// itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredential {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl ProxyCredential {
    /// Proxy address without credentials.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyCredential {
    type Err = ProxyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().splitn(4, ':').collect();
        if parts.len() < 4 {
            return Err(ProxyParseError::TooFewFields(parts.len()));
        }

        let port = parts[1]
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| ProxyParseError::InvalidPort(parts[1].to_string()))?;

        Ok(ProxyCredential {
            host: parts[0].to_string(),
            port,
            user: parts[2].to_string(),
            password: parts[3].to_string(),
        })
    }
}

impl std::fmt::Debug for ProxyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyCredential")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Display for ProxyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlanEntry {
    pub plan_group: String,
    pub label: String,
    pub name: String,
    pub price: String,
}

impl PlanEntry {
    pub fn new(plan_group: &str, name: &str, price: &str) -> Self {
        PlanEntry {
            plan_group: plan_group.to_string(),
            label: plan_label(plan_group).to_string(),
            name: name.to_string(),
            price: price.to_string(),
        }
    }
}

/// Display label for a plan group. Anything other than `monthly` is treated as yearly.
pub fn plan_label(plan_group: &str) -> &'static str {
    if plan_group == "monthly" {
        "Monthly"
    } else {
        "Yearly"
    }
}

impl Display for PlanEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "✅ {} ({}): **{}**", self.name, self.label, self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PriceData {
    pub country: CountryCode,
    pub timestamp: DateTime<Utc>,
    pub plans: Vec<PlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PriceQueryResult {
    pub success: bool,
    pub message: String,
    pub data: Option<PriceData>,
}

impl PriceQueryResult {
    pub fn failure(message: impl Into<String>) -> Self {
        PriceQueryResult {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// `data` is only populated when at least one plan was extracted.
    pub fn from_plans(
        country: &CountryCode,
        plans: Vec<PlanEntry>,
        message: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        if plans.is_empty() {
            return PriceQueryResult::failure(message);
        }

        PriceQueryResult {
            success: true,
            message,
            data: Some(PriceData {
                country: country.clone(),
                timestamp,
                plans,
            }),
        }
    }
}
