pub mod config;
pub mod fetcher;
pub mod headers;
pub mod locales;
pub mod parser;
pub mod pipeline;
pub mod proxy;
pub mod types;

pub use config::Config;
pub use fetcher::{PageFetcher, PageSource};
pub use pipeline::PricePipeline;
pub use proxy::ProxyResolver;
pub use types::{CountryCode, PlanEntry, PriceData, PriceQueryResult, ProxyCredential};

pub(crate) const BASE_URL: &str = "https://www.max.com";
