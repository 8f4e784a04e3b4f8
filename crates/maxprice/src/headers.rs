use rand::seq::IndexedRandom;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, DNT, HeaderMap, HeaderName, HeaderValue, UPGRADE_INSECURE_REQUESTS,
};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/110.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 Chrome/110.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; rv:109.0) Gecko/20100101 Firefox/110.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; x64) AppleWebKit/537.36 Edg/110.0",
];

/// Supplies the `User-Agent` sent with every outgoing request.
pub trait HeaderProvider: Send + Sync + std::fmt::Debug {
    fn user_agent(&self) -> String;
}

/// Picks a user agent uniformly at random from a small desktop browser pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUserAgent;

impl HeaderProvider for RandomUserAgent {
    fn user_agent(&self) -> String {
        USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct FixedUserAgent(pub String);

impl HeaderProvider for FixedUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}

/// Browser-like headers for page requests. The user agent is set per request.
pub(crate) fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(HeaderName::from_static("sec-gpc"), HeaderValue::from_static("1"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_user_agent_comes_from_pool() {
        let provider = RandomUserAgent;
        for _ in 0..20 {
            let ua = provider.user_agent();
            assert!(USER_AGENTS.contains(&ua.as_str()), "unexpected UA: {ua}");
        }
    }

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert_eq!(headers.get(DNT).unwrap(), "1");
        assert_eq!(headers.get("sec-gpc").unwrap(), "1");
        assert!(headers.get(ACCEPT).unwrap().to_str().unwrap().starts_with("text/html"));
    }
}
