//! `ProxyResolver` against a mocked provisioning endpoint.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use maxprice::headers::FixedUserAgent;
use maxprice::{CountryCode, ProxyResolver};

fn resolver(server: &MockServer) -> ProxyResolver {
    ProxyResolver::new(
        Some(format!("{}/v1/gen?country={{country}}", server.uri())),
        Duration::from_secs(5),
        Arc::new(FixedUserAgent("maxprice-test/0.1".into())),
    )
}

fn code(s: &str) -> CountryCode {
    s.parse().expect("valid country code")
}

async fn respond_with(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v1/gen"))
        .and(query_param("country", "SG"))
        .respond_with(template)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_first_proxy() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "proxies": ["10.1.2.3:8080:alice:s3cr:et", "10.9.9.9:9090:bob:pw"]
        })),
    )
    .await;

    let proxy = resolver(&server)
        .resolve(&code("sg"))
        .await
        .expect("proxy should resolve");

    assert_eq!(proxy.host, "10.1.2.3");
    assert_eq!(proxy.port, 8080);
    assert_eq!(proxy.user, "alice");
    assert_eq!(proxy.password, "s3cr:et");
    assert_eq!(proxy.endpoint(), "http://10.1.2.3:8080");
}

#[tokio::test]
async fn three_field_proxy_is_rejected() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "proxies": ["10.1.2.3:8080:alice"] })),
    )
    .await;

    assert!(resolver(&server).resolve(&code("SG")).await.is_none());
}

#[tokio::test]
async fn non_numeric_port_is_rejected() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "proxies": ["10.1.2.3:http:alice:pw"] })),
    )
    .await;

    assert!(resolver(&server).resolve(&code("SG")).await.is_none());
}

#[tokio::test]
async fn error_status_is_rejected() {
    let server = MockServer::start().await;
    respond_with(&server, ResponseTemplate::new(502)).await;

    assert!(resolver(&server).resolve(&code("SG")).await.is_none());
}

#[tokio::test]
async fn empty_and_malformed_bodies_are_rejected() {
    let server = MockServer::start().await;
    respond_with(&server, ResponseTemplate::new(200).set_body_string("")).await;
    assert!(resolver(&server).resolve(&code("SG")).await.is_none());

    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "proxies": [] })),
    )
    .await;
    assert!(resolver(&server).resolve(&code("SG")).await.is_none());
}

#[tokio::test]
async fn disabled_resolver_makes_no_request() {
    let resolver = ProxyResolver::new(
        None,
        Duration::from_secs(5),
        Arc::new(FixedUserAgent("maxprice-test/0.1".into())),
    );

    assert!(!resolver.is_enabled());
    assert!(resolver.resolve(&code("SG")).await.is_none());
}
