use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use secoql::{config::AppConfig, server::Server};
use serde_json::Value;
use std::{future::Future, net::SocketAddr, sync::Once, time::Duration};
use tower::ServiceExt;
use wiremock::MockServer;

pub const API_KEY: &str = "test-api-key";
pub const DATASET_PATH: &str = "/resource/jbjy-vk9h.json";

static TRACING_INIT: Once = Once::new();

/// Runs a test closure against a secoql router wired to a fresh wiremock
/// stand-in for the Socrata endpoint.
pub async fn with_harness<F, Fut>(test: F)
where
    F: FnOnce(TestHarness) -> Fut,
    Fut: Future<Output = ()>,
{
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });

    let upstream = MockServer::start().await;
    let config = test_config(upstream.uri());
    let server = Server::new(config).expect("failed to build secoql server");
    let harness = TestHarness {
        router: server.router(),
        upstream,
        api_key: API_KEY.to_string(),
    };

    test(harness).await;
}

fn test_config(upstream_uri: String) -> AppConfig {
    AppConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        dataset_url: format!("{upstream_uri}{DATASET_PATH}"),
        app_token: None,
        api_key: Some(API_KEY.to_string()),
        default_page_size: 50,
        max_page_size: 1000,
        facet_limit: 50_000,
        request_timeout: Duration::from_secs(5),
    }
}

pub struct TestHarness {
    router: Router,
    pub upstream: MockServer,
    api_key: String,
}

impl TestHarness {
    pub async fn get(&self, uri: &str) -> Response {
        self.request(uri, Some(self.api_key.as_str())).await
    }

    pub async fn get_without_api_key(&self, uri: &str) -> Response {
        self.request(uri, None).await
    }

    async fn request(&self, uri: &str, api_key: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        let request = builder
            .body(Body::empty())
            .expect("failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router call failed")
    }
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, value)
}
