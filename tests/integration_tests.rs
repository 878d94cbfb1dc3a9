//! End-to-end tests over a real socket.
//!
//! Each fixture binds the application to an ephemeral port, points it at a
//! wiremock server playing RAWG, and talks to it with `reqwest`. Unlike the
//! router tests, requests here carry a real peer address, so the rate
//! limiter keys on the socket IP when no proxy headers are sent.
//!
//! Run with: `cargo test --test integration_tests`
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gamehub::{AppState, Config, build_router, utils};

// ============================================================================
// Test Fixture
// ============================================================================

struct TestFixture {
    rawg: MockServer,
    base_url: String,
    client: Client,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<std::io::Result<()>>,
}

impl TestFixture {
    async fn new(rate_limit_window: Duration) -> Self {
        let rawg = MockServer::start().await;

        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            rawg_base_url: rawg.uri(),
            rawg_api_key: Some("test-key".to_string()),
            upstream_timeout: Duration::from_secs(2),
            rate_limit_window,
            shutdown_grace: Duration::from_secs(1),
            metrics_port: 0,
            log_level: "warn".to_string(),
            ..Config::default()
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(AppState::from_config(config.clone()).unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(utils::serve_with_grace(
            listener,
            app,
            async move {
                let _ = rx.await;
            },
            config.shutdown_grace,
        ));

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            rawg,
            base_url: format!("http://{addr}"),
            client,
            shutdown: Some(tx),
            server,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .expect("Server did not stop")
            .unwrap()
            .unwrap();
    }
}

async fn mount_games(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/games"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{
                "id": 22511,
                "name": "The Legend of Zelda: Breath of the Wild",
                "released": "2017-03-03",
                "genres": [{ "id": 4, "name": "Action" }],
                "platforms": [{ "platform": { "id": 7, "name": "Nintendo Switch" } }],
                "stores": [{ "store": { "id": 6, "name": "Nintendo" } }]
            }]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_games_over_socket() {
    let fixture = TestFixture::new(Duration::ZERO).await;
    mount_games(&fixture.rawg).await;

    let (status, body) = fixture.get("/games").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "22511");
    assert_eq!(body[0]["platforms"], json!(["Nintendo Switch"]));
    assert_eq!(
        body[0]["stores"][0]["url"],
        "https://www.nintendo.com/search/?q=The+Legend+of+Zelda%3A+Breath+of+the+Wild&p=1&cat=gme"
    );

    fixture.stop().await;
}

#[tokio::test]
async fn test_rate_limit_keys_on_peer_address() {
    let fixture = TestFixture::new(Duration::from_secs(5)).await;
    mount_games(&fixture.rawg).await;

    let (first, _) = fixture.get("/games").await;
    let (second, body) = fixture.get("/games").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "Too many requests" }));

    // A proxy header gives a different key than the loopback peer
    let response = fixture
        .client
        .get(fixture.url("/games"))
        .header("x-forwarded-for", "198.51.100.20")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    fixture.stop().await;
}

#[tokio::test]
async fn test_upstream_timeout_surfaces_as_500() {
    let fixture = TestFixture::new(Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/games/3498"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 3498, "name": "GTA V" }))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&fixture.rawg)
        .await;

    let (status, body) = fixture.get("/games/3498").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch game" }));

    fixture.stop().await;
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let fixture = TestFixture::new(Duration::ZERO).await;
    let base_url = fixture.base_url.clone();
    let client = fixture.client.clone();

    fixture.stop().await;

    assert!(client.get(format!("{base_url}/games")).send().await.is_err());
}
