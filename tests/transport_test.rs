//! HTTP 传输超时测试

use axum::Router;
use axum::routing::get;
use flare_sgulreg::ClientConfig;
use flare_sgulreg::client::transport::{HttpTransport, SendError};
use std::time::Duration;
use tokio::net::TcpListener;

async fn spawn_slow_server(delay: Duration) -> String {
    let app = Router::new()
        .route(
            "/slow",
            get(move || async move {
                tokio::time::sleep(delay).await;
                "late"
            }),
        )
        .route("/fast", get(|| async { "ok" }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn response_header_timeout_applies_to_send() {
    let url = spawn_slow_server(Duration::from_millis(500)).await;

    let mut config = ClientConfig::default();
    config.response_header_timeout_ms = 100;
    let transport = HttpTransport::from_config(&config).unwrap();

    let err = transport
        .send(transport.client().get(format!("{}/slow", url)))
        .await
        .unwrap_err();
    assert!(matches!(err, SendError::ResponseHeaderTimeout(limit) if limit == Duration::from_millis(100)));

    let response = transport
        .send(transport.client().get(format!("{}/fast", url)))
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn zero_timeouts_mean_unlimited() {
    let url = spawn_slow_server(Duration::from_millis(200)).await;

    let mut config = ClientConfig::default();
    config.timeout_ms = 0;
    config.response_header_timeout_ms = 0;
    let transport = HttpTransport::from_config(&config).unwrap();

    assert_eq!(transport.response_header_timeout(), None);
    let response = transport
        .send(transport.client().get(format!("{}/slow", url)))
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "late");
}

#[tokio::test]
async fn overall_timeout_is_enforced_by_client() {
    let url = spawn_slow_server(Duration::from_millis(500)).await;

    let mut config = ClientConfig::default();
    config.timeout_ms = 100;
    config.response_header_timeout_ms = 0;
    let transport = HttpTransport::from_config(&config).unwrap();

    let err = transport
        .send(transport.client().get(format!("{}/slow", url)))
        .await
        .unwrap_err();
    assert!(matches!(err, SendError::Request(ref e) if e.is_timeout()));
    assert_eq!(transport.expect_continue_timeout(), Duration::from_secs(4));
}
