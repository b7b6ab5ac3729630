//! 测试用的假注册中心
//!
//! 基于 axum 在 127.0.0.1 的随机端口上实现 SgulREG 的 HTTP 接口，
//! 可以控制注册失败次数、发现接口的状态码和返回内容。

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use flare_sgulreg::config::ClientConfig;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// 没有服务监听的注册中心地址
pub const UNREACHABLE_REGISTRY: &str = "http://127.0.0.1:1";

#[derive(Clone, Default)]
pub struct FakeRegistry {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    services: Mutex<HashMap<String, Value>>,
    registrations: Mutex<Vec<Value>>,
    register_calls: AtomicUsize,
    discover_calls: AtomicUsize,
    fail_first_registrations: AtomicUsize,
    discovery_status: Mutex<Option<StatusCode>>,
    discovery_garbage: Mutex<bool>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置某个服务的实例列表，`hosts` 中的每一项生成一个 http 实例
    pub fn set_instances(&self, name: &str, hosts: &[&str]) {
        let instances: Vec<Value> = hosts
            .iter()
            .enumerate()
            .map(|(idx, host)| {
                json!({
                    "instanceId": format!("{}-{}", name, idx),
                    "host": host,
                    "schema": "http",
                    "infoUrl": format!("http://{}/info", host),
                    "healthCheckUrl": format!("http://{}/health", host),
                    "registrationTimestamp": "2026-01-01T00:00:00Z",
                    "lastRefreshTimestamp": "2026-01-01T00:00:10Z"
                })
            })
            .collect();

        self.inner
            .services
            .lock()
            .unwrap()
            .insert(name.to_string(), json!({ "name": name, "instances": instances }));
    }

    /// 前 `n` 次注册请求返回 500
    pub fn fail_first_registrations(&self, n: usize) {
        self.inner.fail_first_registrations.store(n, Ordering::SeqCst);
    }

    /// 发现接口返回指定的状态码（`None` 表示恢复正常）
    pub fn set_discovery_status(&self, status: Option<StatusCode>) {
        *self.inner.discovery_status.lock().unwrap() = status;
    }

    /// 发现接口返回无法解析的响应体
    pub fn set_discovery_garbage(&self, garbage: bool) {
        *self.inner.discovery_garbage.lock().unwrap() = garbage;
    }

    pub fn register_calls(&self) -> usize {
        self.inner.register_calls.load(Ordering::SeqCst)
    }

    pub fn discover_calls(&self) -> usize {
        self.inner.discover_calls.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> Vec<Value> {
        self.inner.registrations.lock().unwrap().clone()
    }

    /// 启动假注册中心，返回其地址
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/health", get(health))
            .route("/sgulreg/services", get(list_services).post(register))
            .route("/sgulreg/services/{name}", get(discover))
            .with_state(self.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn register(State(registry): State<FakeRegistry>, Json(body): Json<Value>) -> Response {
    let call = registry.inner.register_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if call <= registry.inner.fail_first_registrations.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "registry unavailable").into_response();
    }

    registry.inner.registrations.lock().unwrap().push(body.clone());
    let mut response = body;
    response["instanceId"] = json!(format!("instance-{}", call));
    Json(response).into_response()
}

async fn discover(State(registry): State<FakeRegistry>, Path(name): Path<String>) -> Response {
    registry.inner.discover_calls.fetch_add(1, Ordering::SeqCst);

    if let Some(status) = *registry.inner.discovery_status.lock().unwrap() {
        return (status, "unavailable").into_response();
    }
    if *registry.inner.discovery_garbage.lock().unwrap() {
        return (StatusCode::OK, "<html>definitely not json</html>").into_response();
    }

    let service = registry
        .inner
        .services
        .lock()
        .unwrap()
        .get(&name)
        .cloned()
        .unwrap_or_else(|| json!({ "name": name, "instances": [] }));
    Json(service).into_response()
}

async fn list_services(State(registry): State<FakeRegistry>) -> Json<Value> {
    let services: Vec<Value> = registry
        .inner
        .services
        .lock()
        .unwrap()
        .values()
        .cloned()
        .collect();
    Json(Value::Array(services))
}

/// 测试用的客户端配置：短超时、短发现间隔
pub fn client_config(registry_url: &str, fallback: &[&str]) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.timeout_ms = 2_000;
    config.dialer_timeout_ms = 500;
    config.tls_handshake_timeout_ms = 500;
    config.response_header_timeout_ms = 1_000;
    config.service_registry.url = registry_url.to_string();
    config.service_registry.fallback = fallback.iter().map(|s| s.to_string()).collect();
    config.service_registry.watch_interval_ms = 50;
    config
}

/// 轮询等待条件成立，超时返回 false
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
