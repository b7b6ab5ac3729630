//! 服务注册客户端
//!
//! 向注册中心宣告本进程的身份，失败后在后台按固定间隔无限重试，直到注册成功。
//! 注册失败从不导致进程退出，只记录日志并自动重试。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, SgulregError};
use crate::registry::api::RegistryApi;
use crate::task::WatchTask;
use crate::types::{RegistrationRequest, RegistrationResponse};

/// 默认注册重试间隔
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// 服务注册客户端
pub struct RegistrationClient {
    api: RegistryApi,
    request: RwLock<Option<RegistrationRequest>>,
    registered: AtomicBool,
    // 监视循环发起的尝试是否仍在进行，避免重叠的注册调用
    in_flight: AtomicBool,
    attempts: AtomicU64,
    retry_interval: Duration,
}

impl RegistrationClient {
    pub fn new(api: RegistryApi) -> Self {
        Self {
            api,
            request: RwLock::new(None),
            registered: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }

    /// 设置重试间隔
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// 提交注册请求，替换之前排队的请求。不发起网络调用。
    pub async fn submit(&self, request: RegistrationRequest) {
        let mut current = self.request.write().await;
        debug!(service = %request.name, host = %request.host, "registration request submitted");
        *current = Some(request);
    }

    /// 当前排队的注册请求
    pub async fn request(&self) -> Option<RegistrationRequest> {
        self.request.read().await.clone()
    }

    /// 是否已经注册成功
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// 已发起的注册尝试次数
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// 发送当前排队的注册请求
    ///
    /// 成功解析响应后标记为已注册；传输或解析失败时保持未注册并返回错误。
    /// 耗时只受 HTTP 客户端的超时配置约束。
    pub async fn register(&self) -> Result<RegistrationResponse> {
        let request = self.request().await.ok_or_else(|| {
            SgulregError::registration_failed("<none>", "尚未提交注册请求")
        })?;

        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            service = %request.name,
            registry = %self.api.base_url(),
            attempt,
            "trying service registration"
        );

        match self.api.register(&request).await {
            Ok(response) => {
                self.registered.store(true, Ordering::Release);
                info!(
                    service = %request.name,
                    instance_id = ?response.instance_id(),
                    attempt,
                    "✅ service registered with the service registry"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(
                    service = %request.name,
                    attempt,
                    error = %e,
                    "⚠️ service registration failed"
                );
                Err(e)
            }
        }
    }

    /// 注册重试循环
    ///
    /// 每隔 `retry_interval` 检查一次，未注册时在后台发起一次注册（不等待结果），
    /// 注册成功或令牌取消后退出。多次启动也不会重复注册：每次尝试前都检查注册标志，
    /// 上一次尝试未结束时跳过本周期。
    pub async fn watch_registry(self: Arc<Self>, token: CancellationToken) {
        debug!(interval = ?self.retry_interval, "start watching service registration");

        while !self.is_registered() {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("🛑 registration watch stopped before registration succeeded");
                    return;
                }
                _ = tokio::time::sleep(self.retry_interval) => {}
            }

            if self.is_registered() {
                break;
            }
            if self.in_flight.swap(true, Ordering::AcqRel) {
                debug!("previous registration attempt still in flight");
                continue;
            }
            // 拿到 in_flight 后再检查一次，上一次尝试可能刚刚成功
            if self.is_registered() {
                self.in_flight.store(false, Ordering::Release);
                break;
            }

            let client = Arc::clone(&self);
            tokio::spawn(async move {
                // 错误已在 register 中记录，下一个周期会继续重试
                let _ = client.register().await;
                client.in_flight.store(false, Ordering::Release);
            });
        }

        info!("stop service registration retries");
    }

    /// 在后台启动注册重试循环
    pub fn spawn_watch(self: &Arc<Self>, token: CancellationToken) -> WatchTask {
        let client = Arc::clone(self);
        WatchTask::spawn("sgulreg-registration", token, move |token| {
            client.watch_registry(token)
        })
    }
}
