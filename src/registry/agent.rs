//! 服务注册代理
//!
//! 封装注册客户端的常用流程：提交请求并立即尝试一次，
//! 失败时启动后台重试循环。首次调用的错误只作提示，重试会一直进行到成功。

use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::transport::HttpTransport;
use crate::config::Config;
use crate::error::Result;
use crate::registry::api::RegistryApi;
use crate::registry::client::RegistrationClient;
use crate::task::WatchTask;
use crate::types::{RegistrationRequest, RegistrationResponse};

/// 服务注册代理
pub struct RegistrationAgent {
    client: Arc<RegistrationClient>,
    token: CancellationToken,
    watch: Mutex<Option<WatchTask>>,
}

impl RegistrationAgent {
    /// 按配置创建
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(&config.client)?;
        let api = RegistryApi::new(config.client.service_registry.url.clone(), transport);
        let client =
            RegistrationClient::new(api).with_retry_interval(config.registration.retry_interval());
        Ok(Self::new(client))
    }

    pub fn new(client: RegistrationClient) -> Self {
        Self {
            client: Arc::new(client),
            token: CancellationToken::new(),
            watch: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &Arc<RegistrationClient> {
        &self.client
    }

    pub fn is_registered(&self) -> bool {
        self.client.is_registered()
    }

    /// 注册服务
    ///
    /// 失败时启动后台重试（已有重试循环在运行时不再重复启动），并返回首次尝试的错误
    pub async fn register(&self, request: RegistrationRequest) -> Result<RegistrationResponse> {
        let service = request.name.clone();
        self.client.submit(request).await;

        let result = self.client.register().await;
        if let Err(e) = &result {
            warn!(service = %service, error = %e, "service registration failed, keep trying registration");
            self.ensure_watching();
        }
        result
    }

    fn ensure_watching(&self) {
        let mut watch = self.watch.lock().unwrap_or_else(PoisonError::into_inner);
        let running = watch.as_ref().is_some_and(|task| !task.is_finished());
        if !running {
            *watch = Some(self.client.spawn_watch(self.token.child_token()));
        }
    }

    /// 后台重试循环是否仍在运行
    pub fn is_watching(&self) -> bool {
        self.watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// 停止后台重试并等待其结束
    pub async fn shutdown(&self) {
        self.token.cancel();
        let task = self
            .watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.join().await;
        }
        info!("registration agent stopped");
    }
}

impl Drop for RegistrationAgent {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
