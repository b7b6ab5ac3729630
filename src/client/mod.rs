//! 服务间调用客户端
//!
//! `ServiceClient` 绑定一个可被发现的服务名和 API 路径，
//! 组合 HTTP 传输、服务发现缓存和负载均衡器，回答“下一次调用该发往哪里”。
//! 实际的请求由调用方使用 [`ServiceClient::http`] 自行发出。

pub mod transport;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ClientConfig;
use crate::discovery::cache::TargetSnapshot;
use crate::discovery::discover::DiscoveryCache;
use crate::discovery::load_balancer::Balancer;
use crate::error::{Result, SgulregError};
use crate::registry::api::RegistryApi;
use crate::task::WatchTask;
use transport::HttpTransport;

/// 负载均衡的服务间调用客户端
///
/// # 示例
/// ```rust,no_run
/// use flare_sgulreg::client::ServiceClient;
/// use flare_sgulreg::config::ClientConfig;
///
/// # async fn demo() -> flare_sgulreg::Result<()> {
/// let client = ServiceClient::new("account", "/api/v1", &ClientConfig::default())?;
/// let endpoint = client.resolve_endpoint()?;
/// let response = client.http().get(format!("{}/users", endpoint)).send().await?;
/// # let _ = response;
/// # Ok(())
/// # }
/// ```
pub struct ServiceClient {
    service_name: String,
    api_path: String,
    transport: HttpTransport,
    balancer: Balancer,
    discovery: Arc<DiscoveryCache>,
    watch: Option<WatchTask>,
}

impl ServiceClient {
    /// 创建客户端并启动后台服务发现
    ///
    /// 立即返回，不等待注册中心可达。必须在 tokio 运行时中调用。
    /// 未知的负载均衡策略名称会直接报错。
    pub fn new(
        service_name: impl Into<String>,
        api_path: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self> {
        Self::with_token(service_name, api_path, config, CancellationToken::new())
    }

    /// 创建客户端，发现循环跟随外部的取消令牌
    ///
    /// 循环持有 `token` 的子令牌：外部取消会停止本客户端，
    /// 本客户端关闭或被丢弃时不会取消外部令牌
    pub fn with_token(
        service_name: impl Into<String>,
        api_path: impl Into<String>,
        config: &ClientConfig,
        token: CancellationToken,
    ) -> Result<Self> {
        let service_name = service_name.into();
        let api_path = api_path.into();

        let balancer = Balancer::new(config.balancing_strategy()?);
        let registry = &config.service_registry;
        let interval = registry.watch_interval();
        if interval.is_zero() {
            return Err(SgulregError::configuration("watch_interval_ms 必须大于 0"));
        }

        let transport = HttpTransport::from_config(config)?;
        let api = RegistryApi::new(registry.url.clone(), transport.clone());
        let discovery = Arc::new(DiscoveryCache::new(
            service_name.clone(),
            api_path.clone(),
            api,
            registry.fallback.clone(),
        ));
        let watch = discovery.spawn_watch(interval, token.child_token());

        info!(
            service = %service_name,
            api_path = %api_path,
            registry = %registry.url,
            strategy = %balancer.strategy(),
            "service client created"
        );

        Ok(Self {
            service_name,
            api_path,
            transport,
            balancer,
            discovery,
            watch: Some(watch),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn api_path(&self) -> &str {
        &self.api_path
    }

    pub fn balancer(&self) -> &Balancer {
        &self.balancer
    }

    /// 用于发出业务请求的 HTTP 客户端
    pub fn http(&self) -> &reqwest::Client {
        self.transport.client()
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// 服务发现缓存
    pub fn discovery(&self) -> &Arc<DiscoveryCache> {
        &self.discovery
    }

    /// 当前目标快照
    pub fn targets(&self) -> Arc<TargetSnapshot> {
        self.discovery.snapshot()
    }

    /// 解析下一次调用的端点
    ///
    /// 发现到的目标已经带有绑定的 API 路径；回退地址按配置原样使用。
    /// 没有任何目标时返回 `NoTargetsAvailable`。
    pub fn resolve_endpoint(&self) -> Result<String> {
        let snapshot = self.discovery.snapshot();
        self.balancer
            .next(&self.service_name, &snapshot.targets)
            .map(str::to_string)
    }

    /// 解析端点并拼接请求路径
    pub fn endpoint_for(&self, path: &str) -> Result<String> {
        let endpoint = self.resolve_endpoint()?;
        Ok(join_path(&endpoint, path))
    }

    /// 停止后台服务发现并等待其结束
    pub async fn shutdown(mut self) {
        if let Some(watch) = self.watch.take() {
            watch.shutdown().await;
        }
    }
}

impl Drop for ServiceClient {
    fn drop(&mut self) {
        if let Some(watch) = &self.watch {
            watch.stop();
        }
    }
}

fn join_path(endpoint: &str, path: &str) -> String {
    match (endpoint.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", endpoint, &path[1..]),
        (false, false) if !path.is_empty() => format!("{}/{}", endpoint, path),
        _ => format!("{}{}", endpoint, path),
    }
}
