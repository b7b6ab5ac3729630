//! 服务发现缓存
//!
//! 周期性地向注册中心解析指定服务的实例，维护本地目标缓存，
//! 注册中心不可达或返回空列表时应用回退策略。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::discovery::cache::{CacheUpdate, TargetCache, TargetSnapshot};
use crate::error::Result;
use crate::registry::api::RegistryApi;
use crate::task::WatchTask;

/// 服务发现缓存
///
/// 绑定一个逻辑服务名和调用方指定的 API 路径
pub struct DiscoveryCache {
    service_name: String,
    api_path: String,
    api: RegistryApi,
    fallback: Vec<String>,
    cache: TargetCache,
    // 每次发现调用开始前领取的代次，用于丢弃乱序完成的旧结果
    next_generation: AtomicU64,
}

impl DiscoveryCache {
    pub fn new(
        service_name: impl Into<String>,
        api_path: impl Into<String>,
        api: RegistryApi,
        fallback: Vec<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            api_path: api_path.into(),
            api,
            fallback,
            cache: TargetCache::new(),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn api_path(&self) -> &str {
        &self.api_path
    }

    pub fn fallback(&self) -> &[String] {
        &self.fallback
    }

    /// 当前目标快照
    pub fn snapshot(&self) -> Arc<TargetSnapshot> {
        self.cache.snapshot()
    }

    /// 执行一次服务发现
    ///
    /// 成功且实例非空时整体替换缓存；请求失败、响应不可读或实例为空时应用回退策略。
    /// 返回的错误只用于日志，缓存已经按回退策略处理过。
    pub async fn discover(&self) -> Result<Arc<TargetSnapshot>> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        debug!(service = %self.service_name, generation, "discovering endpoints");

        let service_info = match self.api.discover(&self.service_name).await {
            Ok(info) => info,
            Err(e) => {
                error!(service = %self.service_name, error = %e, "service discovery failed");
                self.fallback_discovery(generation);
                return Err(e);
            }
        };

        for instance in &service_info.instances {
            debug!(
                service = %self.service_name,
                instance_id = %instance.instance_id,
                host = %instance.host,
                "discovered service endpoint"
            );
        }

        let endpoints = service_info.endpoints(&self.api_path);
        if endpoints.is_empty() {
            self.fallback_discovery(generation);
            return Ok(self.cache.snapshot());
        }

        match self.cache.replace(generation, endpoints) {
            CacheUpdate::Replaced => {
                let snapshot = self.cache.snapshot();
                info!(
                    service = %self.service_name,
                    endpoints = ?snapshot.targets,
                    "discovered service endpoints"
                );
                Ok(snapshot)
            }
            _ => {
                debug!(
                    service = %self.service_name,
                    generation,
                    "discarding out-of-order discovery result"
                );
                Ok(self.cache.snapshot())
            }
        }
    }

    /// 回退策略：缓存为空时才使用回退列表
    fn fallback_discovery(&self, generation: u64) {
        match self.cache.apply_fallback(generation, &self.fallback) {
            CacheUpdate::Replaced => info!(
                service = %self.service_name,
                fallback = ?self.fallback,
                "using fallback registry"
            ),
            CacheUpdate::KeptExisting => info!(
                service = %self.service_name,
                endpoints = ?self.cache.snapshot().targets,
                "continue using local registry"
            ),
            CacheUpdate::Stale => debug!(
                service = %self.service_name,
                generation,
                "discarding out-of-order fallback"
            ),
        }
    }

    /// 服务发现循环
    ///
    /// 每个周期在后台发起一次发现（不等待上一次完成），令牌取消后退出。
    /// 第一个周期立即触发。
    pub async fn watch(self: Arc<Self>, interval: Duration, token: CancellationToken) {
        debug!(service = %self.service_name, interval = ?interval, "start watching service registry");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!(service = %self.service_name, "🛑 discovery watch stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let cache = Arc::clone(&self);
                    tokio::spawn(async move {
                        // 失败已经记录并由回退策略处理
                        let _ = cache.discover().await;
                    });
                }
            }
        }
    }

    /// 在后台启动服务发现循环
    pub fn spawn_watch(self: &Arc<Self>, interval: Duration, token: CancellationToken) -> WatchTask {
        let cache = Arc::clone(self);
        let name = format!("sgulreg-discovery-{}", self.service_name);
        WatchTask::spawn(name, token, move |token| cache.watch(interval, token))
    }
}

impl std::fmt::Debug for DiscoveryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryCache")
            .field("service_name", &self.service_name)
            .field("api_path", &self.api_path)
            .field("registry", &self.api.base_url())
            .field("fallback", &self.fallback)
            .finish()
    }
}

