//! 客户端配置
//!
//! 从 TOML 文件加载，所有字段都有默认值，未配置的段落使用默认配置

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::discovery::load_balancer::BalancingStrategy;
use crate::error::{Result, SgulregError};

/// 默认的 SgulREG 注册中心地址
pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:9687";

/// 目前唯一支持的注册中心类型
pub const SGULREG_REGISTRY_TYPE: &str = "sgulreg";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub client: ClientConfig,
    pub registration: RegistrationConfig,
    pub log: LogConfig,
}

/// 当前服务的身份信息
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub group: String,
    pub name: String,
    pub version: String,
}

/// HTTP 客户端配置（服务间调用）
///
/// 超时单位均为毫秒
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 整个请求的超时（含连接、重定向和读取响应体），默认 120 秒
    pub timeout_ms: u64,
    /// TCP 建连超时，默认 2 秒
    pub dialer_timeout_ms: u64,
    /// TLS 握手超时，默认 10 秒
    pub tls_handshake_timeout_ms: u64,
    /// `Expect: 100-continue` 等待超时，默认 4 秒
    pub expect_continue_timeout_ms: u64,
    /// 请求发送完成后等待响应头的超时，默认 10 秒
    pub response_header_timeout_ms: u64,
    pub service_registry: ServiceRegistryConfig,
    pub balancing: BalancingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
            dialer_timeout_ms: 2_000,
            tls_handshake_timeout_ms: 10_000,
            expect_continue_timeout_ms: 4_000,
            response_header_timeout_ms: 10_000,
            service_registry: ServiceRegistryConfig::default(),
            balancing: BalancingConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn dialer_timeout(&self) -> Duration {
        Duration::from_millis(self.dialer_timeout_ms)
    }

    pub fn tls_handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.tls_handshake_timeout_ms)
    }

    pub fn expect_continue_timeout(&self) -> Duration {
        Duration::from_millis(self.expect_continue_timeout_ms)
    }

    pub fn response_header_timeout(&self) -> Duration {
        Duration::from_millis(self.response_header_timeout_ms)
    }

    /// 解析负载均衡策略
    pub fn balancing_strategy(&self) -> Result<BalancingStrategy> {
        self.balancing.strategy.parse()
    }
}

/// 注册中心配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceRegistryConfig {
    /// 注册中心类型，目前只支持 "sgulreg"
    #[serde(rename = "type")]
    pub registry_type: String,
    /// 注册中心地址，形如 `http://<host>:<port>`，不带结尾斜杠
    pub url: String,
    /// 回退地址列表
    ///
    /// 本地缓存为空且注册中心不可达（或返回空实例列表）时使用
    pub fallback: Vec<String>,
    /// 两次服务发现之间的间隔（毫秒），默认 2 秒
    pub watch_interval_ms: u64,
}

impl Default for ServiceRegistryConfig {
    fn default() -> Self {
        Self {
            registry_type: SGULREG_REGISTRY_TYPE.to_string(),
            url: DEFAULT_REGISTRY_URL.to_string(),
            fallback: Vec::new(),
            watch_interval_ms: 2_000,
        }
    }
}

impl ServiceRegistryConfig {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

/// 负载均衡配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancingConfig {
    /// "round-robin" 或 "random"（区分大小写）
    pub strategy: String,
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            strategy: BalancingStrategy::RoundRobin.as_str().to_string(),
        }
    }
}

/// 服务注册配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// 注册失败后的重试间隔（毫秒），默认 2 秒
    pub retry_interval_ms: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: 2_000,
        }
    }
}

impl RegistrationConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// 日志级别或 `EnvFilter` 指令，`RUST_LOG` 优先
    pub level: String,
    /// 是否输出 JSON 格式
    pub json: bool,
    /// 是否输出日志目标和行号
    pub caller: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            caller: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SgulregError::configuration(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| SgulregError::configuration(format!("配置文件格式错误: {}", e)))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 按约定位置加载配置
    ///
    /// 依次在 `.` 和 `./config` 中查找 `config.toml`；
    /// 设置了 `ENV` 环境变量时查找 `config-{ENV}.toml`
    pub fn load() -> Result<Self> {
        let file_name = config_file_name(std::env::var("ENV").ok().as_deref());
        let path = [PathBuf::from("."), PathBuf::from("./config")]
            .into_iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                SgulregError::configuration(format!("找不到配置文件 {}", file_name))
            })?;

        tracing::debug!(path = %path.display(), "loading configuration");
        Self::load_from_file(path)
    }

    /// 环境变量覆盖
    ///
    /// - `SGULREG_URL`: 注册中心地址
    /// - `SGULREG_BALANCING`: 负载均衡策略
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SGULREG_URL") {
            if !url.is_empty() {
                self.client.service_registry.url = url;
            }
        }
        if let Ok(strategy) = std::env::var("SGULREG_BALANCING") {
            if !strategy.is_empty() {
                self.client.balancing.strategy = strategy;
            }
        }
    }

    /// 校验配置，并去掉注册中心地址的结尾斜杠
    pub fn validate(&mut self) -> Result<()> {
        let registry = &mut self.client.service_registry;
        if registry.registry_type != SGULREG_REGISTRY_TYPE {
            return Err(SgulregError::configuration(format!(
                "不支持的注册中心类型: {}",
                registry.registry_type
            )));
        }

        let trimmed = registry.url.trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(SgulregError::configuration("注册中心地址不能为空"));
        }
        registry.url = trimmed;

        if registry.watch_interval_ms == 0 {
            return Err(SgulregError::configuration("watch_interval_ms 必须大于 0"));
        }
        if self.registration.retry_interval_ms == 0 {
            return Err(SgulregError::configuration("retry_interval_ms 必须大于 0"));
        }

        self.client.balancing_strategy()?;
        Ok(())
    }
}

fn config_file_name(env: Option<&str>) -> String {
    match env {
        Some(env) if !env.is_empty() => format!("config-{}.toml", env),
        _ => "config.toml".to_string(),
    }
}

