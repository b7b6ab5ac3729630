//! 日志初始化
//!
//! 注册和发现的生命周期事件都通过 `tracing` 输出结构化日志，
//! 这里按配置安装 fmt 订阅者。`RUST_LOG` 优先于配置中的级别。

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;
use crate::error::{Result, SgulregError};

/// 构建日志过滤器
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            SgulregError::configuration(format!("无效的日志级别 {}: {}", config.level, e))
        }),
    }
}

/// 安装全局日志订阅者
///
/// 进程内只能安装一次，重复安装返回配置错误
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_target(config.caller)
            .with_line_number(config.caller)
    });
    let text_layer = (!config.json).then(|| {
        fmt::layer()
            .with_target(config.caller)
            .with_line_number(config.caller)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| SgulregError::configuration(format!("日志订阅者已安装: {}", e)))
}
