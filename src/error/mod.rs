//! 错误处理模块
//!
//! 服务发现和注册的失败都在本地被吸收（回退策略或无限重试），
//! 只有 `NoTargetsAvailable` 会作为终态错误返回给调用方

pub mod code;

pub use code::{ErrorCategory, ErrorCode};

use thiserror::Error;

/// SgulREG 客户端统一错误类型
#[derive(Error, Debug)]
pub enum SgulregError {
    /// 服务发现请求失败（网络/传输层）
    #[error("服务发现请求失败 [{service}]: {reason}")]
    DiscoveryRequestFailed { service: String, reason: String },

    /// 服务发现响应无法读取或解析
    #[error("无法读取服务发现响应 [{service}]: {reason}")]
    DiscoveryResponseUnreadable { service: String, reason: String },

    /// 没有可用的目标地址（缓存为空且没有配置回退地址）
    #[error("服务 {service} 没有可用的目标地址")]
    NoTargetsAvailable { service: String },

    /// 服务注册失败（会被自动重试）
    #[error("服务注册失败 [{service}]: {reason}")]
    RegistrationFailed { service: String, reason: String },

    /// 未知的负载均衡策略
    #[error("未知的负载均衡策略: {0}")]
    UnknownStrategy(String),

    /// HTTP 传输构建或调用失败
    #[error("HTTP 传输错误: {0}")]
    Transport(#[from] reqwest::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Configuration(String),
}

impl SgulregError {
    /// 创建发现请求失败错误
    pub fn discovery_request_failed(service: impl Into<String>, reason: impl ToString) -> Self {
        SgulregError::DiscoveryRequestFailed {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建发现响应不可读错误
    pub fn discovery_response_unreadable(service: impl Into<String>, reason: impl ToString) -> Self {
        SgulregError::DiscoveryResponseUnreadable {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建无可用目标错误
    pub fn no_targets_available(service: impl Into<String>) -> Self {
        SgulregError::NoTargetsAvailable {
            service: service.into(),
        }
    }

    /// 创建注册失败错误
    pub fn registration_failed(service: impl Into<String>, reason: impl ToString) -> Self {
        SgulregError::RegistrationFailed {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建配置错误
    pub fn configuration(msg: impl Into<String>) -> Self {
        SgulregError::Configuration(msg.into())
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            SgulregError::DiscoveryRequestFailed { .. } => ErrorCode::DiscoveryRequestFailed,
            SgulregError::DiscoveryResponseUnreadable { .. } => {
                ErrorCode::DiscoveryResponseUnreadable
            }
            SgulregError::NoTargetsAvailable { .. } => ErrorCode::NoTargetsAvailable,
            SgulregError::RegistrationFailed { .. } => ErrorCode::RegistrationFailed,
            SgulregError::UnknownStrategy(_) => ErrorCode::UnknownStrategy,
            SgulregError::Transport(_) => ErrorCode::TransportError,
            SgulregError::Configuration(_) => ErrorCode::ConfigurationError,
        }
    }

    /// 判断是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, SgulregError>;
