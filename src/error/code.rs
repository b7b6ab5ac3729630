//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误代码枚举
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 服务发现相关错误
/// - 2000-2999: 服务注册相关错误
/// - 3000-3999: 负载均衡相关错误
/// - 6000-6999: 系统相关错误（配置、传输）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 服务发现相关错误 (1000-1999)
    // ============================================================
    DiscoveryRequestFailed = 1000,
    DiscoveryResponseUnreadable = 1001,

    // ============================================================
    // 服务注册相关错误 (2000-2999)
    // ============================================================
    RegistrationFailed = 2000,

    // ============================================================
    // 负载均衡相关错误 (3000-3999)
    // ============================================================
    NoTargetsAvailable = 3000,
    UnknownStrategy = 3001,

    // ============================================================
    // 系统相关错误 (6000-6999)
    // ============================================================
    ConfigurationError = 6000,
    TransportError = 6001,
}

impl ErrorCode {
    /// 获取数值代码
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 获取字符串代码
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DiscoveryRequestFailed => "DISCOVERY_REQUEST_FAILED",
            ErrorCode::DiscoveryResponseUnreadable => "DISCOVERY_RESPONSE_UNREADABLE",
            ErrorCode::RegistrationFailed => "REGISTRATION_FAILED",
            ErrorCode::NoTargetsAvailable => "NO_TARGETS_AVAILABLE",
            ErrorCode::UnknownStrategy => "UNKNOWN_STRATEGY",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::TransportError => "TRANSPORT_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Discovery,
            2000..=2999 => ErrorCategory::Registration,
            3000..=3999 => ErrorCategory::Balancing,
            _ => ErrorCategory::System,
        }
    }

    /// 判断是否为可重试的错误
    ///
    /// 注册中心暂时不可达时，发现和注册都会在下一个周期自动重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::DiscoveryRequestFailed
                | ErrorCode::DiscoveryResponseUnreadable
                | ErrorCode::RegistrationFailed
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Discovery,
    Registration,
    Balancing,
    System,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Discovery => write!(f, "DISCOVERY"),
            ErrorCategory::Registration => write!(f, "REGISTRATION"),
            ErrorCategory::Balancing => write!(f, "BALANCING"),
            ErrorCategory::System => write!(f, "SYSTEM"),
        }
    }
}
