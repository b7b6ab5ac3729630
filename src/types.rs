//! 注册中心协议数据结构
//!
//! 注册和发现两个方向共用的 JSON 线上格式

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 服务注册请求
///
/// 标识一个服务实例。每次注册尝试提交的内容不可变，
/// 两次尝试之间可以整体替换（以最后一次提交为准）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// 服务名称（发现时使用的逻辑名）
    pub name: String,
    /// 实例地址，形如 `10.0.0.1:8080`
    pub host: String,
    /// 协议（http / https）
    pub schema: String,
    #[serde(alias = "infoURL")]
    pub info_url: String,
    #[serde(alias = "healthCheckURL")]
    pub health_check_url: String,
}

impl RegistrationRequest {
    /// 创建新的注册请求
    pub fn new(name: impl Into<String>, host: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            schema: schema.into(),
            info_url: String::new(),
            health_check_url: String::new(),
        }
    }

    /// 设置信息页地址
    pub fn with_info_url(mut self, url: impl Into<String>) -> Self {
        self.info_url = url.into();
        self
    }

    /// 设置健康检查地址
    pub fn with_health_check_url(mut self, url: impl Into<String>) -> Self {
        self.health_check_url = url.into();
        self
    }
}

/// 服务注册响应
///
/// 注册中心确认后的记录，内容不透明，只用于日志和诊断
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct RegistrationResponse(pub serde_json::Value);

impl RegistrationResponse {
    /// 注册中心分配的实例 ID（如果响应中带有）
    pub fn instance_id(&self) -> Option<&str> {
        self.0.get("instanceId").and_then(|v| v.as_str())
    }
}

/// 服务实例信息（由注册中心维护，客户端只读）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    #[serde(default)]
    pub instance_id: String,
    pub host: String,
    pub schema: String,
    #[serde(default, alias = "infoURL")]
    pub info_url: String,
    #[serde(default, alias = "healthCheckURL")]
    pub health_check_url: String,
    #[serde(default)]
    pub registration_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_refresh_timestamp: Option<DateTime<Utc>>,
}

impl InstanceInfo {
    /// 实例根地址：`schema://host`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.schema, self.host)
    }

    /// 拼接 API 路径后的完整端点
    pub fn endpoint(&self, api_path: &str) -> String {
        format!("{}{}", self.base_url(), api_path)
    }
}

/// 服务发现结果
///
/// 实例顺序没有语义，注册中心不保证顺序
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instances: Vec<InstanceInfo>,
}

impl ServiceInfo {
    /// 按收到的顺序生成端点列表
    pub fn endpoints(&self, api_path: &str) -> Vec<String> {
        self.instances
            .iter()
            .map(|instance| instance.endpoint(api_path))
            .collect()
    }
}
