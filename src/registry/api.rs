//! SgulREG 注册中心 HTTP 接口
//!
//! - `POST {url}/sgulreg/services`           注册服务实例
//! - `GET  {url}/sgulreg/services`           获取全部服务
//! - `GET  {url}/sgulreg/services/{name}`    发现指定服务
//! - `GET  {url}/health`                     存活探测

use tracing::debug;

use crate::client::transport::HttpTransport;
use crate::error::{Result, SgulregError};
use crate::types::{RegistrationRequest, RegistrationResponse, ServiceInfo};

/// 注册中心的服务资源路径
pub const SERVICES_PATH: &str = "/sgulreg/services";

/// 注册中心 HTTP 客户端
#[derive(Debug, Clone)]
pub struct RegistryApi {
    base_url: String,
    transport: HttpTransport,
}

impl RegistryApi {
    /// `registry_url` 形如 `http://localhost:9687`，结尾斜杠会被去掉
    pub fn new(registry_url: impl Into<String>, transport: HttpTransport) -> Self {
        let base_url = registry_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    fn services_url(&self) -> String {
        format!("{}{}", self.base_url, SERVICES_PATH)
    }

    fn service_url(&self, service_name: &str) -> String {
        format!("{}{}/{}", self.base_url, SERVICES_PATH, service_name)
    }

    /// 注册服务实例
    pub async fn register(&self, request: &RegistrationRequest) -> Result<RegistrationResponse> {
        let service = request.name.as_str();
        let builder = self.transport.client().post(self.services_url()).json(request);

        let response = self
            .transport
            .send(builder)
            .await
            .map_err(|e| SgulregError::registration_failed(service, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SgulregError::registration_failed(
                service,
                format!("注册中心返回状态 {}", status),
            ));
        }

        response
            .json::<RegistrationResponse>()
            .await
            .map_err(|e| SgulregError::registration_failed(service, format!("无法解析注册响应: {}", e)))
    }

    /// 发现指定服务的全部实例
    pub async fn discover(&self, service_name: &str) -> Result<ServiceInfo> {
        let builder = self.transport.client().get(self.service_url(service_name));
        let response = self
            .transport
            .send(builder)
            .await
            .map_err(|e| SgulregError::discovery_request_failed(service_name, e))?;

        debug!(
            service = %service_name,
            status = %response.status(),
            content_length = ?response.content_length(),
            "discovery response received"
        );

        let status = response.status();
        if !status.is_success() {
            return Err(SgulregError::discovery_request_failed(
                service_name,
                format!("注册中心返回状态 {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SgulregError::discovery_response_unreadable(service_name, e))?;

        serde_json::from_slice::<ServiceInfo>(&body)
            .map_err(|e| SgulregError::discovery_response_unreadable(service_name, e))
    }

    /// 获取注册中心中的全部服务
    pub async fn discover_all(&self) -> Result<Vec<ServiceInfo>> {
        const ALL: &str = "*";

        let builder = self.transport.client().get(self.services_url());
        let response = self
            .transport
            .send(builder)
            .await
            .map_err(|e| SgulregError::discovery_request_failed(ALL, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SgulregError::discovery_request_failed(
                ALL,
                format!("注册中心返回状态 {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SgulregError::discovery_response_unreadable(ALL, e))?;

        serde_json::from_slice::<Vec<ServiceInfo>>(&body)
            .map_err(|e| SgulregError::discovery_response_unreadable(ALL, e))
    }

    /// 存活探测，只看状态码
    pub async fn health(&self) -> bool {
        let builder = self
            .transport
            .client()
            .get(format!("{}/health", self.base_url));

        match self.transport.send(builder).await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(registry = %self.base_url, error = %e, "registry health probe failed");
                false
            }
        }
    }
}
