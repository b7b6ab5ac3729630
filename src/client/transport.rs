//! HTTP 传输
//!
//! 按配置构建 reqwest 客户端，分阶段的超时映射如下：
//! - 建连超时 = dialer_timeout + tls_handshake_timeout（reqwest 的连接阶段包含 TLS 握手）
//! - 响应头超时作用于 `send()`，它在收到响应头时即完成
//! - 整体超时交给 reqwest 的 `timeout`
//!
//! 超时为 0 表示不限制。

use std::time::Duration;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::error::Result;

/// 单次发送失败的原因
#[derive(Error, Debug)]
pub enum SendError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("等待响应头超时 ({0:?})")]
    ResponseHeaderTimeout(Duration),
}

/// HTTP 传输
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    response_header_timeout: Option<Duration>,
    expect_continue_timeout: Duration,
}

impl HttpTransport {
    /// 按配置创建传输
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        let connect_timeout = config.dialer_timeout() + config.tls_handshake_timeout();
        if !connect_timeout.is_zero() {
            builder = builder.connect_timeout(connect_timeout);
        }
        if !config.timeout().is_zero() {
            builder = builder.timeout(config.timeout());
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            response_header_timeout: non_zero(config.response_header_timeout()),
            expect_continue_timeout: config.expect_continue_timeout(),
        })
    }

    /// 底层 reqwest 客户端，调用方用它发出实际的业务请求
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn response_header_timeout(&self) -> Option<Duration> {
        self.response_header_timeout
    }

    /// reqwest 不会发送 `Expect: 100-continue`，该值只做记录
    pub fn expect_continue_timeout(&self) -> Duration {
        self.expect_continue_timeout
    }

    /// 发送请求，直到收到响应头为止
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<reqwest::Response, SendError> {
        match self.response_header_timeout {
            Some(limit) => tokio::time::timeout(limit, request.send())
                .await
                .map_err(|_| SendError::ResponseHeaderTimeout(limit))?
                .map_err(SendError::from),
            None => request.send().await.map_err(SendError::from),
        }
    }
}

fn non_zero(duration: Duration) -> Option<Duration> {
    (!duration.is_zero()).then_some(duration)
}
