//! 服务注册模块
//!
//! 本地身份 → 注册中心，失败后在后台无限重试

pub mod agent;
pub mod api;
pub mod client;

pub use agent::RegistrationAgent;
pub use api::RegistryApi;
pub use client::RegistrationClient;
