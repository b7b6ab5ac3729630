//! Flare SgulREG Client
//!
//! Client-side companion to the SgulREG service registry: announces this
//! process to the registry (retrying until acknowledged), resolves other
//! services by name into a cached target list with static fallback, and
//! load-balances outgoing calls across the cached endpoints.

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod registry;
pub mod task;
pub mod types;

// Re-exports
pub use client::ServiceClient;
pub use client::transport::HttpTransport;
pub use config::{
    BalancingConfig, ClientConfig, Config, LogConfig, RegistrationConfig, ServiceConfig,
    ServiceRegistryConfig,
};
pub use discovery::{Balancer, BalancingStrategy, DiscoveryCache, TargetCache, TargetSnapshot};
pub use error::{ErrorCategory, ErrorCode, Result, SgulregError};
pub use registry::{RegistrationAgent, RegistrationClient, RegistryApi};
pub use task::WatchTask;
pub use types::{InstanceInfo, RegistrationRequest, RegistrationResponse, ServiceInfo};
