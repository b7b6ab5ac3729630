//! 服务发现与负载均衡模块
//!
//! 注册中心 → 目标缓存 → 负载均衡器 → 调用方，数据单向流动

pub mod cache;
pub mod discover;
pub mod load_balancer;

pub use cache::{CacheUpdate, TargetCache, TargetSnapshot};
pub use discover::DiscoveryCache;
pub use load_balancer::{Balancer, BalancingStrategy};
