//! 负载均衡模块
//!
//! 从目标地址列表中为每次调用选择一个端点。策略集合是封闭的，
//! 用枚举表示，选择逻辑用穷尽匹配实现。

use rand::Rng;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, SgulregError};

/// 负载均衡策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancingStrategy {
    /// 轮询
    #[default]
    RoundRobin,
    /// 随机
    Random,
}

impl BalancingStrategy {
    /// 配置中使用的策略名称
    pub fn as_str(&self) -> &'static str {
        match self {
            BalancingStrategy::RoundRobin => "round-robin",
            BalancingStrategy::Random => "random",
        }
    }
}

impl fmt::Display for BalancingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 按名称解析策略（区分大小写），未知名称直接报错，不做默认回退
impl FromStr for BalancingStrategy {
    type Err = SgulregError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "round-robin" => Ok(BalancingStrategy::RoundRobin),
            "random" => Ok(BalancingStrategy::Random),
            _ => Err(SgulregError::UnknownStrategy(s.to_string())),
        }
    }
}

/// 负载均衡器
///
/// 轮询游标由同一个实例的所有调用方共享，每次调用恰好前进一步
#[derive(Debug)]
pub struct Balancer {
    strategy: BalancingStrategy,
    cursor: AtomicUsize,
}

impl Balancer {
    /// 创建新的负载均衡器
    pub fn new(strategy: BalancingStrategy) -> Self {
        Self {
            strategy,
            cursor: AtomicUsize::new(0),
        }
    }

    /// 按策略名称创建
    pub fn for_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn strategy(&self) -> BalancingStrategy {
        self.strategy
    }

    /// 选择一个目标
    ///
    /// 目标列表为空时返回 `NoTargetsAvailable`，`service` 只用于错误信息
    pub fn next<'a>(&self, service: &str, targets: &'a [String]) -> Result<&'a str> {
        if targets.is_empty() {
            return Err(SgulregError::no_targets_available(service));
        }

        let index = match self.strategy {
            BalancingStrategy::RoundRobin => self.next_round_robin(targets.len()),
            BalancingStrategy::Random => rand::thread_rng().gen_range(0..targets.len()),
        };

        Ok(targets[index].as_str())
    }

    /// 轮询选择
    fn next_round_robin(&self, len: usize) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % len
    }
}

impl Default for Balancer {
    fn default() -> Self {
        Self::new(BalancingStrategy::RoundRobin)
    }
}
