//! 目标地址缓存
//!
//! 每个服务一份不可变快照，写入时整体替换，读取时只克隆 `Arc`。
//! 读者永远看不到写了一半的列表，并发读也互不阻塞。

use std::sync::{Arc, PoisonError, RwLock};

/// 目标地址快照
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetSnapshot {
    /// 产生该快照的发现代次，0 表示初始空缓存
    pub generation: u64,
    /// 解析后的端点地址
    pub targets: Vec<String>,
    /// 是否来自回退配置
    pub from_fallback: bool,
}

impl TargetSnapshot {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

/// 快照替换的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUpdate {
    /// 新快照已生效
    Replaced,
    /// 缓存已有目标，保持不变
    KeptExisting,
    /// 更新的发现结果已经生效，本次结果被丢弃
    Stale,
}

/// 目标地址缓存
#[derive(Debug, Default)]
pub struct TargetCache {
    current: RwLock<Arc<TargetSnapshot>>,
}

impl TargetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前快照
    pub fn snapshot(&self) -> Arc<TargetSnapshot> {
        // 写入只做整体替换，锁中毒时内部值依然完整
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 用发现结果替换缓存
    ///
    /// 代次只在真实发现结果之间比较：比当前结果旧的被丢弃，
    /// 回退快照则总是被真实结果替换，即使它的代次更新
    pub fn replace(&self, generation: u64, targets: Vec<String>) -> CacheUpdate {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if !current.from_fallback && generation <= current.generation {
            return CacheUpdate::Stale;
        }

        *current = Arc::new(TargetSnapshot {
            generation,
            targets,
            from_fallback: false,
        });
        CacheUpdate::Replaced
    }

    /// 回退策略
    ///
    /// 缓存已有目标时保持不变（宁可用旧的已知可用地址，也不清空），
    /// 否则换成配置的回退列表（回退列表本身也可能为空）
    pub fn apply_fallback(&self, generation: u64, fallback: &[String]) -> CacheUpdate {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if !current.targets.is_empty() {
            return CacheUpdate::KeptExisting;
        }
        if generation <= current.generation {
            return CacheUpdate::Stale;
        }

        *current = Arc::new(TargetSnapshot {
            generation,
            targets: fallback.to_vec(),
            from_fallback: true,
        });
        CacheUpdate::Replaced
    }
}
