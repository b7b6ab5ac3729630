//! 后台监视任务
//!
//! 注册重试和服务发现的循环都以 `WatchTask` 的形式运行：
//! 每个循环持有一个取消令牌，每个周期检查一次，
//! 便于测试和优雅停机时确定性地终止。

use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 后台监视任务句柄
#[derive(Debug)]
pub struct WatchTask {
    name: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl WatchTask {
    /// 启动监视任务
    ///
    /// `future_fn` 接收取消令牌，返回的 Future 应该在令牌取消后尽快结束
    ///
    /// # 示例
    /// ```rust,no_run
    /// use flare_sgulreg::task::WatchTask;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn demo() {
    /// let task = WatchTask::spawn("demo", CancellationToken::new(), |token| async move {
    ///     token.cancelled().await;
    /// });
    /// task.shutdown().await;
    /// # }
    /// ```
    pub fn spawn<F, Fut>(name: impl Into<String>, token: CancellationToken, future_fn: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future_fn(token.clone()));
        debug!(task_name = %name, "watch task started");

        Self {
            name,
            token,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 获取取消令牌的克隆
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// 发出停止信号（不等待任务结束）
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            debug!(task_name = %self.name, "stopping watch task");
            self.token.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 循环是否已经退出
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 等待任务自然结束
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            warn!(task_name = %self.name, error = %e, "watch task terminated abnormally");
        }
    }

    /// 停止并等待任务结束
    pub async fn shutdown(self) {
        self.stop();
        self.join().await;
    }
}
