// ==========================================
// 商品目录批量导入导出 - 截止时间与取消信号
// ==========================================
// 职责: 每行开始前轮询一次；触发后不再开始新行
// ==========================================

use crate::domain::TruncationReason;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// 外部截止时间 + 可选取消信号
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Deadline {
    /// 从现在起 timeout 后到期
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + timeout),
            cancel: None,
        }
    }

    /// 指定到期时刻
    pub fn at(expires_at: Instant) -> Self {
        Self {
            expires_at: Some(expires_at),
            cancel: None,
        }
    }

    /// 永不到期（命令行工具使用）
    pub fn never() -> Self {
        Self {
            expires_at: None,
            cancel: None,
        }
    }

    /// 附加取消信号
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// 检查是否应停止
    ///
    /// # 返回
    /// - Some(reason): 已取消或已到期（取消优先）
    /// - None: 可以开始下一行
    pub fn check(&self) -> Option<TruncationReason> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(TruncationReason::Cancelled);
        }
        match self.expires_at {
            Some(at) if Instant::now() >= at => Some(TruncationReason::DeadlineExceeded),
            _ => None,
        }
    }
}

// ==========================================
// CancelHandle - 取消句柄（调用方持有）
// ==========================================
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// 创建句柄及其对应的接收端
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, rx)
    }

    pub fn cancel(&self) {
        // 接收端已全部释放时无需通知
        let _ = self.tx.send(true);
    }
}
