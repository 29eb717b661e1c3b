//! 有限次数的固定间隔重试

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::LlmError;

/// 重试策略：最多 `max_attempts` 次，两次之间固定等待 `delay`
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// 执行 `op`，仅对瞬时错误重试
///
/// 非瞬时错误立即返回；瞬时错误用尽次数后返回 [`LlmError::RetriesExhausted`]。
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, LlmError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= policy.max_attempts => {
                return Err(LlmError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                warn!(
                    "⚠️ 第 {}/{} 次调用失败: {}，{:?} 后重试",
                    attempt, policy.max_attempts, e, policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
