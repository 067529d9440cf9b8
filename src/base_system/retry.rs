//! 线性退避重试策略。
//!
//! 探测与逐段下载共用同一个策略对象：`max_attempts` 为总尝试次数（含首次），
//! 第 n 次失败后等待 `n × base_delay` 再发起下一次。

use std::time::Duration;

use tracing::warn;

/// 错误自身决定是否值得再试一次。
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(3, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// 只尝试一次，不等待。
    pub fn single() -> Self {
        Self::linear(1, Duration::ZERO)
    }

    /// 第 `attempt` 次（从 1 开始）失败后的等待时间。
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    pub fn is_retryable<E: Retryable>(&self, err: &E) -> bool {
        err.is_retryable()
    }

    /// 执行 `op`，直到成功、遇到不可重试错误或用尽次数；失败时返回最后一次的错误。
    ///
    /// `op` 的参数是当前尝试序号（从 1 开始）。
    pub fn run<T, E, F>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(v) => return Ok(v),
                Err(err) => {
                    if !self.is_retryable(&err) || attempt >= self.max_attempts {
                        return Err(err);
                    }
                    let delay = self.backoff(attempt);
                    warn!(
                        target: "retry",
                        "{label} 第 {attempt}/{} 次失败: {err}，{} ms 后重试",
                        self.max_attempts,
                        delay.as_millis()
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum TestErr {
        Transient(u32),
        Fatal,
    }

    impl std::fmt::Display for TestErr {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestErr::Transient(n) => write!(f, "transient #{n}"),
                TestErr::Fatal => write!(f, "fatal"),
            }
        }
    }

    impl Retryable for TestErr {
        fn is_retryable(&self) -> bool {
            matches!(self, TestErr::Transient(_))
        }
    }

    #[test]
    fn backoff_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
    }

    #[test]
    fn exhausts_attempts_and_returns_last_error() {
        let policy = RetryPolicy::linear(3, Duration::ZERO);
        let mut calls = Vec::new();
        let res: Result<(), TestErr> = policy.run("t", |n| {
            calls.push(n);
            Err(TestErr::Transient(n))
        });
        assert_eq!(calls, vec![1, 2, 3]);
        assert!(matches!(res, Err(TestErr::Transient(3))));
    }

    #[test]
    fn fatal_error_stops_immediately() {
        let policy = RetryPolicy::linear(3, Duration::ZERO);
        let mut calls = 0;
        let res: Result<(), TestErr> = policy.run("t", |_| {
            calls += 1;
            Err(TestErr::Fatal)
        });
        assert_eq!(calls, 1);
        assert!(matches!(res, Err(TestErr::Fatal)));
    }

    #[test]
    fn succeeds_after_transient_failure() {
        let policy = RetryPolicy::linear(3, Duration::ZERO);
        let res: Result<u32, TestErr> = policy.run("t", |n| {
            if n == 1 {
                Err(TestErr::Transient(n))
            } else {
                Ok(n)
            }
        });
        assert_eq!(res.unwrap(), 2);
    }

    #[test]
    fn single_never_retries() {
        let policy = RetryPolicy::single();
        let mut calls = 0;
        let _: Result<(), TestErr> = policy.run("t", |n| {
            calls += 1;
            Err(TestErr::Transient(n))
        });
        assert_eq!(calls, 1);
    }
}
