//! 弹性模式模块：带指数退避的有界重试执行器。
//!
//! # Resilience Module
//!
//! Bounded retry with exponential backoff around any fallible async operation.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RetryPolicy`] | Base delay, attempt limit, delay cap and retryable predicate |
//! | [`RetryExecutor`] | Runs attempts sequentially, honouring cancellation between and during attempts |
//!
//! ```rust
//! use std::time::Duration;
//! use ai_conductor::resilience::RetryPolicy;
//!
//! let policy = RetryPolicy::default();
//! assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(4_000));
//! assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(32_000));
//! ```

pub mod retry;

pub use retry::{RetryExecutor, RetryPolicy};
