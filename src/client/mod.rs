//! Gemini 客户端：会话句柄、构建器与进程级共享句柄。
//!
//! # Client Module
//!
//! [`GeminiClient`] is the explicit session handle. Build it once with
//! [`GeminiClientBuilder`] and share it by reference, or use [`shared_client`] for a
//! lazily created process-wide handle configured from the environment.
//!
//! Each provider round trip runs as recorder → retry → transport; a top-level
//! [`GeminiClient::query`] adds one optional tool round and cost accounting.

mod builder;
mod core;
mod shared;

pub use builder::GeminiClientBuilder;
pub use self::core::GeminiClient;
pub use shared::{install_shared_client, reset_shared_client, shared_client};
