//! # ai-conductor
//!
//! 面向 Gemini 的弹性会话运行时：重试、工具调用分发、成本核算与录制回放。
//!
//! Resilient conversation runtime for Google Gemini. One top-level call formats the
//! conversation, sends it through a record/replay layer and a bounded retry loop,
//! runs at most one round of model-requested tool calls, and books the cost.
//!
//! ## Call Flow
//!
//! ```text
//! query(messages, system_prompt, tools)
//!   └─ GeminiDriver::build_request          (MessageAdapter)
//!      └─ ConversationRecorder::with_recording   (VCR)
//!         └─ RetryExecutor::execute
//!            └─ ModelTransport::generate_content
//!   └─ ToolCallDispatcher::dispatch         (≤ 1 follow-up round trip)
//!   └─ CostAccountant::record               (process-wide CostLedger)
//! ```
//!
//! Loading a persisted session runs separately through
//! [`conversation::load_messages_from_log`], which rehydrates tool references.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_conductor::{GeminiClient, Message, ToolSet};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> ai_conductor::Result<()> {
//!     // Requires GOOGLE_API_KEY.
//!     let client = GeminiClient::from_env()?;
//!     let turn = client
//!         .query(
//!             &[Message::user("Hello, how are you?")],
//!             &["You are a concise assistant.".to_string()],
//!             &ToolSet::new(),
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!     println!("{} (${:.6})", turn.text(), turn.cost_usd);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Session handle, builder and shared process-wide handle |
//! | [`config`] | Environment configuration and user agent |
//! | [`conversation`] | Persisted log entries, loading and tool rehydration |
//! | [`drivers`] | Gemini wire format and response parsing |
//! | [`resilience`] | Retry policy and executor |
//! | [`tokens`] | Pricing, usage records and the cost ledger |
//! | [`tools`] | Tool trait, tool sets and function-call dispatch |
//! | [`transport`] | HTTP transport and failure classification |
//! | [`types`] | Conversation turns and normalized assistant messages |
//! | [`vcr`] | Record/replay of provider round trips |

pub mod client;
pub mod config;
pub mod conversation;
pub mod drivers;
pub mod error_code;
pub mod resilience;
pub mod tokens;
pub mod tools;
pub mod transport;
pub mod types;
pub mod vcr;

pub use client::{reset_shared_client, shared_client, GeminiClient, GeminiClientBuilder};
pub use config::ClientConfig;
pub use conversation::{load_messages_from_log, ConversationEntry, ConversationRehydrator};
pub use error_code::ProviderErrorCode;
pub use resilience::{RetryExecutor, RetryPolicy};
pub use tokens::{CostAccountant, CostLedger, ModelPricing};
pub use tools::{Tool, ToolCallDispatcher, ToolSet};
pub use types::{AssistantMessage, ContentBlock, Message, MessageContent, MessageRole};
pub use vcr::{ConversationRecorder, VcrMode};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
