//! 类型系统模块：对话轮次与标准化助手消息。
//!
//! # Types Module
//!
//! Provider-agnostic conversation types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | One conversation turn (user or assistant) |
//! | [`MessageContent`] | Plain text or ordered content blocks |
//! | [`ContentBlock`] | Text block or tool-result block |
//! | [`AssistantMessage`] | Normalized assistant turn with cost and duration metadata |
//!
//! ## Example
//!
//! ```rust
//! use ai_conductor::types::{ContentBlock, Message, MessageContent, MessageRole};
//!
//! let question = Message::user("What's in my notes?");
//! let mixed = Message::with_content(
//!     MessageRole::User,
//!     MessageContent::blocks(vec![ContentBlock::text("see attached")]),
//! );
//! assert_eq!(mixed.flattened_text(), "see attached");
//! # let _ = question;
//! ```

pub mod assistant;
pub mod message;

pub use assistant::{ApiMessage, AssistantMessage, Usage};
pub use message::{ContentBlock, Message, MessageContent, MessageRole};
