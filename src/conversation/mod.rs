//! 会话持久化模块：消息日志条目、日志加载与工具引用恢复。
//!
//! # Conversation Module
//!
//! Persisted logs are JSON arrays of [`ConversationEntry`] values. Assistant and
//! progress entries store their tools by name only; [`ConversationRehydrator`]
//! restores the live [`crate::tools::ToolSet`] on load.
//!
//! ```rust,no_run
//! use ai_conductor::conversation::load_messages_from_log;
//! use ai_conductor::tools::ToolSet;
//!
//! # async fn run() -> ai_conductor::Result<()> {
//! let entries = load_messages_from_log("session.json", &ToolSet::new()).await?;
//! println!("{} entries", entries.len());
//! # Ok(())
//! # }
//! ```

mod entry;
mod rehydrate;

pub use entry::{messages_of, ConversationEntry, ProgressEntry, UserEntry};
pub use rehydrate::{load_messages_from_log, rehydrate, ConversationRehydrator};
