//! Persisted conversation entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tools::ToolRefs;
use crate::types::{AssistantMessage, Message};

/// One entry of a persisted message log, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConversationEntry {
    User(UserEntry),
    Assistant(AssistantMessage),
    Progress(ProgressEntry),
}

impl ConversationEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            ConversationEntry::User(_) => "user",
            ConversationEntry::Assistant(_) => "assistant",
            ConversationEntry::Progress(_) => "progress",
        }
    }

    pub fn uuid(&self) -> &str {
        match self {
            ConversationEntry::User(u) => &u.uuid,
            ConversationEntry::Assistant(a) => &a.uuid,
            ConversationEntry::Progress(p) => &p.uuid,
        }
    }

    /// Tool references, for the entry kinds that carry them.
    pub fn tools(&self) -> Option<&ToolRefs> {
        match self {
            ConversationEntry::User(_) => None,
            ConversationEntry::Assistant(a) => Some(&a.tools),
            ConversationEntry::Progress(p) => Some(&p.tools),
        }
    }

    pub(crate) fn tools_mut(&mut self) -> Option<&mut ToolRefs> {
        match self {
            ConversationEntry::User(_) => None,
            ConversationEntry::Assistant(a) => Some(&mut a.tools),
            ConversationEntry::Progress(p) => Some(&mut p.tools),
        }
    }

    /// The conversation turn this entry contributes, if any.
    ///
    /// Progress entries are UI state and never sent back to the model.
    pub fn as_message(&self) -> Option<Message> {
        match self {
            ConversationEntry::User(u) => Some(u.message.clone()),
            ConversationEntry::Assistant(a) => Some(Message::with_content(
                a.message.role,
                a.message.content.clone(),
            )),
            ConversationEntry::Progress(_) => None,
        }
    }
}

impl From<AssistantMessage> for ConversationEntry {
    fn from(msg: AssistantMessage) -> Self {
        ConversationEntry::Assistant(msg)
    }
}

impl From<UserEntry> for ConversationEntry {
    fn from(entry: UserEntry) -> Self {
        ConversationEntry::User(entry)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    pub message: Message,
    pub uuid: String,
}

impl UserEntry {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            uuid: Uuid::new_v4().to_string(),
        }
    }
}

/// Intermediate assistant output emitted while a tool is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub content: AssistantMessage,
    #[serde(rename = "toolUseID")]
    pub tool_use_id: String,
    pub uuid: String,
    #[serde(default)]
    pub tools: ToolRefs,
}

/// Conversation turns of a log, in order, skipping progress entries.
pub fn messages_of(entries: &[ConversationEntry]) -> Vec<Message> {
    entries.iter().filter_map(ConversationEntry::as_message).collect()
}
