//! Restores live tool references into loaded conversation entries.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use super::entry::ConversationEntry;
use crate::tools::{Tool, ToolRefs, ToolSet};
use crate::{Error, ErrorContext, Result};

/// Replaces the stored tool placeholder on assistant and progress entries with the
/// full live tool set. Other entries pass through unchanged.
///
/// Rehydration is idempotent: applying it to an already rehydrated sequence
/// yields the same sequence.
#[derive(Debug, Clone, Default)]
pub struct ConversationRehydrator {
    tools: ToolSet,
}

impl ConversationRehydrator {
    /// Duplicate tool names resolve to the last tool given.
    pub fn new<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        Self {
            tools: ToolSet::from_tools(tools),
        }
    }

    pub fn from_set(tools: ToolSet) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn rehydrate(&self, entries: Vec<ConversationEntry>) -> Vec<ConversationEntry> {
        rehydrate(entries, &self.tools)
    }
}

pub fn rehydrate(entries: Vec<ConversationEntry>, tools: &ToolSet) -> Vec<ConversationEntry> {
    entries
        .into_iter()
        .map(|mut entry| {
            if let Some(refs) = entry.tools_mut() {
                *refs = ToolRefs::Resolved(tools.clone());
            }
            entry
        })
        .collect()
}

/// Read a JSON array of entries from `path` and rehydrate it with `tools`.
pub async fn load_messages_from_log(
    path: impl AsRef<Path>,
    tools: &ToolSet,
) -> Result<Vec<ConversationEntry>> {
    let path = path.as_ref();
    match read_log(path).await {
        Ok(entries) => {
            debug!(path = %path.display(), entries = entries.len(), "loaded message log");
            Ok(rehydrate(entries, tools))
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to load messages from log");
            Err(e)
        }
    }
}

async fn read_log(path: &Path) -> Result<Vec<ConversationEntry>> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|e| {
        Error::configuration_with_context(
            format!("malformed message log: {}", e),
            ErrorContext::new()
                .with_field_path(path.display().to_string())
                .with_source("conversation_log"),
        )
    })
}
