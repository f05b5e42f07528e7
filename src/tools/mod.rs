//! 工具模块：工具抽象、按名称索引的工具集与函数调用分发。
//!
//! # Tools Module
//!
//! Anything exposing a name, a description, a JSON parameter schema and an async
//! `invoke` is a [`Tool`]. Tools are grouped in a [`ToolSet`] keyed by name, and
//! persisted turns reference them through [`ToolRefs`].
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Tool`] | Trait implemented by executable tools |
//! | [`ToolSet`] | Ordered, name-unique set of live tools (last insert wins) |
//! | [`ToolRefs`] | Tool references on a turn: stored names or the live set |
//! | [`ToolCallDispatcher`] | Runs one model-requested function call and the follow-up round trip |

mod dispatcher;

pub use dispatcher::{DispatchOutcome, ToolCallDispatcher, ToolInvocation};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within a call.
    fn name(&self) -> &str;
    fn description(&self) -> String;
    /// JSON Schema of the arguments object.
    fn input_schema(&self) -> Value;
    async fn invoke(&self, args: Value) -> anyhow::Result<Value>;
}

/// Name-unique collection of live tools, in first-insertion order.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set; on duplicate names the last tool wins.
    pub fn from_tools<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut set = Self::new();
        for tool in tools {
            set.insert(tool);
        }
        set
    }

    pub fn insert(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => *slot = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl FromIterator<Arc<dyn Tool>> for ToolSet {
    fn from_iter<T: IntoIterator<Item = Arc<dyn Tool>>>(iter: T) -> Self {
        Self::from_tools(iter)
    }
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tools.iter().map(|t| t.name())).finish()
    }
}

/// Tool references carried by assistant and progress turns.
///
/// Executable tools cannot be persisted, so they serialize as a list of names and
/// always deserialize as [`ToolRefs::Unresolved`] until rehydrated.
#[derive(Clone)]
pub enum ToolRefs {
    Unresolved(Vec<String>),
    Resolved(ToolSet),
}

impl ToolRefs {
    pub fn names(&self) -> Vec<String> {
        match self {
            ToolRefs::Unresolved(names) => names.clone(),
            ToolRefs::Resolved(set) => set.names(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ToolRefs::Resolved(_))
    }

    pub fn resolved(&self) -> Option<&ToolSet> {
        match self {
            ToolRefs::Resolved(set) => Some(set),
            ToolRefs::Unresolved(_) => None,
        }
    }
}

impl Default for ToolRefs {
    fn default() -> Self {
        ToolRefs::Unresolved(Vec::new())
    }
}

impl PartialEq for ToolRefs {
    fn eq(&self, other: &Self) -> bool {
        self.is_resolved() == other.is_resolved() && self.names() == other.names()
    }
}

impl fmt::Debug for ToolRefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolRefs::Unresolved(names) => f.debug_tuple("Unresolved").field(names).finish(),
            ToolRefs::Resolved(set) => f.debug_tuple("Resolved").field(set).finish(),
        }
    }
}

impl Serialize for ToolRefs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ToolRefs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(ToolRefs::Unresolved)
    }
}

/// Text form of a tool result: strings verbatim, anything else as compact JSON.
pub fn result_to_text(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::test_tools::FixedTool;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_names_last_wins_in_place() {
        let first = FixedTool::new("read", json!("first"));
        let other = FixedTool::new("write", json!("w"));
        let second = FixedTool::new("read", json!("second"));
        let set = ToolSet::from_tools(vec![
            first as Arc<dyn Tool>,
            other as Arc<dyn Tool>,
            second.clone() as Arc<dyn Tool>,
        ]);
        assert_eq!(set.names(), vec!["read", "write"]);
        let resolved = set.get("read").unwrap();
        let out = tokio_test::block_on(resolved.invoke(json!({}))).unwrap();
        assert_eq!(out, json!("second"));
        assert_eq!(second.calls(), 1);
    }

    #[test]
    fn test_tool_refs_serialize_as_names() {
        let set = ToolSet::from_tools(vec![FixedTool::new("memory_read", json!(1)) as Arc<dyn Tool>]);
        let refs = ToolRefs::Resolved(set);
        assert_eq!(serde_json::to_value(&refs).unwrap(), json!(["memory_read"]));

        let back: ToolRefs = serde_json::from_value(json!(["memory_read"])).unwrap();
        assert!(!back.is_resolved());
        assert_eq!(back.names(), vec!["memory_read"]);
        assert_ne!(back, refs);
    }

    #[test]
    fn test_result_to_text() {
        assert_eq!(result_to_text(&json!("plain")), "plain");
        assert_eq!(result_to_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
