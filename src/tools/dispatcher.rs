//! Single-round function-call dispatch.

use std::future::Future;

use serde_json::Value;
use tracing::{debug, info};

use super::{result_to_text, ToolSet};
use crate::drivers::gemini::{FunctionCall, ProviderResponse};
use crate::types::message::Message;
use crate::{Error, Result};

/// A tool that was actually run for a function call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub call: FunctionCall,
    pub result: Value,
    pub result_text: String,
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Final answer text.
    pub answer: String,
    pub invocation: Option<ToolInvocation>,
    /// Response of the follow-up round trip, when one was made.
    pub follow_up: Option<ProviderResponse>,
}

impl DispatchOutcome {
    fn answered(response: &ProviderResponse) -> Self {
        Self {
            answer: response.text(),
            invocation: None,
            follow_up: None,
        }
    }
}

/// Inspects a response for a function call and, when it names a known tool, runs it
/// and performs exactly one follow-up round trip with the serialized result.
///
/// Deeper chains are not followed: a function call in the follow-up response is
/// returned as-is for the caller to re-invoke.
pub struct ToolCallDispatcher<'a> {
    tools: &'a ToolSet,
}

impl<'a> ToolCallDispatcher<'a> {
    pub fn new(tools: &'a ToolSet) -> Self {
        Self { tools }
    }

    /// `round_trip` receives the extended conversation (original turns plus one user
    /// turn carrying the tool result) and must perform the provider call.
    pub async fn dispatch<F, Fut>(
        &self,
        response: &ProviderResponse,
        conversation: &[Message],
        round_trip: F,
    ) -> Result<DispatchOutcome>
    where
        F: FnOnce(Vec<Message>) -> Fut,
        Fut: Future<Output = Result<ProviderResponse>>,
    {
        let Some(call) = response.function_call() else {
            return Ok(DispatchOutcome::answered(response));
        };

        // Exact match only; an unknown name leaves the original answer in place.
        let Some(tool) = self.tools.get(&call.name) else {
            debug!(tool = call.name.as_str(), "ignoring function call to unknown tool");
            return Ok(DispatchOutcome::answered(response));
        };

        info!(tool = call.name.as_str(), "invoking tool for function call");
        let result = tool
            .invoke(call.args.clone())
            .await
            .map_err(|e| Error::tool_execution(&call.name, &e))?;
        let result_text = result_to_text(&result);

        let mut next = conversation.to_vec();
        next.push(Message::user(result_text.clone()));
        let follow_up = round_trip(next).await?;

        Ok(DispatchOutcome {
            answer: follow_up.text(),
            invocation: Some(ToolInvocation {
                call,
                result,
                result_text,
            }),
            follow_up: Some(follow_up),
        })
    }
}
