use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ClientConfig;
use crate::drivers::gemini::{GeminiDriver, GenerateContentRequest, ProviderResponse};
use crate::resilience::{RetryExecutor, RetryPolicy};
use crate::tokens::{CostAccountant, CostLedger, UsageCounters};
use crate::tools::{ToolCallDispatcher, ToolRefs, ToolSet};
use crate::transport::ModelTransport;
use crate::types::assistant::{
    API_ERROR_MESSAGE_PREFIX, INVALID_API_KEY_ERROR_MESSAGE, NO_CONTENT_MESSAGE,
};
use crate::types::{AssistantMessage, Message, Usage};
use crate::vcr::ConversationRecorder;
use crate::{Error, Result};

use super::builder::GeminiClientBuilder;

/// Session handle for one configured model.
pub struct GeminiClient {
    pub(crate) config: ClientConfig,
    pub(crate) driver: GeminiDriver,
    pub(crate) transport: Arc<dyn ModelTransport>,
    pub(crate) retry: RetryPolicy,
    pub(crate) recorder: ConversationRecorder,
    pub(crate) accountant: CostAccountant,
}

impl GeminiClient {
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Build a client from environment variables. Fails before any network
    /// activity when `GOOGLE_API_KEY` is missing.
    pub fn from_env() -> Result<Self> {
        GeminiClientBuilder::new().build()
    }

    pub fn model(&self) -> &str {
        self.driver.model()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn driver(&self) -> &GeminiDriver {
        &self.driver
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn recorder(&self) -> &ConversationRecorder {
        &self.recorder
    }

    pub fn ledger(&self) -> &Arc<CostLedger> {
        self.accountant.ledger()
    }

    /// One provider round trip: recorder outside, retry inside.
    ///
    /// A replayed request performs no I/O, no retry and no backoff.
    pub async fn round_trip(
        &self,
        request: &GenerateContentRequest,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<ProviderResponse> {
        let model = self.driver.model();
        self.recorder
            .with_recording(model, request, move || async move {
                RetryExecutor::new(policy)
                    .with_cancellation(cancel.clone())
                    .execute(move |_attempt| self.transport.generate_content(model, request, cancel))
                    .await
            })
            .await
    }

    /// Top-level entry point: send the conversation, run at most one tool round,
    /// account the cost and return a normalized assistant turn.
    ///
    /// Provider-side failures come back as an API error turn. Only tool failures
    /// and cancellation are returned as `Err`.
    pub async fn query(
        &self,
        messages: &[Message],
        system_prompt: &[String],
        tools: &ToolSet,
        cancel: &CancellationToken,
    ) -> Result<AssistantMessage> {
        let started = Instant::now();
        match self.run_query(messages, system_prompt, tools, cancel).await {
            Ok((answer, usage)) => {
                let duration = started.elapsed();
                let record = self.accountant.record(usage, duration);
                let usage = usage.unwrap_or_default();
                info!(
                    message_count = messages.len(),
                    duration_ms = record.duration_ms(),
                    tokens = usage.total_tokens,
                    cost_usd = record.cost_usd,
                    "gemini_api_success"
                );

                let content = if answer.is_empty() {
                    NO_CONTENT_MESSAGE.to_string()
                } else {
                    answer
                };
                let turn_usage = Usage {
                    total_tokens: usage.total_tokens,
                    prompt_tokens: usage.prompt_tokens,
                    completion_tokens: usage.output_tokens(),
                };
                Ok(AssistantMessage::new(content, self.model(), turn_usage)
                    .with_cost(record.cost_usd, record.duration_ms())
                    .with_tools(ToolRefs::Resolved(tools.clone())))
            }
            Err(e) if e.is_provider_side() => {
                error!(
                    error = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "gemini_api_error"
                );
                Ok(Self::error_turn(&e))
            }
            Err(e) => Err(e),
        }
    }

    async fn run_query(
        &self,
        messages: &[Message],
        system_prompt: &[String],
        tools: &ToolSet,
        cancel: &CancellationToken,
    ) -> Result<(String, Option<UsageCounters>)> {
        let request = self.driver.build_request(messages, system_prompt, tools);
        let first = self.round_trip(&request, self.retry, cancel).await?;

        let outcome = ToolCallDispatcher::new(tools)
            .dispatch(&first, messages, move |next| async move {
                let follow_up = self.driver.build_request(&next, system_prompt, tools);
                self.round_trip(&follow_up, self.retry, cancel).await
            })
            .await?;

        let usage = sum_usage(
            first.usage(),
            outcome.follow_up.as_ref().and_then(|r| r.usage()),
        );
        Ok((outcome.answer, usage))
    }

    fn error_turn(err: &Error) -> AssistantMessage {
        match err {
            Error::Authentication { .. } => AssistantMessage::api_error(INVALID_API_KEY_ERROR_MESSAGE),
            other => AssistantMessage::api_error(format!("{}: {}", API_ERROR_MESSAGE_PREFIX, other)),
        }
    }

    /// Generate text for a single prompt. Errors propagate.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let started = Instant::now();
        let response = self.generate_with_policy(prompt, self.retry).await?;
        self.accountant.record(response.usage(), started.elapsed());
        Ok(response.text())
    }

    /// Check the configured key with a cheap request. Nothing is booked on the ledger.
    ///
    /// `Ok(false)` when the key is rejected, `Err` for any other failure.
    pub async fn verify_api_key(&self) -> Result<bool> {
        match self.generate_with_policy("test", RetryPolicy::verification()).await {
            Ok(_) => Ok(true),
            Err(Error::Authentication { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn generate_with_policy(
        &self,
        prompt: &str,
        policy: RetryPolicy,
    ) -> Result<ProviderResponse> {
        let request = self.driver.prompt_request(prompt);
        self.round_trip(&request, policy, &CancellationToken::new()).await
    }
}

fn sum_usage(a: Option<UsageCounters>, b: Option<UsageCounters>) -> Option<UsageCounters> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (a, None) => a,
        (None, b) => b,
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model())
            .field("transport", &self.transport.name())
            .field("retry", &self.retry)
            .field("recorder", &self.recorder)
            .finish()
    }
}
