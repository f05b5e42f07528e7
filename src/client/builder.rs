use std::sync::Arc;
use std::time::Duration;

use crate::client::core::GeminiClient;
use crate::config::{ClientConfig, API_KEY_ENV, VCR_DIR_ENV, VCR_MODE_ENV};
use crate::drivers::gemini::{GeminiDriver, GenerationConfig, SafetySetting};
use crate::resilience::RetryPolicy;
use crate::tokens::{global_ledger, CostAccountant, CostLedger, ModelPricing};
use crate::transport::{HttpTransport, ModelTransport};
use crate::vcr::{ConversationRecorder, VcrMode};
use crate::{Error, ErrorContext, Result};

/// Builder for [`GeminiClient`].
///
/// Anything not set explicitly comes from the environment (see
/// [`ClientConfig::from_env`]) or from the crate defaults.
#[derive(Default)]
pub struct GeminiClientBuilder {
    config: Option<ClientConfig>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    pricing: Option<ModelPricing>,
    ledger: Option<Arc<CostLedger>>,
    recorder: Option<ConversationRecorder>,
    transport: Option<Arc<dyn ModelTransport>>,
    generation: Option<GenerationConfig>,
    safety_settings: Option<Vec<SafetySetting>>,
}

impl GeminiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a complete configuration instead of reading the environment.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override base URL (primarily for testing with mock servers)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    /// Book costs on `ledger` instead of the process-wide one.
    pub fn ledger(mut self, ledger: Arc<CostLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn recorder(mut self, recorder: ConversationRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn ModelTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = Some(settings);
        self
    }

    pub fn build(self) -> Result<GeminiClient> {
        self.build_with_lookup(|name| std::env::var(name).ok())
    }

    fn build_with_lookup<F>(self, env: F) -> Result<GeminiClient>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An explicit recorder makes the VCR variables irrelevant; an explicit key
        // satisfies the required one. Remaining settings still come from `env`.
        let explicit_recorder = self.recorder.is_some();
        let explicit_key = self.api_key.clone();
        let lookup = |name: &str| {
            if explicit_recorder && (name == VCR_MODE_ENV || name == VCR_DIR_ENV) {
                return None;
            }
            match (&explicit_key, name == API_KEY_ENV) {
                (Some(key), true) => Some(key.clone()),
                _ => env(name),
            }
        };
        let mut config = match self.config {
            Some(config) => config,
            None => ClientConfig::from_lookup(lookup)?,
        };
        if let Some(key) = self.api_key {
            config.api_key = key;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }

        if config.api_key.trim().is_empty() {
            return Err(Error::configuration_with_context(
                format!("{} must not be empty", API_KEY_ENV),
                ErrorContext::new()
                    .with_field_path("config.api_key")
                    .with_source("client_builder"),
            ));
        }

        let transport: Arc<dyn ModelTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&config)?),
        };

        let recorder = self.recorder.unwrap_or_else(|| match config.vcr_mode {
            VcrMode::Passthrough => ConversationRecorder::passthrough(),
            mode => ConversationRecorder::with_dir(mode, config.vcr_dir.clone()),
        });

        let pricing = self
            .pricing
            .unwrap_or_else(|| ModelPricing::for_model(&config.model));
        let ledger = self.ledger.unwrap_or_else(global_ledger);

        let mut driver = GeminiDriver::new(config.model.clone());
        if let Some(generation) = self.generation {
            driver = driver.with_generation_config(generation);
        }
        if let Some(settings) = self.safety_settings {
            driver = driver.with_safety_settings(settings);
        }

        Ok(GeminiClient {
            config,
            driver,
            transport,
            retry: self.retry.unwrap_or_default(),
            recorder,
            accountant: CostAccountant::new(pricing, ledger),
        })
    }
}
