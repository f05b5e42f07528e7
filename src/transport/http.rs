use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Proxy;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ModelTransport, TransportError};
use crate::config::ClientConfig;
use crate::drivers::gemini::{GenerateContentRequest, ProviderResponse};
use crate::error_code::ProviderErrorCode;
use crate::{Error, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";
const INVALID_KEY_REASON: &str = "API_KEY_INVALID";
const INVALID_KEY_TEXT: &str = "API key not valid";

/// reqwest-backed transport for the Generative Language REST API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            if let Ok(proxy) = Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            user_agent: config.user_agent(),
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    async fn send(&self, model: &str, request: &GenerateContentRequest) -> Result<ProviderResponse> {
        let url = self.endpoint(model);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(USER_AGENT, &self.user_agent)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), model, "provider returned an error");
            return Err(classify_error_body(status.as_u16(), &body));
        }

        let raw: serde_json::Value = response.json().await.map_err(map_reqwest_error)?;
        // 200 responses can still carry an error object.
        if raw.get("error").is_some() {
            return Err(classify_error_body(status.as_u16(), &raw.to_string()));
        }
        Ok(ProviderResponse::from_value(raw))
    }
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        cancel: &CancellationToken,
    ) -> Result<ProviderResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            r = self.send(model, request) => r,
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::provider(ProviderErrorCode::DeadlineExceeded, e.to_string())
    } else if e.is_connect() {
        Error::provider(ProviderErrorCode::Unavailable, e.to_string())
    } else {
        Error::Transport(TransportError::Http(e))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

/// Classify a failed response into [`Error::Authentication`] or [`Error::Provider`].
///
/// The code comes from `error.status` when it names a known status, otherwise from
/// the HTTP status.
pub fn classify_error_body(http_status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error)
        .unwrap_or_default();

    let message = if parsed.message.is_empty() {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("HTTP {}", http_status)
        } else {
            trimmed.to_string()
        }
    } else {
        parsed.message.clone()
    };

    let code = parsed
        .status
        .as_deref()
        .and_then(ProviderErrorCode::from_status_name)
        .unwrap_or_else(|| ProviderErrorCode::from_http_status(http_status));

    let invalid_key = code == ProviderErrorCode::Unauthenticated
        || parsed
            .details
            .iter()
            .any(|d| d.reason.as_deref() == Some(INVALID_KEY_REASON))
        || message.contains(INVALID_KEY_TEXT);

    if invalid_key {
        return Error::Authentication { message };
    }

    Error::Provider {
        code,
        http_status: Some(http_status),
        message,
    }
}
