//! 传输层：将线上请求发送到 provider，并在边界处对失败进行分类。
//!
//! # Transport Module
//!
//! [`ModelTransport`] performs exactly one provider round trip. Failures leave this
//! layer already classified: [`crate::Error::Authentication`] for rejected
//! credentials, [`crate::Error::Provider`] with a [`crate::error_code::ProviderErrorCode`]
//! for everything the provider reports, [`crate::Error::Cancelled`] for caller
//! cancellation.

mod http;

pub use http::{classify_error_body, HttpTransport};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::drivers::gemini::{GenerateContentRequest, ProviderResponse};
use crate::Result;

#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Send one `generateContent` request for `model`.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        cancel: &CancellationToken,
    ) -> Result<ProviderResponse>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
