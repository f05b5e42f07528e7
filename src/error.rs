use crate::error_code::ProviderErrorCode;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "env.GOOGLE_API_KEY")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_config", "vcr_recorder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the conversation runtime.
///
/// Provider failures are classified once, at the transport boundary, into
/// [`Error::Authentication`] or [`Error::Provider`] carrying a closed
/// [`ProviderErrorCode`]. Everything downstream (retry, error turns) matches on
/// variants instead of message text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("{message} [{code}]")]
    Provider {
        code: ProviderErrorCode,
        http_status: Option<u16>,
        message: String,
    },

    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Recording error: {message}{}", format_context(.context))]
    Recording {
        message: String,
        context: ErrorContext,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new recording error with structured context
    pub fn recording_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Recording {
            message: msg.into(),
            context,
        }
    }

    pub fn provider(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Error::Provider {
            code,
            http_status: None,
            message: message.into(),
        }
    }

    pub fn tool_execution(tool: impl Into<String>, err: &anyhow::Error) -> Self {
        Error::ToolExecution {
            tool: tool.into(),
            message: format!("{:#}", err),
        }
    }

    /// Provider code for provider-reported failures.
    pub fn provider_code(&self) -> Option<ProviderErrorCode> {
        match self {
            Error::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Transient provider failure per the retryable code allow-list.
    ///
    /// Caller cancellation is never retryable, even though a provider-side
    /// `CANCELLED` status is.
    pub fn is_retryable(&self) -> bool {
        self.provider_code().map(|c| c.retryable()).unwrap_or(false)
    }

    /// Failures that surface as an API error turn rather than an `Err` from `query`.
    pub fn is_provider_side(&self) -> bool {
        matches!(
            self,
            Error::Authentication { .. }
                | Error::Provider { .. }
                | Error::Transport(_)
                | Error::Serialization(_)
                | Error::Recording { .. }
        )
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Recording { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}
