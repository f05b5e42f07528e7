//! Provider 错误码：Google RPC 规范状态码及其重试语义。
//!
//! Canonical provider error codes.
//!
//! Gemini reports failures with the Google RPC status vocabulary
//! (`{"error": {"status": "RESOURCE_EXHAUSTED", ...}}`). The transport maps every
//! failed response onto this closed set, so retry classification is a total
//! function over [`ProviderErrorCode`] instead of message matching.
//!
//! | Code | Retryable |
//! |------|-----------|
//! | RESOURCE_EXHAUSTED, UNAVAILABLE, DEADLINE_EXCEEDED | yes |
//! | INTERNAL, CANCELLED, ABORTED | yes |
//! | everything else | no |
//!
//! ## Example
//!
//! ```rust
//! use ai_conductor::error_code::ProviderErrorCode;
//!
//! let code = ProviderErrorCode::from_status_name("UNAVAILABLE").unwrap();
//! assert!(code.retryable());
//! assert_eq!(code.as_str(), "UNAVAILABLE");
//! assert_eq!(ProviderErrorCode::from_http_status(429), ProviderErrorCode::ResourceExhausted);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderErrorCode {
    /// The operation was cancelled upstream.
    Cancelled,
    /// Unknown server error.
    Unknown,
    /// Malformed request or invalid parameter.
    InvalidArgument,
    /// Deadline expired before the operation could complete.
    DeadlineExceeded,
    /// Model or resource not found.
    NotFound,
    AlreadyExists,
    PermissionDenied,
    /// Quota or rate limit exhausted.
    ResourceExhausted,
    FailedPrecondition,
    /// Concurrency conflict; the operation was aborted.
    Aborted,
    OutOfRange,
    Unimplemented,
    /// Internal provider error.
    Internal,
    /// Service temporarily unavailable or overloaded.
    Unavailable,
    DataLoss,
    /// Missing or invalid credentials.
    Unauthenticated,
}

impl ProviderErrorCode {
    pub const ALL: [ProviderErrorCode; 16] = [
        Self::Cancelled,
        Self::Unknown,
        Self::InvalidArgument,
        Self::DeadlineExceeded,
        Self::NotFound,
        Self::AlreadyExists,
        Self::PermissionDenied,
        Self::ResourceExhausted,
        Self::FailedPrecondition,
        Self::Aborted,
        Self::OutOfRange,
        Self::Unimplemented,
        Self::Internal,
        Self::Unavailable,
        Self::DataLoss,
        Self::Unauthenticated,
    ];

    /// Returns the canonical status name (e.g. `"RESOURCE_EXHAUSTED"`).
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    /// Whether a failure with this code is transient and worth retrying.
    #[inline]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ResourceExhausted
                | Self::Unavailable
                | Self::DeadlineExceeded
                | Self::Internal
                | Self::Cancelled
                | Self::Aborted
        )
    }

    /// Parses a canonical status name. Returns `None` for names outside the set.
    pub fn from_status_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    /// Maps an HTTP status to the most likely code when the body carries no status name.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidArgument,
            401 => Self::Unauthenticated,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 | 504 => Self::DeadlineExceeded,
            409 => Self::Aborted,
            429 => Self::ResourceExhausted,
            499 => Self::Cancelled,
            500 => Self::Internal,
            501 => Self::Unimplemented,
            503 => Self::Unavailable,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
