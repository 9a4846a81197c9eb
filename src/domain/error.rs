//! Caller-facing outcome kinds.

use serde::Serialize;
use std::fmt;

/// Stable machine-readable code for each [`ServiceError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    Canceled,
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Canceled => "canceled",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure a review operation can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// A caller-supplied value failed a domain constraint.
    #[error("{message}")]
    InvalidArgument { message: String },
    /// The referenced review does not exist.
    #[error("{message}")]
    NotFound { message: String },
    /// The request context was cancelled or timed out before work began.
    #[error("{message}")]
    Canceled { message: String },
    /// Storage or infrastructure failure.
    #[error("{message}")]
    Internal { message: String },
}

impl ServiceError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn canceled(message: impl Into<String>) -> Self {
        Self::Canceled {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            ServiceError::NotFound { .. } => ErrorCode::NotFound,
            ServiceError::Canceled { .. } => ErrorCode::Canceled,
            ServiceError::Internal { .. } => ErrorCode::Internal,
        }
    }
}
