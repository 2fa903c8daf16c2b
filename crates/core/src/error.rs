//! Error taxonomy shared by the store, the HTTP handler and the HTTP client.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Result type used across the authorization service.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authorization service error.
///
/// Every implementation of [`crate::AuthorizationService`] surfaces one of these
/// kinds, so callers see the same taxonomy whether they talk to the store
/// directly or over HTTP.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required field was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No record matched the requested id or token.
    #[error("not found: {0}")]
    NotFound(String),

    /// The id or token is already in use.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected failure in the store, a collaborator or the transport.
    #[error("internal error: {0}")]
    Internal(String),

    /// The caller's deadline elapsed before the request completed.
    #[error("canceled: {0}")]
    Canceled(String),
}

impl AuthError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn canceled(msg: impl Into<String>) -> Self {
        Self::Canceled(msg.into())
    }

    /// Rebuild an error from its wire representation.
    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match code {
            ErrorCode::InvalidArgument => Self::InvalidArgument(msg),
            ErrorCode::NotFound => Self::NotFound(msg),
            ErrorCode::Conflict => Self::Conflict(msg),
            ErrorCode::Internal => Self::Internal(msg),
            ErrorCode::Canceled => Self::Canceled(msg),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Internal(_) => ErrorCode::Internal,
            Self::Canceled(_) => ErrorCode::Canceled,
        }
    }

    /// The human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Internal(m)
            | Self::Canceled(m) => m,
        }
    }
}

/// Machine-readable error code carried on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    Conflict,
    Internal,
    Canceled,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 5] = [
        ErrorCode::InvalidArgument,
        ErrorCode::NotFound,
        ErrorCode::Conflict,
        ErrorCode::Internal,
        ErrorCode::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Conflict => "conflict",
            ErrorCode::Internal => "internal",
            ErrorCode::Canceled => "canceled",
        }
    }

    /// HTTP status the handler responds with for this code.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::InvalidArgument => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::Internal => 500,
            ErrorCode::Canceled => 408,
        }
    }

    /// Inverse of [`ErrorCode::http_status`], used when a response carries no code.
    ///
    /// Unknown client errors degrade to `InvalidArgument`, everything else to `Internal`.
    pub fn from_http_status(status: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.http_status() == status)
            .unwrap_or(if (400..500).contains(&status) {
                ErrorCode::InvalidArgument
            } else {
                ErrorCode::Internal
            })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AuthError::internal(format!("unknown error code {s:?}")))
    }
}
