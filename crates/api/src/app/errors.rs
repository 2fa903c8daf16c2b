use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use keyward_core::wire::{ERROR_CODE_HEADER, ErrorBody};
use keyward_core::{AuthError, ErrorCode};

/// Map a service error onto the HTTP status table.
///
/// Internal errors are logged in full but answered with a generic message.
pub fn auth_error_to_response(err: AuthError) -> Response {
    let code = err.code();
    match &err {
        AuthError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error serving authorization request");
            json_error(code, "internal error")
        }
        other => {
            tracing::warn!(code = %code, error = %other.message(), "authorization request failed");
            json_error(code, other.message())
        }
    }
}

pub fn json_error(code: ErrorCode, message: impl Into<String>) -> Response {
    let status =
        StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(ERROR_CODE_HEADER, HeaderValue::from_static(code.as_str()))],
        axum::Json(ErrorBody {
            error: code.as_str().to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

pub fn invalid_argument(message: impl Into<String>) -> Response {
    json_error(ErrorCode::InvalidArgument, message)
}
