//! Wire-level names shared by the HTTP handler and the HTTP client.

use serde::{Deserialize, Serialize};

/// Response header carrying the [`crate::ErrorCode`] of an error response.
pub const ERROR_CODE_HEADER: &str = "x-keyward-error-code";

/// Response header carrying the number of list matches before pagination.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code, see [`crate::ErrorCode::as_str`].
    pub error: String,
    pub message: String,
}
