//! Process-wide logging setup shared by the keyward binaries.

pub mod tracing;

pub use crate::tracing::{LogFormat, LogSettings};

/// Install the global subscriber using `RUST_LOG` and `KEYWARD_LOG_FORMAT`.
///
/// Repeated calls are no-ops.
pub fn init() {
    crate::tracing::init(&LogSettings::from_env());
}
