//! Process configuration read from the environment.

use std::net::SocketAddr;

use keyward_core::Id;

pub const DEFAULT_PORT: u16 = 8080;

/// Runtime settings for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// `KEYWARD_BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `KEYWARD_PATH_PREFIX`, e.g. `/v1`. Applied to routes and to computed links.
    pub path_prefix: String,
    /// `KEYWARD_SEED_USERS`: comma-separated hex ids known to the user directory.
    pub seed_users: Vec<Id>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            path_prefix: String::new(),
            seed_users: Vec::new(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Invalid values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("KEYWARD_BIND_ADDR") {
            match raw.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(value = %raw, error = %e, "invalid KEYWARD_BIND_ADDR; using default"),
            }
        }

        if let Some(raw) = lookup("KEYWARD_PATH_PREFIX") {
            config.path_prefix = normalize_prefix(&raw);
        }

        if let Some(raw) = lookup("KEYWARD_SEED_USERS") {
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                match part.parse::<Id>() {
                    Ok(id) => config.seed_users.push(id),
                    Err(e) => tracing::warn!(value = %part, error = %e, "skipping invalid seed user id"),
                }
            }
        }

        config
    }
}

/// `v1/` -> `/v1`, `/` -> ``.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
