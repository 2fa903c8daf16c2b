//! HTTP client for the authorization resource.
//!
//! [`AuthorizationClient`] implements [`keyward_core::AuthorizationService`], so
//! callers can swap the in-memory store for a remote server without changes.

mod client;

pub use client::{AuthorizationClient, ClientConfig};
