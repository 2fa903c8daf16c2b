//! HTTP API: routing, request decoding, and response encoding for authorizations.

pub mod app;
pub mod config;
