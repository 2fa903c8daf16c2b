//! Identifier and secret-token generators.
//!
//! The store only depends on the [`IdGenerator`] and [`TokenGenerator`]
//! contracts; tests swap in the deterministic implementations below.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::id::Id;

/// Produces resource identifiers.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> Id;
}

/// Produces secret tokens.
pub trait TokenGenerator: Send + Sync {
    fn new_token(&self) -> String;
}

impl<G> IdGenerator for Arc<G>
where
    G: IdGenerator + ?Sized,
{
    fn new_id(&self) -> Id {
        (**self).new_id()
    }
}

impl<G> TokenGenerator for Arc<G>
where
    G: TokenGenerator + ?Sized,
{
    fn new_token(&self) -> String {
        (**self).new_token()
    }
}

/// Random [`Id::GENERATED_LEN`]-byte identifiers from the OS CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn new_id(&self) -> Id {
        Id::from(OsRng.next_u64())
    }
}

/// URL-safe base64 encoding of [`RandomTokenGenerator::TOKEN_BYTES`] bytes of OS randomness.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokenGenerator;

impl RandomTokenGenerator {
    pub const TOKEN_BYTES: usize = 64;
}

impl TokenGenerator for RandomTokenGenerator {
    fn new_token(&self) -> String {
        let mut bytes = [0u8; Self::TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// Deterministic identifiers counting up from a seed.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> Id {
        Id::from(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Deterministic tokens: `{prefix}{n}`.
#[derive(Debug)]
pub struct SequentialTokenGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialTokenGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl TokenGenerator for SequentialTokenGenerator {
    fn new_token(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{n}", self.prefix)
    }
}

/// Always returns the same token. Useful for exercising collision handling.
#[derive(Debug, Clone)]
pub struct StaticTokenGenerator(pub String);

impl TokenGenerator for StaticTokenGenerator {
    fn new_token(&self) -> String {
        self.0.clone()
    }
}
