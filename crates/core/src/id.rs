//! Opaque resource identifiers.
//!
//! An [`Id`] is a byte string whose canonical textual form is lowercase hex.
//! Generated identifiers are always [`Id::GENERATED_LEN`] bytes wide (16 hex
//! characters), but identifiers supplied by callers may be any non-empty length.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AuthError, AuthResult};

/// Identifier of an authorization or a user.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Vec<u8>);

impl Id {
    /// Width in bytes of identifiers produced by the random generator.
    pub const GENERATED_LEN: usize = 8;

    /// Fails on an empty byte string, which has no hex form.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> AuthResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AuthError::invalid_argument("id must not be empty"));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Canonical hex encoding, as used in URLs and JSON bodies.
    pub fn encode(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes().to_vec())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.encode())
    }
}

impl FromStr for Id {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AuthError::invalid_argument("id must not be empty"));
        }
        let bytes = hex::decode(s)
            .map_err(|e| AuthError::invalid_argument(format!("invalid id {s:?}: {e}")))?;
        Self::from_bytes(bytes)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
