//! Domain primitives: Address, Signature, UnixTime.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Solana account address (base58-encoded 32-byte public key).
///
/// Compared by exact string equality. Addresses are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("address is empty")]
    Empty,
    #[error("base58 decode failed: {0}")]
    Base58(String),
    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

impl Address {
    /// Create an Address from a string without validation.
    ///
    /// Used for addresses that arrive already decoded from the RPC node.
    pub fn new(addr: String) -> Self {
        Address(addr)
    }

    /// Parse and validate a user-supplied address.
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressParseError::Empty);
        }

        let bytes = bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| AddressParseError::Base58(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(AddressParseError::Length(bytes.len()));
        }

        Ok(Address(trimmed.to_string()))
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Transaction signature (base58 string), unique per transaction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub String);

impl Signature {
    pub fn new(sig: String) -> Self {
        Signature(sig)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block time in seconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTime(pub i64);

impl UnixTime {
    pub fn new(secs: i64) -> Self {
        UnixTime(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// RFC 3339 rendering, or None if the timestamp is out of range.
    pub fn to_rfc3339(&self) -> Option<String> {
        chrono::DateTime::from_timestamp(self.0, 0).map(|dt| dt.to_rfc3339())
    }
}
