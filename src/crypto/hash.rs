//! Block hash type
//!
//! Digests are stored in their internal byte order and interpreted as
//! little-endian 256-bit integers when compared against a target. The
//! hex form is byte-reversed, matching how block explorers print hashes.

use crate::core::target::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hash parsing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HashError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Invalid hash length: {0} bytes (expected 32)")]
    InvalidLength(usize),
}

/// A 256-bit block digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The all-zero hash, used as the parent reference of a genesis block
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Parse from the display (byte-reversed) hex form
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let mut bytes = hex::decode(s.trim().trim_start_matches("0x"))?;
        if bytes.len() != 32 {
            return Err(HashError::InvalidLength(bytes.len()));
        }
        bytes.reverse();

        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Hash256(out))
    }

    /// Display (byte-reversed) hex form
    pub fn to_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }

    /// Build the hash whose integer value is `value`
    pub fn from_u256(value: &U256) -> Self {
        let mut out = [0u8; 32];
        value.to_little_endian(&mut out);
        Hash256(out)
    }

    /// Interpret the digest as an unsigned 256-bit integer
    pub fn to_u256(&self) -> U256 {
        U256::from_little_endian(&self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl FromStr for Hash256 {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash256::from_hex(s)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash256::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
