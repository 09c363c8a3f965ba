//! Compact target encoding ("nBits")
//!
//! A 32-bit header field stores a 256-bit target as a base-256 float:
//!
//! ```text
//!   byte 3      bytes 2..0
//! +----------+---------------------------+
//! | exponent | sign | 23-bit mantissa    |
//! +----------+---------------------------+
//! value = mantissa * 256^(exponent - 3)
//! ```
//!
//! Decoding is total: malformed values are reported through the
//! `negative` and `overflow` flags instead of errors. Encoding keeps only
//! ~24 significant bits, so it is lossy for arbitrary targets.

use crate::core::target::{Target, TargetError, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Mask of the 23 usable mantissa bits
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Sign flag, the top bit of the mantissa
const SIGN_BIT: u32 = 0x0080_0000;

/// A target in its 4-byte header encoding
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct CompactTarget(pub u32);

/// Result of decoding a compact target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTarget {
    /// The expanded target (truncated to 256 bits when `overflow` is set)
    pub value: Target,
    /// The sign flag was set on a non-zero mantissa
    pub negative: bool,
    /// The exponent places significant bits beyond 256
    pub overflow: bool,
}

impl CompactTarget {
    pub fn from_consensus(bits: u32) -> Self {
        CompactTarget(bits)
    }

    pub fn to_consensus(self) -> u32 {
        self.0
    }

    /// The exponent byte
    pub fn exponent(self) -> u32 {
        self.0 >> 24
    }

    /// Expand into a 256-bit target plus sign and overflow flags
    pub fn decode(self) -> DecodedTarget {
        let size = self.exponent();
        let mut word = self.0 & MANTISSA_MASK;

        let value = if size <= 3 {
            word >>= 8 * (3 - size);
            U256::from(word)
        } else {
            let shift = 8 * (size as usize - 3);
            if shift >= 256 {
                U256::zero()
            } else {
                U256::from(word) << shift
            }
        };

        let negative = word != 0 && (self.0 & SIGN_BIT) != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

        DecodedTarget {
            value,
            negative,
            overflow,
        }
    }

    /// Canonical compact form of a non-negative target.
    ///
    /// Uses the smallest exponent that holds the value, and shifts the
    /// mantissa down a byte whenever it would set the sign bit.
    pub fn encode(target: &Target) -> Self {
        let mut size = (target.bits() + 7) / 8;
        let mut compact = if size <= 3 {
            (target.low_u64() << (8 * (3 - size))) as u32
        } else {
            (*target >> (8 * (size - 3))).low_u32()
        };

        if compact & SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }

        CompactTarget(compact | ((size as u32) << 24))
    }

    /// Little-endian header bytes
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
        CompactTarget(u32::from_le_bytes(bytes))
    }

    /// Parse `1d00ffff` or `0x1d00ffff`
    pub fn from_hex(s: &str) -> Result<Self, TargetError> {
        let digits = s.trim().trim_start_matches("0x");
        if digits.len() > 8 {
            return Err(TargetError::TooLong(digits.len().div_ceil(2)));
        }

        let padded = format!("{:0>8}", digits);
        let bytes = hex::decode(padded)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&bytes);
        Ok(CompactTarget(u32::from_be_bytes(out)))
    }
}

impl DecodedTarget {
    /// Neither negative nor overflowing
    pub fn is_well_formed(&self) -> bool {
        !self.negative && !self.overflow
    }
}

impl From<u32> for CompactTarget {
    fn from(bits: u32) -> Self {
        CompactTarget(bits)
    }
}

impl From<CompactTarget> for u32 {
    fn from(compact: CompactTarget) -> Self {
        compact.0
    }
}

impl fmt::Display for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl fmt::Debug for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompactTarget(0x{:08x})", self.0)
    }
}

impl fmt::LowerHex for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for CompactTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompactTarget::from_hex(s)
    }
}

impl Serialize for CompactTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CompactTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CompactVisitor;

        impl<'de> de::Visitor<'de> for CompactVisitor {
            type Value = CompactTarget;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a compact target as a hex string or u32")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CompactTarget, E> {
                u32::try_from(v)
                    .map(CompactTarget)
                    .map_err(|_| E::custom(format!("compact target out of range: {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CompactTarget, E> {
                CompactTarget::from_hex(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(CompactVisitor)
    }
}
