//! 256-bit target arithmetic
//!
//! Targets are plain unsigned 256-bit integers. The retarget step needs a
//! 512-bit intermediate so the multiply-before-divide never truncates.

use thiserror::Error;
use uint::construct_uint;

construct_uint! {
    /// Unsigned 256-bit integer (4 x 64-bit little-endian words)
    pub struct U256(4);
}

construct_uint! {
    /// Unsigned 512-bit integer, used only as a widening intermediate
    pub struct U512(8);
}

/// A proof-of-work target: the largest hash value accepted for a block
pub type Target = U256;

/// Errors from parsing or narrowing targets
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TargetError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Target too long: {0} bytes (max: 32)")]
    TooLong(usize),
    #[error("Value does not fit in 256 bits")]
    Overflow,
}

impl From<U256> for U512 {
    fn from(value: U256) -> Self {
        let mut words = [0u64; 8];
        words[..4].copy_from_slice(&value.0);
        U512(words)
    }
}

impl TryFrom<U512> for U256 {
    type Error = TargetError;

    fn try_from(value: U512) -> Result<Self, Self::Error> {
        if value.0[4..].iter().any(|w| *w != 0) {
            return Err(TargetError::Overflow);
        }
        let mut words = [0u64; 4];
        words.copy_from_slice(&value.0[..4]);
        Ok(U256(words))
    }
}

/// Parse a big-endian hex string (optionally `0x`-prefixed) into a target
pub fn parse_target_hex(s: &str) -> Result<Target, TargetError> {
    let digits = s.trim().trim_start_matches("0x");
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };

    let bytes = hex::decode(padded)?;
    if bytes.len() > 32 {
        return Err(TargetError::TooLong(bytes.len()));
    }

    Ok(U256::from_big_endian(&bytes))
}

/// Format a target as 64 big-endian hex digits
pub fn target_to_hex(target: &Target) -> String {
    let mut bytes = [0u8; 32];
    target.to_big_endian(&mut bytes);
    hex::encode(bytes)
}

/// Expected number of hashes needed to meet `target`.
///
/// Work is 2^256 / (target + 1). 2^256 itself does not fit in 256 bits, so
/// it is computed as `(!target / (target + 1)) + 1`.
pub fn block_work(target: &Target) -> U256 {
    if target.is_zero() {
        return U256::zero();
    }

    match target.checked_add(U256::one()) {
        Some(divisor) => (!*target / divisor) + U256::one(),
        // target == 2^256 - 1
        None => U256::one(),
    }
}

/// Lossy float view of a 256-bit value, for display only
pub fn to_f64(value: &U256) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, word| acc * 18_446_744_073_709_551_616.0 + *word as f64)
}

/// How many times harder `target` is than the network's easiest target
pub fn difficulty(target: &Target, pow_limit: &Target) -> f64 {
    if target.is_zero() {
        return f64::INFINITY;
    }
    to_f64(pow_limit) / to_f64(target)
}
