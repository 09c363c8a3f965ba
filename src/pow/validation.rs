//! Proof-of-work acceptance check
//!
//! The order of checks is consensus-critical: the claimed target is
//! range-checked first, then the hash is compared against it.

use crate::core::compact::CompactTarget;
use crate::core::params::ConsensusParams;
use crate::crypto::Hash256;
use thiserror::Error;

/// Why a claimed target is unacceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFault {
    Negative,
    Overflow,
    Zero,
    AboveLimit,
}

/// Proof-of-work rejections. Both are permanent properties of a header.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowError {
    #[error("Invalid target: {0:?}")]
    InvalidTarget(TargetFault),
    #[error("Insufficient work: hash exceeds target")]
    InsufficientWork,
}

/// Check `hash` against the claimed compact target, reporting the reason
/// for a rejection
pub fn validate_proof_of_work(
    hash: &Hash256,
    bits: CompactTarget,
    params: &ConsensusParams,
) -> Result<(), PowError> {
    let decoded = bits.decode();

    if decoded.negative {
        return Err(PowError::InvalidTarget(TargetFault::Negative));
    }
    if decoded.overflow {
        return Err(PowError::InvalidTarget(TargetFault::Overflow));
    }
    if decoded.value.is_zero() {
        return Err(PowError::InvalidTarget(TargetFault::Zero));
    }
    if decoded.value > params.pow_limit {
        return Err(PowError::InvalidTarget(TargetFault::AboveLimit));
    }

    if hash.to_u256() > decoded.value {
        return Err(PowError::InsufficientWork);
    }

    Ok(())
}

/// Whether `hash` satisfies the claimed compact target
pub fn check_proof_of_work(hash: &Hash256, bits: CompactTarget, params: &ConsensusParams) -> bool {
    validate_proof_of_work(hash, bits, params).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::Network;
    use crate::core::target::U256;
    use proptest::prelude::*;

    fn hash_of(value: U256) -> Hash256 {
        Hash256::from_u256(&value)
    }

    #[test]
    fn test_accepts_hash_at_or_below_target() {
        let params = Network::Main.params();
        let bits = CompactTarget(0x1d00_ffff);
        let target = bits.decode().value;

        assert!(check_proof_of_work(&hash_of(target), bits, &params));
        assert!(check_proof_of_work(&hash_of(U256::zero()), bits, &params));
        assert_eq!(
            validate_proof_of_work(&hash_of(target + U256::one()), bits, &params),
            Err(PowError::InsufficientWork)
        );
    }

    #[test]
    fn test_real_header_hash() {
        let params = Network::Main.params();
        let hash =
            Hash256::from_hex("00000000bec226aaf9b7691a1bdb832999606a4b1dc8968307070c539b4f0b7b")
                .unwrap();
        assert!(check_proof_of_work(&hash, CompactTarget(0x1d00_ffff), &params));
        // a tighter target rejects the same hash
        assert!(!check_proof_of_work(&hash, CompactTarget(0x1c00_ffff), &params));
    }

    #[test]
    fn test_rejects_invalid_targets() {
        let params = Network::Main.params();
        let zero_hash = Hash256::ZERO;

        let cases = [
            (0x0000_0000, TargetFault::Zero),
            (0x0100_3456, TargetFault::Zero),
            (0x0492_3456, TargetFault::Negative),
            (0x2300_0001, TargetFault::Overflow),
            (0xff12_3456, TargetFault::Overflow),
            // one step easier than the main limit
            (0x1d01_0000, TargetFault::AboveLimit),
            (0x207f_ffff, TargetFault::AboveLimit),
        ];

        for (bits, fault) in cases {
            assert_eq!(
                validate_proof_of_work(&zero_hash, CompactTarget(bits), &params),
                Err(PowError::InvalidTarget(fault)),
                "bits {:08x}",
                bits
            );
        }
    }

    #[test]
    fn test_limit_depends_on_network() {
        let regtest = Network::Regtest.params();
        let main = Network::Main.params();
        let bits = CompactTarget(0x207f_ffff);
        let hash = hash_of(U256::one() << 250usize);

        assert!(check_proof_of_work(&hash, bits, &regtest));
        assert!(!check_proof_of_work(&hash, bits, &main));
    }

    proptest! {
        #[test]
        fn prop_accepts_exactly_when_hash_within_target(
            bits in any::<u32>(),
            hash_words in any::<[u64; 4]>(),
        ) {
            let params = Network::Regtest.params();
            let bits = CompactTarget(bits);
            let decoded = bits.decode();
            let hash = Hash256::from_u256(&U256(hash_words));

            let expected = !decoded.negative
                && !decoded.overflow
                && !decoded.value.is_zero()
                && decoded.value <= params.pow_limit
                && U256(hash_words) <= decoded.value;

            prop_assert_eq!(check_proof_of_work(&hash, bits, &params), expected);
        }
    }
}
