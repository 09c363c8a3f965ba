//! Per-network consensus parameters
//!
//! Each network carries one immutable `ConsensusParams` record. It is
//! selected once at startup and passed explicitly into every difficulty
//! computation.

use crate::core::compact::CompactTarget;
use crate::core::target::{Target, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Retarget window length in seconds (30 minutes)
pub const DEFAULT_TARGET_TIMESPAN: i64 = 30 * 60;

/// Expected seconds between blocks
pub const DEFAULT_TARGET_SPACING: i64 = 30;

/// Largest accepted target timespan, leaving headroom for the retarget
/// bounds arithmetic
pub const MAX_TARGET_TIMESPAN: i64 = i64::MAX / 200;

/// Easiest target on main and test networks (32 leading zero bits)
pub const MAIN_POW_LIMIT: Target = U256([
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0x0000_0000_FFFF_FFFF,
]);

/// Easiest target on the regression test network
pub const REGTEST_POW_LIMIT: Target = U256([
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
]);

/// Invalid parameter records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    #[error("Target spacing must be positive (got {0})")]
    InvalidSpacing(i64),
    #[error("Target timespan {timespan} is not a positive multiple of spacing {spacing}")]
    InvalidTimespan { timespan: i64, spacing: i64 },
    #[error("Target timespan {0} exceeds the maximum of {max}", max = MAX_TARGET_TIMESPAN)]
    TimespanTooLarge(i64),
    #[error("Proof-of-work limit must be non-zero")]
    ZeroPowLimit,
}

/// The networks this engine knows parameters for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Main,
    Testnet,
    Regtest,
}

impl Network {
    /// The consensus parameters of this network
    pub fn params(self) -> ConsensusParams {
        match self {
            Network::Main => ConsensusParams {
                pow_limit: MAIN_POW_LIMIT,
                target_timespan: DEFAULT_TARGET_TIMESPAN,
                target_spacing: DEFAULT_TARGET_SPACING,
                allow_min_difficulty_blocks: false,
                no_retargeting: false,
            },
            Network::Testnet => ConsensusParams {
                pow_limit: MAIN_POW_LIMIT,
                target_timespan: DEFAULT_TARGET_TIMESPAN,
                target_spacing: DEFAULT_TARGET_SPACING,
                allow_min_difficulty_blocks: true,
                no_retargeting: false,
            },
            Network::Regtest => ConsensusParams {
                pow_limit: REGTEST_POW_LIMIT,
                target_timespan: DEFAULT_TARGET_TIMESPAN,
                target_spacing: DEFAULT_TARGET_SPACING,
                allow_min_difficulty_blocks: true,
                no_retargeting: true,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Main),
            "test" | "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(ParamsError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Difficulty-related consensus rules of one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Easiest (numerically largest) target ever permitted
    #[serde(with = "target_hex")]
    pub pow_limit: Target,
    /// Seconds spanned by one retarget window
    pub target_timespan: i64,
    /// Expected seconds between blocks
    pub target_spacing: i64,
    /// Allow minimum-difficulty blocks after a production stall
    pub allow_min_difficulty_blocks: bool,
    /// Freeze difficulty at the parent's value
    pub no_retargeting: bool,
}

impl ConsensusParams {
    /// Blocks per retarget window
    pub fn adjustment_interval(&self) -> u64 {
        self.target_timespan
            .checked_div(self.target_spacing)
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Whether a block at `height` starts a retarget window
    pub fn is_retarget_boundary(&self, height: u64) -> bool {
        height.checked_rem(self.adjustment_interval()) == Some(0)
    }

    /// `pow_limit` in compact form
    pub fn pow_limit_compact(&self) -> CompactTarget {
        CompactTarget::encode(&self.pow_limit)
    }

    /// Check the record is usable by the retarget engine
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.target_spacing <= 0 {
            return Err(ParamsError::InvalidSpacing(self.target_spacing));
        }
        if self.target_timespan <= 0 || self.target_timespan % self.target_spacing != 0 {
            return Err(ParamsError::InvalidTimespan {
                timespan: self.target_timespan,
                spacing: self.target_spacing,
            });
        }
        if self.target_timespan > MAX_TARGET_TIMESPAN {
            return Err(ParamsError::TimespanTooLarge(self.target_timespan));
        }
        if self.pow_limit.is_zero() {
            return Err(ParamsError::ZeroPowLimit);
        }
        Ok(())
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Network::Main.params()
    }
}

/// Serde adapter storing a target as big-endian hex
pub mod target_hex {
    use crate::core::target::{parse_target_hex, target_to_hex, Target};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(target: &Target, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&target_to_hex(target))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Target, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_target_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::target::parse_target_hex;

    #[test]
    fn test_pow_limit_constants() {
        assert_eq!(
            MAIN_POW_LIMIT,
            parse_target_hex("00000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
                .unwrap()
        );
        assert_eq!(
            REGTEST_POW_LIMIT,
            parse_target_hex("7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
                .unwrap()
        );
    }

    #[test]
    fn test_builtin_networks() {
        let main = Network::Main.params();
        assert_eq!(main.adjustment_interval(), 60);
        assert_eq!(main.pow_limit_compact(), CompactTarget(0x1d00_ffff));
        assert!(!main.allow_min_difficulty_blocks);
        assert!(!main.no_retargeting);

        let test = Network::Testnet.params();
        assert_eq!(test.pow_limit, main.pow_limit);
        assert!(test.allow_min_difficulty_blocks);
        assert!(!test.no_retargeting);

        let regtest = Network::Regtest.params();
        assert_eq!(regtest.pow_limit_compact(), CompactTarget(0x207f_ffff));
        assert!(regtest.allow_min_difficulty_blocks);
        assert!(regtest.no_retargeting);

        for network in [Network::Main, Network::Testnet, Network::Regtest] {
            assert!(network.params().validate().is_ok());
        }
    }

    #[test]
    fn test_retarget_boundary() {
        let params = Network::Main.params();
        assert!(params.is_retarget_boundary(0));
        assert!(params.is_retarget_boundary(60));
        assert!(!params.is_retarget_boundary(59));

        let broken = ConsensusParams {
            target_spacing: 0,
            ..params
        };
        assert_eq!(broken.adjustment_interval(), 0);
        assert!(!broken.is_retarget_boundary(60));
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Main);
        assert_eq!("TEST".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("regtest".parse::<Network>().unwrap(), Network::Regtest);
        assert_eq!(
            "signet".parse::<Network>(),
            Err(ParamsError::UnknownNetwork("signet".to_string()))
        );
    }

    #[test]
    fn test_validate() {
        let mut params = ConsensusParams::default();
        params.target_spacing = 0;
        assert_eq!(params.validate(), Err(ParamsError::InvalidSpacing(0)));

        let mut params = ConsensusParams::default();
        params.target_timespan = 1801;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::InvalidTimespan { .. })
        ));

        let mut params = ConsensusParams::default();
        params.target_timespan = i64::MAX / 100;
        params.target_spacing = i64::MAX / 100;
        assert_eq!(
            params.validate(),
            Err(ParamsError::TimespanTooLarge(i64::MAX / 100))
        );

        let mut params = ConsensusParams::default();
        params.target_timespan = MAX_TARGET_TIMESPAN;
        params.target_spacing = MAX_TARGET_TIMESPAN;
        assert!(params.validate().is_ok());

        let mut params = ConsensusParams::default();
        params.pow_limit = U256::zero();
        assert_eq!(params.validate(), Err(ParamsError::ZeroPowLimit));
    }

    #[test]
    fn test_params_serde() {
        let params = Network::Regtest.params();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains(
            "\"7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\""
        ));
        let back: ConsensusParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
