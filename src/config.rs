//! Engine configuration
//!
//! A config file selects one of the built-in networks and may override
//! individual consensus parameters:
//!
//! ```json
//! {
//!     "network": "testnet",
//!     "overrides": { "target_spacing": 60, "pow_limit": "0x00000fff" }
//! }
//! ```

use crate::core::params::{ConsensusParams, Network, ParamsError};
use crate::core::target::{parse_target_hex, TargetError};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid pow limit override: {0}")]
    InvalidPowLimit(#[from] TargetError),
    #[error("Invalid consensus parameters: {0}")]
    InvalidParams(#[from] ParamsError),
}

/// Per-field replacements for the selected network's parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsOverrides {
    /// Big-endian hex, `0x` prefix optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pow_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_timespan: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_spacing: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_min_difficulty_blocks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_retargeting: Option<bool>,
}

impl ParamsOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, params: &mut ConsensusParams) -> Result<(), ConfigError> {
        if let Some(limit) = &self.pow_limit {
            params.pow_limit = parse_target_hex(limit)?;
        }
        if let Some(timespan) = self.target_timespan {
            params.target_timespan = timespan;
        }
        if let Some(spacing) = self.target_spacing {
            params.target_spacing = spacing;
        }
        if let Some(allow) = self.allow_min_difficulty_blocks {
            params.allow_min_difficulty_blocks = allow;
        }
        if let Some(frozen) = self.no_retargeting {
            params.no_retargeting = frozen;
        }
        Ok(())
    }
}

/// Network selection plus parameter overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: Network,
    pub overrides: ParamsOverrides,
}

impl Config {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            overrides: ParamsOverrides::default(),
        }
    }

    /// Load a config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the config as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// The validated consensus parameters this config describes
    pub fn resolve(&self) -> Result<ConsensusParams, ConfigError> {
        let mut params = self.network.params();
        self.overrides.apply(&mut params)?;
        params.validate()?;

        if !self.overrides.is_empty() {
            info!("Using {} parameters with overrides", self.network);
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::U256;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_main() {
        let config = Config::default();
        assert_eq!(config.network, Network::Main);
        assert_eq!(config.resolve().unwrap(), Network::Main.params());
    }

    #[test]
    fn test_overrides_apply() {
        let config = Config {
            network: Network::Testnet,
            overrides: ParamsOverrides {
                pow_limit: Some("0x00ffff".to_string()),
                target_spacing: Some(60),
                no_retargeting: Some(true),
                ..Default::default()
            },
        };

        let params = config.resolve().unwrap();
        assert_eq!(params.pow_limit, U256::from(0xffffu64));
        assert_eq!(params.target_spacing, 60);
        assert_eq!(params.adjustment_interval(), 30);
        assert!(params.allow_min_difficulty_blocks);
        assert!(params.no_retargeting);
    }

    #[test]
    fn test_invalid_overrides() {
        let mut config = Config::for_network(Network::Main);
        config.overrides.target_spacing = Some(7);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidParams(ParamsError::InvalidTimespan { .. }))
        ));

        let mut config = Config::for_network(Network::Main);
        config.overrides.target_timespan = Some(i64::MAX / 100);
        config.overrides.target_spacing = Some(i64::MAX / 100);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidParams(ParamsError::TimespanTooLarge(_)))
        ));

        let mut config = Config::for_network(Network::Main);
        config.overrides.pow_limit = Some("zz".to_string());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidPowLimit(_))
        ));

        let mut config = Config::for_network(Network::Main);
        config.overrides.pow_limit = Some("00".to_string());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidParams(ParamsError::ZeroPowLimit))
        ));
    }

    #[test]
    fn test_load_and_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pow.json");

        std::fs::write(
            &path,
            r#"{ "network": "regtest", "overrides": { "target_timespan": 600 } }"#,
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.network, Network::Regtest);
        assert_eq!(config.resolve().unwrap().adjustment_interval(), 20);

        let copy = dir.path().join("copy.json");
        config.save(&copy).unwrap();
        assert_eq!(Config::load(&copy).unwrap(), config);
    }

    #[test]
    fn test_load_partial_and_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pow.json");

        std::fs::write(&path, "{}").unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::SerializationError(_))
        ));

        assert!(matches!(
            Config::load(dir.path().join("absent.json")),
            Err(ConfigError::IoError(_))
        ));
    }
}
