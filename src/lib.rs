//! Pow-Engine: proof-of-work difficulty rules for a blockchain node
//!
//! This crate decides the mining target required of the next block and
//! checks that a block hash satisfies its claimed target:
//! - Compact "nBits" target encoding with sign and overflow detection
//! - Periodic retargeting from median-time-past with damping and bounds
//! - Minimum-difficulty exception for test networks
//! - Proof-of-work acceptance check
//! - In-memory header index with fork-aware ancestor lookup
//!
//! All engine functions are pure: parameters and chain access are passed
//! into every call, so any number of threads and networks can use them at
//! once.
//!
//! # Example
//!
//! ```rust
//! use pow_engine::core::{BlockHeader, CompactTarget, Network};
//! use pow_engine::crypto::Hash256;
//! use pow_engine::pow::{check_proof_of_work, select_next_target};
//! use pow_engine::storage::HeaderIndex;
//!
//! let params = Network::Testnet.params();
//! let mut index = HeaderIndex::new();
//!
//! let genesis_hash = Hash256::from_hex(
//!     "00000000bec226aaf9b7691a1bdb832999606a4b1dc8968307070c539b4f0b7b",
//! ).unwrap();
//! let bits = select_next_target(&index, None, 1_462_060_800, &params).unwrap();
//! assert!(check_proof_of_work(&genesis_hash, bits, &params));
//!
//! index
//!     .add_header(BlockHeader::new(0, 1_462_060_800, bits, genesis_hash, Hash256::ZERO))
//!     .unwrap();
//! let next = select_next_target(&index, index.tip(), 1_462_060_830, &params).unwrap();
//! assert_eq!(next, CompactTarget(0x1d00_ffff));
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod pow;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, ConfigError, ParamsOverrides};
pub use core::{BlockHeader, ChainView, CompactTarget, ConsensusParams, Network, Target, U256};
pub use crypto::Hash256;
pub use pow::{
    calculate_next_target, check_proof_of_work, select_next_target, validate_proof_of_work,
    PowError, RetargetError,
};
pub use storage::HeaderIndex;
