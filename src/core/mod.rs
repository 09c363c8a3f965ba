//! Core consensus types
//!
//! This module contains the building blocks the difficulty engine reads:
//! - 256-bit targets and chain work
//! - The compact "bits" encoding
//! - Per-network consensus parameters
//! - Block headers and the read-only chain view

pub mod block;
pub mod chain;
pub mod compact;
pub mod params;
pub mod target;

pub use block::BlockHeader;
pub use chain::{median_timestamp, ChainView, MTP_BLOCK_COUNT};
pub use compact::{CompactTarget, DecodedTarget};
pub use params::{
    ConsensusParams, Network, ParamsError, DEFAULT_TARGET_SPACING, DEFAULT_TARGET_TIMESPAN,
    MAIN_POW_LIMIT, REGTEST_POW_LIMIT,
};
pub use target::{
    block_work, difficulty, parse_target_hex, target_to_hex, Target, TargetError, U256, U512,
};
