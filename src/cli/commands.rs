//! CLI commands for the difficulty engine
//!
//! Implements all command handlers for the CLI interface.

use crate::config::Config;
use crate::core::compact::CompactTarget;
use crate::core::params::{ConsensusParams, Network};
use crate::core::target::{block_work, difficulty, parse_target_hex, target_to_hex};
use crate::crypto::Hash256;
use crate::pow::{select_next_target, validate_proof_of_work, PowError};
use crate::storage::HeaderIndex;
use chrono::Utc;
use log::debug;
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Build the effective config from an optional file and an optional
/// network override
pub fn load_config(path: Option<&Path>, network: Option<Network>) -> CliResult<Config> {
    let mut config = match path {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            Config::load(path)?
        }
        None => Config::default(),
    };

    if let Some(network) = network {
        config.network = network;
    }

    Ok(config)
}

/// Print the consensus parameters in use
pub fn cmd_params(config: &Config) -> CliResult<()> {
    let params = config.resolve()?;

    println!("⚙️  Consensus Parameters ({})", config.network);
    println!("   ├─ Pow limit: {}", target_to_hex(&params.pow_limit));
    println!("   ├─ Pow limit bits: {}", params.pow_limit_compact());
    println!("   ├─ Target timespan: {}s", params.target_timespan);
    println!("   ├─ Target spacing: {}s", params.target_spacing);
    println!("   ├─ Adjustment interval: {} blocks", params.adjustment_interval());
    println!(
        "   ├─ Min-difficulty blocks: {}",
        params.allow_min_difficulty_blocks
    );
    println!("   └─ Retargeting: {}", !params.no_retargeting);

    if !config.overrides.is_empty() {
        println!("\n   ⚠️  Parameters overridden by config file");
    }

    Ok(())
}

/// Expand a compact target
pub fn cmd_decode(params: &ConsensusParams, bits: &str) -> CliResult<()> {
    let bits = CompactTarget::from_hex(bits)?;
    let decoded = bits.decode();

    println!("🔓 Compact {}", bits);
    println!("   ├─ Target: {}", target_to_hex(&decoded.value));
    println!("   ├─ Negative: {}", decoded.negative);
    println!("   ├─ Overflow: {}", decoded.overflow);

    if decoded.is_well_formed() {
        println!("   ├─ Canonical: {}", CompactTarget::encode(&decoded.value));
        println!("   ├─ Work: {}", block_work(&decoded.value));
        println!(
            "   └─ Difficulty: {:.4}",
            difficulty(&decoded.value, &params.pow_limit)
        );
    } else {
        println!("   └─ ❌ Not a usable target");
    }

    Ok(())
}

/// Compress a target to its compact form
pub fn cmd_encode(target: &str) -> CliResult<()> {
    let target = parse_target_hex(target)?;
    let bits = CompactTarget::encode(&target);
    let restored = bits.decode().value;

    println!("🔒 Target {}", target_to_hex(&target));
    println!("   ├─ Compact: {}", bits);
    println!("   └─ Decodes to: {}", target_to_hex(&restored));

    if restored != target {
        println!("\n   ⚠️  Encoding truncated low-order bits");
    }

    Ok(())
}

/// Check a block hash against a claimed compact target
pub fn cmd_check(params: &ConsensusParams, hash: &str, bits: &str) -> CliResult<()> {
    let hash = Hash256::from_hex(hash)?;
    let bits = CompactTarget::from_hex(bits)?;

    println!("🔍 Checking proof of work...");
    println!("   ├─ Hash: {}", hash);
    println!("   └─ Bits: {}", bits);

    match validate_proof_of_work(&hash, bits, params) {
        Ok(()) => println!("✅ Proof of work is valid!"),
        Err(PowError::InvalidTarget(fault)) => {
            println!("❌ Invalid target: {:?}", fault);
        }
        Err(PowError::InsufficientWork) => {
            println!("❌ Hash does not meet the target");
        }
    }

    Ok(())
}

/// Print the target required of the block after the best header in `headers`
pub fn cmd_next(params: &ConsensusParams, headers: &Path, time: Option<i64>) -> CliResult<()> {
    let index = HeaderIndex::load_json(headers)?;
    let stats = index.stats();
    let timestamp = time.unwrap_or_else(|| Utc::now().timestamp());

    let next = select_next_target(&index, index.tip(), timestamp, params)?;

    println!("⛓️  Header Chain");
    println!("   ├─ Headers: {}", stats.total_headers);
    match index.tip() {
        Some(tip) => {
            println!("   ├─ Best height: {}", tip.height);
            println!("   ├─ Best hash: {}", tip.hash);
            println!("   ├─ Tip bits: {}", tip.bits);
        }
        None => println!("   ├─ Empty chain, next block is genesis"),
    }
    println!("   └─ Chain work: {}", stats.best_chain_work);

    println!("\n🎯 Next target at time {}", timestamp);
    println!("   ├─ Bits: {}", next);
    println!("   └─ Target: {}", target_to_hex(&next.decode().value));

    Ok(())
}
