//! Next required target, including the minimum-difficulty exception
//!
//! Networks with `allow_min_difficulty_blocks` accept a pow-limit block
//! whenever the chain stalls for more than two block spacings. Once
//! blocks arrive on time again the required target reverts to the last
//! one set by an ordinary block or a retarget boundary.

use crate::core::block::BlockHeader;
use crate::core::chain::ChainView;
use crate::core::compact::CompactTarget;
use crate::core::params::ConsensusParams;
use crate::pow::retarget::{calculate_next_target, RetargetError};
use log::debug;

/// Compute the compact target required of a block with timestamp
/// `candidate_timestamp` built on `current`.
///
/// `current` is `None` when the candidate is the genesis block.
pub fn select_next_target<C>(
    chain: &C,
    current: Option<&BlockHeader>,
    candidate_timestamp: i64,
    params: &ConsensusParams,
) -> Result<CompactTarget, RetargetError>
where
    C: ChainView + ?Sized,
{
    params.validate()?;
    let limit_bits = params.pow_limit_compact();

    let current = match current {
        Some(header) => header,
        None => return Ok(limit_bits),
    };

    if !params.allow_min_difficulty_blocks {
        return calculate_next_target(chain, current, params);
    }

    let stall_deadline = current
        .timestamp
        .saturating_add(params.target_spacing.saturating_mul(2));
    if candidate_timestamp > stall_deadline {
        debug!(
            "Selector: candidate at {} is past {}, minimum difficulty allowed",
            candidate_timestamp, stall_deadline
        );
        return Ok(limit_bits);
    }

    Ok(last_regular_block(chain, current, params).bits)
}

/// Walk back over minimum-difficulty blocks to the most recent block that
/// is a retarget boundary, carries a regular target, or is genesis
fn last_regular_block<'a, C>(
    chain: &'a C,
    mut block: &'a BlockHeader,
    params: &ConsensusParams,
) -> &'a BlockHeader
where
    C: ChainView + ?Sized,
{
    let limit_bits = params.pow_limit_compact();

    while block.bits == limit_bits && !params.is_retarget_boundary(block.height) {
        match chain.parent(block) {
            Some(parent) => block = parent,
            None => break,
        }
    }

    block
}
