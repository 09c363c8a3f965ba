//! Difficulty retargeting
//!
//! Once per window of `adjustment_interval` blocks the target is rescaled
//! by how long the window actually took, measured between the median
//! times past of its first and last block. The measured timespan is
//! damped by 4 and then bounded so one window can tighten difficulty by
//! at most 8% of the timespan and ease it by at most 16%.

use crate::core::block::BlockHeader;
use crate::core::chain::ChainView;
use crate::core::compact::CompactTarget;
use crate::core::params::{ConsensusParams, ParamsError};
use crate::core::target::{Target, U256, U512};
use log::{debug, error, info};
use thiserror::Error;

/// Largest per-window easing, percent of the target timespan
pub const MAX_ADJUST_DOWN: i64 = 16;

/// Largest per-window tightening, percent of the target timespan
pub const MAX_ADJUST_UP: i64 = 8;

/// Divisor applied to the deviation from the target timespan
pub const TIMESPAN_DAMPING: i64 = 4;

/// Retarget failures. Both indicate a caller or index bug, never a bad block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetargetError {
    #[error("Chain index has no ancestor at height {height} for block at height {tip_height}")]
    MissingAncestor { tip_height: u64, height: u64 },
    #[error("Invalid consensus parameters: {0}")]
    InvalidParams(#[from] ParamsError),
}

/// Damp `actual_timespan` towards the target timespan and clamp it to the
/// allowed adjustment range
pub fn bounded_timespan(actual_timespan: i64, params: &ConsensusParams) -> i64 {
    // i128 holds every intermediate for any i64 inputs
    let target = i128::from(params.target_timespan);
    let min_timespan = target * i128::from(100 - MAX_ADJUST_UP) / 100;
    let max_timespan = target * i128::from(100 + MAX_ADJUST_DOWN) / 100;

    let damped = target + (i128::from(actual_timespan) - target) / i128::from(TIMESPAN_DAMPING);
    debug!("Retarget: damped timespan {} before bounds", damped);

    let bounded = damped.clamp(min_timespan.min(max_timespan), max_timespan.max(min_timespan));
    i64::try_from(bounded).unwrap_or(if bounded < 0 { i64::MIN } else { i64::MAX })
}

/// Scale `old` by `timespan / target_timespan`, capped at the pow limit.
///
/// The product is formed in 512 bits so no precision is lost before the
/// division.
pub fn scale_target(old: &Target, timespan: i64, params: &ConsensusParams) -> Target {
    let numerator = U512::from(*old) * U512::from(timespan.max(0) as u64);
    let scaled = numerator / U512::from(params.target_timespan.max(1) as u64);

    match U256::try_from(scaled) {
        Ok(target) if target <= params.pow_limit => target,
        _ => {
            info!("Retarget: new target above pow limit, clamping");
            params.pow_limit
        }
    }
}

/// Compute the compact target required of the block after `current`
pub fn calculate_next_target<C>(
    chain: &C,
    current: &BlockHeader,
    params: &ConsensusParams,
) -> Result<CompactTarget, RetargetError>
where
    C: ChainView + ?Sized,
{
    params.validate()?;

    if params.no_retargeting {
        return Ok(current.bits);
    }

    let interval = params.adjustment_interval();
    if current.height + 1 < interval {
        debug!(
            "Retarget: height {} inside first window, using pow limit",
            current.height
        );
        return Ok(params.pow_limit_compact());
    }

    let first_height = current.height + 1 - interval;
    let first = chain.ancestor_at(current, first_height).ok_or_else(|| {
        error!(
            "Retarget: chain index missing ancestor {} of block {} at height {}",
            first_height, current.hash, current.height
        );
        RetargetError::MissingAncestor {
            tip_height: current.height,
            height: first_height,
        }
    })?;

    let actual_timespan = chain
        .median_time_past(current)
        .saturating_sub(chain.median_time_past(first));
    let timespan = bounded_timespan(actual_timespan, params);

    let old_target = current.bits.decode().value;
    let new_target = scale_target(&old_target, timespan, params);
    let new_bits = CompactTarget::encode(&new_target);

    debug!(
        "Retarget: height {} target timespan {} actual {} bounded {}",
        current.height, params.target_timespan, actual_timespan, timespan
    );
    debug!("Retarget: before {} {:x}", current.bits, old_target);
    debug!("Retarget: after  {} {:x}", new_bits, new_target);

    Ok(new_bits)
}
