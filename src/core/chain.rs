//! Read-only chain access consumed by the difficulty engine
//!
//! The engine never walks pointers itself. Everything it needs from the
//! chain index (ancestor lookup and median time past) goes through the
//! `ChainView` capability, implemented by the real index and by light
//! fakes in tests. Synchronisation of the underlying index is the
//! caller's responsibility.

use crate::core::block::BlockHeader;

/// Number of blocks used for Median Time Past
pub const MTP_BLOCK_COUNT: usize = 11;

/// Ancestor lookup over an accepted chain
pub trait ChainView {
    /// The ancestor of `block` at `height` on `block`'s own chain.
    ///
    /// Returns `block`'s stored entry when `height == block.height` and
    /// `None` when `height > block.height` or the index has no such entry.
    fn ancestor_at(&self, block: &BlockHeader, height: u64) -> Option<&BlockHeader>;

    /// The block's parent, `None` for genesis
    fn parent(&self, block: &BlockHeader) -> Option<&BlockHeader> {
        if block.height == 0 {
            return None;
        }
        self.ancestor_at(block, block.height - 1)
    }

    /// Median of the timestamps of `block` and up to 10 of its ancestors
    fn median_time_past(&self, block: &BlockHeader) -> i64 {
        let mut times = Vec::with_capacity(MTP_BLOCK_COUNT);
        times.push(block.timestamp);

        let mut cursor = self.parent(block);
        while let Some(ancestor) = cursor {
            if times.len() == MTP_BLOCK_COUNT {
                break;
            }
            times.push(ancestor.timestamp);
            cursor = self.parent(ancestor);
        }

        median_timestamp(times)
    }
}

/// Median of a non-empty timestamp list.
///
/// For an even count this is the upper of the two middle values.
pub fn median_timestamp(mut times: Vec<i64>) -> i64 {
    times.sort_unstable();
    times.get(times.len() / 2).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compact::CompactTarget;
    use crate::crypto::Hash256;

    /// Linear chain stored by height
    struct VecChain(Vec<BlockHeader>);

    impl ChainView for VecChain {
        fn ancestor_at(&self, block: &BlockHeader, height: u64) -> Option<&BlockHeader> {
            if height > block.height {
                return None;
            }
            self.0.get(height as usize)
        }
    }

    fn chain_with_times(times: &[i64]) -> VecChain {
        VecChain(
            times
                .iter()
                .enumerate()
                .map(|(h, t)| {
                    BlockHeader::new(
                        h as u64,
                        *t,
                        CompactTarget(0x1d00_ffff),
                        Hash256::ZERO,
                        Hash256::ZERO,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_median_timestamp() {
        assert_eq!(median_timestamp(vec![5]), 5);
        assert_eq!(median_timestamp(vec![3, 1, 2]), 2);
        // even count takes the upper middle
        assert_eq!(median_timestamp(vec![10, 40, 20, 30]), 30);
    }

    #[test]
    fn test_parent() {
        let chain = chain_with_times(&[0, 30, 60]);
        assert!(chain.parent(&chain.0[0]).is_none());
        assert_eq!(chain.parent(&chain.0[2]).unwrap().height, 1);
    }

    #[test]
    fn test_median_time_past_uses_last_eleven() {
        // 20 blocks, 30s apart, one forged timestamp far in the future
        let mut times: Vec<i64> = (0..20).map(|i| i * 30).collect();
        times[18] = 1_000_000;
        let chain = chain_with_times(&times);

        let tip = &chain.0[19];
        // window is heights 9..=19; median is height 14 once the outlier sorts last
        assert_eq!(chain.median_time_past(tip), 14 * 30);
    }

    #[test]
    fn test_median_time_past_near_genesis() {
        let chain = chain_with_times(&[100, 130, 160, 190]);
        assert_eq!(chain.median_time_past(&chain.0[0]), 100);
        assert_eq!(chain.median_time_past(&chain.0[1]), 130);
        assert_eq!(chain.median_time_past(&chain.0[3]), 160);
    }
}
