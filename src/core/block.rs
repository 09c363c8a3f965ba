//! Block header view used by difficulty computations
//!
//! Only the fields the difficulty engine reads are kept here. Headers are
//! read-only snapshots of the accepted chain.

use crate::core::compact::CompactTarget;
use crate::crypto::Hash256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Block header containing the difficulty-relevant metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block height (genesis is 0)
    pub height: u64,
    /// Block creation time, seconds since the Unix epoch
    pub timestamp: i64,
    /// Compact difficulty target
    pub bits: CompactTarget,
    /// Block hash
    pub hash: Hash256,
    /// Hash of the previous block (all zero for genesis)
    #[serde(default)]
    pub prev_hash: Hash256,
}

impl BlockHeader {
    pub fn new(
        height: u64,
        timestamp: i64,
        bits: CompactTarget,
        hash: Hash256,
        prev_hash: Hash256,
    ) -> Self {
        Self {
            height,
            timestamp,
            bits,
            hash,
            prev_hash,
        }
    }

    /// Whether this header starts the chain
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Header time as a UTC datetime, if representable
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}
