//! Header Index
//!
//! In-memory index over accepted block headers:
//! - Headers by hash (all branches)
//! - Main-chain hash by height (most cumulative work)
//! - Fork-aware ancestor lookup for the difficulty engine

use crate::core::block::BlockHeader;
use crate::core::chain::ChainView;
use crate::core::target::{block_work, U256};
use crate::crypto::Hash256;
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufReader};
use std::path::Path;
use thiserror::Error;

/// Index errors
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Duplicate header: {0}")]
    DuplicateHeader(Hash256),
    #[error("Unknown parent {prev_hash} for header {hash}")]
    UnknownParent { hash: Hash256, prev_hash: Hash256 },
    #[error("Genesis header {hash} references parent {prev_hash}")]
    GenesisWithParent { hash: Hash256, prev_hash: Hash256 },
    #[error("Second genesis header {0}")]
    DuplicateGenesis(Hash256),
    #[error("Header {hash} has height {got}, expected {expected}")]
    HeightMismatch {
        hash: Hash256,
        expected: u64,
        got: u64,
    },
}

// =============================================================================
// Index Entry
// =============================================================================

/// A stored header with its cumulative work
#[derive(Debug, Clone)]
pub struct HeaderIndexEntry {
    pub header: BlockHeader,
    /// Sum of block work from genesis up to and including this header
    pub chain_work: U256,
}

// =============================================================================
// Header Index
// =============================================================================

/// Index for header lookups by hash and main-chain height
#[derive(Debug, Default)]
pub struct HeaderIndex {
    /// Headers by hash
    by_hash: HashMap<Hash256, HeaderIndexEntry>,
    /// Main-chain hash by height
    by_height: Vec<Hash256>,
    /// Best chain tip hash
    best_block: Option<Hash256>,
}

impl HeaderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from headers given parents-first
    pub fn from_headers<I>(headers: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = BlockHeader>,
    {
        let mut index = Self::new();
        for header in headers {
            index.add_header(header)?;
        }
        Ok(index)
    }

    /// Load a JSON array of headers, parents first
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let file = fs::File::open(path)?;
        let headers: Vec<BlockHeader> = serde_json::from_reader(BufReader::new(file))?;
        Self::from_headers(headers)
    }

    /// Add a header whose parent is already indexed (or a genesis header)
    pub fn add_header(&mut self, header: BlockHeader) -> Result<(), IndexError> {
        if self.contains(&header.hash) {
            return Err(IndexError::DuplicateHeader(header.hash));
        }

        let parent_work = if header.is_genesis() {
            if !header.prev_hash.is_zero() {
                return Err(IndexError::GenesisWithParent {
                    hash: header.hash,
                    prev_hash: header.prev_hash,
                });
            }
            if !self.by_height.is_empty() {
                return Err(IndexError::DuplicateGenesis(header.hash));
            }
            U256::zero()
        } else {
            let parent = self.by_hash.get(&header.prev_hash).ok_or(IndexError::UnknownParent {
                hash: header.hash,
                prev_hash: header.prev_hash,
            })?;

            if parent.header.height + 1 != header.height {
                return Err(IndexError::HeightMismatch {
                    hash: header.hash,
                    expected: parent.header.height + 1,
                    got: header.height,
                });
            }
            parent.chain_work
        };

        let chain_work = parent_work.saturating_add(block_work(&header.bits.decode().value));
        let hash = header.hash;

        self.by_hash.insert(hash, HeaderIndexEntry { header, chain_work });

        let best_work = self
            .best_block
            .and_then(|h| self.by_hash.get(&h))
            .map(|e| e.chain_work);
        if best_work.map_or(true, |best| chain_work > best) {
            self.set_best(hash);
        }

        Ok(())
    }

    /// Make `tip` the best block and rewrite the height index along its branch
    fn set_best(&mut self, tip: Hash256) {
        let Some(tip_height) = self.by_hash.get(&tip).map(|e| e.header.height) else {
            return;
        };

        let len = tip_height as usize + 1;
        self.by_height.truncate(len);
        self.by_height.resize(len, Hash256::ZERO);

        let mut cursor = tip;
        while let Some(entry) = self.by_hash.get(&cursor) {
            let height = entry.header.height as usize;
            if self.by_height[height] == cursor {
                break;
            }
            self.by_height[height] = cursor;
            if height == 0 {
                break;
            }
            cursor = entry.header.prev_hash;
        }

        self.best_block = Some(tip);
    }

    /// Get header entry by hash
    pub fn get(&self, hash: &Hash256) -> Option<&HeaderIndexEntry> {
        self.by_hash.get(hash)
    }

    /// Get main-chain header by height
    pub fn get_by_height(&self, height: u64) -> Option<&BlockHeader> {
        let hash = self.by_height.get(height as usize)?;
        self.by_hash.get(hash).map(|e| &e.header)
    }

    /// Best chain tip
    pub fn tip(&self) -> Option<&BlockHeader> {
        self.best_block
            .and_then(|h| self.by_hash.get(&h))
            .map(|e| &e.header)
    }

    /// Whether `header` is on the best chain
    pub fn is_on_main_chain(&self, header: &BlockHeader) -> bool {
        self.by_height.get(header.height as usize) == Some(&header.hash)
    }

    /// Check if header exists
    pub fn contains(&self, hash: &Hash256) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Get total indexed headers
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    /// Get statistics
    pub fn stats(&self) -> HeaderIndexStats {
        HeaderIndexStats {
            total_headers: self.by_hash.len(),
            main_chain_headers: self.by_height.len(),
            best_height: self.tip().map(|h| h.height),
            best_chain_work: self
                .best_block
                .and_then(|h| self.by_hash.get(&h))
                .map(|e| e.chain_work)
                .unwrap_or_default(),
        }
    }
}

impl ChainView for HeaderIndex {
    fn ancestor_at(&self, block: &BlockHeader, height: u64) -> Option<&BlockHeader> {
        if height > block.height {
            return None;
        }

        let mut cursor = self.by_hash.get(&block.hash)?;
        loop {
            if cursor.header.height == height {
                return Some(&cursor.header);
            }
            // once on the main chain the height index answers directly
            if self.is_on_main_chain(&cursor.header) {
                return self.get_by_height(height);
            }
            cursor = self.by_hash.get(&cursor.header.prev_hash)?;
        }
    }
}

/// Header index statistics
#[derive(Debug, Clone)]
pub struct HeaderIndexStats {
    pub total_headers: usize,
    pub main_chain_headers: usize,
    pub best_height: Option<u64>,
    pub best_chain_work: U256,
}

// =============================================================================
// Test fixtures
// =============================================================================


// =============================================================================
// Tests
// =============================================================================
