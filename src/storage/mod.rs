//! Storage module for the in-memory header index

pub mod index;

pub use index::{HeaderIndex, HeaderIndexEntry, HeaderIndexStats, IndexError};
