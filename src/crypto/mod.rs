//! Hash types used by header validation

pub mod hash;

pub use hash::{Hash256, HashError};
