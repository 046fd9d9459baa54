//! Error types for composite-key operations.

use thiserror::Error;

/// Rejection of a malformed composite key.
///
/// A key that is well formed but not present is never an error: lookups and
/// deletions report it as `None`.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Insert and find need exactly one component per dimension.
    #[error("composite key has {len} components, expected {expected}")]
    KeyLength { len: usize, expected: usize },

    /// Delete accepts any non-empty prefix of a full key.
    #[error("composite key has {len} components, expected between 1 and {dimensions}")]
    PrefixLength { len: usize, dimensions: usize },
}

/// Result type for composite-key operations.
pub type Result<T> = std::result::Result<T, Error>;
