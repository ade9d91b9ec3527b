//! Errors raised by trie operations.
use alloy_primitives::B256;
use thiserror::Error;

/// Result alias used across the crate.
pub type TrieResult<T> = Result<T, TrieError>;

/// Failure of a single trie operation. A failed `put`/`remove` leaves the previous root in place.
///
/// The error is `Clone` because a single in-flight node load hands its outcome to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// The backing store has no node for the requested hash.
    #[error("node {0} not found in store")]
    NotFound(B256),
    /// A stored node or compact path could not be decoded.
    #[error(transparent)]
    Decode(#[from] alloy_rlp::Error),
    /// The operation is not defined for this node variant.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// The value codec rejected the stored bytes.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// A stored node outlived the trie whose loader resolves it.
    #[error("loader for node {0} was dropped")]
    LoaderDropped(B256),
    /// The backing store failed.
    #[error("store error: {0}")]
    Store(String),
}
