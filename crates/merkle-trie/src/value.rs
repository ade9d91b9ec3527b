//! Conversion of user values to and from the bytes held by the trie.
use crate::error::{TrieError, TrieResult};
use alloy_primitives::Bytes;

/// A value storable in a [`MerklePatriciaTrie`](crate::MerklePatriciaTrie).
///
/// An empty encoding means "no value": putting it removes the key.
pub trait TrieValue: Sized {
    /// Bytes stored in the trie.
    fn encode_value(&self) -> Bytes;

    /// Rebuilds a value from the stored bytes.
    fn decode_value(bytes: Bytes) -> TrieResult<Self>;
}

impl TrieValue for Bytes {
    fn encode_value(&self) -> Bytes {
        self.clone()
    }

    fn decode_value(bytes: Bytes) -> TrieResult<Self> {
        Ok(bytes)
    }
}

impl TrieValue for Vec<u8> {
    fn encode_value(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }

    fn decode_value(bytes: Bytes) -> TrieResult<Self> {
        Ok(bytes.to_vec())
    }
}

impl TrieValue for String {
    fn encode_value(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }

    fn decode_value(bytes: Bytes) -> TrieResult<Self> {
        Self::from_utf8(bytes.to_vec()).map_err(|err| TrieError::InvalidValue(err.to_string()))
    }
}
