//! Backing storage of serialized nodes, keyed by node hash.
use crate::error::TrieResult;
use alloy_primitives::{B256, Bytes};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Content-addressed node storage.
///
/// Entries are immutable: the value stored under a hash is always the RLP whose keccak-256 is
/// that hash, so writing the same entry twice is harmless.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Reads the RLP of the node with the given hash.
    async fn get(&self, hash: B256) -> TrieResult<Option<Bytes>>;

    /// Writes the RLP of a node under its hash.
    async fn put(&self, hash: B256, rlp: Bytes) -> TrieResult<()>;

    /// Writes several entries.
    async fn put_batch(&self, entries: Vec<(B256, Bytes)>) -> TrieResult<()> {
        for (hash, rlp) in entries {
            self.put(hash, rlp).await?;
        }
        Ok(())
    }
}

/// InMemory implementation of the [`NodeStore`] trait. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNodeStore {
    inner: Arc<RwLock<HashMap<B256, Bytes>>>,
}

impl InMemoryNodeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store holds no node.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Whether a node with the given hash is stored.
    pub fn contains(&self, hash: &B256) -> bool {
        self.inner.read().contains_key(hash)
    }
}

#[async_trait]
impl NodeStore for InMemoryNodeStore {
    async fn get(&self, hash: B256) -> TrieResult<Option<Bytes>> {
        Ok(self.inner.read().get(&hash).cloned())
    }

    async fn put(&self, hash: B256, rlp: Bytes) -> TrieResult<()> {
        self.inner.write().insert(hash, rlp);
        Ok(())
    }

    async fn put_batch(&self, entries: Vec<(B256, Bytes)>) -> TrieResult<()> {
        self.inner.write().extend(entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_entries() {
        let store = InMemoryNodeStore::new();
        let other = store.clone();
        let hash = B256::repeat_byte(7);

        assert!(store.is_empty());
        other.put(hash, Bytes::from_static(b"node")).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&hash));
        assert_eq!(store.get(hash).await.unwrap(), Some(Bytes::from_static(b"node")));
        assert_eq!(store.get(B256::ZERO).await.unwrap(), None);

        store
            .put_batch(vec![(B256::repeat_byte(1), Bytes::new()), (B256::repeat_byte(2), Bytes::new())])
            .await
            .unwrap();
        assert_eq!(other.len(), 3);
    }
}
