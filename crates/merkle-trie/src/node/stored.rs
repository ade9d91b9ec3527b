//! A node known only by its hash, loaded from the backing store on first access.
use crate::error::{TrieError, TrieResult};
use crate::loader::NodeLoader;
use crate::node::Node;
use alloy_primitives::B256;
use core::fmt;
use std::sync::Weak;

/// Proxy for a persisted node.
///
/// The node owns nothing but its hash. The loaded delegate lives in the loader's cache, can be
/// evicted at any time and is transparently fetched again on the next access.
///
/// The loader is held weakly: cached nodes contain stored children, and the trie owning the
/// loader is what keeps it alive.
pub struct StoredNode {
    hash: B256,
    loader: Weak<NodeLoader>,
}

impl StoredNode {
    /// Creates a reference to the node with the given hash.
    pub const fn new(hash: B256, loader: Weak<NodeLoader>) -> Self {
        Self { hash, loader }
    }

    /// Hash of the referenced node.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// Returns the delegate node, fetching it from the store if it is not cached.
    ///
    /// Concurrent calls for the same hash share a single fetch and observe the same node.
    /// Fails with [`TrieError::LoaderDropped`] once the owning trie is gone.
    pub async fn resolve(&self) -> TrieResult<Node> {
        let loader = self.loader.upgrade().ok_or(TrieError::LoaderDropped(self.hash))?;
        loader.load(self.hash).await
    }

    /// Drops the cached delegate. The next [`resolve`](Self::resolve) fetches it again.
    pub fn unload(&self) {
        if let Some(loader) = self.loader.upgrade() {
            loader.evict(&self.hash);
        }
    }

    /// Whether the delegate is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.loader.upgrade().is_some_and(|loader| loader.is_cached(&self.hash))
    }
}

impl fmt::Debug for StoredNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredNode").field("hash", &self.hash).finish_non_exhaustive()
    }
}
