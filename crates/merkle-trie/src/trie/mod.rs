//! The trie facade: a map from byte keys to values committed to by a single root hash.
mod commit;
mod display;

use crate::error::TrieResult;
use crate::factory::{DefaultNodeFactory, NodeFactory, StoredNodeFactory};
use crate::node::Node;
use crate::path::bytes_to_path;
use crate::value::TrieValue;
use crate::visitor;
use alloy_primitives::B256;
use core::fmt;
use core::marker::PhantomData;
use tracing::trace;

/// A Merkle Patricia trie.
///
/// Updates take `&mut self` and swap the root only once the new one is fully built: a failed
/// update (e.g. a node missing from the store) leaves the trie unchanged. Lookups take `&self`
/// and may run concurrently.
pub struct MerklePatriciaTrie<V, F = DefaultNodeFactory> {
    root: Node,
    factory: F,
    _value: PhantomData<fn() -> V>,
}

/// A trie whose nodes are persisted in, and lazily loaded from, a
/// [`NodeStore`](crate::NodeStore).
pub type StoredMerklePatriciaTrie<V> = MerklePatriciaTrie<V, StoredNodeFactory>;

impl<V: TrieValue> MerklePatriciaTrie<V> {
    /// Creates an empty in-memory trie.
    pub const fn new() -> Self {
        Self::from_parts(Node::Null, DefaultNodeFactory)
    }
}

impl<V: TrieValue> Default for MerklePatriciaTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, F> MerklePatriciaTrie<V, F> {
    pub(crate) const fn from_parts(root: Node, factory: F) -> Self {
        Self { root, factory, _value: PhantomData }
    }

    /// Root node.
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Factory building the nodes of this trie.
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Root hash. [`EMPTY_ROOT_HASH`](alloy_trie::EMPTY_ROOT_HASH) for an empty trie.
    pub fn root_hash(&self) -> B256 {
        self.root.hash()
    }

    /// Whether the trie holds no entry.
    pub const fn is_empty(&self) -> bool {
        self.root.is_null()
    }
}

impl<V: TrieValue, F: NodeFactory> MerklePatriciaTrie<V, F> {
    /// Creates an empty trie building its nodes with `factory`.
    pub const fn with_factory(factory: F) -> Self {
        Self::from_parts(Node::Null, factory)
    }

    /// Value stored under `key`.
    pub async fn get(&self, key: impl AsRef<[u8]>) -> TrieResult<Option<V>> {
        let path = bytes_to_path(key);
        visitor::get(self.root.clone(), path).await?.map(V::decode_value).transpose()
    }

    /// Stores `value` under `key`, replacing any previous value. A value with an empty encoding
    /// removes the key.
    pub async fn put(&mut self, key: impl AsRef<[u8]>, value: V) -> TrieResult<()> {
        let value = value.encode_value();
        if value.is_empty() {
            return self.remove(key).await;
        }
        let path = bytes_to_path(key);
        let root = visitor::put(self.root.clone(), path, value, &self.factory).await?;
        self.root = root;
        trace!(root = %self.root.hash(), "trie updated");
        Ok(())
    }

    /// Removes the value stored under `key`, if any.
    pub async fn remove(&mut self, key: impl AsRef<[u8]>) -> TrieResult<()> {
        let path = bytes_to_path(key);
        let root = visitor::remove(self.root.clone(), path, &self.factory).await?;
        self.root = root;
        trace!(root = %self.root.hash(), "trie updated");
        Ok(())
    }
}

impl<V, F: fmt::Debug> fmt::Debug for MerklePatriciaTrie<V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerklePatriciaTrie")
            .field("root", &self.root)
            .field("factory", &self.factory)
            .finish()
    }
}
