//! Persistence of a store-backed trie.
use super::{MerklePatriciaTrie, StoredMerklePatriciaTrie};
use crate::config::StoredTrieConfig;
use crate::error::TrieResult;
use crate::factory::{NodeFactory, StoredNodeFactory};
use crate::loader::{LoaderStats, NodeLoader};
use crate::node::{BranchChildren, Node};
use crate::store::NodeStore;
use crate::value::TrieValue;
use alloy_primitives::{B256, Bytes};
use alloy_trie::EMPTY_ROOT_HASH;
use std::sync::Arc;
use tracing::debug;

/// A node about to be written, with the form it takes once written: children referenced by
/// hash are replaced by stored references.
struct Pending {
    hash: B256,
    rlp: Bytes,
    committed: Node,
}

impl<V: TrieValue> StoredMerklePatriciaTrie<V> {
    /// Opens the trie with the given root hash in `store`. Nothing is read until first access.
    pub fn open(store: Arc<dyn NodeStore>, root_hash: B256, config: StoredTrieConfig) -> Self {
        let factory = StoredNodeFactory::new(store, config);
        let root = if root_hash == EMPTY_ROOT_HASH { Node::Null } else { factory.stored(root_hash) };
        MerklePatriciaTrie::from_parts(root, factory)
    }

    /// Creates an empty trie persisting to `store`.
    pub fn empty(store: Arc<dyn NodeStore>, config: StoredTrieConfig) -> Self {
        Self::open(store, EMPTY_ROOT_HASH, config)
    }

    /// Writes every node created since the last commit to the store and returns the root hash.
    ///
    /// Nodes embedded in their parent are not written on their own; the root always is, so the
    /// trie can be reopened from its hash. Subtrees that are still stored references are not
    /// visited. Afterwards the root is itself a stored reference and the written nodes sit in the
    /// loader cache.
    pub async fn commit(&mut self) -> TrieResult<B256> {
        let root_hash = self.root.hash();
        if matches!(self.root, Node::Null | Node::Stored(_)) {
            return Ok(root_hash);
        }

        let mut pending = Vec::new();
        let root = collect_uncommitted(&self.root, &self.factory, &mut pending);
        if !matches!(root, Node::Stored(_)) {
            // An embeddable root is still addressed by its hash.
            pending.push(Pending { hash: root_hash, rlp: root.rlp()?, committed: root });
        }

        let written = pending.len();
        let entries = pending.iter().map(|node| (node.hash, node.rlp.clone())).collect();
        self.factory.loader().store().put_batch(entries).await?;

        let loader = self.factory.loader();
        for node in pending {
            loader.prime(node.hash, node.committed);
        }
        self.root = self.factory.stored(root_hash);
        debug!(root = %root_hash, nodes = written, "trie committed");
        Ok(root_hash)
    }

    /// Drops the loaded root from the cache. The next access reloads it from the store.
    pub fn unload_root(&self) {
        if let Node::Stored(stored) = &self.root {
            stored.unload();
        }
    }

    /// The loader resolving the stored nodes of this trie.
    pub const fn loader(&self) -> &Arc<NodeLoader> {
        self.factory.loader()
    }

    /// Activity counters of the loader.
    pub fn loader_stats(&self) -> &LoaderStats {
        self.factory.loader().stats()
    }
}

// Post-order walk queuing every in-memory node that is referenced by hash, children first.
// Returns the form of `node` its parent embeds.
fn collect_uncommitted(
    node: &Node,
    factory: &StoredNodeFactory,
    pending: &mut Vec<Pending>,
) -> Node {
    let committed = match node {
        Node::Null | Node::Stored(_) => return node.clone(),
        Node::Leaf(_) => node.clone(),
        Node::Extension(extension) => {
            let child = collect_uncommitted(extension.child(), factory, pending);
            if child.ptr_eq(extension.child()) {
                node.clone()
            } else {
                factory.create_extension(extension.path().clone(), child)
            }
        }
        Node::Branch(branch) => {
            let mut children = BranchChildren::new();
            let mut changed = false;
            for (idx, child) in branch.children().iter().enumerate() {
                let committed = collect_uncommitted(child, factory, pending);
                changed |= !committed.ptr_eq(child);
                children.set(idx as u8, committed);
            }
            if changed {
                factory.create_branch(children, branch.value().cloned())
            } else {
                node.clone()
            }
        }
    };

    let rlp = committed.encoded_rlp();
    if rlp.len() < 32 {
        return committed;
    }
    let hash = committed.hash();
    pending.push(Pending { hash, rlp, committed });
    factory.stored(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrieError;
    use crate::store::InMemoryNodeStore;
    use alloy_primitives::hex;

    fn stored_trie(store: &InMemoryNodeStore) -> StoredMerklePatriciaTrie<Bytes> {
        StoredMerklePatriciaTrie::empty(Arc::new(store.clone()), StoredTrieConfig::default())
    }

    #[tokio::test]
    async fn commit_then_reopen() {
        let store = InMemoryNodeStore::new();
        let mut trie = stored_trie(&store);
        for i in 0..64_u8 {
            trie.put([i, i.wrapping_mul(7)], Bytes::from(vec![i; 48])).await.unwrap();
        }
        let root = trie.commit().await.unwrap();
        assert!(matches!(trie.root(), Node::Stored(_)));
        assert!(store.contains(&root));

        let reopened =
            StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store.clone()), root, StoredTrieConfig::default());
        assert_eq!(reopened.root_hash(), root);
        for i in 0..64_u8 {
            assert_eq!(
                reopened.get([i, i.wrapping_mul(7)]).await.unwrap(),
                Some(Bytes::from(vec![i; 48]))
            );
        }
        assert!(reopened.loader_stats().fetches() > 0);
    }

    #[tokio::test]
    async fn small_root_is_written() {
        let store = InMemoryNodeStore::new();
        let mut trie = stored_trie(&store);
        trie.put(hex!("01"), Bytes::from("x")).await.unwrap();
        let root = trie.commit().await.unwrap();
        assert_eq!(store.len(), 1);

        let reopened =
            StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store), root, StoredTrieConfig::default());
        assert_eq!(reopened.get(hex!("01")).await.unwrap(), Some(Bytes::from("x")));
    }

    #[tokio::test]
    async fn empty_trie_commits_nothing() {
        let store = InMemoryNodeStore::new();
        let mut trie = stored_trie(&store);
        assert_eq!(trie.commit().await.unwrap(), EMPTY_ROOT_HASH);
        assert!(store.is_empty());

        let reopened =
            StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store), EMPTY_ROOT_HASH, StoredTrieConfig::default());
        assert!(reopened.is_empty());
    }

    #[tokio::test]
    async fn second_commit_only_writes_new_nodes() {
        let store = InMemoryNodeStore::new();
        let mut trie = stored_trie(&store);
        for i in 0..16_u8 {
            trie.put([i << 4], Bytes::from(vec![i; 40])).await.unwrap();
        }
        trie.commit().await.unwrap();
        // Root branch plus sixteen hashed leaves.
        assert_eq!(store.len(), 17);

        trie.put([0x05], Bytes::from(vec![0xff; 40])).await.unwrap();
        let Node::Branch(root) = trie.root() else { panic!("expected a branch") };
        // Siblings of the updated slot are still references into the store.
        assert!(matches!(root.child(1), Node::Stored(_)));

        trie.commit().await.unwrap();
        // New root, a branch at slot 0 and both of its leaves, whose paths got shorter.
        assert_eq!(store.len(), 17 + 4);
    }

    #[tokio::test]
    async fn commit_of_unchanged_trie_is_a_no_op() {
        let store = InMemoryNodeStore::new();
        let mut trie = stored_trie(&store);
        trie.put(b"key", Bytes::from(vec![1; 40])).await.unwrap();
        let root = trie.commit().await.unwrap();
        let written = store.len();

        trie.remove(b"absent").await.unwrap();
        assert_eq!(trie.commit().await.unwrap(), root);
        assert_eq!(store.len(), written);
    }

    #[tokio::test]
    async fn unloaded_root_is_fetched_again() {
        let store = InMemoryNodeStore::new();
        let mut trie = stored_trie(&store);
        trie.put(b"key", Bytes::from(vec![1; 40])).await.unwrap();
        trie.commit().await.unwrap();

        // The committed nodes are primed, so reads are served from the cache.
        assert_eq!(trie.get(b"key").await.unwrap(), Some(Bytes::from(vec![1; 40])));
        assert_eq!(trie.loader_stats().fetches(), 0);

        trie.unload_root();
        assert_eq!(trie.get(b"key").await.unwrap(), Some(Bytes::from(vec![1; 40])));
        assert_eq!(trie.loader_stats().fetches(), 1);
    }

    #[tokio::test]
    async fn dropping_the_trie_frees_the_loader() {
        let store = InMemoryNodeStore::new();
        let mut trie = stored_trie(&store);
        for i in 0..16_u8 {
            trie.put([i << 4], Bytes::from(vec![i; 40])).await.unwrap();
        }
        let root = trie.commit().await.unwrap();

        let reopened =
            StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store), root, StoredTrieConfig::default());
        assert_eq!(reopened.get([0x10]).await.unwrap(), Some(Bytes::from(vec![1; 40])));
        // The cached root branch holds stored references to its sixteen children.
        assert!(reopened.loader().cached_len() >= 2);
        let Node::Stored(stored_root) = reopened.root().clone() else { panic!("expected a stored root") };

        let loader = Arc::downgrade(reopened.loader());
        drop(reopened);
        assert!(loader.upgrade().is_none());
        assert_eq!(stored_root.resolve().await.unwrap_err(), TrieError::LoaderDropped(root));
    }

    #[tokio::test]
    async fn failed_update_keeps_the_root() {
        let store = InMemoryNodeStore::new();
        let missing = B256::repeat_byte(0x42);
        let mut trie =
            StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store), missing, StoredTrieConfig::default());

        assert_eq!(trie.get(b"key").await, Err(TrieError::NotFound(missing)));
        assert_eq!(trie.put(b"key", Bytes::from("v")).await, Err(TrieError::NotFound(missing)));
        assert_eq!(trie.remove(b"key").await, Err(TrieError::NotFound(missing)));
        assert_eq!(trie.root_hash(), missing);
    }
}
