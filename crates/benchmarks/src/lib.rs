//! Benchmark utilities: deterministic trie contents and prebuilt tries.

use alloy_primitives::{B256, Bytes, keccak256};
use futures::executor::block_on;
use merkle_trie::{InMemoryNodeStore, MerklePatriciaTrie, StoredMerklePatriciaTrie, StoredTrieConfig};
use std::sync::Arc;

/// Generates `count` entries with hashed 32-byte keys, like a state or storage trie.
pub fn generate_entries(count: usize) -> Vec<(B256, Bytes)> {
    (0..count)
        .map(|i| {
            let seed = (i as u64).to_be_bytes();
            let value = Bytes::from(keccak256(keccak256(seed)).to_vec());
            (keccak256(seed), value)
        })
        .collect()
}

/// Builds an in-memory trie holding `entries`.
pub fn build_trie(entries: &[(B256, Bytes)]) -> MerklePatriciaTrie<Bytes> {
    let mut trie = MerklePatriciaTrie::new();
    for (key, value) in entries {
        block_on(trie.put(key, value.clone())).expect("in-memory put cannot fail");
    }
    trie
}

/// A store holding `entries` committed as one trie, and the trie root.
#[derive(Debug)]
pub struct CommittedTrie {
    /// Store holding every committed node.
    pub store: InMemoryNodeStore,
    /// Root hash of the committed trie.
    pub root: B256,
}

impl CommittedTrie {
    /// Commits `entries` to a fresh in-memory store.
    pub fn new(entries: &[(B256, Bytes)]) -> Self {
        let store = InMemoryNodeStore::new();
        let mut trie = StoredMerklePatriciaTrie::<Bytes>::empty(
            Arc::new(store.clone()),
            StoredTrieConfig::default(),
        );
        for (key, value) in entries {
            block_on(trie.put(key, value.clone())).expect("put failed");
        }
        let root = block_on(trie.commit()).expect("commit failed");
        Self { store, root }
    }

    /// Opens the committed trie with a cold cache.
    pub fn open(&self, config: StoredTrieConfig) -> StoredMerklePatriciaTrie<Bytes> {
        StoredMerklePatriciaTrie::open(Arc::new(self.store.clone()), self.root, config)
    }
}
