#![no_main]

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use alloy_primitives::Bytes;
use arbitrary::Arbitrary;
use futures::executor::block_on;
use libfuzzer_sys::fuzz_target;
use merkle_trie::{InMemoryNodeStore, StoredMerklePatriciaTrie, StoredTrieConfig};

#[derive(Debug, Arbitrary)]
enum Op {
    Put { key: Vec<u8>, value: Vec<u8> },
    Remove { key: Vec<u8> },
    Commit,
    Reopen,
}

#[derive(Debug, Arbitrary)]
struct Input {
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let store = Arc::new(InMemoryNodeStore::new());
    // A tiny cache so that reads keep going back to the store.
    let config = StoredTrieConfig::default().with_cache_capacity(NonZeroUsize::new(2).unwrap());
    let mut trie = StoredMerklePatriciaTrie::<Bytes>::empty(store.clone(), config);
    let mut model = BTreeMap::<Vec<u8>, Bytes>::new();

    for op in input.ops {
        match op {
            Op::Put { key, value } => {
                let value = Bytes::from(value);
                block_on(trie.put(&key, value.clone())).unwrap();
                if value.is_empty() {
                    model.remove(&key);
                } else {
                    model.insert(key, value);
                }
            }
            Op::Remove { key } => {
                block_on(trie.remove(&key)).unwrap();
                model.remove(&key);
            }
            Op::Commit => {
                block_on(trie.commit()).unwrap();
            }
            Op::Reopen => {
                let root = block_on(trie.commit()).unwrap();
                trie = StoredMerklePatriciaTrie::open(store.clone(), root, config);
            }
        }
    }

    for (key, value) in &model {
        assert_eq!(block_on(trie.get(key)).unwrap().as_ref(), Some(value));
    }
});
