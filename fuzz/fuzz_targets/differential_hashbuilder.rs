#![no_main]

use std::collections::BTreeMap;

use alloy_primitives::{B256, Bytes};
use alloy_trie::{HashBuilder, Nibbles};
use arbitrary::Arbitrary;
use futures::executor::block_on;
use libfuzzer_sys::fuzz_target;
use merkle_trie::MerklePatriciaTrie;

#[derive(Debug, Arbitrary)]
enum Op {
    Put { key: [u8; 32], value: Vec<u8> },
    Remove { key: [u8; 32] },
}

#[derive(Debug, Arbitrary)]
struct Input {
    ops: Vec<Op>,
}

fn model_root(model: &BTreeMap<B256, Bytes>) -> B256 {
    let mut hash_builder = HashBuilder::default();
    for (key, value) in model {
        hash_builder.add_leaf(Nibbles::unpack(*key), value);
    }
    hash_builder.root()
}

fuzz_target!(|input: Input| {
    let mut trie = MerklePatriciaTrie::<Bytes>::new();
    let mut model = BTreeMap::<B256, Bytes>::new();

    for op in &input.ops {
        match op {
            Op::Put { key, value } => {
                let key = B256::from(*key);
                let value = Bytes::copy_from_slice(value);
                block_on(trie.put(key, value.clone())).unwrap();
                // An empty value removes the key.
                if value.is_empty() {
                    model.remove(&key);
                } else {
                    model.insert(key, value);
                }
            }
            Op::Remove { key } => {
                let key = B256::from(*key);
                block_on(trie.remove(key)).unwrap();
                model.remove(&key);
            }
        }

        // Validate after each operation so transient divergences are not masked by later ops.
        let expected = model_root(&model);
        let actual = trie.root_hash();
        assert_eq!(actual, expected, "merkle-trie root != HashBuilder root");
    }
});
