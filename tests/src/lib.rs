#![allow(missing_docs)]

#[cfg(test)]
mod tests {
    use alloy_primitives::{B256, Bytes, hex};
    use async_trait::async_trait;
    use merkle_trie::{
        InMemoryNodeStore, MerklePatriciaTrie, NodeStore, StoredMerklePatriciaTrie,
        StoredTrieConfig, TrieError, TrieResult,
    };
    use parking_lot::Mutex;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashMap};
    use std::num::NonZeroUsize;
    use std::{fs::File, path::PathBuf, sync::Arc};

    #[derive(Debug, Deserialize)]
    struct TrieTest {
        #[serde(rename = "in")]
        input: Vec<(String, Option<String>)>,
        root: B256,
    }

    // Strings starting with 0x are hex, anything else is taken verbatim.
    fn fixture_bytes(s: &str) -> Vec<u8> {
        match s.strip_prefix("0x") {
            Some(encoded) => hex::decode(encoded).expect("invalid hex in fixture"),
            None => s.as_bytes().to_vec(),
        }
    }

    fn load_trie_tests() -> BTreeMap<String, TrieTest> {
        let mut input_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        input_path.push("fixtures/trietest.json");
        serde_json::from_reader(File::open(input_path).expect("failed to open fixture"))
            .expect("failed to parse fixture")
    }

    /// Store recording every read, optionally delaying it.
    #[derive(Debug, Default)]
    struct RecordingStore {
        inner: InMemoryNodeStore,
        reads: Mutex<HashMap<B256, usize>>,
        delay: bool,
    }

    impl RecordingStore {
        fn slow(inner: InMemoryNodeStore) -> Self {
            Self { inner, reads: Mutex::default(), delay: true }
        }

        fn total_reads(&self) -> usize {
            self.reads.lock().values().sum()
        }
    }

    #[async_trait]
    impl NodeStore for RecordingStore {
        async fn get(&self, hash: B256) -> TrieResult<Option<Bytes>> {
            *self.reads.lock().entry(hash).or_default() += 1;
            if self.delay {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
            self.inner.get(hash).await
        }

        async fn put(&self, hash: B256, rlp: Bytes) -> TrieResult<()> {
            self.inner.put(hash, rlp).await
        }
    }

    /// Store whose reads always fail.
    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl NodeStore for BrokenStore {
        async fn get(&self, _hash: B256) -> TrieResult<Option<Bytes>> {
            Err(TrieError::Store("disk unavailable".to_string()))
        }

        async fn put(&self, _hash: B256, _rlp: Bytes) -> TrieResult<()> {
            Err(TrieError::Store("disk unavailable".to_string()))
        }
    }

    fn key(i: u32) -> [u8; 4] {
        (i.wrapping_mul(0x9e37_79b9)).to_be_bytes()
    }

    fn value(i: u32) -> Bytes {
        Bytes::from(format!("value number {i} padded to avoid inlining").into_bytes())
    }

    async fn committed_store(entries: u32) -> (InMemoryNodeStore, B256) {
        let store = InMemoryNodeStore::new();
        let mut trie =
            StoredMerklePatriciaTrie::<Bytes>::empty(Arc::new(store.clone()), StoredTrieConfig::default());
        for i in 0..entries {
            trie.put(key(i), value(i)).await.unwrap();
        }
        let root = trie.commit().await.unwrap();
        (store, root)
    }

    #[test]
    fn config_deserializes_capacity() {
        let config: StoredTrieConfig = serde_json::from_str(r#"{"cache_capacity":16}"#).unwrap();
        assert_eq!(config.cache_capacity.get(), 16);
        assert!(serde_json::from_str::<StoredTrieConfig>(r#"{"cache_capacity":0}"#).is_err());
    }

    #[tokio::test]
    async fn trie_test_vectors() {
        for (name, test) in load_trie_tests() {
            let mut memory = MerklePatriciaTrie::<Bytes>::new();
            let store = InMemoryNodeStore::new();
            let mut stored =
                StoredMerklePatriciaTrie::<Bytes>::empty(Arc::new(store.clone()), StoredTrieConfig::default());
            let mut expected = BTreeMap::new();

            for (k, v) in &test.input {
                let k = fixture_bytes(k);
                match v {
                    Some(v) => {
                        let v = Bytes::from(fixture_bytes(v));
                        memory.put(&k, v.clone()).await.unwrap();
                        stored.put(&k, v.clone()).await.unwrap();
                        expected.insert(k, v);
                    }
                    None => {
                        memory.remove(&k).await.unwrap();
                        stored.remove(&k).await.unwrap();
                        expected.remove(&k);
                    }
                }
                // Committing in the middle must not change the outcome.
                stored.commit().await.unwrap();
            }

            assert_eq!(memory.root_hash(), test.root, "{name}: in-memory root");
            assert_eq!(stored.commit().await.unwrap(), test.root, "{name}: stored root");

            let reopened =
                StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store), test.root, StoredTrieConfig::default());
            for (k, v) in &expected {
                assert_eq!(reopened.get(k).await.unwrap().as_ref(), Some(v), "{name}: reopened get");
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_readers_fetch_each_node_once() {
        let (inner, root) = committed_store(256).await;
        let store = Arc::new(RecordingStore::slow(inner.clone()));
        let trie = Arc::new(StoredMerklePatriciaTrie::<Bytes>::open(
            store.clone(),
            root,
            StoredTrieConfig::default(),
        ));

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let trie = Arc::clone(&trie);
                tokio::spawn(async move {
                    for i in 0..256 {
                        assert_eq!(trie.get(key(i)).await.unwrap(), Some(value(i)));
                    }
                })
            })
            .collect();
        for reader in readers {
            reader.await.unwrap();
        }

        // Every node was read from the store exactly once, however many readers needed it.
        let reads = store.reads.lock();
        assert!(reads.values().all(|&count| count == 1), "some node was fetched twice");
        assert_eq!(reads.len(), inner.len());
        assert_eq!(trie.loader_stats().fetches(), inner.len() as u64);
    }

    #[tokio::test]
    async fn tiny_cache_keeps_answering() {
        let (inner, root) = committed_store(64).await;
        let store = Arc::new(RecordingStore { inner: inner.clone(), ..Default::default() });
        let config = StoredTrieConfig::default().with_cache_capacity(NonZeroUsize::MIN);
        let trie = StoredMerklePatriciaTrie::<Bytes>::open(store.clone(), root, config);

        for _ in 0..2 {
            for i in 0..64 {
                assert_eq!(trie.get(key(i)).await.unwrap(), Some(value(i)));
            }
        }
        // Evicted nodes come back from the store.
        assert!(store.total_reads() > inner.len());
        assert!(trie.loader().cached_len() <= 1);
    }

    #[tokio::test]
    async fn reopen_update_and_commit_again() {
        let (store, root) = committed_store(100).await;
        let mut trie =
            StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store.clone()), root, StoredTrieConfig::default());
        let mut expected = MerklePatriciaTrie::<Bytes>::new();
        for i in 0..100 {
            expected.put(key(i), value(i)).await.unwrap();
        }
        assert_eq!(trie.root_hash(), expected.root_hash());

        for i in (0..100).step_by(3) {
            trie.remove(key(i)).await.unwrap();
            expected.remove(key(i)).await.unwrap();
        }
        for i in 100..120 {
            trie.put(key(i), value(i)).await.unwrap();
            expected.put(key(i), value(i)).await.unwrap();
        }
        assert_eq!(trie.root_hash(), expected.root_hash());

        let root = trie.commit().await.unwrap();
        assert_eq!(root, expected.root_hash());

        let reopened =
            StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store), root, StoredTrieConfig::default());
        for i in 0..120 {
            let expected_value = if i < 100 && i % 3 == 0 { None } else { Some(value(i)) };
            assert_eq!(reopened.get(key(i)).await.unwrap(), expected_value);
        }
    }

    #[tokio::test]
    async fn removing_everything_reaches_the_empty_root() {
        let (store, root) = committed_store(50).await;
        let mut trie =
            StoredMerklePatriciaTrie::<Bytes>::open(Arc::new(store), root, StoredTrieConfig::default());
        for i in 0..50 {
            trie.remove(key(i)).await.unwrap();
        }
        assert!(trie.is_empty());
        assert_eq!(trie.commit().await.unwrap(), merkle_trie::EMPTY_ROOT_HASH);
    }

    #[tokio::test]
    async fn store_failures_surface_and_keep_the_root() {
        let root = B256::from(hex!("8aad789dff2f538bca5d8ea56e8abe10f4c7ba3a5dea95fea4cd6e7c3a1168d3"));
        let mut trie =
            StoredMerklePatriciaTrie::<String>::open(Arc::new(BrokenStore), root, StoredTrieConfig::default());

        let err = trie.get(b"dog").await.unwrap_err();
        assert_eq!(err, TrieError::Store("disk unavailable".to_string()));
        assert!(trie.put(b"dog", "puppy".to_string()).await.is_err());
        assert_eq!(trie.root_hash(), root);

        let mut fresh =
            StoredMerklePatriciaTrie::<String>::empty(Arc::new(BrokenStore), StoredTrieConfig::default());
        fresh.put(b"dog", "puppy".to_string()).await.unwrap();
        assert!(fresh.commit().await.is_err());
        // The failed commit leaves the in-memory root in place.
        assert_eq!(fresh.get(b"dog").await.unwrap().as_deref(), Some("puppy"));
    }
}
