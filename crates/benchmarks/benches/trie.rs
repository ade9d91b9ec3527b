#![allow(unused_crate_dependencies, missing_docs)]

use benchmarks::{CommittedTrie, build_trie, generate_entries};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use merkle_trie::{Bytes, InMemoryNodeStore, StoredMerklePatriciaTrie, StoredTrieConfig};
use std::num::NonZeroUsize;
use std::sync::Arc;

fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("put");

    for count in [100, 1000, 10_000] {
        let entries = generate_entries(count);
        group.bench_function(BenchmarkId::new("in_memory", count), |b| {
            b.iter(|| build_trie(&entries));
        });
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for count in [100, 1000, 10_000] {
        let entries = generate_entries(count);

        let trie = build_trie(&entries);
        group.bench_function(BenchmarkId::new("in_memory", count), |b| {
            b.iter(|| {
                for (key, _) in &entries {
                    block_on(trie.get(key)).expect("get failed");
                }
            });
        });

        let committed = CommittedTrie::new(&entries);
        let warm = committed.open(StoredTrieConfig::default().with_cache_capacity(
            NonZeroUsize::new(4 * count).expect("non-zero capacity"),
        ));
        group.bench_function(BenchmarkId::new("stored_warm", count), |b| {
            b.iter(|| {
                for (key, _) in &entries {
                    block_on(warm.get(key)).expect("get failed");
                }
            });
        });

        group.bench_function(BenchmarkId::new("stored_cold", count), |b| {
            b.iter_batched(
                || committed.open(StoredTrieConfig::default()),
                |cold| {
                    for (key, _) in &entries {
                        block_on(cold.get(key)).expect("get failed");
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");

    for count in [100, 1000, 10_000] {
        let entries = generate_entries(count);
        group.bench_function(BenchmarkId::new("fresh", count), |b| {
            b.iter_batched(
                || {
                    let mut trie = StoredMerklePatriciaTrie::<Bytes>::empty(
                        Arc::new(InMemoryNodeStore::new()),
                        StoredTrieConfig::default(),
                    );
                    for (key, value) in &entries {
                        block_on(trie.put(key, value.clone())).expect("put failed");
                    }
                    trie
                },
                |mut trie| block_on(trie.commit()).expect("commit failed"),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_put, bench_get, bench_commit);
criterion_main!(benches);
