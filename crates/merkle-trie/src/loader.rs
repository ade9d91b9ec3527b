//! Loading of stored nodes: a bounded LRU cache in front of the backing store, plus single-flight
//! deduplication of concurrent fetches of the same hash.
//!
//! A load first looks in the cache. On a miss it either joins the fetch already in flight for
//! the hash or, after re-checking the cache, installs a new lazily started shared fetch. The
//! fetch populates the cache and clears its in-flight slot whether it succeeds or not.
use crate::config::StoredTrieConfig;
use crate::error::{TrieError, TrieResult};
use crate::node::{Node, decode_node};
use crate::store::NodeStore;
use alloy_primitives::{B256, keccak256};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

type SharedLoad = Shared<BoxFuture<'static, TrieResult<Node>>>;

/// Resolves node hashes against a [`NodeStore`].
pub struct NodeLoader {
    store: Arc<dyn NodeStore>,
    cache: Mutex<LruCache<B256, Node>>,
    in_flight: Mutex<HashMap<B256, SharedLoad>>,
    stats: LoaderStats,
}

/// Counters describing the loader's activity.
#[derive(Debug, Default)]
pub struct LoaderStats {
    fetches: AtomicU64,
    cache_hits: AtomicU64,
    joined: AtomicU64,
}

impl LoaderStats {
    /// Number of reads issued against the backing store.
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Number of loads answered from the cache.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Number of loads that waited on a fetch started by another caller.
    pub fn joined(&self) -> u64 {
        self.joined.load(Ordering::Relaxed)
    }
}

impl NodeLoader {
    /// Creates a loader reading from `store`.
    pub fn new(store: Arc<dyn NodeStore>, config: &StoredTrieConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: Mutex::new(LruCache::new(config.cache_capacity)),
            in_flight: Mutex::new(HashMap::new()),
            stats: LoaderStats::default(),
        })
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Activity counters.
    pub const fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    /// Returns the node stored under `hash`.
    ///
    /// At most one store read per hash is outstanding; concurrent callers share its outcome.
    pub async fn load(self: &Arc<Self>, hash: B256) -> TrieResult<Node> {
        if let Some(node) = self.cached(&hash) {
            return Ok(node);
        }

        let load = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.entry(hash) {
                Entry::Occupied(entry) => {
                    self.stats.joined.fetch_add(1, Ordering::Relaxed);
                    debug!(%hash, "joining in-flight node load");
                    entry.get().clone()
                }
                Entry::Vacant(entry) => {
                    // A fetch may have completed between the miss above and taking the lock.
                    if let Some(node) = self.cached(&hash) {
                        return Ok(node);
                    }
                    let load = Self::fetch(Arc::downgrade(self), hash).boxed().shared();
                    entry.insert(load.clone());
                    load
                }
            }
        };

        load.await
    }

    // Holds the loader weakly: the shared future sits in `in_flight`, which the loader owns.
    async fn fetch(loader: Weak<Self>, hash: B256) -> TrieResult<Node> {
        let store = {
            let this = loader.upgrade().ok_or(TrieError::LoaderDropped(hash))?;
            this.stats.fetches.fetch_add(1, Ordering::Relaxed);
            Arc::clone(&this.store)
        };
        debug!(%hash, "fetching node from store");
        let fetched = store.get(hash).await;

        let this = loader.upgrade().ok_or(TrieError::LoaderDropped(hash))?;
        let result = match fetched {
            Ok(Some(rlp)) if keccak256(&rlp) != hash => {
                Err(TrieError::Store(format!("node stored under {hash} has a different hash")))
            }
            Ok(Some(rlp)) => decode_node(&rlp, hash, &this),
            Ok(None) => Err(TrieError::NotFound(hash)),
            Err(err) => Err(err),
        };

        match &result {
            Ok(node) => {
                this.cache.lock().put(hash, node.clone());
            }
            Err(err) => warn!(%hash, %err, "failed to load node"),
        }
        this.in_flight.lock().remove(&hash);
        result
    }

    fn cached(&self, hash: &B256) -> Option<Node> {
        let node = self.cache.lock().get(hash).cloned();
        if node.is_some() {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            trace!(%hash, "node cache hit");
        }
        node
    }

    /// Places an already materialized node in the cache.
    pub fn prime(&self, hash: B256, node: Node) {
        debug_assert!(!matches!(node, Node::Stored(_)), "priming with an unresolved node");
        self.cache.lock().put(hash, node);
    }

    /// Drops the cached node for `hash`, if any.
    pub fn evict(&self, hash: &B256) {
        if self.cache.lock().pop(hash).is_some() {
            trace!(%hash, "node unloaded");
        }
    }

    /// Whether a node for `hash` is cached.
    pub fn is_cached(&self, hash: &B256) -> bool {
        self.cache.lock().contains(hash)
    }

    /// Number of cached nodes.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}

impl core::fmt::Debug for NodeLoader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeLoader")
            .field("cached", &self.cached_len())
            .field("in_flight", &self.in_flight.lock().len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
