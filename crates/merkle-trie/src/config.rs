//! Configuration of store-backed tries.
use std::num::NonZeroUsize;

/// Number of decoded nodes kept in memory by default.
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(4096) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Settings of a [`StoredMerklePatriciaTrie`](crate::StoredMerklePatriciaTrie).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoredTrieConfig {
    /// Upper bound on the number of decoded nodes held by the loader cache. Least recently used
    /// nodes are evicted first and reloaded from the store on demand.
    pub cache_capacity: NonZeroUsize,
}

impl Default for StoredTrieConfig {
    fn default() -> Self {
        Self { cache_capacity: DEFAULT_CACHE_CAPACITY }
    }
}

impl StoredTrieConfig {
    /// Sets the cache capacity.
    pub const fn with_cache_capacity(mut self, cache_capacity: NonZeroUsize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }
}
