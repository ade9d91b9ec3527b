//! A Merkle Patricia trie whose nodes can live in a backing store and are paged in on demand.
//!
//! Every node is addressed by the keccak-256 hash of its RLP encoding, so the root hash commits
//! to the whole key/value mapping. Nodes are immutable and shared between trie versions. A node
//! known only by its hash is loaded the first time it is traversed; concurrent traversals of the
//! same unloaded node share a single store read.
mod config;
mod error;
mod factory;
mod loader;
mod node;
mod path;
mod store;
mod trie;
mod value;
mod visitor;

pub use alloy_primitives::{B256, Bytes};
pub use alloy_trie::EMPTY_ROOT_HASH;
pub use config::{DEFAULT_CACHE_CAPACITY, StoredTrieConfig};
pub use error::{TrieError, TrieResult};
pub use factory::{DefaultNodeFactory, NodeFactory, StoredNodeFactory};
pub use loader::{LoaderStats, NodeLoader};
pub use node::{BranchChildren, BranchNode, ExtensionNode, LeafNode, Node, StoredNode};
pub use path::{LEAF_TERMINATOR, Path, bytes_to_path, compact_decode, compact_encode};
pub use store::{InMemoryNodeStore, NodeStore};
pub use trie::{MerklePatriciaTrie, StoredMerklePatriciaTrie};
pub use value::TrieValue;
