//! Construction of nodes.
//!
//! Every node built by the update algorithms goes through a [`NodeFactory`]. The in-memory
//! factory builds plain nodes; the store-backed one additionally turns hashes back into nodes.
use crate::config::StoredTrieConfig;
use crate::error::TrieResult;
use crate::loader::NodeLoader;
use crate::node::{BranchChildren, BranchNode, ExtensionNode, LeafNode, Node, StoredNode};
use crate::path::Path;
use crate::store::NodeStore;
use alloy_primitives::{B256, Bytes};
use std::sync::Arc;

/// Builds the nodes of a trie.
pub trait NodeFactory: Send + Sync {
    /// Leaf holding `value` under `path`. The path ends in the leaf terminator.
    fn create_leaf(&self, path: Path, value: Bytes) -> Node {
        Node::Leaf(Arc::new(LeafNode::new(path, value)))
    }

    /// Extension leading to `child` through `path`.
    fn create_extension(&self, path: Path, child: Node) -> Node {
        Node::Extension(Arc::new(ExtensionNode::new(path, child)))
    }

    /// Branch over `children` with an optional own value.
    fn create_branch(&self, children: BranchChildren, value: Option<Bytes>) -> Node {
        Node::Branch(Arc::new(BranchNode::new(children, value)))
    }
}

/// Factory of purely in-memory tries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeFactory;

impl NodeFactory for DefaultNodeFactory {}

/// Factory of tries whose nodes are persisted in a [`NodeStore`].
#[derive(Debug, Clone)]
pub struct StoredNodeFactory {
    loader: Arc<NodeLoader>,
}

impl StoredNodeFactory {
    /// Creates a factory reading from `store`.
    pub fn new(store: Arc<dyn NodeStore>, config: StoredTrieConfig) -> Self {
        Self { loader: NodeLoader::new(store, &config) }
    }

    /// The loader shared by all stored nodes of this factory.
    pub const fn loader(&self) -> &Arc<NodeLoader> {
        &self.loader
    }

    /// Unresolved reference to the node with the given hash.
    pub fn stored(&self, hash: B256) -> Node {
        Node::Stored(Arc::new(StoredNode::new(hash, Arc::downgrade(&self.loader))))
    }

    /// Reconstitutes the node with the given hash from the store.
    ///
    /// Fails with [`TrieError::NotFound`](crate::TrieError::NotFound) when the store holds no
    /// such node. Children referenced by hash come back as [`Node::Stored`].
    pub async fn retrieve(&self, hash: B256) -> TrieResult<Node> {
        self.loader.load(hash).await
    }
}

impl NodeFactory for StoredNodeFactory {}
