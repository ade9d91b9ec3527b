//! Definition of the node types building the trie.
//!
//! Nodes are immutable once built. Every structural change produces new nodes, which share the
//! untouched subtrees of the previous version through `Arc`s.
mod children;
mod decode;
mod encode;
mod stored;

pub use children::BranchChildren;
pub(crate) use decode::decode_node;
pub use stored::StoredNode;

use crate::error::{TrieError, TrieResult};
use crate::factory::NodeFactory;
use crate::path::{LEAF_TERMINATOR, Path};
use alloy_primitives::{B256, Bytes};
use alloy_trie::EMPTY_ROOT_HASH;
use encode::Encoded;
use std::sync::Arc;

/// A trie node.
#[derive(Debug, Clone, Default)]
pub enum Node {
    /// The canonical empty node.
    #[default]
    Null,
    /// Terminal node holding the rest of a key path and its value.
    Leaf(Arc<LeafNode>),
    /// Shared path segment followed by a single child.
    Extension(Arc<ExtensionNode>),
    /// Sixteen-way fan-out with an optional value of its own.
    Branch(Arc<BranchNode>),
    /// Reference to a node persisted in a store, loaded on demand.
    Stored(Arc<StoredNode>),
}

/// Leaf node. The path always ends in [`LEAF_TERMINATOR`].
#[derive(Debug)]
pub struct LeafNode {
    path: Path,
    value: Bytes,
    encoded: Encoded,
}

/// Extension node. The path is never empty and never holds the terminator.
#[derive(Debug)]
pub struct ExtensionNode {
    path: Path,
    child: Node,
    encoded: Encoded,
}

/// Branch node.
#[derive(Debug)]
pub struct BranchNode {
    children: BranchChildren,
    value: Option<Bytes>,
    encoded: Encoded,
}

impl LeafNode {
    /// Creates a leaf node.
    pub fn new(path: Path, value: Bytes) -> Self {
        debug_assert!(path.is_leaf(), "leaf path without terminator");
        Self { path, value, encoded: Encoded::default() }
    }

    /// Remaining key path, terminator included.
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Stored value.
    pub const fn value(&self) -> &Bytes {
        &self.value
    }
}

impl ExtensionNode {
    /// Creates an extension node.
    ///
    /// # Panics
    /// If `path` is empty or ends in the leaf terminator.
    pub fn new(path: Path, child: Node) -> Self {
        assert!(!path.is_empty(), "empty extension path");
        assert!(!path.is_leaf(), "extension path ends in a leaf terminator");
        Self { path, child, encoded: Encoded::default() }
    }

    /// Shared path segment.
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// The single child.
    pub const fn child(&self) -> &Node {
        &self.child
    }
}

impl BranchNode {
    /// Creates a branch node.
    pub fn new(children: BranchChildren, value: Option<Bytes>) -> Self {
        Self { children, value, encoded: Encoded::default() }
    }

    /// All child slots.
    pub const fn children(&self) -> &BranchChildren {
        &self.children
    }

    /// Child at nibble `idx`.
    pub fn child(&self, idx: u8) -> &Node {
        self.children.get(idx)
    }

    /// Value of a key ending exactly at this branch.
    pub const fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }
}

impl Node {
    /// Whether this is the empty node.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Identity comparison: both handles point to the same node instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Leaf(a), Self::Leaf(b)) => Arc::ptr_eq(a, b),
            (Self::Extension(a), Self::Extension(b)) => Arc::ptr_eq(a, b),
            (Self::Branch(a), Self::Branch(b)) => Arc::ptr_eq(a, b),
            (Self::Stored(a), Self::Stored(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The node itself, or the loaded delegate of a stored node.
    pub async fn resolved(&self) -> TrieResult<Self> {
        match self {
            Self::Stored(stored) => stored.resolve().await,
            node => Ok(node.clone()),
        }
    }

    /// Path segment owned by the node. Empty for branches and the null node.
    pub async fn path(&self) -> TrieResult<Path> {
        Ok(self.resolved().await?.local_path())
    }

    /// Value held by the node.
    ///
    /// Extension nodes carry no value: asking for one is a contract violation reported as
    /// [`TrieError::Unsupported`], distinct from an absent value.
    pub async fn value(&self) -> TrieResult<Option<Bytes>> {
        match self.resolved().await? {
            Self::Null => Ok(None),
            Self::Leaf(leaf) => Ok(Some(leaf.value.clone())),
            Self::Branch(branch) => Ok(branch.value.clone()),
            Self::Extension(_) => Err(TrieError::Unsupported("value of an extension node")),
            Self::Stored(_) => unreachable!("resolved() never returns a stored node"),
        }
    }

    /// Re-roots the node under `path`, merging paths instead of nesting extensions.
    pub async fn replace_path<F: NodeFactory + ?Sized>(
        &self,
        path: Path,
        factory: &F,
    ) -> TrieResult<Self> {
        let node = self.resolved().await?;
        Ok(match &node {
            Self::Null => Self::Null,
            Self::Leaf(leaf) => factory.create_leaf(path, leaf.value.clone()),
            Self::Extension(extension) if path.is_empty() => extension.child.clone(),
            Self::Extension(extension) => factory.create_extension(path, extension.child.clone()),
            Self::Branch(_) if path.is_empty() => node.clone(),
            Self::Branch(_) => factory.create_extension(path, node.clone()),
            Self::Stored(_) => unreachable!("resolved() never returns a stored node"),
        })
    }

    fn local_path(&self) -> Path {
        match self {
            Self::Null | Self::Branch(_) => Path::new(),
            Self::Leaf(leaf) => leaf.path.clone(),
            Self::Extension(extension) => extension.path.clone(),
            Self::Stored(_) => unreachable!("only called on resolved nodes"),
        }
    }

    /// Canonical RLP serialization.
    ///
    /// Stored nodes only know their hash, so serializing one is unsupported.
    pub fn rlp(&self) -> TrieResult<Bytes> {
        match self {
            Self::Stored(_) => Err(TrieError::Unsupported("serializing an unresolved stored node")),
            node => Ok(node.encoded_rlp()),
        }
    }

    /// Reference embedded in a parent: the RLP itself when shorter than 32 bytes, the encoded
    /// hash otherwise.
    pub fn rlp_ref(&self) -> Bytes {
        match self {
            Self::Stored(stored) => encode::encode_hash(stored.hash()),
            node => encode::shorten(node.encoded_rlp(), node),
        }
    }

    /// Keccak-256 of the RLP serialization.
    pub fn hash(&self) -> B256 {
        match self {
            Self::Null => EMPTY_ROOT_HASH,
            Self::Leaf(leaf) => leaf.encoded.hash(|| leaf.encode()),
            Self::Extension(extension) => extension.encoded.hash(|| extension.encode()),
            Self::Branch(branch) => branch.encoded.hash(|| branch.encode()),
            Self::Stored(stored) => stored.hash(),
        }
    }

    pub(crate) fn encoded_rlp(&self) -> Bytes {
        match self {
            Self::Null => Bytes::from_static(&[alloy_rlp::EMPTY_STRING_CODE]),
            Self::Leaf(leaf) => leaf.encoded.rlp(|| leaf.encode()).clone(),
            Self::Extension(extension) => extension.encoded.rlp(|| extension.encode()).clone(),
            Self::Branch(branch) => branch.encoded.rlp(|| branch.encode()).clone(),
            Self::Stored(_) => unreachable!("stored nodes are encoded by reference"),
        }
    }

    /// Records a serialization known to be correct, as read back from a store.
    fn seed_encoding(&self, rlp: Bytes, hash: B256) {
        match self {
            Self::Leaf(leaf) => leaf.encoded.seed(rlp, hash),
            Self::Extension(extension) => extension.encoded.seed(rlp, hash),
            Self::Branch(branch) => branch.encoded.seed(rlp, hash),
            Self::Null | Self::Stored(_) => {}
        }
    }
}

/// Path holding only the terminator: the remaining path of a key that ends at a branch.
pub(crate) fn terminal_path() -> Path {
    Path::from_nibbles([LEAF_TERMINATOR])
}
