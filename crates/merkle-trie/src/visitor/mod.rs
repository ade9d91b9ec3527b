//! The trie algorithms, one per operation, each dispatching on the node variant.
//!
//! Updates never mutate: they return the root of the new subtree, which shares every untouched
//! child with the old one. An update that changes nothing below a node hands back that very
//! node, which is how a [`Node::Stored`](crate::Node::Stored) survives updates elsewhere.
mod get;
mod put;
mod remove;

pub(crate) use get::get;
pub(crate) use put::put;
pub(crate) use remove::remove;

use crate::error::TrieResult;
use crate::factory::NodeFactory;
use crate::node::Node;
use crate::path::Path;

// Extension child replacement: the new child absorbs the extension path, so that an extension
// never points at another extension.
async fn replace_child<F: NodeFactory + ?Sized>(
    extension_path: &Path,
    child: Node,
    factory: &F,
) -> TrieResult<Node> {
    let path = extension_path.join(&child.path().await?);
    child.replace_path(path, factory).await
}
