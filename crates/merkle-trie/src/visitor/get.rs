//! Looking up the value stored under a path.
use crate::error::TrieResult;
use crate::node::Node;
use crate::path::{LEAF_TERMINATOR, Path};
use alloy_primitives::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;

/// Value stored under `path` in the subtree rooted at `node`.
pub(crate) fn get(node: Node, path: Path) -> BoxFuture<'static, TrieResult<Option<Bytes>>> {
    async move {
        match node {
            Node::Null => Ok(None),
            Node::Leaf(leaf) => Ok((leaf.path() == &path).then(|| leaf.value().clone())),
            Node::Extension(extension) => {
                let prefix = extension.path();
                if path.common_prefix_length(prefix) < prefix.len() {
                    return Ok(None);
                }
                get(extension.child().clone(), path.slice(prefix.len()..)).await
            }
            Node::Branch(branch) => match path.at(0) {
                LEAF_TERMINATOR => Ok(branch.value().cloned()),
                idx => get(branch.child(idx).clone(), path.slice(1..)).await,
            },
            Node::Stored(stored) => get(stored.resolve().await?, path).await,
        }
    }
    .boxed()
}
