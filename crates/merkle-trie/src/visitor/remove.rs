//! Removing the value under a path.
use super::replace_child;
use crate::error::TrieResult;
use crate::factory::NodeFactory;
use crate::node::{BranchChildren, Node, terminal_path};
use crate::path::{LEAF_TERMINATOR, Path};
use alloy_primitives::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;

/// Removes the value under `path` from the subtree rooted at `node` and returns the new subtree
/// root. Removing an absent path returns `node` itself.
pub(crate) fn remove<'a, F: NodeFactory + ?Sized>(
    node: Node,
    path: Path,
    factory: &'a F,
) -> BoxFuture<'a, TrieResult<Node>> {
    async move {
        match &node {
            Node::Null => Ok(Node::Null),
            Node::Leaf(leaf) => Ok(if leaf.path() == &path { Node::Null } else { node }),
            Node::Extension(extension) => {
                let prefix = extension.path();
                if path.common_prefix_length(prefix) < prefix.len() {
                    return Ok(node);
                }
                let child = extension.child();
                let updated = remove(child.clone(), path.slice(prefix.len()..), factory).await?;
                if updated.ptr_eq(child) {
                    return Ok(node);
                }
                replace_child(prefix, updated, factory).await
            }
            Node::Branch(branch) => match path.at(0) {
                LEAF_TERMINATOR if branch.value().is_none() => Ok(node),
                LEAF_TERMINATOR => collapse_branch(branch.children().clone(), None, factory).await,
                idx => {
                    let child = branch.child(idx);
                    let updated = remove(child.clone(), path.slice(1..), factory).await?;
                    if updated.ptr_eq(child) {
                        return Ok(node);
                    }
                    collapse_branch(
                        branch.children().with(idx, updated),
                        branch.value().cloned(),
                        factory,
                    )
                    .await
                }
            },
            Node::Stored(stored) => {
                let delegate = stored.resolve().await?;
                let updated = remove(delegate.clone(), path, factory).await?;
                Ok(if updated.ptr_eq(&delegate) { node } else { updated })
            }
        }
    }
    .boxed()
}

// Rebuilds a branch after one of its entries was removed, folding it into a simpler node when
// it no longer fans out.
async fn collapse_branch<F: NodeFactory + ?Sized>(
    children: BranchChildren,
    value: Option<Bytes>,
    factory: &F,
) -> TrieResult<Node> {
    if children.is_empty() {
        return Ok(value.map_or(Node::Null, |value| factory.create_leaf(terminal_path(), value)));
    }
    if value.is_none() {
        if let Some((idx, child)) = children.only_child() {
            let path = child.path().await?.prepend(idx);
            return child.replace_path(path, factory).await;
        }
    }
    Ok(factory.create_branch(children, value))
}
