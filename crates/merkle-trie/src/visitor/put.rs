//! Inserting or overwriting the value under a path.
use super::replace_child;
use crate::error::TrieResult;
use crate::factory::NodeFactory;
use crate::node::{BranchChildren, Node};
use crate::path::{LEAF_TERMINATOR, Path};
use alloy_primitives::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;

/// Stores `value` under `path` in the subtree rooted at `node` and returns the new subtree root.
pub(crate) fn put<'a, F: NodeFactory + ?Sized>(
    node: Node,
    path: Path,
    value: Bytes,
    factory: &'a F,
) -> BoxFuture<'a, TrieResult<Node>> {
    async move {
        match &node {
            Node::Null => Ok(factory.create_leaf(path, value)),
            Node::Leaf(leaf) => {
                if leaf.path() == &path {
                    return Ok(factory.create_leaf(path, value));
                }
                split(&node, leaf.path(), path, value, factory).await
            }
            Node::Extension(extension) => {
                let prefix = extension.path();
                if path.common_prefix_length(prefix) < prefix.len() {
                    return split(&node, prefix, path, value, factory).await;
                }
                let child = extension.child();
                let updated = put(child.clone(), path.slice(prefix.len()..), value, factory).await?;
                if updated.ptr_eq(child) {
                    return Ok(node);
                }
                replace_child(prefix, updated, factory).await
            }
            Node::Branch(branch) => match path.at(0) {
                LEAF_TERMINATOR => {
                    Ok(factory.create_branch(branch.children().clone(), Some(value)))
                }
                idx => {
                    let child = branch.child(idx);
                    let updated = put(child.clone(), path.slice(1..), value, factory).await?;
                    if updated.ptr_eq(child) {
                        return Ok(node);
                    }
                    Ok(factory.create_branch(
                        branch.children().with(idx, updated),
                        branch.value().cloned(),
                    ))
                }
            },
            Node::Stored(stored) => {
                let delegate = stored.resolve().await?;
                let updated = put(delegate.clone(), path, value, factory).await?;
                Ok(if updated.ptr_eq(&delegate) { node } else { updated })
            }
        }
    }
    .boxed()
}

// Splits a leaf or an extension whose path diverges from `path`.
// A branch is placed at the divergence point and holds both sides; a side ending right there
// gives its value to the branch. The shared prefix, if any, becomes an extension on top.
async fn split<F: NodeFactory + ?Sized>(
    existing: &Node,
    existing_path: &Path,
    path: Path,
    value: Bytes,
    factory: &F,
) -> TrieResult<Node> {
    let common = existing_path.common_prefix_length(&path);
    let mut children = BranchChildren::new();
    let mut branch_value = None;

    match existing_path.at(common) {
        LEAF_TERMINATOR => branch_value = existing.value().await?,
        idx => {
            let child = existing.replace_path(existing_path.slice(common + 1..), factory).await?;
            children.set(idx, child);
        }
    }
    match path.at(common) {
        LEAF_TERMINATOR => branch_value = Some(value),
        idx => children.set(idx, factory.create_leaf(path.slice(common + 1..), value)),
    }

    let branch = factory.create_branch(children, branch_value);
    if common == 0 {
        Ok(branch)
    } else {
        Ok(factory.create_extension(path.slice(..common), branch))
    }
}
