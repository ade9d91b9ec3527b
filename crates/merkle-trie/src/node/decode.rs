//! Implementation of a trie node rlp decoding.
//! Children referenced by hash become [`StoredNode`]s, inlined children are decoded in place.
use super::{BranchChildren, BranchNode, ExtensionNode, LeafNode, Node, StoredNode};
use crate::error::{TrieError, TrieResult};
use crate::loader::NodeLoader;
use crate::path::compact_decode;
use alloy_primitives::{B256, Bytes};
use alloy_rlp::{Header, PayloadView};
use std::sync::Arc;

/// Decodes a node read back from the store under `hash`.
pub(crate) fn decode_node(rlp: &Bytes, hash: B256, loader: &Arc<NodeLoader>) -> TrieResult<Node> {
    let mut buf = &rlp[..];
    let node = match Header::decode_raw(&mut buf)? {
        PayloadView::List(items) => decode_list(&items, loader)?,
        PayloadView::String(_) => {
            return Err(alloy_rlp::Error::Custom("MPT: Stored node is not a list").into());
        }
    };
    if !buf.is_empty() {
        return Err(alloy_rlp::Error::UnexpectedLength.into());
    }
    node.seed_encoding(rlp.clone(), hash);
    Ok(node)
}

// Decodes a child reference: empty string, 32-byte hash or an inlined node.
fn decode_ref(mut buf: &[u8], loader: &Arc<NodeLoader>) -> TrieResult<Node> {
    match Header::decode_raw(&mut buf)? {
        PayloadView::String(payload) if payload.is_empty() => Ok(Node::Null),
        PayloadView::String(payload) if payload.len() == 32 => Ok(Node::Stored(Arc::new(
            StoredNode::new(B256::from_slice(payload), Arc::downgrade(loader)),
        ))),
        PayloadView::String(_) => Err(alloy_rlp::Error::Custom("MPT: Invalid RLP string length").into()),
        PayloadView::List(items) => decode_list(&items, loader),
    }
}

fn decode_list(items: &[&[u8]], loader: &Arc<NodeLoader>) -> TrieResult<Node> {
    match items {
        [encoded_path, second] => {
            let mut encoded_path = *encoded_path;
            let path = compact_decode(Header::decode_bytes(&mut encoded_path, false)?)?;
            if path.is_leaf() {
                let mut value = *second;
                let value = Bytes::copy_from_slice(Header::decode_bytes(&mut value, false)?);
                Ok(Node::Leaf(Arc::new(LeafNode::new(path, value))))
            } else {
                if path.is_empty() {
                    return Err(alloy_rlp::Error::Custom("MPT: Empty extension path").into());
                }
                let child = decode_ref(second, loader)?;
                if child.is_null() {
                    return Err(alloy_rlp::Error::Custom("MPT: Empty node in extension").into());
                }
                Ok(Node::Extension(Arc::new(ExtensionNode::new(path, child))))
            }
        }
        [refs @ .., value] if refs.len() == 16 => {
            let mut children = BranchChildren::new();
            for (idx, child) in refs.iter().enumerate() {
                children.set(idx as u8, decode_ref(child, loader)?);
            }
            let mut value = *value;
            let value = Header::decode_bytes(&mut value, false)?;
            let value = (!value.is_empty()).then(|| Bytes::copy_from_slice(value));
            if children.count() + u32::from(value.is_some()) < 2 {
                return Err(TrieError::Decode(alloy_rlp::Error::Custom(
                    "MPT: Branch with less than two entries",
                )));
            }
            Ok(Node::Branch(Arc::new(BranchNode::new(children, value))))
        }
        _ => Err(alloy_rlp::Error::Custom("MPT: Invalid RLP list length").into()),
    }
}
