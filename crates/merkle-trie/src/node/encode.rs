//! RLP encoding and hashing of the concrete node types.
//! https://ethereum.org/en/developers/docs/data-structures-and-encoding/patricia-merkle-trie/#optimization
use super::{BranchNode, ExtensionNode, LeafNode, Node};
use crate::path::compact_encode;
use alloy_primitives::{B256, Bytes, keccak256};
use alloy_rlp::{EMPTY_STRING_CODE, Encodable, Header};
use std::sync::OnceLock;

/// Memoized serialization and hash of an immutable node.
#[derive(Debug, Default)]
pub(super) struct Encoded {
    rlp: OnceLock<Bytes>,
    hash: OnceLock<B256>,
}

impl Encoded {
    pub(super) fn rlp(&self, encode: impl FnOnce() -> Vec<u8>) -> &Bytes {
        self.rlp.get_or_init(|| Bytes::from(encode()))
    }

    pub(super) fn hash(&self, encode: impl FnOnce() -> Vec<u8>) -> B256 {
        *self.hash.get_or_init(|| keccak256(self.rlp(encode)))
    }

    pub(super) fn seed(&self, rlp: Bytes, hash: B256) {
        let _ = self.rlp.set(rlp);
        let _ = self.hash.set(hash);
    }
}

impl LeafNode {
    // [compact(path), value]
    pub(super) fn encode(&self) -> Vec<u8> {
        let path = compact_encode(&self.path);
        // Warning: `.length()` computes the *RLP* representation length of the value it is called on.
        let mut out = encode_list_header(path[..].length() + self.value[..].length());
        path[..].encode(&mut out);
        self.value[..].encode(&mut out);
        out
    }
}

impl ExtensionNode {
    // [compact(path), child reference]
    pub(super) fn encode(&self) -> Vec<u8> {
        let path = compact_encode(&self.path);
        // The child reference is already encoded, so its absolute length is used and it is appended.
        let child = self.child.rlp_ref();
        let mut out = encode_list_header(path[..].length() + child.len());
        path[..].encode(&mut out);
        out.extend_from_slice(&child);
        out
    }
}

impl BranchNode {
    // [ref 0, .., ref 15, value]
    pub(super) fn encode(&self) -> Vec<u8> {
        let refs: Vec<Bytes> = self.children.iter().map(Node::rlp_ref).collect();
        let value_length = self.value.as_ref().map_or(1, |value| value[..].length());
        let payload_length = refs.iter().map(|r| r.len()).sum::<usize>() + value_length;

        let mut out = encode_list_header(payload_length);
        for child in &refs {
            out.extend_from_slice(child);
        }
        match &self.value {
            Some(value) => value[..].encode(&mut out),
            None => out.push(EMPTY_STRING_CODE),
        }
        out
    }
}

// RLP string encoding of a 32-byte hash: 0xa0 followed by the hash.
#[inline]
pub(super) fn encode_hash(hash: B256) -> Bytes {
    let mut out = Vec::with_capacity(33);
    hash.encode(&mut out);
    Bytes::from(out)
}

// Encodes a child node reference depending on the child data length.
#[inline]
pub(super) fn shorten(rlp: Bytes, node: &Node) -> Bytes {
    if rlp.len() < 32 { rlp } else { encode_hash(node.hash()) }
}

// Encodes list header for known payload length. Reserves memory.
#[inline]
fn encode_list_header(payload_length: usize) -> Vec<u8> {
    let header = Header { list: true, payload_length };
    let mut out = Vec::with_capacity(header.length() + payload_length);
    header.encode(&mut out);
    out
}
