//! Nibble paths and their compact (hex-prefix) encoding.
//! https://ethereum.org/en/developers/docs/data-structures-and-encoding/patricia-merkle-trie/#specification
use crate::error::{TrieError, TrieResult};
use alloy_primitives::Bytes;
use core::fmt;
use core::ops::RangeBounds;

/// Reserved nibble marking the end of a key. One past the valid nibble range.
pub const LEAF_TERMINATOR: u8 = 16;

/// A sequence of nibbles, optionally ending with [`LEAF_TERMINATOR`].
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<u8>);

impl Path {
    /// Creates an empty path.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a path from raw nibble values.
    ///
    /// # Panics
    /// If any value is above [`LEAF_TERMINATOR`], or the terminator is not the last element.
    pub fn from_nibbles(nibbles: impl Into<Vec<u8>>) -> Self {
        let nibbles = nibbles.into();
        if let Some(pos) = nibbles.iter().position(|&n| n == LEAF_TERMINATOR) {
            assert_eq!(pos, nibbles.len() - 1, "leaf terminator inside a path");
        }
        assert!(nibbles.iter().all(|&n| n <= LEAF_TERMINATOR), "invalid nibble");
        Self(nibbles)
    }

    /// Number of symbols, the terminator included.
    #[inline]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no symbols.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Symbol at `idx`.
    #[inline]
    pub fn at(&self, idx: usize) -> u8 {
        self.0[idx]
    }

    /// Whether the path ends with the leaf terminator.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.0.last() == Some(&LEAF_TERMINATOR)
    }

    /// Copies a sub-range of the path.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let start = match range.start_bound() {
            core::ops::Bound::Included(&s) => s,
            core::ops::Bound::Excluded(&s) => s + 1,
            core::ops::Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            core::ops::Bound::Included(&e) => e + 1,
            core::ops::Bound::Excluded(&e) => e,
            core::ops::Bound::Unbounded => self.len(),
        };
        Self(self.0[start..end].to_vec())
    }

    /// Length of the longest shared prefix.
    pub fn common_prefix_length(&self, other: &Self) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Concatenates `self` and `other`.
    pub fn join(&self, other: &Self) -> Self {
        debug_assert!(!self.is_leaf() || other.is_empty(), "joining past a terminator");
        let mut nibbles = Vec::with_capacity(self.len() + other.len());
        nibbles.extend_from_slice(&self.0);
        nibbles.extend_from_slice(&other.0);
        Self(nibbles)
    }

    /// Prepends a single nibble.
    pub fn prepend(&self, nibble: u8) -> Self {
        let mut nibbles = Vec::with_capacity(self.len() + 1);
        nibbles.push(nibble);
        nibbles.extend_from_slice(&self.0);
        Self(nibbles)
    }

    /// Raw symbols.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Path(")?;
        for nibble in &self.0 {
            if *nibble == LEAF_TERMINATOR {
                f.write_str("T")?;
            } else {
                write!(f, "{nibble:x}")?;
            }
        }
        f.write_str(")")
    }
}

/// Splits every byte of `bytes` into two nibbles (high first) and appends the terminator.
pub fn bytes_to_path(bytes: impl AsRef<[u8]>) -> Path {
    let bytes = bytes.as_ref();
    let mut nibbles = Vec::with_capacity(bytes.len() * 2 + 1);
    for byte in bytes {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0f);
    }
    nibbles.push(LEAF_TERMINATOR);
    Path(nibbles)
}

/// Hex-prefix encodes a path. The first nibble carries the flags
/// `0b10` (terminal) and `0b01` (odd length); an even path is padded with a zero nibble.
pub fn compact_encode(path: &Path) -> Bytes {
    let (nibbles, terminal) = match path.as_slice() {
        [rest @ .., LEAF_TERMINATOR] => (rest, true),
        all => (all, false),
    };
    let odd = nibbles.len() % 2 == 1;
    let flag = (u8::from(terminal) << 1) | u8::from(odd);

    let mut out = Vec::with_capacity(nibbles.len() / 2 + 1);
    let rest = if odd {
        out.push((flag << 4) | nibbles[0]);
        &nibbles[1..]
    } else {
        out.push(flag << 4);
        nibbles
    };
    for pair in rest.chunks_exact(2) {
        out.push((pair[0] << 4) | pair[1]);
    }
    Bytes::from(out)
}

/// Inverse of [`compact_encode`]. Terminal paths get the terminator re-appended.
pub fn compact_decode(encoded: &[u8]) -> TrieResult<Path> {
    let Some((&first, rest)) = encoded.split_first() else {
        return Err(TrieError::Decode(alloy_rlp::Error::InputTooShort));
    };
    let (terminal, odd) = match first >> 4 {
        0b0000 => (false, false),
        0b0001 => (false, true),
        0b0010 => (true, false),
        0b0011 => (true, true),
        _ => return Err(alloy_rlp::Error::Custom("invalid compact path flag").into()),
    };
    if !odd && first & 0x0f != 0 {
        return Err(alloy_rlp::Error::Custom("non-zero compact path padding").into());
    }

    let mut nibbles = Vec::with_capacity(rest.len() * 2 + 2);
    if odd {
        nibbles.push(first & 0x0f);
    }
    for byte in rest {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0f);
    }
    if terminal {
        nibbles.push(LEAF_TERMINATOR);
    }
    Ok(Path(nibbles))
}
