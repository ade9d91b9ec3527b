//! Simple printing implementation of an MPT.
use super::MerklePatriciaTrie;
use crate::node::Node;
use std::fmt::{Display, Formatter, Result};

impl<V, F> Display for MerklePatriciaTrie<V, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "MerklePatriciaTrie[{}]", self.root.hash())?;
        fmt_node(f, &self.root, 0)
    }
}

// Stored nodes are printed as references: formatting never touches the store.
fn fmt_node(f: &mut Formatter<'_>, node: &Node, indent: usize) -> Result {
    match node {
        Node::Null => write!(f, "{:indent$}Null", ""),
        Node::Leaf(leaf) => {
            write!(f, "{:indent$}Leaf {{ path: {:?}, value: {:?} }}", "", leaf.path(), leaf.value())
        }
        Node::Extension(extension) => {
            writeln!(f, "{:indent$}Extension {{ path: {:?} }}", "", extension.path())?;
            fmt_node(f, extension.child(), indent + 4)
        }
        Node::Branch(branch) => {
            write!(f, "{:indent$}Branch", "")?;
            if let Some(value) = branch.value() {
                write!(f, " {{ value: {value:?} }}")?;
            }
            for (idx, child) in branch.children().iter().enumerate() {
                if child.is_null() {
                    continue;
                }
                writeln!(f)?;
                writeln!(f, "{:width$}{idx:x}:", "", width = indent + 2)?;
                fmt_node(f, child, indent + 4)?;
            }
            Ok(())
        }
        Node::Stored(stored) => write!(f, "{:indent$}Stored {{ hash: {} }}", "", stored.hash()),
    }
}
