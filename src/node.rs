//! Protocol trees.
//!
//! A [`Node`] is either a leaf, where the rectangle is monochromatic and both
//! parties know the output, or an internal node, where one party announces
//! which half of the rectangle holds its input. Each internal node owns its
//! two children; the first child is the chosen half, the second its complement.

use std::fmt;

use crate::types::{Entry, Party, Rect};
use crate::utils::to_binary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        rect: Rect,
        output: Entry,
    },
    Internal {
        rect: Rect,
        cost: usize,
        speaker: Party,
        choice: usize,
        children: Box<[Node; 2]>,
    },
}

impl Node {
    pub fn rect(&self) -> Rect {
        match self {
            Node::Leaf { rect, .. } | Node::Internal { rect, .. } => *rect,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Worst-case number of bits exchanged below this node.
    pub fn cost(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { cost, .. } => *cost,
        }
    }

    /// Output of a leaf, `None` for internal nodes.
    pub fn output(&self) -> Option<Entry> {
        match self {
            Node::Leaf { output, .. } => Some(*output),
            Node::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(&Node, &Node)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { children, .. } => Some((&children[0], &children[1])),
        }
    }

    /// Length of the longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        match self.children() {
            None => 0,
            Some((left, right)) => 1 + left.depth().max(right.depth()),
        }
    }

    /// Total number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self.children() {
            None => 1,
            Some((left, right)) => 1 + left.size() + right.size(),
        }
    }

    /// Iterates over the leaves, left to right.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Follows the protocol on the input pair `(row, col)` and returns the leaf reached.
    ///
    /// Returns `None` if the input is not inside this node's rectangle.
    pub fn follow(&self, row: usize, col: usize) -> Option<&Node> {
        let input = Rect::cell(row, col);
        let mut node = self;
        if !input.is_subset(&node.rect()) {
            return None;
        }
        while let Some((left, right)) = node.children() {
            node = if input.is_subset(&left.rect()) { left } else { right };
        }
        Some(node)
    }

    /// Returns a value rendering the tree as indented text.
    ///
    /// Rectangles are printed as fixed-width binary strings of `row_bits`
    /// and `col_bits` digits, most significant bit first.
    pub fn display(&self, row_bits: usize, col_bits: usize) -> NodeDisplay<'_> {
        NodeDisplay {
            node: self,
            row_bits,
            col_bits,
        }
    }
}

/// Iterator over the leaves of a protocol tree.
pub struct Leaves<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node.children() {
                None => return Some(node),
                Some((left, right)) => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
        None
    }
}

pub struct NodeDisplay<'a> {
    node: &'a Node,
    row_bits: usize,
    col_bits: usize,
}

impl NodeDisplay<'_> {
    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: &Node, level: usize) -> fmt::Result {
        let rect = node.rect();
        write!(
            f,
            "{}Rectangle: ({},{}) ",
            "\t".repeat(level),
            to_binary(rect.rows, self.row_bits),
            to_binary(rect.cols, self.col_bits)
        )?;
        match node {
            Node::Leaf { output, .. } => writeln!(f, "Output: {}", output),
            Node::Internal {
                cost, speaker, children, ..
            } => {
                writeln!(f, "Speaker: {} Cost: {}", speaker, cost)?;
                self.write_node(f, &children[0], level + 1)?;
                self.write_node(f, &children[1], level + 1)
            }
        }
    }
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.node, 0)
    }
}
