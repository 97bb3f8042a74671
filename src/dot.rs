//! Protocol tree to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Internal nodes** show the rectangle, the speaker, and the remaining cost
//! - **Leaves** show the rectangle and the output, and sit at the bottom (sink rank)
//! - **Edges** are labelled with the announced bit: `0` leads to the chosen
//!   half, `1` to its complement. Alice's edges and Bob's edges use different
//!   styles.
//!
//! # Examples
//!
//! ```
//! use cc_bounds::matrix::Matrix;
//! use cc_bounds::protocol::Protocol;
//!
//! let m: Matrix = "0 1\n1 0".parse().unwrap();
//! let protocol = Protocol::synthesize(&m);
//!
//! let dot = protocol.root().to_dot(m.rows(), m.cols()).unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! assert!(dot.starts_with("digraph {"));
//! ```

use std::fmt::Write as _;

use crate::node::Node;
use crate::types::Party;
use crate::utils::to_binary;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for internal nodes (default: "ellipse")
    pub internal_shape: &'static str,
    /// Shape for leaves (default: "box")
    pub leaf_shape: &'static str,
    /// Style for edges of Alice's bits (default: "solid")
    pub alice_edge_style: &'static str,
    /// Style for edges of Bob's bits (default: "dashed")
    pub bob_edge_style: &'static str,
    /// Whether internal nodes show their cost (default: true)
    pub show_cost: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            internal_shape: "ellipse",
            leaf_shape: "box",
            alice_edge_style: "solid",
            bob_edge_style: "dashed",
            show_cost: true,
        }
    }
}

impl Node {
    /// Converts the protocol tree to DOT format.
    ///
    /// `row_bits` and `col_bits` are the number of rows and columns of the
    /// matrix, used to render rectangles as fixed-width binary strings.
    pub fn to_dot(&self, row_bits: usize, col_bits: usize) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(row_bits, col_bits, &DotConfig::default())
    }

    /// Converts the protocol tree to DOT format with custom configuration.
    pub fn to_dot_with_config(
        &self,
        row_bits: usize,
        col_bits: usize,
        config: &DotConfig,
    ) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;

        // Preorder numbering; the stack holds (node, id).
        let mut leaves = Vec::new();
        let mut next_id = 1;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, id)) = stack.pop() {
            let rect = node.rect();
            let rect_label = format!("{},{}", to_binary(rect.rows, row_bits), to_binary(rect.cols, col_bits));
            match node {
                Node::Leaf { output, .. } => {
                    writeln!(
                        dot,
                        "{} [shape={}, label=\"{}\\n{}\"];",
                        id, config.leaf_shape, rect_label, output
                    )?;
                    leaves.push(id);
                }
                Node::Internal {
                    cost, speaker, children, ..
                } => {
                    let label = if config.show_cost {
                        format!("{}\\n{} ({})", rect_label, speaker, cost)
                    } else {
                        format!("{}\\n{}", rect_label, speaker)
                    };
                    writeln!(dot, "{} [shape={}, label=\"{}\"];", id, config.internal_shape, label)?;

                    let style = match speaker {
                        Party::Alice => config.alice_edge_style,
                        Party::Bob => config.bob_edge_style,
                    };
                    let left = next_id;
                    let right = next_id + 1;
                    next_id += 2;
                    writeln!(dot, "{} -> {} [style={}, label=\"0\"];", id, left, style)?;
                    writeln!(dot, "{} -> {} [style={}, label=\"1\"];", id, right, style)?;
                    stack.push((&children[1], right));
                    stack.push((&children[0], left));
                }
            }
        }

        // Leaves at the bottom
        write!(dot, "{{ rank=sink;")?;
        for id in leaves {
            write!(dot, " {};", id)?;
        }
        writeln!(dot, " }}")?;

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
