//! Optimal deterministic protocols.
//!
//! The synthesizer fills four tables indexed by every rectangle `(x, y)` of the
//! matrix, where `x` is a row mask in `1..2^a` and `y` a column mask in `1..2^b`:
//!
//! - `cost[x][y]`: the deterministic communication complexity of the rectangle,
//! - `speaker[x][y]`: who sends the next bit at the optimum (`None` when the cost is 0),
//! - `choice[x][y]`: the half of the speaker's set that the optimal split isolates,
//! - `output[x][y]`: the common value of a monochromatic rectangle, `None` otherwise.
//!
//! Rectangles are processed in increasing order of `x`, then `y`. Every half
//! listed in the partition table is a proper subset of its parent and therefore
//! numerically smaller, so every sub-rectangle referenced is already resolved.
//!
//! # Example
//!
//! ```
//! use cc_bounds::matrix::Matrix;
//! use cc_bounds::protocol::Protocol;
//! use cc_bounds::types::Party;
//!
//! let m: Matrix = "0 1\n0 1".parse().unwrap();
//! let protocol = Protocol::synthesize(&m);
//!
//! // Bob announces his column and both parties know the answer.
//! assert_eq!(protocol.cost(), 1);
//! assert_eq!(protocol.tables().speaker(m.full_rect()), Some(Party::Bob));
//! ```

use std::fmt;

use log::{debug, trace};

use crate::matrix::Matrix;
use crate::node::{Node, NodeDisplay};
use crate::subset::partitions_of;
use crate::types::{Entry, Party, Rect};
use crate::utils::{bit_index, full_mask};

/// Dynamic-programming tables over all rectangles of a matrix.
#[derive(Debug, Clone)]
pub struct Tables {
    pub cost: Vec<Vec<usize>>,
    pub speaker: Vec<Vec<Option<Party>>>,
    pub choice: Vec<Vec<usize>>,
    pub output: Vec<Vec<Option<Entry>>>,
}

impl Tables {
    fn new(m: usize, n: usize) -> Self {
        Self {
            cost: vec![vec![usize::MAX; n]; m],
            speaker: vec![vec![None; n]; m],
            choice: vec![vec![0; n]; m],
            output: vec![vec![None; n]; m],
        }
    }

    pub fn cost(&self, rect: Rect) -> usize {
        self.cost[rect.rows][rect.cols]
    }

    pub fn speaker(&self, rect: Rect) -> Option<Party> {
        self.speaker[rect.rows][rect.cols]
    }

    pub fn choice(&self, rect: Rect) -> usize {
        self.choice[rect.rows][rect.cols]
    }

    pub fn output(&self, rect: Rect) -> Option<Entry> {
        self.output[rect.rows][rect.cols]
    }

    /// Output of the union of two already-resolved rectangles, if both are
    /// free of communication and their outputs unify.
    fn merge(&self, a: Rect, b: Rect) -> Option<Entry> {
        if self.cost(a) != 0 || self.cost(b) != 0 {
            return None;
        }
        self.output(a)?.unify(self.output(b)?)
    }

    fn set_leaf(&mut self, rect: Rect, output: Entry) {
        self.cost[rect.rows][rect.cols] = 0;
        self.output[rect.rows][rect.cols] = Some(output);
    }

    fn offer(&mut self, rect: Rect, cost: usize, speaker: Party, choice: usize) {
        // Strict comparison: the first candidate found wins ties.
        if cost < self.cost(rect) {
            self.cost[rect.rows][rect.cols] = cost;
            self.speaker[rect.rows][rect.cols] = Some(speaker);
            self.choice[rect.rows][rect.cols] = choice;
        }
    }
}

/// Fills the cost, speaker, choice, and output tables for `matrix`.
pub fn fill_tables(matrix: &Matrix) -> Tables {
    let m = 1 << matrix.rows();
    let n = 1 << matrix.cols();
    let partitions = partitions_of(full_mask(matrix.rows().max(matrix.cols())));
    let mut tables = Tables::new(m, n);

    debug!("filling tables for {}x{} rectangles", m - 1, n - 1);

    for x in 1..m {
        let row_halves = &partitions[x];
        for y in 1..n {
            let col_halves = &partitions[y];
            let rect = Rect::new(x, y);

            if row_halves.is_empty() && col_halves.is_empty() {
                let output = matrix.get(bit_index(x), bit_index(y));
                tables.set_leaf(rect, output);
                continue;
            }

            // One witness split is enough to detect a monochromatic rectangle.
            // Rows are tried first; columns only when the row set is a singleton.
            let merged = match row_halves.first() {
                Some(&x1) => {
                    let (a, b) = rect.split_rows(x1);
                    tables.merge(a, b)
                }
                None => {
                    let (a, b) = rect.split_cols(col_halves[0]);
                    tables.merge(a, b)
                }
            };
            if let Some(output) = merged {
                trace!("rectangle {} is monochromatic: {}", rect, output);
                tables.set_leaf(rect, output);
                continue;
            }

            for &x1 in row_halves {
                let (a, b) = rect.split_rows(x1);
                let cost = 1 + tables.cost(a).max(tables.cost(b));
                tables.offer(rect, cost, Party::Alice, x1);
            }
            for &y1 in col_halves {
                let (a, b) = rect.split_cols(y1);
                let cost = 1 + tables.cost(a).max(tables.cost(b));
                tables.offer(rect, cost, Party::Bob, y1);
            }
            trace!(
                "rectangle {} costs {} ({:?} splits off {:#b})",
                rect,
                tables.cost(rect),
                tables.speaker(rect),
                tables.choice(rect)
            );
        }
    }

    tables
}

/// An optimal deterministic protocol for a matrix.
#[derive(Debug, Clone)]
pub struct Protocol {
    matrix: Matrix,
    tables: Tables,
    root: Node,
}

impl Protocol {
    /// Computes the optimal protocol for the full matrix.
    pub fn synthesize(matrix: &Matrix) -> Self {
        let tables = fill_tables(matrix);
        let root = build_tree(&tables, matrix.full_rect());
        debug!(
            "synthesized protocol of cost {} with {} nodes",
            root.cost(),
            root.size()
        );
        Self {
            matrix: matrix.clone(),
            tables,
            root,
        }
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Deterministic communication complexity of the full matrix.
    pub fn cost(&self) -> usize {
        self.tables.cost(self.matrix.full_rect())
    }

    /// Builds the optimal sub-protocol starting from `rect`.
    ///
    /// # Panics
    ///
    /// Panics if `rect` is empty on either side or not inside the matrix.
    pub fn tree_at(&self, rect: Rect) -> Node {
        assert!(
            rect.rows != 0 && rect.cols != 0 && rect.is_subset(&self.matrix.full_rect()),
            "rectangle {} is not a non-empty sub-rectangle of the matrix",
            rect
        );
        build_tree(&self.tables, rect)
    }

    /// Renders the protocol tree as indented text.
    pub fn display(&self) -> NodeDisplay<'_> {
        self.root.display(self.matrix.rows(), self.matrix.cols())
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Reconstructs the protocol tree rooted at `rect` from filled tables.
///
/// Every recursive call strictly shrinks the rectangle, so this terminates.
pub fn build_tree(tables: &Tables, rect: Rect) -> Node {
    match (tables.speaker(rect), tables.output(rect)) {
        (Some(speaker), _) => {
            let choice = tables.choice(rect);
            let (left, right) = match speaker {
                Party::Alice => rect.split_rows(choice),
                Party::Bob => rect.split_cols(choice),
            };
            Node::Internal {
                rect,
                cost: tables.cost(rect),
                speaker,
                choice,
                children: Box::new([build_tree(tables, left), build_tree(tables, right)]),
            }
        }
        (None, Some(output)) => Node::Leaf { rect, output },
        (None, None) => unreachable!("rectangle {} was never resolved", rect),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_log::test;

    use super::*;

    fn parse(s: &str) -> Matrix {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_cell() {
        for (text, entry) in [("0", Entry::Zero), ("1", Entry::One), ("*", Entry::DontCare)] {
            let protocol = Protocol::synthesize(&parse(text));
            assert_eq!(protocol.cost(), 0);
            assert_eq!(protocol.root(), &Node::Leaf { rect: Rect::new(1, 1), output: entry });
        }
    }

    #[test]
    fn test_constant() {
        let m = parse("1 1 1\n1 * 1\n1 1 *");
        let protocol = Protocol::synthesize(&m);
        assert_eq!(protocol.cost(), 0);
        assert_eq!(protocol.tables().output(m.full_rect()), Some(Entry::One));
        assert!(protocol.root().is_leaf());
    }

    #[test]
    fn test_xor() {
        let m = parse("0 1\n1 0");
        let protocol = Protocol::synthesize(&m);
        assert_eq!(protocol.cost(), 2);
        assert_eq!(protocol.root().depth(), 2);
        assert_eq!(protocol.root().leaves().count(), 4);
    }

    #[test]
    fn test_identity() {
        let m = parse("1 0 0 0\n0 1 0 0\n0 0 1 0\n0 0 0 1");
        let protocol = Protocol::synthesize(&m);
        // Four 1-leaves and at least one 0-leaf need depth 3.
        assert_eq!(protocol.cost(), 3);
        assert_eq!(protocol.root().depth(), 3);
    }

    #[test]
    fn test_column_announcement() {
        let m = parse("0 1\n0 1");
        let protocol = Protocol::synthesize(&m);
        let full = m.full_rect();
        assert_eq!(protocol.cost(), 1);
        assert_eq!(protocol.tables().speaker(full), Some(Party::Bob));
        assert_eq!(protocol.tables().choice(full), 0b01);
        assert_eq!(protocol.tables().output(full), None);
    }

    #[test]
    fn test_ties_prefer_first_row_half() {
        // AND: row and column splits both cost 2.
        let m = parse("0 0\n0 1");
        let protocol = Protocol::synthesize(&m);
        let full = m.full_rect();
        assert_eq!(protocol.cost(), 2);
        assert_eq!(protocol.tables().speaker(full), Some(Party::Alice));
        assert_eq!(protocol.tables().choice(full), 0b01);
    }

    #[test]
    fn test_dont_care_merges() {
        // Row 1 is all don't-cares and absorbs into either neighbour.
        let m = parse("0 0\n* *\n1 1");
        let protocol = Protocol::synthesize(&m);
        let tables = protocol.tables();
        assert_eq!(tables.cost(Rect::new(0b011, 0b11)), 0);
        assert_eq!(tables.output(Rect::new(0b011, 0b11)), Some(Entry::Zero));
        assert_eq!(tables.cost(Rect::new(0b110, 0b11)), 0);
        assert_eq!(tables.output(Rect::new(0b110, 0b11)), Some(Entry::One));
        assert_eq!(tables.output(Rect::new(0b010, 0b11)), Some(Entry::DontCare));
        assert_eq!(protocol.cost(), 1);
    }

    #[test]
    fn test_disjointness_with_dont_cares() {
        let m = parse("1 1 0 1\n1 0 1 0\n1 * 0 0\n1 0 * 0");
        let protocol = Protocol::synthesize(&m);
        assert_eq!(protocol.root().depth(), protocol.cost());
        for leaf in protocol.root().leaves() {
            assert_eq!(m.monochromatic(leaf.rect()), leaf.output());
        }
    }

    #[test]
    fn test_merge_direction_matches_direct_evaluation() {
        // The zero-cost test only inspects one split direction; check that
        // this never disagrees with evaluating each rectangle directly.
        let m = parse("0 * 1\n* * 1\n0 0 *");
        let protocol = Protocol::synthesize(&m);
        let tables = protocol.tables();
        for x in 1..8 {
            for y in 1..8 {
                let rect = Rect::new(x, y);
                let direct = m.monochromatic(rect);
                assert_eq!(tables.cost(rect) == 0, direct.is_some(), "rectangle {}", rect);
                if direct.is_some() {
                    assert_eq!(tables.output(rect), direct, "rectangle {}", rect);
                }
            }
        }
    }

    #[test]
    fn test_tree_at() {
        let m = parse("1 0 0 0\n0 1 0 0\n0 0 1 0\n0 0 0 1");
        let protocol = Protocol::synthesize(&m);
        let sub = protocol.tree_at(Rect::new(0b0011, 0b1100));
        assert_eq!(sub, Node::Leaf { rect: Rect::new(0b0011, 0b1100), output: Entry::Zero });
        let sub = protocol.tree_at(Rect::new(0b0011, 0b0011));
        assert_eq!(sub.cost(), 2);
    }

    #[test]
    #[should_panic(expected = "not a non-empty sub-rectangle")]
    fn test_tree_at_outside() {
        let protocol = Protocol::synthesize(&parse("0 1\n1 0"));
        protocol.tree_at(Rect::new(0b100, 0b1));
    }

    #[test]
    fn test_display() {
        let protocol = Protocol::synthesize(&parse("0 1\n0 1"));
        assert_eq!(
            protocol.to_string(),
            "Rectangle: (11,11) Speaker: Bob Cost: 1\n\
             \tRectangle: (11,01) Output: 0\n\
             \tRectangle: (11,10) Output: 1\n"
        );
    }

    fn arb_matrix() -> impl Strategy<Value = Matrix> {
        (1usize..=3, 1usize..=3).prop_flat_map(|(a, b)| {
            prop::collection::vec(prop::collection::vec(prop::option::weighted(0.8, any::<bool>()), b), a).prop_map(
                |rows| {
                    let cells = rows.into_iter().map(|row| row.into_iter().map(Entry::from).collect()).collect();
                    Matrix::new(cells).unwrap()
                },
            )
        })
    }

    proptest! {
        #[test]
        fn proptest_leaves_are_sound(m in arb_matrix()) {
            let protocol = Protocol::synthesize(&m);
            for leaf in protocol.root().leaves() {
                let output = leaf.output().unwrap();
                prop_assert_eq!(m.monochromatic(leaf.rect()), Some(output));
            }
        }

        #[test]
        fn proptest_depth_equals_cost(m in arb_matrix()) {
            let protocol = Protocol::synthesize(&m);
            prop_assert_eq!(protocol.root().depth(), protocol.cost());
        }

        #[test]
        fn proptest_every_input_reaches_its_value(m in arb_matrix()) {
            let protocol = Protocol::synthesize(&m);
            for (i, j, entry) in m.cells() {
                let leaf = protocol.root().follow(i, j).unwrap();
                let output = leaf.output().unwrap();
                prop_assert!(entry.unify(output).is_some());
                if !entry.is_dont_care() {
                    prop_assert_eq!(output, entry);
                }
            }
        }

        #[test]
        fn proptest_constant_is_free(a in 1usize..=4, b in 1usize..=4, bit in any::<bool>()) {
            let m = Matrix::from_fn(a, b, |_, _| Entry::from(bit)).unwrap();
            let protocol = Protocol::synthesize(&m);
            prop_assert_eq!(protocol.cost(), 0);
            prop_assert_eq!(protocol.tables().output(m.full_rect()), Some(Entry::from(bit)));
        }
    }
}
