//! Success-probability bounds for randomized protocols.
//!
//! A randomized protocol with a budget of `steps` bits is modelled as a flow of
//! probability mass over rectangles. Every state `(k, r)` (round `k`, current
//! rectangle `r`) chooses among actions: split `r` along one of its row or
//! column bipartitions (only while `k < steps`), or commit to output 0 or 1.
//! One LP variable holds the mass of each `(k, r, action)` triple; slot 0
//! holds the success probability being maximised.
//!
//! The constraints are:
//!
//! - **Flow conservation.** For every `(k, r)`, the mass leaving `r` equals the
//!   mass entering it: `1` for the full rectangle at round 0 and `0` for every
//!   other rectangle at round 0; at round `k > 0`, the sum over every larger
//!   rectangle `e` (same columns and more rows, or same rows and more columns)
//!   of the split of `e` at round `k - 1` that produces `r`.
//! - **Correctness.** For every cell `(i, j)` with a concrete value `q`, the
//!   mass committing to `q` in any rectangle containing `(i, j)`, over all
//!   rounds, is at least the success probability. In one-sided mode the cells
//!   with value 0 must instead be answered correctly with probability 1.
//!
//! Commits are allowed in every round, so a feasible flow for `steps` bits is
//! also feasible for `steps + 1`. The optimum is therefore non-decreasing in
//! `steps`, and [`min_bits`] bisects on it.
//!
//! # Example
//!
//! ```
//! use cc_bounds::matrix::Matrix;
//! use cc_bounds::randomized::{max_success, min_bits};
//!
//! let xor: Matrix = "0 1\n1 0".parse().unwrap();
//!
//! let p = max_success(&xor, 0, false).unwrap();
//! assert!((p - 0.5).abs() < 1e-6);
//!
//! assert_eq!(min_bits(&xor, 1.0, false).unwrap(), 2);
//! ```

use std::collections::HashMap;
use std::ops::Range;

use log::{debug, info};

use crate::lp::{LinearProgram, LpSolver, MicroLp, Row, SolveError};
use crate::matrix::Matrix;
use crate::subset::{extensions_of, outer_subsets, partitions_of};
use crate::types::Rect;

/// Slot of the success-probability variable.
pub const OBJECTIVE: usize = 0;

/// What a protocol does next from a given rectangle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Action {
    /// Announce which side of a bipartition the input lies in.
    ///
    /// Holds the half listed in the partition table; the other outcome is its
    /// complement within the current rectangle.
    Split(Rect),
    /// Stop and output the given bit.
    Commit(bool),
}

/// Allocation of LP variable slots to `(round, rectangle, action)` triples.
///
/// Slots are allocated round by round, rectangles in increasing order of rows
/// then columns, and per rectangle: row halves, column halves, commit to 0,
/// commit to 1.
#[derive(Debug, Clone)]
pub struct VarIndex {
    steps: usize,
    slots: HashMap<(usize, Rect, Action), usize>,
    blocks: HashMap<(usize, Rect), Range<usize>>,
    len: usize,
}

impl VarIndex {
    /// Allocates slots for every rectangle in `rects` and every round `0..=steps`.
    pub fn new(rects: &[Rect], steps: usize, partitions: &[Vec<usize>]) -> Self {
        let mut slots = HashMap::new();
        let mut blocks = HashMap::new();
        let mut next = OBJECTIVE + 1;
        for k in 0..=steps {
            for &r in rects {
                let start = next;
                for action in actions(partitions, r, k < steps) {
                    slots.insert((k, r, action), next);
                    next += 1;
                }
                blocks.insert((k, r), start..next);
            }
        }
        Self {
            steps,
            slots,
            blocks,
            len: next,
        }
    }

    /// Total number of slots, including the objective.
    pub fn num_slots(&self) -> usize {
        self.len
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Slot of `(round, rect, action)`, if allocated.
    pub fn slot(&self, round: usize, rect: Rect, action: Action) -> Option<usize> {
        self.slots.get(&(round, rect, action)).copied()
    }

    /// Slots of every action available at `(round, rect)`.
    pub fn slots_at(&self, round: usize, rect: Rect) -> Range<usize> {
        self.blocks.get(&(round, rect)).cloned().unwrap_or(0..0)
    }

    /// Slot of the split of `outer` at `round` whose outcome is `inner`.
    ///
    /// `inner` must differ from `outer` in exactly one coordinate. The split
    /// is listed under whichever of `inner` and its complement is the
    /// partition-table half.
    pub fn split_slot(&self, round: usize, outer: Rect, inner: Rect) -> Option<usize> {
        let complement = if inner.rows != outer.rows {
            debug_assert_eq!(inner.cols, outer.cols);
            Rect::new(outer.rows - inner.rows, outer.cols)
        } else {
            Rect::new(outer.rows, outer.cols - inner.cols)
        };
        self.slot(round, outer, Action::Split(inner))
            .or_else(|| self.slot(round, outer, Action::Split(complement)))
    }
}

/// Unwraps a slot that the construction guarantees exists.
///
/// # Panics
///
/// Panics if the slot was never allocated.
fn required(slot: Option<usize>, round: usize, rect: Rect, what: &str) -> usize {
    slot.unwrap_or_else(|| panic!("no LP variable for {} at round {} in rectangle {}", what, round, rect))
}

/// Actions available in `rect`: its row halves, its column halves (only if
/// `can_split`), then both commits.
pub fn actions(partitions: &[Vec<usize>], rect: Rect, can_split: bool) -> Vec<Action> {
    let mut result = Vec::new();
    if can_split {
        result.extend(partitions[rect.rows].iter().map(|&p| Action::Split(Rect::new(p, rect.cols))));
        result.extend(partitions[rect.cols].iter().map(|&p| Action::Split(Rect::new(rect.rows, p))));
    }
    result.push(Action::Commit(false));
    result.push(Action::Commit(true));
    result
}

/// The flow LP together with its variable allocation.
#[derive(Debug, Clone)]
pub struct FlowProgram {
    pub lp: LinearProgram,
    pub index: VarIndex,
}

/// Builds the flow LP for `matrix` with a budget of `steps` bits.
pub fn build_program(matrix: &Matrix, steps: usize, one_sided: bool) -> FlowProgram {
    let row_universe = matrix.row_universe();
    let col_universe = matrix.col_universe();
    let full = matrix.full_rect();

    let partitions = partitions_of(row_universe.max(col_universe));
    let row_ext = extensions_of(row_universe);
    let col_ext = extensions_of(col_universe);

    let rects: Vec<Rect> = (1..=row_universe)
        .flat_map(|x| (1..=col_universe).map(move |y| Rect::new(x, y)))
        .collect();
    let index = VarIndex::new(&rects, steps, &partitions);

    let mut lp = LinearProgram::new(index.num_slots());
    lp.objective[OBJECTIVE] = -1.0;
    for bound in lp.bounds.iter_mut().skip(OBJECTIVE + 1) {
        *bound = (Some(0.0), Some(1.0));
    }
    lp.bounds[OBJECTIVE] = (None, Some(1.0));

    // Flow conservation
    for k in 0..=steps {
        for &r in &rects {
            let mut row: Row = index.slots_at(k, r).map(|slot| (slot, 1.0)).collect();
            let rhs = if k == 0 {
                if r == full {
                    1.0
                } else {
                    0.0
                }
            } else {
                let outer = row_ext[r.rows]
                    .iter()
                    .map(|&rows| Rect::new(rows, r.cols))
                    .chain(col_ext[r.cols].iter().map(|&cols| Rect::new(r.rows, cols)));
                for e in outer {
                    let slot = required(index.split_slot(k - 1, e, r), k - 1, e, "split");
                    row.push((slot, -1.0));
                }
                0.0
            };
            lp.add_eq(row, rhs);
        }
    }

    // Correctness
    for (i, j, entry) in matrix.cells() {
        let Some(bit) = entry.bit() else {
            continue;
        };
        let input = Rect::cell(i, j);
        let mut row = Row::new();
        let rhs = if one_sided && !bit {
            -1.0
        } else {
            row.push((OBJECTIVE, 1.0));
            0.0
        };
        for rows in outer_subsets(&row_ext, input.rows) {
            for cols in outer_subsets(&col_ext, input.cols) {
                let r = Rect::new(rows, cols);
                for k in 0..=steps {
                    let slot = required(index.slot(k, r, Action::Commit(bit)), k, r, "commit");
                    row.push((slot, -1.0));
                }
            }
        }
        lp.add_ub(row, rhs);
    }

    debug!(
        "flow LP for {} steps: {} variables, {} equalities, {} inequalities",
        steps,
        lp.num_vars(),
        lp.eq.len(),
        lp.ub.len()
    );
    FlowProgram { lp, index }
}

/// Knobs for [`min_bits_with`].
#[derive(Debug, Clone)]
pub struct BoundConfig {
    /// Slack subtracted from the target probability to absorb solver noise (default: 0.01)
    pub tolerance: f64,
    /// Upper end of the search range; [`trivial_upper_bound`] when `None` (default: None)
    pub max_rounds: Option<usize>,
}

impl Default for BoundConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_rounds: None,
        }
    }
}

/// Maximum success probability of a `steps`-bit randomized protocol.
pub fn max_success(matrix: &Matrix, steps: usize, one_sided: bool) -> Result<f64, SolveError> {
    max_success_with(matrix, steps, one_sided, &MicroLp)
}

/// Same as [`max_success`], with an explicit LP backend.
pub fn max_success_with(
    matrix: &Matrix,
    steps: usize,
    one_sided: bool,
    solver: &impl LpSolver,
) -> Result<f64, SolveError> {
    let program = build_program(matrix, steps, one_sided);
    let value = solver.minimize(&program.lp)?;
    // Solver round-off can land just outside the probability range.
    Ok((-value).clamp(0.0, 1.0))
}

/// Number of bits that always suffice: `ceil(log2(min(a, b))) + 1`.
///
/// The party with fewer inputs announces its input, then the other party
/// announces the output.
pub fn trivial_upper_bound(matrix: &Matrix) -> usize {
    let a = matrix.rows().min(matrix.cols());
    a.next_power_of_two().trailing_zeros() as usize + 1
}

/// Fewest bits for which some randomized protocol succeeds with probability
/// at least `p` on every input.
pub fn min_bits(matrix: &Matrix, p: f64, one_sided: bool) -> Result<usize, SolveError> {
    min_bits_with(matrix, p, one_sided, &BoundConfig::default(), &MicroLp)
}

/// Same as [`min_bits`], with explicit configuration and LP backend.
pub fn min_bits_with(
    matrix: &Matrix,
    p: f64,
    one_sided: bool,
    config: &BoundConfig,
    solver: &impl LpSolver,
) -> Result<usize, SolveError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(SolveError::InvalidProbability(p));
    }
    if config.tolerance.is_nan() || config.tolerance < 0.0 {
        return Err(SolveError::InvalidTolerance(config.tolerance));
    }
    let target = p - config.tolerance;

    let mut lo = 0;
    let mut hi = config.max_rounds.unwrap_or_else(|| trivial_upper_bound(matrix));
    while lo < hi {
        let mid = (lo + hi) / 2;
        let value = max_success_with(matrix, mid, one_sided, solver)?;
        info!("{} bits: success probability {:.4} (target {:.4})", mid, value, target);
        if value < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}
