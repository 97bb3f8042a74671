//! Small value types shared by the synthesizer and the solver.
//!
//! This module provides the tri-state matrix [`Entry`], the [`Party`] that
//! speaks at a protocol node, and the [`Rect`] combinatorial rectangle.
use std::fmt;

/// A single cell of the communication matrix.
///
/// Cells are either a concrete output bit or a don't-care, which the protocol
/// may resolve to whichever value is convenient.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Entry {
    Zero,
    One,
    DontCare,
}

impl Entry {
    /// Unifies two entries.
    ///
    /// A don't-care unifies with anything and yields the other side.
    /// Two concrete entries unify only when they are equal.
    ///
    /// ```
    /// use cc_bounds::types::Entry;
    ///
    /// assert_eq!(Entry::Zero.unify(Entry::DontCare), Some(Entry::Zero));
    /// assert_eq!(Entry::DontCare.unify(Entry::DontCare), Some(Entry::DontCare));
    /// assert_eq!(Entry::Zero.unify(Entry::One), None);
    /// ```
    pub fn unify(self, other: Entry) -> Option<Entry> {
        match (self, other) {
            (Entry::DontCare, x) | (x, Entry::DontCare) => Some(x),
            (x, y) if x == y => Some(x),
            _ => None,
        }
    }

    /// Returns the concrete bit, or `None` for a don't-care.
    pub fn bit(self) -> Option<bool> {
        match self {
            Entry::Zero => Some(false),
            Entry::One => Some(true),
            Entry::DontCare => None,
        }
    }

    pub fn is_dont_care(self) -> bool {
        self == Entry::DontCare
    }
}

impl From<bool> for Entry {
    fn from(value: bool) -> Self {
        if value {
            Entry::One
        } else {
            Entry::Zero
        }
    }
}

impl From<Option<bool>> for Entry {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Entry::DontCare, Entry::from)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Zero => write!(f, "0"),
            Entry::One => write!(f, "1"),
            Entry::DontCare => write!(f, "*"),
        }
    }
}

/// The party transmitting the next bit.
///
/// Alice holds the row input, Bob holds the column input.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Party {
    Alice,
    Bob,
}

impl Party {
    /// Returns `true` for the row party.
    pub fn is_row(self) -> bool {
        self == Party::Alice
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Alice => write!(f, "Alice"),
            Party::Bob => write!(f, "Bob"),
        }
    }
}

/// A combinatorial rectangle: a set of rows times a set of columns.
///
/// Both coordinates are bitmasks over row (resp. column) indices.
///
/// # Invariants
///
/// - Both masks are non-zero for every rectangle reachable by the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rect {
    pub rows: usize,
    pub cols: usize,
}

impl Rect {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Rectangle containing exactly one input pair `(row, col)`.
    pub const fn cell(row: usize, col: usize) -> Self {
        Self::new(1 << row, 1 << col)
    }

    /// Returns `true` if `self` is a sub-rectangle of `other`.
    pub fn is_subset(&self, other: &Rect) -> bool {
        self.rows & !other.rows == 0 && self.cols & !other.cols == 0
    }

    /// Number of input pairs covered by the rectangle.
    pub fn size(&self) -> usize {
        (self.rows.count_ones() * self.cols.count_ones()) as usize
    }

    /// Splits off the row half `half`, returning `(half, rest)`.
    pub fn split_rows(&self, half: usize) -> (Rect, Rect) {
        debug_assert!(half & !self.rows == 0);
        (Rect::new(half, self.cols), Rect::new(self.rows - half, self.cols))
    }

    /// Splits off the column half `half`, returning `(half, rest)`.
    pub fn split_cols(&self, half: usize) -> (Rect, Rect) {
        debug_assert!(half & !self.cols == 0);
        (Rect::new(self.rows, half), Rect::new(self.rows, self.cols - half))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:#b}, {:#b})", self.rows, self.cols)
    }
}
