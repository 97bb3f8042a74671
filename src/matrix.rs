//! The communication matrix of a two-party function.
//!
//! Rows are Alice's inputs, columns are Bob's inputs, and every cell holds the
//! function value as an [`Entry`]. A [`Matrix`] is validated on construction,
//! so everything downstream may assume it is non-empty and rectangular.
//!
//! # Text format
//!
//! One row per line, cells separated by whitespace or commas. A cell is `0`,
//! `1`, or one of `*`, `-`, `x`, `?` for don't-care. Empty lines and lines
//! starting with `#` are ignored.
//!
//! ```
//! use cc_bounds::matrix::Matrix;
//! use cc_bounds::types::Entry;
//!
//! let m: Matrix = "
//!     1 1 0 1
//!     1 0 1 0
//!     1 * 0 0
//!     1 0 * 0
//! ".parse().unwrap();
//!
//! assert_eq!(m.rows(), 4);
//! assert_eq!(m.cols(), 4);
//! assert_eq!(m.get(2, 1), Entry::DontCare);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::types::{Entry, Rect};
use crate::utils::{bits, full_mask};

/// Error type for malformed matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// The matrix has no rows.
    NoRows,
    /// The matrix has no columns.
    NoColumns,
    /// A row has a different length than the first row.
    Ragged { row: usize, expected: usize, found: usize },
    /// A cell is not 0, 1, or a don't-care.
    InvalidEntry { row: usize, col: usize, value: String },
    /// More rows or columns than [`Matrix::MAX_DIM`].
    TooLarge { rows: usize, cols: usize },
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixError::NoRows => write!(f, "matrix has no rows"),
            MatrixError::NoColumns => write!(f, "matrix has no columns"),
            MatrixError::Ragged { row, expected, found } => {
                write!(f, "row {} has {} cells, expected {}", row, found, expected)
            }
            MatrixError::InvalidEntry { row, col, value } => {
                write!(f, "invalid entry '{}' at ({}, {})", value, row, col)
            }
            MatrixError::TooLarge { rows, cols } => write!(
                f,
                "matrix of size {}x{} exceeds the {}x{} limit",
                rows,
                cols,
                Matrix::MAX_DIM,
                Matrix::MAX_DIM
            ),
        }
    }
}

impl std::error::Error for MatrixError {}

/// A validated `a x b` matrix over `{0, 1, *}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    cells: Vec<Vec<Entry>>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Largest supported number of rows (and of columns).
    ///
    /// Every table in the engine is indexed by all `2^a * 2^b` rectangles, so
    /// a 10x10 matrix already needs about 2^20 entries per table. The
    /// partition table grows as `3^max(a, b)`.
    pub const MAX_DIM: usize = 10;

    /// Creates a matrix from rows of entries.
    pub fn new(cells: Vec<Vec<Entry>>) -> Result<Self, MatrixError> {
        let rows = cells.len();
        if rows == 0 {
            return Err(MatrixError::NoRows);
        }
        let cols = cells[0].len();
        if cols == 0 {
            return Err(MatrixError::NoColumns);
        }
        for (i, row) in cells.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::Ragged {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
        }
        if rows > Self::MAX_DIM || cols > Self::MAX_DIM {
            return Err(MatrixError::TooLarge { rows, cols });
        }
        Ok(Self { cells, rows, cols })
    }

    /// Creates a matrix from numeric rows: `Some(0)`, `Some(1)`, or `None` for don't-care.
    ///
    /// ```
    /// use cc_bounds::matrix::Matrix;
    ///
    /// let xor = Matrix::from_numeric(&[[Some(0), Some(1)], [Some(1), Some(0)]]).unwrap();
    /// assert_eq!(xor.rows(), 2);
    ///
    /// assert!(Matrix::from_numeric(&[[Some(2)]]).is_err());
    /// ```
    pub fn from_numeric<R: AsRef<[Option<u8>]>>(rows: &[R]) -> Result<Self, MatrixError> {
        let mut cells = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let mut entries = Vec::with_capacity(row.as_ref().len());
            for (j, &value) in row.as_ref().iter().enumerate() {
                let entry = match value {
                    Some(0) => Entry::Zero,
                    Some(1) => Entry::One,
                    None => Entry::DontCare,
                    Some(v) => {
                        return Err(MatrixError::InvalidEntry {
                            row: i,
                            col: j,
                            value: v.to_string(),
                        })
                    }
                };
                entries.push(entry);
            }
            cells.push(entries);
        }
        Self::new(cells)
    }

    /// Creates a matrix by evaluating `f` on every `(row, col)` pair.
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> Entry) -> Result<Self, MatrixError> {
        let cells = (0..rows).map(|i| (0..cols).map(|j| f(i, j)).collect()).collect();
        Self::new(cells)
    }

    /// Number of rows (Alice's inputs).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (Bob's inputs).
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Entry {
        self.cells[row][col]
    }

    /// Mask of all row indices.
    pub fn row_universe(&self) -> usize {
        full_mask(self.rows)
    }

    /// Mask of all column indices.
    pub fn col_universe(&self) -> usize {
        full_mask(self.cols)
    }

    /// The rectangle covering the whole matrix.
    pub fn full_rect(&self) -> Rect {
        Rect::new(self.row_universe(), self.col_universe())
    }

    /// Iterates over all cells as `(row, col, entry)`, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Entry)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &e)| (i, j, e)))
    }

    /// Evaluates the rectangle directly from the cells.
    ///
    /// Returns the common value of the rectangle ignoring don't-cares
    /// (`DontCare` if every cell is a don't-care), or `None` if two cells
    /// disagree.
    pub fn monochromatic(&self, rect: Rect) -> Option<Entry> {
        let mut color = Entry::DontCare;
        for i in bits(rect.rows) {
            for j in bits(rect.cols) {
                color = color.unify(self.get(i, j))?;
            }
        }
        Some(color)
    }

    /// Returns `true` if every cell is a don't-care or equal to the same value.
    pub fn is_constant(&self) -> bool {
        self.monochromatic(self.full_rect()).is_some()
    }
}

fn parse_entry(token: &str, row: usize, col: usize) -> Result<Entry, MatrixError> {
    match token {
        "0" => Ok(Entry::Zero),
        "1" => Ok(Entry::One),
        "*" | "-" | "x" | "?" => Ok(Entry::DontCare),
        _ => Err(MatrixError::InvalidEntry {
            row,
            col,
            value: token.to_string(),
        }),
    }
}

impl FromStr for Matrix {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::new();
        for line in s.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = cells.len();
            let entries = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .enumerate()
                .map(|(col, token)| parse_entry(token, row, col))
                .collect::<Result<Vec<_>, _>>()?;
            cells.push(entries);
        }
        Self::new(cells)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(|e| e.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let m: Matrix = "0 1 *\n1,0,1\n\n# comment\n- x ?".parse().unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(0, 1), Entry::One);
        assert_eq!(m.get(1, 1), Entry::Zero);
        assert_eq!(m.get(0, 2), Entry::DontCare);
        assert_eq!(m.get(2, 0), Entry::DontCare);
        assert_eq!(m.full_rect(), Rect::new(0b111, 0b111));
    }

    #[test]
    fn test_display_roundtrip() {
        let m: Matrix = "0 1\n* 0".parse().unwrap();
        assert_eq!(m.to_string(), "0 1\n* 0\n");
        assert_eq!(m.to_string().parse::<Matrix>().unwrap(), m);
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!("".parse::<Matrix>(), Err(MatrixError::NoRows));
        assert_eq!(Matrix::new(vec![vec![]]), Err(MatrixError::NoColumns));
        assert_eq!(
            "0 1\n1".parse::<Matrix>(),
            Err(MatrixError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            "0 2".parse::<Matrix>(),
            Err(MatrixError::InvalidEntry {
                row: 0,
                col: 1,
                value: "2".to_string()
            })
        );
        assert!(matches!(
            Matrix::from_fn(11, 1, |_, _| Entry::Zero),
            Err(MatrixError::TooLarge { rows: 11, cols: 1 })
        ));
        assert!(matches!(
            Matrix::from_fn(1, 11, |_, _| Entry::Zero),
            Err(MatrixError::TooLarge { rows: 1, cols: 11 })
        ));
        assert!(Matrix::from_fn(Matrix::MAX_DIM, Matrix::MAX_DIM, |_, _| Entry::Zero).is_ok());
    }

    #[test]
    fn test_monochromatic() {
        let m: Matrix = "0 *\n0 1\n* *".parse().unwrap();
        assert_eq!(m.monochromatic(Rect::new(0b011, 0b01)), Some(Entry::Zero));
        assert_eq!(m.monochromatic(Rect::new(0b001, 0b11)), Some(Entry::Zero));
        assert_eq!(m.monochromatic(Rect::new(0b010, 0b11)), None);
        assert_eq!(m.monochromatic(Rect::new(0b100, 0b11)), Some(Entry::DontCare));
        assert_eq!(m.monochromatic(Rect::new(0b110, 0b10)), Some(Entry::One));
        assert!(!m.is_constant());
    }

    #[test]
    fn test_error_display() {
        let err = MatrixError::Ragged {
            row: 3,
            expected: 4,
            found: 2,
        };
        assert_eq!(err.to_string(), "row 3 has 2 cells, expected 4");
    }
}
