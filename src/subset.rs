//! Subset combinatorics over bitmasks.
//!
//! Row and column sets are encoded as integers whose set bits are the member
//! indices. Two tables drive both the deterministic synthesizer and the LP
//! construction:
//!
//! - The **partition table** lists, for every subset `s`, one half `p` from
//!   each unordered bipartition `{p, s - p}` of `s`. The representative kept
//!   is the half that does not contain the highest set bit of `s`.
//! - The **extension table** lists, for every subset `s` of a fixed universe,
//!   every strict superset of `s` within that universe. Equivalently, `j` is
//!   an extension of `i` iff `i` or `j - i` is a half of `j`.
//!
//! # Example
//!
//! ```
//! use cc_bounds::subset::{extensions_of, partitions_of};
//!
//! let parts = partitions_of(0b111);
//! assert_eq!(parts[0b111], vec![0b001, 0b010, 0b011]);
//! assert!(parts[0b100].is_empty());
//!
//! let exts = extensions_of(0b111);
//! assert_eq!(exts[0b100], vec![0b101, 0b111, 0b110]);
//! assert!(exts[0b111].is_empty());
//! ```

use crate::utils::{is_full_mask, lowest_bit, lowest_unset_bit};

/// Builds the partition table for every subset value in `0..=universe`.
///
/// For a subset with `k >= 2` members the entry holds exactly `2^(k-1) - 1`
/// halves, each strictly between `0` and the subset. Singletons and the empty
/// set map to an empty list.
///
/// # Panics
///
/// Panics if `universe == 0`.
pub fn partitions_of(universe: usize) -> Vec<Vec<usize>> {
    assert!(universe > 0, "subset universe must be non-empty");

    // Built with the empty half included so that each entry can be derived
    // from the entry of `s` without its lowest bit; the empty half is dropped
    // at the end.
    let mut table: Vec<Vec<usize>> = Vec::with_capacity(universe + 1);
    table.push(Vec::new());
    for s in 1..=universe {
        let low = lowest_bit(s);
        let halves = if low == s {
            vec![0]
        } else {
            table[s - low].iter().flat_map(|&p| [p, p + low]).collect()
        };
        table.push(halves);
    }
    for halves in table.iter_mut().skip(1) {
        let empty = halves.remove(0);
        debug_assert_eq!(empty, 0);
    }

    log::debug!("partition table built for universe {:#b}", universe);
    table
}

/// Builds the extension table for every subset of `universe`.
///
/// The table is filled from the largest subsets down: each subset `s` extends
/// to `s` plus its lowest missing element, and inherits the extensions of
/// that parent both with and without that element.
///
/// # Panics
///
/// Panics if `universe` is not of the form `2^k - 1`.
pub fn extensions_of(universe: usize) -> Vec<Vec<usize>> {
    assert!(
        is_full_mask(universe),
        "subset universe must be a full mask, got {:#b}",
        universe
    );

    let mut table: Vec<Vec<usize>> = vec![Vec::new(); universe + 1];
    for s in (1..universe).rev() {
        let bit = lowest_unset_bit(s);
        let parent = s + bit;
        let exts: Vec<usize> = std::iter::once(parent)
            .chain(table[parent].iter().flat_map(|&p| [p, p - bit]))
            .collect();
        table[s] = exts;
    }

    log::debug!("extension table built for universe {:#b}", universe);
    table
}

/// Every subset of the universe containing `s`: its extensions, then `s` itself.
pub fn outer_subsets(extensions: &[Vec<usize>], s: usize) -> impl Iterator<Item = usize> + '_ {
    extensions[s].iter().copied().chain(std::iter::once(s))
}
