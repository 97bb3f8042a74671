//! Bit tricks over subset masks.

/// Lowest set bit of `x`, as a mask.
///
/// ```text
/// x & -x
/// ```
pub fn lowest_bit(x: usize) -> usize {
    x & x.wrapping_neg()
}

/// Lowest unset bit of `x`, as a mask.
///
/// ```text
/// !x & (x + 1)
/// ```
pub fn lowest_unset_bit(x: usize) -> usize {
    !x & x.wrapping_add(1)
}

/// Index of the single set bit of `x`.
///
/// # Panics
///
/// Panics if `x` is not a power of two.
pub fn bit_index(x: usize) -> usize {
    assert!(x.is_power_of_two(), "expected a singleton mask, got {:#b}", x);
    x.trailing_zeros() as usize
}

/// Returns `true` if `x` is of the form `2^k - 1` with `k >= 1`.
pub fn is_full_mask(x: usize) -> bool {
    x != 0 && lowest_unset_bit(x) == x + 1
}

/// Mask with the `n` low bits set.
pub fn full_mask(n: usize) -> usize {
    assert!(n < usize::BITS as usize);
    (1 << n) - 1
}

/// Renders the `width` low bits of `x`, most significant bit first.
pub fn to_binary(x: usize, width: usize) -> String {
    (0..width).rev().map(|i| if (x >> i) & 1 == 1 { '1' } else { '0' }).collect()
}

/// Iterates over the indices of the set bits of `x`, lowest first.
pub fn bits(mut x: usize) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if x == 0 {
            None
        } else {
            let i = x.trailing_zeros() as usize;
            x &= x - 1;
            Some(i)
        }
    })
}
