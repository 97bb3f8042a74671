//! End-to-end scenarios for the deterministic and randomized engines.

use cc_bounds::matrix::Matrix;
use cc_bounds::node::Node;
use cc_bounds::protocol::Protocol;
use cc_bounds::randomized::{build_program, max_success, min_bits, trivial_upper_bound};
use cc_bounds::types::{Entry, Party, Rect};

const EPS: f64 = 1e-6;

fn parse(s: &str) -> Matrix {
    s.parse().unwrap()
}

fn identity() -> Matrix {
    parse("1 0 0 0\n0 1 0 0\n0 0 1 0\n0 0 0 1")
}

// ─── Deterministic ─────────────────────────────────────────────────────────────

#[test]
fn identity_needs_three_bits() {
    let m = identity();
    let protocol = Protocol::synthesize(&m);
    assert_eq!(protocol.cost(), 3);
    assert_eq!(protocol.root().depth(), 3);

    // Each diagonal cell is its own 1-leaf.
    let ones = protocol.root().leaves().filter(|n| n.output() == Some(Entry::One)).count();
    assert_eq!(ones, 4);
}

#[test]
fn inequality_matches_identity() {
    let neq = parse("0 1 1 1\n1 0 1 1\n1 1 0 1\n1 1 1 0");
    assert_eq!(Protocol::synthesize(&neq).cost(), 3);
}

#[test]
fn xor_needs_two_bits() {
    let m = parse("0 1\n1 0");
    let protocol = Protocol::synthesize(&m);
    assert_eq!(protocol.cost(), 2);

    // Alice speaks first (row halves are tried before column halves).
    match protocol.root() {
        Node::Internal { speaker, choice, .. } => {
            assert_eq!(*speaker, Party::Alice);
            assert_eq!(*choice, 0b01);
        }
        leaf => panic!("expected an internal node, got {:?}", leaf),
    }
}

#[test]
fn constant_matrix_is_free() {
    for text in ["0 0 0\n0 0 0", "1 * \n * 1", "* *\n* *"] {
        let m = parse(text);
        let protocol = Protocol::synthesize(&m);
        assert_eq!(protocol.cost(), 0, "{}", text);
        assert_eq!(protocol.tables().output(m.full_rect()), m.monochromatic(m.full_rect()));
    }
}

#[test]
fn every_singleton_is_a_leaf() {
    let m = parse("0 * 1\n1 0 *");
    let protocol = Protocol::synthesize(&m);
    for (i, j, entry) in m.cells() {
        let cell = Rect::cell(i, j);
        assert_eq!(protocol.tables().cost(cell), 0);
        assert_eq!(protocol.tables().output(cell), Some(entry));
    }
}

#[test]
fn leaves_partition_the_matrix() {
    let m = parse("1 1 0 1\n1 0 1 0\n1 * 0 0\n1 0 * 0");
    let protocol = Protocol::synthesize(&m);
    let total: usize = protocol.root().leaves().map(|n| n.rect().size()).sum();
    assert_eq!(total, m.rows() * m.cols());
    for leaf in protocol.root().leaves() {
        assert_eq!(m.monochromatic(leaf.rect()), leaf.output());
    }
}

#[test]
fn largest_matrix_synthesizes() {
    // Output is the parity of row and column: each party announces its parity.
    let n = Matrix::MAX_DIM;
    let m = Matrix::from_fn(n, n, |i, j| Entry::from((i + j) % 2 == 1)).unwrap();
    let protocol = Protocol::synthesize(&m);
    assert_eq!(protocol.cost(), 2);
    assert_eq!(protocol.root().depth(), 2);
    assert_eq!(protocol.root().leaves().count(), 4);

    assert!(Matrix::from_fn(n + 1, n, |_, _| Entry::Zero).is_err());
}

// ─── Randomized ────────────────────────────────────────────────────────────────

#[test]
fn success_is_monotone_in_steps() {
    for text in ["0 1\n1 0", "0 0\n0 1", "0 1 1\n1 * 0\n1 0 1"] {
        let m = parse(text);
        let upper = trivial_upper_bound(&m);
        let mut previous = f64::NEG_INFINITY;
        for steps in 0..=upper {
            let p = max_success(&m, steps, false).unwrap();
            assert!(p >= previous - EPS, "{}: {} steps give {} < {}", text, steps, p, previous);
            assert!((-EPS..=1.0 + EPS).contains(&p));
            previous = p;
        }
        // The trivial protocol always succeeds.
        assert!((previous - 1.0).abs() < EPS, "{}: {}", text, previous);
    }
}

#[test]
fn min_bits_is_the_first_step_count_reaching_the_target() {
    let m = parse("0 1\n1 0");
    let t = min_bits(&m, 1.0, false).unwrap();
    assert_eq!(t, 2);
    assert!(max_success(&m, t - 1, false).unwrap() < 0.99);
    assert!(max_success(&m, t, false).unwrap() >= 0.99);
}

#[test]
fn min_bits_one_sided_half_probability() {
    // With one bit every reachable rectangle of XOR still holds a 0-input,
    // which forces all mass onto output 0.
    let m = parse("0 1\n1 0");
    let t = min_bits(&m, 0.5, true).unwrap();
    assert_eq!(t, 2);
    assert!(max_success(&m, t - 1, true).unwrap() < 0.49);
    assert!(max_success(&m, t, true).unwrap() >= 0.49);
}

#[test]
fn min_bits_half_probability_is_free_for_balanced_inputs() {
    let m = identity();
    assert_eq!(min_bits(&m, 0.5, false).unwrap(), 0);
}

#[test]
fn one_sided_is_never_easier() {
    let m = parse("0 1\n1 0");
    for steps in 0..=2 {
        let two_sided = max_success(&m, steps, false).unwrap();
        let one_sided = max_success(&m, steps, true).unwrap();
        assert!(one_sided <= two_sided + EPS, "{} steps: {} > {}", steps, one_sided, two_sided);
    }
}

#[test]
fn program_structure_scales_with_steps() {
    let m = identity();
    let p0 = build_program(&m, 0, false);
    let p1 = build_program(&m, 1, false);
    assert!(p0.lp.is_well_formed());
    assert!(p1.lp.is_well_formed());
    // One conservation row per (round, rectangle), one correctness row per cell.
    assert_eq!(p0.lp.eq.len(), 15 * 15);
    assert_eq!(p1.lp.eq.len(), 2 * 15 * 15);
    assert_eq!(p0.lp.ub.len(), 16);
    // Round 0 only has commits when no steps remain.
    assert_eq!(p0.index.num_slots(), 1 + 15 * 15 * 2);
}
