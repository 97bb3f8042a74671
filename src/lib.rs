//! # cc-bounds: Communication complexity bounds in Rust
//!
//! **`cc-bounds`** computes communication-complexity bounds for a two-party
//! Boolean function given as a finite matrix: rows are Alice's inputs, columns
//! are Bob's inputs, and every cell is `0`, `1`, or a don't-care.
//!
//! ## What is computed?
//!
//! - **Deterministic complexity.** The minimum worst-case number of bits the
//!   two parties must exchange to agree on the output, together with an
//!   optimal protocol as an explicit binary tree. See [`protocol`].
//! - **Randomized success probability.** For a fixed number of bits, the best
//!   worst-case success probability of a randomized protocol, obtained from a
//!   linear program over probability flows. A bisection over the bit budget
//!   turns this into the minimum number of bits for a target probability.
//!   See [`randomized`].
//!
//! Both engines index tables by all `2^a * 2^b` rectangles of an `a x b`
//! matrix, so they are meant for small matrices.
//!
//! ## Basic Usage
//!
//! ```rust
//! use cc_bounds::matrix::Matrix;
//! use cc_bounds::protocol::Protocol;
//! use cc_bounds::randomized::max_success;
//!
//! // 1. Describe the function
//! let eq: Matrix = "
//!     1 0 0 0
//!     0 1 0 0
//!     0 0 1 0
//!     0 0 0 1
//! ".parse().unwrap();
//!
//! // 2. Optimal deterministic protocol
//! let protocol = Protocol::synthesize(&eq);
//! assert_eq!(protocol.cost(), 3);
//! println!("{}", protocol);
//!
//! // 3. Best randomized protocol with no communication at all
//! let p = max_success(&eq, 0, false).unwrap();
//! assert!((p - 0.5).abs() < 1e-6);
//! ```
//!
//! ## Core Components
//!
//! - **[`subset`]**: partition and extension tables over bitmask subsets.
//! - **[`protocol`]**: dynamic-programming tables and protocol tree reconstruction.
//! - **[`randomized`]**: the flow LP, `max_success`, and `min_bits`.
//! - **[`lp`]**: the canonical LP form and the solver backend.

pub mod dot;
pub mod lp;
pub mod matrix;
pub mod node;
pub mod protocol;
pub mod randomized;
pub mod subset;
pub mod types;
pub mod utils;
