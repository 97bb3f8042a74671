//! Linear programs in canonical form and the solver seam.
//!
//! The randomized bound solver never talks to an LP library directly. It
//! produces a [`LinearProgram`]:
//!
//! ```text
//! minimise    c · x
//! subject to  A_eq x  = b_eq
//!             A_ub x <= b_ub
//!             lo_i <= x_i <= hi_i
//! ```
//!
//! and hands it to an [`LpSolver`]. The default backend, [`MicroLp`], solves
//! it with the pure-Rust simplex solver bundled with `good_lp`.

use std::fmt;

use good_lp::{
    default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
};
use log::debug;

/// A sparse constraint row: `(variable, coefficient)` pairs.
pub type Row = Vec<(usize, f64)>;

/// Error type for LP construction and solving.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The constraint system has no solution.
    Infeasible,
    /// The objective can be decreased without bound.
    Unbounded,
    /// Any other failure reported by the backend.
    Backend(String),
    /// A target success probability outside `[0, 1]`.
    InvalidProbability(f64),
    /// A negative or NaN bisection tolerance.
    InvalidTolerance(f64),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Infeasible => write!(f, "linear program is infeasible"),
            SolveError::Unbounded => write!(f, "linear program is unbounded"),
            SolveError::Backend(msg) => write!(f, "LP backend error: {}", msg),
            SolveError::InvalidProbability(p) => write!(f, "success probability {} is outside [0, 1]", p),
            SolveError::InvalidTolerance(t) => write!(f, "tolerance {} is not a non-negative number", t),
        }
    }
}

impl std::error::Error for SolveError {}

impl From<ResolutionError> for SolveError {
    fn from(e: ResolutionError) -> Self {
        match e {
            ResolutionError::Infeasible => SolveError::Infeasible,
            ResolutionError::Unbounded => SolveError::Unbounded,
            other => SolveError::Backend(other.to_string()),
        }
    }
}

/// A linear program in canonical minimisation form.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    /// Objective coefficients, one per variable.
    pub objective: Vec<f64>,
    /// Equality rows.
    pub eq: Vec<Row>,
    /// Right-hand sides of the equality rows.
    pub eq_rhs: Vec<f64>,
    /// Inequality rows, in `<=` form.
    pub ub: Vec<Row>,
    /// Right-hand sides of the inequality rows.
    pub ub_rhs: Vec<f64>,
    /// `(lower, upper)` bounds per variable; `None` is unbounded on that side.
    pub bounds: Vec<(Option<f64>, Option<f64>)>,
}

impl LinearProgram {
    /// Creates a program over `num_vars` variables with a zero objective and
    /// every variable free.
    pub fn new(num_vars: usize) -> Self {
        Self {
            objective: vec![0.0; num_vars],
            bounds: vec![(None, None); num_vars],
            ..Self::default()
        }
    }

    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn add_eq(&mut self, row: Row, rhs: f64) {
        self.eq.push(row);
        self.eq_rhs.push(rhs);
    }

    pub fn add_ub(&mut self, row: Row, rhs: f64) {
        self.ub.push(row);
        self.ub_rhs.push(rhs);
    }

    /// Checks that every row references allocated variables only, once each,
    /// and that every side table has the right length.
    pub fn is_well_formed(&self) -> bool {
        let n = self.num_vars();
        let rows_ok = |rows: &[Row]| {
            rows.iter().all(|row| {
                let mut seen = vec![false; n];
                row.iter().all(|&(i, _)| i < n && !std::mem::replace(&mut seen[i], true))
            })
        };
        self.bounds.len() == n
            && self.eq.len() == self.eq_rhs.len()
            && self.ub.len() == self.ub_rhs.len()
            && rows_ok(&self.eq)
            && rows_ok(&self.ub)
    }

    /// Checks whether `x` satisfies every constraint within `tol`.
    pub fn is_feasible(&self, x: &[f64], tol: f64) -> bool {
        let dot = |row: &Row| row.iter().map(|&(i, c)| c * x[i]).sum::<f64>();
        x.len() == self.num_vars()
            && self.eq.iter().zip(&self.eq_rhs).all(|(row, &rhs)| (dot(row) - rhs).abs() <= tol)
            && self.ub.iter().zip(&self.ub_rhs).all(|(row, &rhs)| dot(row) <= rhs + tol)
            && self.bounds.iter().zip(x).all(|(&(lo, hi), &v)| {
                lo.map_or(true, |lo| v >= lo - tol) && hi.map_or(true, |hi| v <= hi + tol)
            })
    }

    /// Objective value at `x`.
    pub fn objective_at(&self, x: &[f64]) -> f64 {
        self.objective.iter().zip(x).map(|(c, v)| c * v).sum()
    }
}

/// A backend able to minimise a [`LinearProgram`].
pub trait LpSolver {
    /// Returns the optimal objective value.
    fn minimize(&self, lp: &LinearProgram) -> Result<f64, SolveError>;
}

/// Default backend: the `microlp` simplex solver through `good_lp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLp;

fn linear(vars: &[Variable], terms: impl IntoIterator<Item = (usize, f64)>) -> Expression {
    let mut expr = Expression::default();
    for (i, c) in terms {
        expr.add_mul(c, vars[i]);
    }
    expr
}

impl LpSolver for MicroLp {
    fn minimize(&self, lp: &LinearProgram) -> Result<f64, SolveError> {
        debug!(
            "solving LP with {} variables, {} equalities, {} inequalities",
            lp.num_vars(),
            lp.eq.len(),
            lp.ub.len()
        );

        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = lp
            .bounds
            .iter()
            .map(|&(lo, hi)| {
                let mut def = variable();
                if let Some(lo) = lo {
                    def = def.min(lo);
                }
                if let Some(hi) = hi {
                    def = def.max(hi);
                }
                problem.add(def)
            })
            .collect();

        let objective = linear(&vars, lp.objective.iter().copied().enumerate().filter(|&(_, c)| c != 0.0));
        let mut model = problem.minimise(objective.clone()).using(default_solver);
        for (row, &rhs) in lp.eq.iter().zip(&lp.eq_rhs) {
            model = model.with(linear(&vars, row.iter().copied()).eq(rhs));
        }
        for (row, &rhs) in lp.ub.iter().zip(&lp.ub_rhs) {
            model = model.with(linear(&vars, row.iter().copied()).leq(rhs));
        }

        let solution = model.solve()?;
        let value = solution.eval(&objective);
        debug!("LP optimum: {}", value);
        Ok(value)
    }
}
