//! Direct reference solve of the discretized problem using Faer.
//!
//! The Jacobi iterate converges to the solution of the tridiagonal system
//!
//! ```text
//! (2 - h² r_i) u_i - u_{i-1} - u_{i+1} = -h² f_i,   i = 0..n
//! ```
//!
//! with `u_{-1} = u_n = 0`. This module assembles that system as a dense
//! matrix and factors it with full-pivoting LU, which gives the exact
//! discrete solution for comparison. Dense storage limits it to small and
//! medium meshes.
//!
//! # References
//! - Faer documentation: https://github.com/sarah-ek/faer-rs

use faer::linalg::solvers::{FullPivLu, SolveCore};
use faer::{Conj, Mat, MatMut};

use crate::error::OdeError;
use crate::problem::OdeProblem;

/// Largest mesh the dense reference solver accepts.
pub const MAX_DIRECT_POINTS: usize = 4096;

/// Dense LU solver for the full (undistributed) mesh.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectSolver;

impl DirectSolver {
    pub fn new() -> Self {
        DirectSolver
    }

    /// Assemble the tridiagonal system matrix for `ode`.
    pub fn assemble(ode: &OdeProblem) -> Mat<f64> {
        let n = ode.n_steps;
        let h2 = ode.step * ode.step;
        let mut a = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            a[(i, i)] = 2.0 - h2 * ode.r(ode.coordinate(i));
            if i > 0 {
                a[(i, i - 1)] = -1.0;
            }
            if i + 1 < n {
                a[(i, i + 1)] = -1.0;
            }
        }
        a
    }

    /// Exact discrete solution at the interior points, in global-index order.
    pub fn solve(&self, ode: &OdeProblem) -> Result<Vec<f64>, OdeError> {
        let n = ode.n_steps;
        if n > MAX_DIRECT_POINTS {
            return Err(OdeError::Config(format!(
                "direct solve supports at most {MAX_DIRECT_POINTS} points, got {n}"
            )));
        }
        let h2 = ode.step * ode.step;
        let a = Self::assemble(ode);
        let factor = FullPivLu::new(a.as_ref());

        let mut x: Vec<f64> = (0..n).map(|i| -h2 * ode.f(ode.coordinate(i))).collect();
        let x_mat = MatMut::from_column_major_slice_mut(&mut x, n, 1);
        factor.solve_in_place_with_conj(Conj::No, x_mat);

        if x.iter().any(|v| !v.is_finite()) {
            return Err(OdeError::Runtime("direct solve produced non-finite values (singular system)".into()));
        }
        Ok(x)
    }
}
