//! Residual diagnostics for the fixed-iteration solve.
//!
//! The solver never stops early; the residual is computed once after the
//! last sweep and reported alongside the iteration count.

use num_traits::Float;

use crate::problem::CoefficientCache;

#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    pub iterations: usize,
    /// Global L2 norm of the discrete residual after the last iteration.
    pub final_residual: T,
}

/// Sum of squared residuals of the discrete equations over the owned points.
///
/// `values` is a halo-layout buffer (ghosts at both ends) whose ghosts are
/// up to date. Row `i` of the system reads
/// `u[i-1] + u[i+1] - h² f[i] - (2 - h² r[i]) u[i] = 0`.
pub fn local_residual_sq<T: Float>(values: &[T], cache: &CoefficientCache<T>, step: T) -> T {
    let h2 = step * step;
    let two = T::one() + T::one();
    (1..values.len().saturating_sub(1))
        .map(|i| {
            let res = values[i - 1] + values[i + 1] - h2 * cache.f_values[i - 1]
                - (two - h2 * cache.r_values[i - 1]) * values[i];
            res * res
        })
        .fold(T::zero(), |acc, r| acc + r)
}
