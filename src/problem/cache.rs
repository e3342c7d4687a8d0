// Per-worker coefficient cache

use crate::domain::Partition;
use crate::problem::OdeProblem;

/// `r` and `f` sampled at every owned point, so the sweep never evaluates
/// a transcendental function. Built once before iterating, read-only after.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientCache<T = f64> {
    pub r_values: Vec<T>,
    pub f_values: Vec<T>,
}

impl<T> CoefficientCache<T> {
    pub fn len(&self) -> usize {
        self.r_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r_values.is_empty()
    }
}

impl CoefficientCache<f64> {
    /// Sample `r` and `f` at the points owned by `part`.
    pub fn prime(part: &Partition, ode: &OdeProblem) -> Self {
        let (r_values, f_values) = part
            .range()
            .map(|g| {
                let x = ode.coordinate(g);
                (ode.r(x), ode.f(x))
            })
            .unzip();
        Self { r_values, f_values }
    }
}
