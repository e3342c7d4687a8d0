//! Core traits for jacobi-ode.

/// A real-valued function of one real variable, such as `r` or `f` in
/// `u'' + r(x) u = f(x)`.
pub trait ScalarFn<T = f64>: Send + Sync {
    /// Evaluate the function at `x`.
    fn eval(&self, x: T) -> T;
}

impl<T, F> ScalarFn<T> for F
where
    F: Fn(T) -> T + Send + Sync,
{
    fn eval(&self, x: T) -> T {
        self(x)
    }
}

/// Receives progress notifications from the solve loop.
pub trait ProgressSink {
    /// Called with the 0-based iteration number at every reporting interval.
    fn report(&mut self, rank: usize, iteration: usize);
}
