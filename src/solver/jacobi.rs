//! One Jacobi relaxation sweep for `u'' + r u = f` on a worker's slice.
//!
//! The three-point discretization of row `i` gives
//!
//! ```text
//! u[i] = (u[i-1] + u[i+1] - h² f[i]) / (2 - h² r[i])
//! ```
//!
//! Every new value depends only on the previous iterate, so the sweep is
//! embarrassingly parallel and its result does not depend on evaluation
//! order.

use num_traits::Float;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::domain::HaloBuffer;
use crate::problem::CoefficientCache;

/// Slices shorter than this are swept sequentially.
#[cfg(feature = "rayon")]
pub const PAR_THRESHOLD: usize = 1 << 14;

#[inline(always)]
fn relax_point<T: Float>(current: &[T], cache: &CoefficientCache<T>, h2: T, i: usize) -> T {
    let two = T::one() + T::one();
    // cache has no ghost slots: owned slot i is cache entry i - 1
    let num = current[i - 1] + current[i + 1] - h2 * cache.f_values[i - 1];
    let denom = two - h2 * cache.r_values[i - 1];
    num / denom
}

/// Write the next iterate of slots `1..=n` of `current` into `next`.
///
/// Both slices use the halo layout (`n + 2` slots); ghost slots of `next`
/// are left untouched.
pub fn sweep<T>(current: &[T], next: &mut [T], cache: &CoefficientCache<T>, step: T)
where
    T: Float + Send + Sync,
{
    let n = cache.len();
    debug_assert_eq!(current.len(), n + 2);
    debug_assert_eq!(next.len(), n + 2);
    let h2 = step * step;

    if sweep_parallel(current, next, cache, h2) {
        return;
    }
    for i in 1..=n {
        next[i] = relax_point(current, cache, h2, i);
    }
}

#[cfg(feature = "rayon")]
fn sweep_parallel<T>(current: &[T], next: &mut [T], cache: &CoefficientCache<T>, h2: T) -> bool
where
    T: Float + Send + Sync,
{
    let n = cache.len();
    if n < PAR_THRESHOLD {
        return false;
    }
    next[1..=n].par_iter_mut().enumerate().for_each(|(k, out)| {
        *out = relax_point(current, cache, h2, k + 1);
    });
    true
}

#[cfg(not(feature = "rayon"))]
fn sweep_parallel<T>(_: &[T], _: &mut [T], _: &CoefficientCache<T>, _: T) -> bool {
    false
}

/// Sweep the halo buffer and make the new iterate current.
pub fn relax<T>(halo: &mut HaloBuffer<T>, cache: &CoefficientCache<T>, step: T)
where
    T: Float + Send + Sync,
{
    let (current, next) = halo.split();
    sweep(current, next, cache, step);
    halo.swap();
}
