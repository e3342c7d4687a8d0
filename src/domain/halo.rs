//! Double-buffered worker values with one ghost slot on each side.
//!
//! Layout of both buffers (`n` = owned count):
//!
//! ```text
//!  slot:   0        1 ..= n         n + 1
//!          ghost    owned values    ghost
//! ```
//!
//! The left ghost mirrors the left neighbor's last owned value (or the
//! boundary value 0 at `x = 0`), the right ghost mirrors the right
//! neighbor's first owned value (or 0 at `x = 1`).

use num_traits::Float;

use crate::domain::Side;

#[derive(Debug, Clone, PartialEq)]
pub struct HaloBuffer<T = f64> {
    current: Vec<T>,
    next: Vec<T>,
    owned: usize,
}

impl<T: Float> HaloBuffer<T> {
    /// Zero-initialized buffers for `owned` points plus two ghosts.
    pub fn new(owned: usize) -> Self {
        Self {
            current: vec![T::zero(); owned + 2],
            next: vec![T::zero(); owned + 2],
            owned,
        }
    }

    pub fn owned_count(&self) -> usize {
        self.owned
    }

    /// The whole current buffer, ghosts included.
    pub fn current(&self) -> &[T] {
        &self.current
    }

    /// Current owned values in increasing global-index order.
    pub fn owned(&self) -> &[T] {
        &self.current[1..=self.owned]
    }

    fn ghost_slot(&self, side: Side) -> usize {
        match side {
            Side::Left => 0,
            Side::Right => self.owned + 1,
        }
    }

    pub fn ghost(&self, side: Side) -> T {
        self.current[self.ghost_slot(side)]
    }

    pub fn set_ghost(&mut self, side: Side, value: T) {
        let slot = self.ghost_slot(side);
        self.current[slot] = value;
    }

    /// Value handed to the neighbor on `side`: `current[1]` to the left,
    /// `current[n]` to the right. An empty slice forwards its ghosts.
    pub fn edge(&self, side: Side) -> T {
        match side {
            Side::Left => self.current[1],
            Side::Right => self.current[self.owned],
        }
    }

    /// Read access to `current` and write access to `next` for a sweep.
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        (&self.current, &mut self.next)
    }

    /// Exchange the roles of the two buffers. No data is copied.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Consume the buffer, keeping only the owned values.
    pub fn into_owned(mut self) -> Vec<T> {
        self.current.truncate(self.owned + 1);
        self.current.remove(0);
        self.current
    }
}
