//! Block partitioning of the interior mesh across workers.
//!
//! The `totalPoints` interior mesh points are split into contiguous,
//! non-overlapping ranges, one per worker. Every worker receives either
//! `d` or `d + 1` points, where `d = totalPoints / workerCount`; the
//! `totalPoints % workerCount` remainder points go to the lowest ranks.
//!
//! # Example
//! ```rust
//! use jacobi_ode::domain::Partition;
//! let p = Partition::new(1, 2, 4).unwrap();
//! assert_eq!(p.first_global_index, 2);
//! assert_eq!(p.owned_count, 2);
//! ```

use std::fmt;
use std::ops::Range;

use bitflags::bitflags;

use crate::error::OdeError;
use crate::utils::coloring::Color;

/// Closed-form owner range: returns `(first_global_index, owned_count)`.
///
/// Pure arithmetic; the caller guarantees `workers >= 1`. Ranks beyond the
/// number of points get an empty range positioned at `total_points`.
pub fn partition(rank: usize, workers: usize, total_points: usize) -> (usize, usize) {
    let d = total_points / workers;
    let m = total_points % workers;

    let owned = if rank < m { d + 1 } else { d };
    let first = if rank == 0 {
        0
    } else if rank < m {
        (d + 1) * rank
    } else {
        (d + 1) * m + d * (rank - m)
    };
    (first, owned)
}

/// One of the two ends of a worker's slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Towards lower global indices (x = 0).
    Left,
    /// Towards higher global indices (x = 1).
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

bitflags! {
    /// Sides of a slice that touch a physical (Dirichlet) boundary.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Sides: u8 {
        const LEFT  = 0b01;
        const RIGHT = 0b10;
        const BOTH  = Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl From<Side> for Sides {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => Sides::LEFT,
            Side::Right => Sides::RIGHT,
        }
    }
}

/// The slice of the mesh owned by one worker. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Rank of the owning worker, in `[0, workers)`.
    pub rank: usize,
    /// Total number of workers.
    pub workers: usize,
    /// Global index of the first owned point.
    pub first_global_index: usize,
    /// Number of owned points (may be 0 when there are more workers than points).
    pub owned_count: usize,
}

impl Partition {
    /// Build the partition of `rank` out of `workers` over `total_points` points.
    pub fn new(rank: usize, workers: usize, total_points: usize) -> Result<Self, OdeError> {
        if workers == 0 {
            return Err(OdeError::Config("worker count must be at least 1".into()));
        }
        if rank >= workers {
            return Err(OdeError::Config(format!(
                "rank {rank} out of range for {workers} workers"
            )));
        }
        let (first_global_index, owned_count) = partition(rank, workers, total_points);
        Ok(Partition { rank, workers, first_global_index, owned_count })
    }

    /// Partitions of every rank, in rank order.
    pub fn all(workers: usize, total_points: usize) -> Result<Vec<Self>, OdeError> {
        (0..workers.max(1))
            .map(|rank| Partition::new(rank, workers, total_points))
            .collect()
    }

    /// Owned global indices as a half-open range.
    pub fn range(&self) -> Range<usize> {
        self.first_global_index..self.first_global_index + self.owned_count
    }

    pub fn is_empty(&self) -> bool {
        self.owned_count == 0
    }

    /// Rank on the given side, or `None` at the domain edge.
    pub fn neighbor(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.rank.checked_sub(1),
            Side::Right => (self.rank + 1 < self.workers).then_some(self.rank + 1),
        }
    }

    /// Sides on which this slice ends at `x = 0` or `x = 1`.
    pub fn boundary_sides(&self) -> Sides {
        let mut sides = Sides::empty();
        if self.rank == 0 {
            sides |= Sides::LEFT;
        }
        if self.rank + 1 == self.workers {
            sides |= Sides::RIGHT;
        }
        sides
    }

    /// Red/black color used to order the exchanges.
    pub fn color(&self) -> Color {
        Color::of_rank(self.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_goes_to_low_ranks() {
        // 10 points over 4 workers: 3,3,2,2
        let parts = Partition::all(4, 10).unwrap();
        let counts: Vec<_> = parts.iter().map(|p| p.owned_count).collect();
        let firsts: Vec<_> = parts.iter().map(|p| p.first_global_index).collect();
        assert_eq!(counts, vec![3, 3, 2, 2]);
        assert_eq!(firsts, vec![0, 3, 6, 8]);
    }

    #[test]
    fn two_workers_four_points() {
        assert_eq!(partition(0, 2, 4), (0, 2));
        assert_eq!(partition(1, 2, 4), (2, 2));
    }

    #[test]
    fn more_workers_than_points() {
        let parts = Partition::all(5, 3).unwrap();
        assert_eq!(parts[2].range(), 2..3);
        assert!(parts[3].is_empty());
        assert!(parts[4].is_empty());
        assert_eq!(parts[4].first_global_index, 3);
    }

    #[test]
    fn rejects_zero_workers_and_bad_rank() {
        assert!(matches!(Partition::new(0, 0, 10), Err(OdeError::Config(_))));
        assert!(matches!(Partition::new(3, 3, 10), Err(OdeError::Config(_))));
    }

    #[test]
    fn neighbors_and_boundaries() {
        let single = Partition::new(0, 1, 8).unwrap();
        assert_eq!(single.boundary_sides(), Sides::BOTH);
        assert_eq!(single.neighbor(Side::Left), None);
        assert_eq!(single.neighbor(Side::Right), None);

        let middle = Partition::new(1, 3, 8).unwrap();
        assert!(middle.boundary_sides().is_empty());
        assert_eq!(middle.neighbor(Side::Left), Some(0));
        assert_eq!(middle.neighbor(Side::Right), Some(2));

        let last = Partition::new(2, 3, 8).unwrap();
        assert_eq!(last.boundary_sides(), Sides::RIGHT);
    }
}
