//! Property tests for the block partitioning of the interior mesh.

use jacobi_ode::{partition, OdeError, Partition, Sides};
use proptest::prelude::*;

proptest! {
    /// Ranges are contiguous, cover every point exactly once and start at 0.
    #[test]
    fn ranges_tile_the_mesh(workers in 1usize..64, total in 0usize..10_000) {
        let mut next = 0;
        for rank in 0..workers {
            let (first, owned) = partition(rank, workers, total);
            prop_assert_eq!(first, next);
            next = first + owned;
        }
        prop_assert_eq!(next, total);
    }

    /// Owned counts differ by at most one, and the larger slices sit at the
    /// lowest ranks.
    #[test]
    fn slices_are_balanced(workers in 1usize..64, total in 0usize..10_000) {
        let counts: Vec<usize> = (0..workers).map(|k| partition(k, workers, total).1).collect();
        let min = *counts.iter().min().unwrap();
        let max = *counts.iter().max().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(counts.windows(2).all(|w| w[0] >= w[1]));
        prop_assert_eq!(counts.iter().filter(|&&c| c == total / workers + 1).count(), total % workers);
    }

    #[test]
    fn partition_struct_agrees_with_closed_form(workers in 1usize..32, total in 0usize..1_000) {
        for part in Partition::all(workers, total).unwrap() {
            let (first, owned) = partition(part.rank, workers, total);
            prop_assert_eq!(part.first_global_index, first);
            prop_assert_eq!(part.owned_count, owned);
            prop_assert_eq!(part.range(), first..first + owned);
        }
    }
}

#[test]
fn only_the_outer_workers_touch_the_boundary() {
    let parts = Partition::all(4, 100).unwrap();
    assert_eq!(parts[0].boundary_sides(), Sides::LEFT);
    assert_eq!(parts[1].boundary_sides(), Sides::empty());
    assert_eq!(parts[2].boundary_sides(), Sides::empty());
    assert_eq!(parts[3].boundary_sides(), Sides::RIGHT);

    let single = Partition::new(0, 1, 100).unwrap();
    assert_eq!(single.boundary_sides(), Sides::BOTH);
}

#[test]
fn bad_ranks_are_rejected() {
    assert!(matches!(Partition::new(4, 4, 10), Err(OdeError::Config(_))));
    assert!(matches!(Partition::new(0, 0, 10), Err(OdeError::Config(_))));
}

#[test]
fn worked_examples() {
    assert_eq!(partition(0, 3, 10), (0, 4));
    assert_eq!(partition(1, 3, 10), (4, 3));
    assert_eq!(partition(2, 3, 10), (7, 3));
    // more workers than points: the tail owns nothing
    assert_eq!(partition(2, 4, 3), (2, 1));
    assert_eq!(partition(3, 4, 3), (3, 0));
}
